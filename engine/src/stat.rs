//! Monotonic counters backing the `rta_stat` meta-table (§4.9).
//!
//! Plain `Cell<u64>` fields rather than a `RefCell`-wrapped struct: every
//! counter is `Copy`, so interior mutability through a shared `&Stat` needs
//! nothing heavier.

use std::cell::Cell;

use sql::CommandKind;

#[derive(Debug, Default)]
pub struct Stat {
    pub syserr: Cell<u64>,
    pub internalerr: Cell<u64>,
    pub sqlerr: Cell<u64>,
    pub connections: Cell<u64>,
    pub n_select: Cell<u64>,
    pub n_update: Cell<u64>,
    pub n_insert: Cell<u64>,
    pub n_delete: Cell<u64>,
}

impl Stat {
    pub fn new() -> Self {
        Stat::default()
    }

    fn bump(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }

    pub fn bump_verb(&self, kind: CommandKind) {
        match kind {
            CommandKind::Select => Stat::bump(&self.n_select),
            CommandKind::Update => Stat::bump(&self.n_update),
            CommandKind::Insert => Stat::bump(&self.n_insert),
            CommandKind::Delete => Stat::bump(&self.n_delete),
        }
    }

    pub fn bump_sqlerr(&self) {
        Stat::bump(&self.sqlerr)
    }

    pub fn bump_internalerr(&self) {
        Stat::bump(&self.internalerr)
    }

    pub fn bump_syserr(&self) {
        Stat::bump(&self.syserr)
    }

    pub fn bump_connections(&self) {
        Stat::bump(&self.connections)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bump_verb_increments_the_right_counter() {
        let stat = Stat::new();
        stat.bump_verb(CommandKind::Select);
        stat.bump_verb(CommandKind::Select);
        stat.bump_verb(CommandKind::Insert);
        assert_eq!(stat.n_select.get(), 2);
        assert_eq!(stat.n_insert.get(), 1);
        assert_eq!(stat.n_update.get(), 0);
    }
}
