//! Iterator abstraction: produces successive `(row handle, row id)`
//! pairs for a table's scan loop, whether the table is array- or
//! iterator-backed. The distinction is invisible past this module — the
//! executor just calls `RowScan::new(table)` and iterates.

use catalog::{RowHandle, TableDescriptor};

pub struct RowScan<'a> {
    table: &'a TableDescriptor,
    cursor: Option<(RowHandle, usize)>,
    started: bool,
}

impl<'a> RowScan<'a> {
    pub fn new(table: &'a TableDescriptor) -> Self {
        RowScan {
            table,
            cursor: None,
            started: false,
        }
    }
}

impl<'a> Iterator for RowScan<'a> {
    type Item = (RowHandle, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let produced = if !self.started {
            self.started = true;
            self.table.storage.first().map(|row| (row, 0usize))
        } else {
            let (prev, prev_idx) = self.cursor.take()?;
            self.table.storage.next(&prev, prev_idx).map(|row| (row, prev_idx + 1))
        };
        self.cursor = produced.clone();
        produced
    }
}
