//! Process-wide debug configuration backing the `rta_dbg` meta-table (§4.9).
//!
//! Writable through SQL (`UPDATE rta_dbg SET trace=1`), so every field needs
//! interior mutability through a shared `&DbgConfig`; `target`/`ident`
//! changes additionally tear down and reinstall the `tracing` subscriber's
//! writer (§4.10), which `Engine` does after the write callback returns.

use std::cell::{Cell, RefCell};

use common::config::EngineSection;
use common::log::LogTarget;

#[derive(Debug)]
pub struct DbgConfig {
    pub syserr: Cell<bool>,
    pub internalerr: Cell<bool>,
    pub sqlerr: Cell<bool>,
    pub trace: Cell<bool>,
    pub target: Cell<u8>,
    /// Syslog priority/facility the `rta_dbg` meta-table still carries for
    /// parity with `librta`'s `Rtadbg` (§4.9); `tracing`-based logging has no
    /// use for either, so a write here only updates the stored value.
    pub priority: Cell<u8>,
    pub facility: Cell<u8>,
    pub ident: RefCell<String>,
}

impl Default for DbgConfig {
    fn default() -> Self {
        DbgConfig {
            syserr: Cell::new(false),
            internalerr: Cell::new(false),
            sqlerr: Cell::new(false),
            trace: Cell::new(false),
            target: Cell::new(0),
            priority: Cell::new(6), // LOG_INFO
            facility: Cell::new(0),
            ident: RefCell::new("rta".to_string()),
        }
    }
}

impl DbgConfig {
    pub fn new() -> Self {
        DbgConfig::default()
    }

    pub fn from_section(section: &EngineSection) -> Self {
        DbgConfig {
            syserr: Cell::new(section.dbg_syserr),
            internalerr: Cell::new(section.dbg_internalerr),
            sqlerr: Cell::new(section.dbg_sqlerr),
            trace: Cell::new(section.dbg_trace),
            target: Cell::new(section.dbg_target),
            priority: Cell::new(section.dbg_priority),
            facility: Cell::new(section.dbg_facility),
            ident: RefCell::new(section.dbg_ident.clone()),
        }
    }

    pub fn log_target(&self) -> LogTarget {
        LogTarget::from_code(self.target.get())
    }
}
