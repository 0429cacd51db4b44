//! Engine facade (C6, C7, C9, C10, C11): the query executor, the savefile
//! engine, the self-describing meta-tables, and the `Engine` handle that
//! ties them to a `catalog::Registry`.
//!
//! `wire` and `server` talk to this crate only through `Engine`; nothing
//! downstream needs to know a row is ever just bytes behind an `Rc`.

pub mod dbg;
pub mod executor;
pub mod handle;
pub mod meta;
pub mod savefile;
pub mod stat;

pub use dbg::DbgConfig;
pub use executor::{ExecResult, FieldDescriptor};
pub use handle::Engine;
pub use meta::{is_meta_table, RTA_COLUMNS, RTA_DBG, RTA_STAT, RTA_TABLES};
pub use stat::Stat;
