//! Type system and registry for the embedded SQL engine (C1, C2).
//!
//! This crate knows nothing about SQL text or the wire protocol. It only
//! defines the scalar kinds a column can hold, the immutable descriptors a
//! host registers, and the registry that enforces the naming/size/structural
//! invariants of the design. `access` builds the row-reading machinery on
//! top of these types; `sql`/`engine` never reach into a row's bytes
//! directly, only through what this crate and `access` expose.

pub mod callback;
pub mod column;
pub mod kind;
pub mod reserved;
pub mod registry;
pub mod row;
pub mod table;
pub mod value;

pub use callback::{DeleteCallback, InsertCallback, IteratorFn, ReadCallback, WriteCallback};
pub use column::ColumnDescriptor;
pub use kind::{ColumnFlags, ColumnKind};
pub use registry::{Registry, MAX_COLUMNS, MAX_COLUMNS_PER_TABLE, MAX_TABLES};
pub use row::RowHandle;
pub use table::{RowStorage, TableDescriptor, TableRef};
pub use value::{CellValue, RelOp};
