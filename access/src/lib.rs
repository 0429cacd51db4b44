//! Row accessor and iterator abstraction (C3, C4).
//!
//! Sits directly on top of `catalog`: this is where a `(table, column
//! descriptor, row handle)` triple turns into a `CellValue`, where WHERE
//! terms get compared, and where a table's rows get walked regardless of
//! whether they live in a `Vec` or behind a host iterator closure. `sql`
//! and `engine` never touch row bytes except through this crate.

pub mod cell;
pub mod compare;
pub mod insert;
pub mod scan;

pub use cell::{alloc_indirect, free_indirect, read_cell, write_cell};
pub use compare::compare;
pub use insert::{allocate_row, free_row_indirects};
pub use scan::RowScan;
