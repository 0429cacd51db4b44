use std::rc::Rc;

use common::Result;

use crate::row::RowHandle;

/// Invoked before a row's value is read (projection or WHERE evaluation).
/// Signature per §9 design notes: `(table, column, row_id) -> Result<()>`.
/// Read callbacks exist to let the host recompute a derived value (a sum,
/// an average) into the row just before the engine reads it; the actual
/// value still comes from the row's bytes via the accessor.
pub type ReadCallback = Rc<dyn Fn(&str, &str, usize) -> Result<()>>;

/// Invoked once per targeted column after its new value has been written
/// into the row, in column-definition order (§4.6). `old_row` is the
/// pre-UPDATE snapshot, `None` on the INSERT path where there is nothing to
/// roll back to.
pub type WriteCallback =
    Rc<dyn Fn(&str, &str, &str, &RowHandle, usize, Option<&[u8]>) -> Result<()>>;

/// Invoked once per INSERT with the fully-populated, engine-allocated row.
/// Returns the OID/row index on acceptance; the table takes over linkage
/// from here. A negative C return becomes `Err` in this rewrite.
pub type InsertCallback = Rc<dyn Fn(&str, &str, &RowHandle) -> Result<i64>>;

/// Invoked once per DELETE; takes over both unlinking and freeing
/// responsibility, including any indirect-column heap allocations (§3).
pub type DeleteCallback = Rc<dyn Fn(&str, &RowHandle) -> Result<()>>;

/// Host-supplied sequence function for iterator-backed tables (§4.4):
/// `(previous handle or None, desired row index) -> next handle or None`.
pub type IteratorFn = Rc<dyn Fn(Option<&RowHandle>, usize) -> Option<RowHandle>>;
