use std::cell::RefCell;
use std::rc::Rc;

use crate::callback::{DeleteCallback, InsertCallback, IteratorFn};
use crate::column::ColumnDescriptor;
use crate::row::RowHandle;

/// How a table's rows are reached (§3, §4.4). There is no "base address or
/// null" union here the way the source has it: array-backed storage is a
/// `Vec<RowHandle>` the engine can index directly, iterator-backed storage
/// is a host-supplied sequence closure. Either way row count is read off
/// the storage at scan time, never cached (§4.4).
pub enum RowStorage {
    /// Contiguous, host-owned rows, shared via `Rc` so that the insert and
    /// delete callbacks built alongside this storage (table construction
    /// time) can push/remove from the same `Vec` the engine scans.
    Array(Rc<RefCell<Vec<RowHandle>>>),
    /// Linked-list-shaped storage walked by a host closure (§4.4). The
    /// engine never sees the link field.
    Iterator(IteratorFn),
}

impl RowStorage {
    pub fn array(rows: Vec<RowHandle>) -> Self {
        RowStorage::Array(Rc::new(RefCell::new(rows)))
    }

    /// Builds array storage sharing an existing handle, for callers that
    /// need to close over the same `Vec` when wiring insert/delete
    /// callbacks (demo tables, tests).
    pub fn shared_array(rows: Rc<RefCell<Vec<RowHandle>>>) -> Self {
        RowStorage::Array(rows)
    }

    /// The underlying shared `Vec`, for building insert/delete callbacks
    /// that must stay in sync with this storage. `None` for iterator-backed
    /// tables.
    pub fn array_handle(&self) -> Option<Rc<RefCell<Vec<RowHandle>>>> {
        match self {
            RowStorage::Array(rows) => Some(rows.clone()),
            RowStorage::Iterator(_) => None,
        }
    }

    /// First row of a scan: `base + 0` for array storage, `iter(None, 0)`
    /// for iterator storage (§4.4).
    pub fn first(&self) -> Option<RowHandle> {
        match self {
            RowStorage::Array(rows) => rows.borrow().first().cloned(),
            RowStorage::Iterator(iter_fn) => iter_fn(None, 0),
        }
    }

    /// Next row after `(prev, prev_index)`.
    pub fn next(&self, prev: &RowHandle, prev_index: usize) -> Option<RowHandle> {
        match self {
            RowStorage::Array(rows) => rows.borrow().get(prev_index + 1).cloned(),
            RowStorage::Iterator(iter_fn) => iter_fn(Some(prev), prev_index + 1),
        }
    }

    /// Row count at this instant. For array storage this is exact and
    /// O(1); for iterator storage there is no cheaper way than walking, so
    /// callers that only need "is this table empty" should prefer `first()
    /// .is_none()` instead of `count() == 0`.
    pub fn count(&self) -> usize {
        match self {
            RowStorage::Array(rows) => rows.borrow().len(),
            RowStorage::Iterator(_) => {
                let mut n = 0usize;
                let mut cur = self.first();
                while let Some(row) = cur {
                    n += 1;
                    cur = self.next(&row, n - 1);
                }
                n
            }
        }
    }

    pub fn push_array_row(&self, row: RowHandle) {
        if let RowStorage::Array(rows) = self {
            rows.borrow_mut().push(row);
        }
    }

    /// Removes the first handle identity-equal to `row` (§3 Lifecycle:
    /// DELETE's callback takes over unlinking). No-op for iterator storage
    /// or if the row is already gone.
    pub fn remove_array_row(&self, row: &RowHandle) {
        if let RowStorage::Array(rows) = self {
            let mut rows = rows.borrow_mut();
            if let Some(pos) = rows.iter().position(|r| r.same_row(row)) {
                rows.remove(pos);
            }
        }
    }
}

/// Immutable description of one registered table (§3). Built by the host
/// before registration; the registry stores a reference (`Rc`), not a copy.
pub struct TableDescriptor {
    pub name: String,
    /// Size in bytes of one row record; used to zero-fill engine-allocated
    /// rows on INSERT and to size indirect-column pointees.
    pub row_size: usize,
    pub storage: RowStorage,
    pub insert_cb: Option<InsertCallback>,
    pub delete_cb: Option<DeleteCallback>,
    pub columns: Vec<ColumnDescriptor>,
    /// Empty string means "no persistence" (§3).
    pub savefile: String,
    pub help: String,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, row_size: usize, storage: RowStorage) -> Self {
        TableDescriptor {
            name: name.into(),
            row_size,
            storage,
            insert_cb: None,
            delete_cb: None,
            columns: Vec::new(),
            savefile: String::new(),
            help: String::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_insert_cb(mut self, cb: InsertCallback) -> Self {
        self.insert_cb = Some(cb);
        self
    }

    pub fn with_delete_cb(mut self, cb: DeleteCallback) -> Self {
        self.delete_cb = Some(cb);
        self
    }

    pub fn with_savefile(mut self, path: impl Into<String>) -> Self {
        self.savefile = path.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_savefile(&self) -> bool {
        !self.savefile.is_empty()
    }

    pub fn supports_insert(&self) -> bool {
        self.insert_cb.is_some()
    }

    pub fn supports_delete(&self) -> bool {
        self.delete_cb.is_some()
    }
}

pub type TableRef = Rc<TableDescriptor>;
