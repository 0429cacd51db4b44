use std::cell::RefCell;
use std::rc::Rc;

/// An opaque reference to one row, usable with the row accessor (`access`
/// crate). Backed by a reference-counted byte buffer rather than a raw
/// pointer into host memory: for array-backed tables the table owns one
/// `RowHandle` per slot; for iterator-backed tables the handle is whatever
/// the host's iterator closure hands back, cloned cheaply since it is just
/// an `Rc` bump.
#[derive(Debug, Clone)]
pub struct RowHandle(Rc<RefCell<Vec<u8>>>);

impl RowHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        RowHandle(Rc::new(RefCell::new(bytes)))
    }

    pub fn zeroed(row_size: usize) -> Self {
        RowHandle::new(vec![0u8; row_size])
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    pub fn restore(&self, snapshot: &[u8]) {
        self.0.borrow_mut().copy_from_slice(snapshot);
    }

    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Identity comparison: two handles pointing at the same underlying
    /// buffer. Used by the iterator-backed scan to detect when a delete
    /// callback has already unlinked the row it was handed.
    pub fn same_row(&self, other: &RowHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
