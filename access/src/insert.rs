//! Row allocation for the INSERT path (§4.6): a zero-filled row of the
//! table's declared size, with every indirect column's pointee
//! heap-allocated and zeroed (§3 Lifecycle — "the engine initializes
//! indirect-pointer slots in engine-allocated rows").

use catalog::{RowHandle, TableDescriptor};

use crate::cell::{alloc_indirect, free_indirect};

/// Allocates a new row for `table`: zero-filled bytes, plus a live pointee
/// allocation behind every indirect column's slot.
pub fn allocate_row(table: &TableDescriptor) -> RowHandle {
    let row = RowHandle::zeroed(table.row_size);
    for col in &table.columns {
        if let Some(size) = col.kind.pointee_size() {
            // SAFETY: freed exactly once, either by `free_row_indirects`
            // (INSERT rejected, or DELETE) or implicitly handed off to the
            // row for its lifetime otherwise.
            let ptr = unsafe { alloc_indirect(size) };
            row.with_bytes_mut(|buf| {
                buf[col.offset..col.offset + std::mem::size_of::<usize>()]
                    .copy_from_slice(&ptr.to_ne_bytes());
            });
        }
    }
    row
}

/// Frees every indirect column's pointee allocation in `row`. Called when
/// an INSERT is rejected by the insert callback (§4.6 E_BADINSERT path,
/// "the engine frees everything it allocated") and by the executor's
/// DELETE path before handing the row to the host's delete callback (§3
/// Lifecycle).
pub fn free_row_indirects(table: &TableDescriptor, row: &RowHandle) {
    for col in &table.columns {
        if let Some(size) = col.kind.pointee_size() {
            let ptr = row.with_bytes(|buf| {
                let slot = &buf[col.offset..col.offset + std::mem::size_of::<usize>()];
                usize::from_ne_bytes(slot.try_into().expect("pointer-sized slot"))
            });
            // SAFETY: `ptr` was produced by `allocate_row`'s `alloc_indirect`
            // call for this exact column and has not been freed yet — the
            // executor calls this at most once per row, on the single
            // rejection/DELETE path that owns the row.
            unsafe { free_indirect(ptr, size) };
        }
    }
}
