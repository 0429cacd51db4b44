//! Row accessor: reads and writes a typed cell given a column
//! descriptor and a row handle, honoring the direct/indirect distinction
//! (§4.3). Direct slots are decoded straight out of the row's safe `&[u8]`
//! window; only indirect slots need to chase a pointer, which is the one
//! unsafe boundary this crate keeps (§9 design note) — its precondition is
//! that the slot holds either zero or a pointer this crate itself handed
//! out via `alloc_indirect`, of exactly `pointee_size()` bytes.

use byteorder::{ByteOrder, LittleEndian};
use catalog::{CellValue, ColumnDescriptor, ColumnKind, RowHandle};
use common::err::EngineError;
use common::Result;

fn decode_direct(kind: &ColumnKind, bytes: &[u8]) -> CellValue {
    match kind {
        ColumnKind::Str(_) => CellValue::Str(decode_cstr(bytes)),
        ColumnKind::Int => CellValue::Int(LittleEndian::read_i32(bytes)),
        ColumnKind::Short => CellValue::Short(LittleEndian::read_i16(bytes)),
        ColumnKind::UChar => CellValue::UChar(bytes[0]),
        ColumnKind::Long => CellValue::Long(LittleEndian::read_i64(bytes)),
        ColumnKind::Float => CellValue::Float(LittleEndian::read_f32(bytes)),
        ColumnKind::Double => CellValue::Double(LittleEndian::read_f64(bytes)),
        ColumnKind::Pointer => CellValue::Pointer(LittleEndian::read_u64(bytes)),
        ColumnKind::IndirectStr(_)
        | ColumnKind::IndirectInt
        | ColumnKind::IndirectLong
        | ColumnKind::IndirectFloat => {
            unreachable!("indirect kinds are decoded via their pointee, not decode_direct")
        }
    }
}

fn encode_direct(col: &ColumnDescriptor, value: &CellValue, out: &mut [u8]) -> Result<()> {
    match (&col.kind, value) {
        (ColumnKind::Str(cap), CellValue::Str(s)) => encode_cstr(col, *cap as usize, s, out)?,
        (ColumnKind::Int, CellValue::Int(v)) => LittleEndian::write_i32(out, *v),
        (ColumnKind::Short, CellValue::Short(v)) => LittleEndian::write_i16(out, *v),
        (ColumnKind::UChar, CellValue::UChar(v)) => out[0] = *v,
        (ColumnKind::Long, CellValue::Long(v)) => LittleEndian::write_i64(out, *v),
        (ColumnKind::Float, CellValue::Float(v)) => LittleEndian::write_f32(out, *v),
        (ColumnKind::Double, CellValue::Double(v)) => LittleEndian::write_f64(out, *v),
        (ColumnKind::Pointer, CellValue::Pointer(v)) => LittleEndian::write_u64(out, *v),
        _ => return Err(EngineError::BadParse),
    }
    Ok(())
}

fn decode_cstr(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn encode_cstr(col: &ColumnDescriptor, capacity: usize, s: &str, out: &mut [u8]) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > capacity.saturating_sub(1) {
        return Err(EngineError::BigStr(col.name.clone()));
    }
    out.iter_mut().for_each(|b| *b = 0);
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Reads the raw pointer value (native-endian: it is an in-process address,
/// never a wire value) stored in an indirect column's slot.
fn read_indirect_ptr(slot: &[u8]) -> usize {
    usize::from_ne_bytes(slot.try_into().expect("indirect slot sized by ColumnKind::slot_size"))
}

fn write_indirect_ptr(slot: &mut [u8], ptr: usize) {
    slot.copy_from_slice(&ptr.to_ne_bytes());
}

/// Reads the typed value of `col` out of `row` (§4.3).
pub fn read_cell(col: &ColumnDescriptor, row: &RowHandle) -> Result<CellValue> {
    let size = col.kind.slot_size();
    row.with_bytes(|buf| {
        let slot = &buf[col.offset..col.offset + size];
        if col.kind.is_indirect() {
            let ptr = read_indirect_ptr(slot);
            let pointee_size = col.kind.pointee_size().expect("indirect kind has a pointee size");
            if ptr == 0 {
                return Ok(zero_value_for_indirect(&col.kind));
            }
            // SAFETY: `ptr` was produced by `alloc_indirect` for this exact
            // column, with exactly `pointee_size` bytes, and is only ever
            // freed by `free_indirect` which this row's table owner calls
            // on DELETE — never while a read/write is in flight, since the
            // engine is single-threaded cooperative (§5).
            let pointee = unsafe { std::slice::from_raw_parts(ptr as *const u8, pointee_size) };
            Ok(decode_indirect(&col.kind, pointee))
        } else {
            Ok(decode_direct(&col.kind, slot))
        }
    })
}

fn zero_value_for_indirect(kind: &ColumnKind) -> CellValue {
    match kind {
        ColumnKind::IndirectStr(_) => CellValue::Str(String::new()),
        ColumnKind::IndirectInt => CellValue::Int(0),
        ColumnKind::IndirectLong => CellValue::Long(0),
        ColumnKind::IndirectFloat => CellValue::Float(0.0),
        _ => unreachable!(),
    }
}

fn decode_indirect(kind: &ColumnKind, pointee: &[u8]) -> CellValue {
    match kind {
        ColumnKind::IndirectStr(_) => CellValue::Str(decode_cstr(pointee)),
        ColumnKind::IndirectInt => CellValue::Int(LittleEndian::read_i32(pointee)),
        ColumnKind::IndirectLong => CellValue::Long(LittleEndian::read_i64(pointee)),
        ColumnKind::IndirectFloat => CellValue::Float(LittleEndian::read_f32(pointee)),
        _ => unreachable!(),
    }
}

/// Writes `value` into `col`'s slot of `row`. String writes copy at most
/// `capacity - 1` bytes and always leave a terminating NUL; callers are
/// expected to have already rejected over-long strings at validation time
/// (§4.6 step 3 E_BIGSTR), so the `BigStr` this returns is a defensive
/// backstop, not the primary enforcement point.
pub fn write_cell(col: &ColumnDescriptor, row: &RowHandle, value: &CellValue) -> Result<()> {
    let size = col.kind.slot_size();
    if col.kind.is_indirect() {
        let pointee_size = col.kind.pointee_size().expect("indirect kind has a pointee size");
        let ptr = row.with_bytes(|buf| read_indirect_ptr(&buf[col.offset..col.offset + size]));
        if ptr == 0 {
            return Err(EngineError::BadTrigger(col.name.clone()));
        }
        let mut scratch = vec![0u8; pointee_size];
        encode_indirect(col, value, &mut scratch)?;
        // SAFETY: same invariant as `read_cell` above.
        unsafe {
            std::ptr::copy_nonoverlapping(scratch.as_ptr(), ptr as *mut u8, pointee_size);
        }
        Ok(())
    } else {
        row.with_bytes_mut(|buf| encode_direct(col, value, &mut buf[col.offset..col.offset + size]))
    }
}

fn encode_indirect(col: &ColumnDescriptor, value: &CellValue, out: &mut [u8]) -> Result<()> {
    match (&col.kind, value) {
        (ColumnKind::IndirectStr(cap), CellValue::Str(s)) => encode_cstr(col, *cap as usize, s, out)?,
        (ColumnKind::IndirectInt, CellValue::Int(v)) => LittleEndian::write_i32(out, *v),
        (ColumnKind::IndirectLong, CellValue::Long(v)) => LittleEndian::write_i64(out, *v),
        (ColumnKind::IndirectFloat, CellValue::Float(v)) => LittleEndian::write_f32(out, *v),
        _ => return Err(EngineError::BadParse),
    }
    Ok(())
}

/// Heap-allocates a zero-filled pointee of `size` bytes and returns its
/// address as a `usize`. Used by the INSERT path (`access::insert`) to
/// populate indirect columns' slots in a freshly allocated row.
///
/// # Safety
/// The returned address must be freed with exactly one call to
/// `free_indirect` with the same `size`, and must not be read/written
/// through `read_cell`/`write_cell` after that call.
pub unsafe fn alloc_indirect(size: usize) -> usize {
    let boxed: Box<[u8]> = vec![0u8; size].into_boxed_slice();
    Box::into_raw(boxed) as *mut u8 as usize
}

/// Frees a pointee previously returned by `alloc_indirect`. A `ptr` of zero
/// is a no-op (mirrors "freed memory should neither be read nor written"
/// being trivially true when there was never an allocation).
///
/// # Safety
/// `ptr` must have come from `alloc_indirect(size)` and must not have been
/// freed already.
pub unsafe fn free_indirect(ptr: usize, size: usize) {
    if ptr == 0 {
        return;
    }
    drop(Box::from_raw(std::slice::from_raw_parts_mut(ptr as *mut u8, size)));
}
