//! WHERE-term comparison rules (§4.3): bounded prefix compare for strings,
//! 64-bit widened signed subtraction for integers, native floating-point
//! compare for floats/doubles (the source's subtract-and-truncate-to-int
//! quirk is deliberately not reproduced, per the open question in §9),
//! opaque pointers degrading to a 32-bit integer compare.

use catalog::{CellValue, ColumnKind, RelOp};

pub fn compare(kind: &ColumnKind, lhs: &CellValue, op: RelOp, rhs: &CellValue) -> bool {
    if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
        let cap = kind.str_capacity().map(|c| c as usize).unwrap_or(usize::MAX);
        return op.apply_ordering(bounded_str_cmp(a, b, cap));
    }
    if lhs.as_f64().is_some() || rhs.as_f64().is_some() {
        if let (Some(a), Some(b)) = (widen_to_f64(lhs), widen_to_f64(rhs)) {
            let ord = a.partial_cmp(&b);
            return match ord {
                Some(o) => op.apply_ordering(o),
                None => false,
            };
        }
    }
    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        return op.apply_ordering(a.cmp(&b));
    }
    false
}

fn widen_to_f64(v: &CellValue) -> Option<f64> {
    v.as_f64().or_else(|| v.as_i64().map(|i| i as f64))
}

fn bounded_str_cmp(a: &str, b: &str, capacity: usize) -> std::cmp::Ordering {
    let a = &a.as_bytes()[..a.len().min(capacity)];
    let b = &b.as_bytes()[..b.len().min(capacity)];
    a.cmp(b)
}
