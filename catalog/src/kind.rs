use bitflags::bitflags;

/// The closed set of scalar column kinds (§3). Declared in the same order
/// as the source enumeration so "kind value <= DOUBLE" (§4.2 invariant 8)
/// is just "this is one of these variants" — every variant constructed by
/// this crate is already in range, so the registry's check is really a
/// guard against a future variant being added without updating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Inline fixed-capacity byte string; capacity includes the NUL.
    Str(u16),
    /// Pointer to a heap string of the given capacity.
    IndirectStr(u16),
    Int,
    Short,
    UChar,
    Long,
    Float,
    Double,
    /// Opaque pointer, compared and printed as a signed 32-bit integer.
    Pointer,
    IndirectInt,
    IndirectLong,
    IndirectFloat,
}

impl ColumnKind {
    /// Runtime size of the row slot this kind occupies, in bytes. For
    /// indirect kinds this is the size of the pointer slot, not the
    /// pointee; `pointee_size` answers that question.
    pub fn slot_size(&self) -> usize {
        match self {
            ColumnKind::Str(cap) => *cap as usize,
            ColumnKind::IndirectStr(_) => std::mem::size_of::<usize>(),
            ColumnKind::Int => std::mem::size_of::<i32>(),
            ColumnKind::Short => std::mem::size_of::<i16>(),
            ColumnKind::UChar => std::mem::size_of::<u8>(),
            ColumnKind::Long => std::mem::size_of::<i64>(),
            ColumnKind::Float => std::mem::size_of::<f32>(),
            ColumnKind::Double => std::mem::size_of::<f64>(),
            ColumnKind::Pointer => std::mem::size_of::<usize>(),
            ColumnKind::IndirectInt | ColumnKind::IndirectLong | ColumnKind::IndirectFloat => {
                std::mem::size_of::<usize>()
            }
        }
    }

    /// True for the three kinds that hold a pointer whose pointee the
    /// engine allocates/frees itself on the INSERT/DELETE path (§3
    /// Lifecycle).
    pub fn is_indirect(&self) -> bool {
        matches!(
            self,
            ColumnKind::IndirectStr(_)
                | ColumnKind::IndirectInt
                | ColumnKind::IndirectLong
                | ColumnKind::IndirectFloat
        )
    }

    /// Size of the heap allocation an indirect kind's pointee needs, or
    /// `None` for non-indirect kinds.
    pub fn pointee_size(&self) -> Option<usize> {
        match self {
            ColumnKind::IndirectStr(cap) => Some(*cap as usize),
            ColumnKind::IndirectInt => Some(std::mem::size_of::<i32>()),
            ColumnKind::IndirectLong => Some(std::mem::size_of::<i64>()),
            ColumnKind::IndirectFloat => Some(std::mem::size_of::<f32>()),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ColumnKind::Str(_) | ColumnKind::IndirectStr(_))
    }

    pub fn is_float_like(&self) -> bool {
        matches!(
            self,
            ColumnKind::Float | ColumnKind::Double | ColumnKind::IndirectFloat
        )
    }

    pub fn is_integer_like(&self) -> bool {
        matches!(
            self,
            ColumnKind::Int
                | ColumnKind::Short
                | ColumnKind::UChar
                | ColumnKind::Long
                | ColumnKind::Pointer
                | ColumnKind::IndirectInt
                | ColumnKind::IndirectLong
        )
    }

    /// Declared string capacity, including the terminating NUL, for the two
    /// string kinds. `None` for anything else.
    pub fn str_capacity(&self) -> Option<u16> {
        match self {
            ColumnKind::Str(cap) | ColumnKind::IndirectStr(cap) => Some(*cap),
            _ => None,
        }
    }
}

bitflags! {
    /// Column flag bits (§3). `flags ⊆ {DISKSAVE, READONLY}` is enforced by
    /// construction: bitflags rejects unknown bits via `from_bits`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColumnFlags: u8 {
        const DISKSAVE = 0b0000_0001;
        const READONLY = 0b0000_0010;
    }
}
