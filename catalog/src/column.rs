use crate::callback::{ReadCallback, WriteCallback};
use crate::kind::{ColumnFlags, ColumnKind};

/// Maximum length of a table or column name (§3).
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of a help string (§3).
pub const MAX_HELP_LEN: usize = 1000;

/// Immutable description of one column of a registered table (§3). Built by
/// the host before registration and never mutated afterwards; the registry
/// stores a reference, not a copy.
#[derive(Clone)]
pub struct ColumnDescriptor {
    pub table: String,
    pub name: String,
    pub kind: ColumnKind,
    /// Byte offset of this column's slot within the row record. Meaningful
    /// only for array-backed tables' internal layout; iterator-backed
    /// tables still use it to size the zero-filled row the engine
    /// allocates on INSERT.
    pub offset: usize,
    pub flags: ColumnFlags,
    pub read_cb: Option<ReadCallback>,
    pub write_cb: Option<WriteCallback>,
    pub help: String,
}

impl ColumnDescriptor {
    pub fn new(table: impl Into<String>, name: impl Into<String>, kind: ColumnKind, offset: usize) -> Self {
        ColumnDescriptor {
            table: table.into(),
            name: name.into(),
            kind,
            offset,
            flags: ColumnFlags::empty(),
            read_cb: None,
            write_cb: None,
            help: String::new(),
        }
    }

    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_read_cb(mut self, cb: ReadCallback) -> Self {
        self.read_cb = Some(cb);
        self
    }

    pub fn with_write_cb(mut self, cb: WriteCallback) -> Self {
        self.write_cb = Some(cb);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn is_disksave(&self) -> bool {
        self.flags.contains(ColumnFlags::DISKSAVE)
    }

    pub fn is_readonly(&self) -> bool {
        self.flags.contains(ColumnFlags::READONLY)
    }
}

impl std::fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("table", &self.table)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("offset", &self.offset)
            .field("flags", &self.flags)
            .finish()
    }
}
