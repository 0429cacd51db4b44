use std::fs;
use std::rc::Rc;

use common::err::EngineError;
use common::Result;

use crate::column::{MAX_HELP_LEN, MAX_NAME_LEN};
use crate::reserved::is_reserved_word;
use crate::table::{TableDescriptor, TableRef};

/// Hard ceiling on registered tables (§3 invariant: "≥ 500 tables").
pub const MAX_TABLES: usize = 512;
/// Hard ceiling on columns across the whole registry (§3 invariant: "≥ 2500
/// columns").
pub const MAX_COLUMNS: usize = 2560;
/// Per-table column ceiling; also the bound the parser (§4.5) enforces on a
/// single statement's column/update arrays.
pub const MAX_COLUMNS_PER_TABLE: usize = 256;

/// Process-wide (here: per-`Engine`) collection of registered tables and
/// their flattened column count, plus the configured savefile directory
/// (§4.2). Holds `Rc<TableDescriptor>` references, never copies — table and
/// column descriptors are built once by the host and live for the
/// `Registry`'s lifetime.
pub struct Registry {
    tables: Vec<TableRef>,
    flat_column_count: usize,
    config_dir: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            tables: Vec::new(),
            flat_column_count: 0,
            config_dir: None,
        }
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn find(&self, name: &str) -> Option<TableRef> {
        self.tables.iter().find(|t| t.name == name).cloned()
    }

    pub fn config_dir(&self) -> Option<&str> {
        self.config_dir.as_deref()
    }

    /// Verifies `path` names an existing directory and stores a normalized
    /// copy (trailing `/` stripped, except for the root) (§4.2).
    pub fn set_config_dir(&mut self, path: &str) -> Result<()> {
        let meta = fs::metadata(path).map_err(|_| EngineError::BadConfigDir(path.to_string()))?;
        if !meta.is_dir() {
            return Err(EngineError::BadConfigDir(path.to_string()));
        }
        let normalized = if path.len() > 1 {
            path.trim_end_matches('/').to_string()
        } else {
            path.to_string()
        };
        self.config_dir = Some(normalized);
        Ok(())
    }

    /// Resolves a table's savefile path against the configured directory:
    /// absolute paths (and tables with no configured directory) pass
    /// through unchanged.
    pub fn resolve_savefile<'a>(&self, table: &'a TableDescriptor) -> String {
        if table.savefile.is_empty() || table.savefile.starts_with('/') {
            return table.savefile.clone();
        }
        match &self.config_dir {
            Some(dir) => format!("{}/{}", dir, table.savefile),
            None => table.savefile.clone(),
        }
    }

    /// Performs the invariant checks of §3/§4.2 in order, returning on the
    /// first violation. On success appends the table and its columns to
    /// the flat counts. Does **not** replay the savefile — that requires
    /// the SQL executor, which this crate does not depend on; `engine`'s
    /// `Engine::add_table` does the replay after this call succeeds.
    pub fn add_table(&mut self, descriptor: TableRef) -> Result<()> {
        if self.tables.len() >= MAX_TABLES {
            return Err(EngineError::TooManyTables);
        }
        if self.find(&descriptor.name).is_some() {
            return Err(EngineError::DuplicateTable(descriptor.name.clone()));
        }
        if descriptor.name.len() > MAX_NAME_LEN {
            return Err(EngineError::OversizeName(descriptor.name.clone()));
        }
        if is_reserved_word(&descriptor.name) {
            return Err(EngineError::ReservedWord(descriptor.name.clone()));
        }
        // "savefile pointer non-null" (§4.2 step 5): in this rewrite
        // `savefile` is always a valid `String`, empty meaning "none", so
        // there is nothing further to check here.
        if descriptor.columns.len() > MAX_COLUMNS_PER_TABLE {
            return Err(EngineError::ColumnLimitExceeded(descriptor.name.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        for col in &descriptor.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(EngineError::DuplicateColumn(
                    descriptor.name.clone(),
                    col.name.clone(),
                ));
            }
        }

        for col in &descriptor.columns {
            if col.name.len() > MAX_NAME_LEN {
                return Err(EngineError::OversizeName(col.name.clone()));
            }
            if is_reserved_word(&col.name) {
                return Err(EngineError::ReservedWord(col.name.clone()));
            }
            if col.help.len() > MAX_HELP_LEN {
                return Err(EngineError::OversizeHelp(col.name.clone()));
            }
            if col.table != descriptor.name {
                return Err(EngineError::WrongOwningTable(
                    col.name.clone(),
                    descriptor.name.clone(),
                ));
            }
        }

        if self.flat_column_count + descriptor.columns.len() > MAX_COLUMNS {
            return Err(EngineError::TooManyColumns);
        }

        self.flat_column_count += descriptor.columns.len();
        self.tables.push(descriptor);
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
