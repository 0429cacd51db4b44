//! Savefile engine: serializes a table's DISKSAVE columns to a textual
//! log of UPDATE/INSERT statements and replays that log at registration.
//!
//! Writing is atomic (temp file in the target's directory, then rename);
//! loading re-parses each surviving line through the same SQL parser the
//! wire protocol uses, against a table view whose `savefile` field is
//! suppressed so write callbacks triggered during replay don't recurse back
//! into `save` (§4.7, §3 invariant).

use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use catalog::{CellValue, ColumnDescriptor, RowStorage, TableDescriptor, TableRef};
use common::err::EngineError;
use common::Result;

use crate::executor;

/// Longest line `load` honors; longer lines are silently truncated (§6).
const MAX_SAVEFILE_LINE: usize = 2048;

fn quote_string(s: &str) -> String {
    let has_double = s.contains('"');
    let has_single = s.contains('\'');
    if !has_double {
        format!("\"{}\"", s)
    } else if !has_single {
        format!("'{}'", s)
    } else {
        format!("\"{}\"", s.replace('"', "\\\""))
    }
}

fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Str(s) => quote_string(s),
        other => other.format(),
    }
}

/// Columns eligible for persistence: DISKSAVE and not READONLY — a
/// read-only column can never be written back by the UPDATE/INSERT lines
/// this module generates, so marking it DISKSAVE would produce a savefile
/// `load` can't replay.
fn disksave_columns(table: &TableDescriptor) -> Vec<&ColumnDescriptor> {
    table.columns.iter().filter(|c| c.is_disksave() && !c.is_readonly()).collect()
}

/// Renders `table`'s current DISKSAVE columns as savefile text, one
/// statement per line, terminated by a trailing newline (§8 scenario 5).
pub fn serialize_table(table: &TableRef) -> Result<String> {
    let cols = disksave_columns(table);
    if cols.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::new();
    for (row_index, (row, _)) in access::RowScan::new(table.as_ref()).enumerate() {
        let values: Vec<CellValue> = cols.iter().map(|c| access::read_cell(c, &row)).collect::<Result<_>>()?;

        if table.supports_insert() {
            let col_names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
            let vals: Vec<String> = values.iter().map(format_value).collect();
            out.push_str(&format!(
                "INSERT INTO {} ({}) VALUES ({})\n",
                table.name,
                col_names.join(", "),
                vals.join(", ")
            ));
        } else {
            let assigns: Vec<String> = cols
                .iter()
                .zip(values.iter())
                .map(|(c, v)| format!("{}={}", c.name, format_value(v)))
                .collect();
            out.push_str(&format!(
                "UPDATE {} SET {} LIMIT 1 OFFSET {}\n",
                table.name,
                assigns.join(", "),
                row_index
            ));
        }
    }
    Ok(out)
}

/// Writes `content` to `path` atomically: a temp file in the same directory
/// is fully written, then renamed over the target (§4.7).
pub fn save(table: &TableRef, path: &str) -> Result<()> {
    let content = serialize_table(table)?;
    let target = Path::new(path);
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}

/// Builds a view of `table` sharing the same row storage and callbacks but
/// with `savefile` cleared, so replaying through `executor::execute` cannot
/// recursively trigger `save` (§3 invariant, §4.2 step 9).
fn without_savefile(table: &TableRef) -> TableRef {
    let storage = match &table.storage {
        RowStorage::Array(rows) => RowStorage::shared_array(rows.clone()),
        RowStorage::Iterator(f) => RowStorage::Iterator(f.clone()),
    };
    let mut clone = TableDescriptor::new(table.name.clone(), table.row_size, storage).with_columns(table.columns.clone());
    if let Some(cb) = table.insert_cb.clone() {
        clone = clone.with_insert_cb(cb);
    }
    if let Some(cb) = table.delete_cb.clone() {
        clone = clone.with_delete_cb(cb);
    }
    Rc::new(clone.with_help(table.help.clone()))
}

/// Replays `path` against `table`: only lines whose first token is `UPDATE`
/// or `INSERT` are fed to the parser/executor, everything else is a comment
/// (§4.7, §9 open question). Lines longer than `MAX_SAVEFILE_LINE` bytes are
/// truncated before parsing.
pub fn load(table: &TableRef, path: &str) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let suppressed = without_savefile(table);

    for raw_line in text.lines() {
        let line: &str = if raw_line.len() > MAX_SAVEFILE_LINE {
            &raw_line[..MAX_SAVEFILE_LINE]
        } else {
            raw_line
        };
        let first_token = line.trim_start().split_whitespace().next().unwrap_or("");
        if !first_token.eq_ignore_ascii_case("UPDATE") && !first_token.eq_ignore_ascii_case("INSERT") {
            continue;
        }
        let command = sql::parse(line)?;
        executor::execute(&suppressed, 0, &command)?;
    }
    Ok(())
}
