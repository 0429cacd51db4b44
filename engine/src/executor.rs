//! Query executor: verifies a parsed `Command` against live table
//! metadata, then walks rows applying WHERE, invoking callbacks, and
//! emitting a structured result the wire framer (`wire` crate) encodes.
//!
//! This module knows nothing about wire bytes — `ExecResult` is the
//! contract between the two. It also knows nothing about the savefile; the
//! `Engine` facade decides when to invoke `savefile::save` after a
//! successful write.

use catalog::{CellValue, ColumnDescriptor, RelOp, RowHandle, TableRef};
use common::err::EngineError;
use common::Result;
use catalog::MAX_COLUMNS_PER_TABLE;
use sql::{Assignment, Command, CommandKind, Literal, Projection, WhereTerm};

/// One projected column's wire identity (§4.6 "Row-description emission").
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub table_oid: i64,
    pub column_index: i32,
}

/// Everything the executor produces for one statement; the wire framer
/// turns this into `'T'`/`'D'`/`'C'` packets, and `execute_sql`'s caller
/// (tests, the session harness) can inspect it directly without going
/// through wire bytes at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Select {
        fields: Vec<FieldDescriptor>,
        rows: Vec<Vec<String>>,
    },
    Update {
        count: usize,
    },
    Insert {
        oid: i64,
    },
    Delete {
        count: usize,
    },
}

/// Resolves one `(column, literal)` pair against `col`'s kind (§4.6 step 3).
/// `for_write` gates the capacity check: WHERE terms compare with a bounded
/// prefix (`access::compare`) and never overflow a slot, but UPDATE/INSERT
/// assignments must fit within `capacity - 1` bytes or raise `E_BIGSTR`.
pub fn typecheck_literal(col: &ColumnDescriptor, literal: &Literal, for_write: bool) -> Result<CellValue> {
    use catalog::ColumnKind::*;
    match &col.kind {
        Str(cap) | IndirectStr(cap) => {
            let s = match literal {
                Literal::Str(s) | Literal::Ident(s) => s.clone(),
                _ => return Err(EngineError::BadParse),
            };
            if for_write && s.len() > (*cap as usize).saturating_sub(1) {
                return Err(EngineError::BigStr(col.name.clone()));
            }
            Ok(CellValue::Str(s))
        }
        Int | IndirectInt => {
            let i = as_int_literal(literal)?;
            if i < i32::MIN as i64 || i > i32::MAX as i64 {
                return Err(EngineError::BadParse);
            }
            Ok(CellValue::Int(i as i32))
        }
        Short => {
            let i = as_int_literal(literal)?;
            if i < i16::MIN as i64 || i > i16::MAX as i64 {
                return Err(EngineError::BadParse);
            }
            Ok(CellValue::Short(i as i16))
        }
        UChar => {
            let i = as_int_literal(literal)?;
            if !(0..=255).contains(&i) {
                return Err(EngineError::BadParse);
            }
            Ok(CellValue::UChar(i as u8))
        }
        Long | IndirectLong => Ok(CellValue::Long(as_int_literal(literal)?)),
        Float | IndirectFloat => Ok(CellValue::Float(as_float_literal(literal)? as f32)),
        Double => Ok(CellValue::Double(as_float_literal(literal)?)),
        Pointer => {
            let i = as_int_literal(literal)?;
            Ok(CellValue::Pointer((i as i32 as u32) as u64))
        }
    }
}

fn as_int_literal(literal: &Literal) -> Result<i64> {
    match literal {
        Literal::Int(i) => Ok(*i),
        _ => Err(EngineError::BadParse),
    }
}

/// Floats accept an integer literal too (`myfloat = 0`), a deliberate
/// leniency: the grammar's `integer`/`real` split is about lexical shape,
/// not a ban on assigning whole numbers to float columns.
fn as_float_literal(literal: &Literal) -> Result<f64> {
    match literal {
        Literal::Float(f) => Ok(*f),
        Literal::Int(i) => Ok(*i as f64),
        _ => Err(EngineError::BadParse),
    }
}

fn resolve_where_terms(table: &TableRef, terms: &[WhereTerm]) -> Result<Vec<(ColumnDescriptor, RelOp, CellValue)>> {
    terms
        .iter()
        .map(|t| {
            let col = table.column(&t.column).ok_or_else(|| EngineError::NoColumn(t.column.clone()))?.clone();
            let value = typecheck_literal(&col, &t.literal, false)?;
            Ok((col, t.op, value))
        })
        .collect()
}

fn row_matches(row: &RowHandle, row_id: usize, where_terms: &[(ColumnDescriptor, RelOp, CellValue)]) -> Result<bool> {
    for (col, op, rhs) in where_terms {
        if let Some(cb) = &col.read_cb {
            cb(&col.table, &col.name, row_id).map_err(|_| EngineError::BadTrigger(col.name.clone()))?;
        }
        let lhs = access::read_cell(col, row)?;
        if !access::compare(&col.kind, &lhs, *op, rhs) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn resolve_columns<'t>(table: &'t TableRef, projection: &Projection) -> Result<Vec<&'t ColumnDescriptor>> {
    match projection {
        Projection::Star => Ok(table.columns.iter().collect()),
        Projection::Columns(names) => names
            .iter()
            .map(|n| table.column(n).ok_or_else(|| EngineError::NoColumn(n.clone())))
            .collect(),
    }
}

fn table_oid_base(table_index: usize) -> i64 {
    table_index as i64 * MAX_COLUMNS_PER_TABLE as i64
}

fn exec_select(
    table: &TableRef,
    table_index: usize,
    command: &Command,
    where_terms: &[(ColumnDescriptor, RelOp, CellValue)],
) -> Result<ExecResult> {
    let columns = resolve_columns(table, &command.projection)?;

    let fields = columns
        .iter()
        .enumerate()
        .map(|(i, col)| FieldDescriptor {
            name: col.name.clone(),
            table_oid: table_oid_base(table_index) + i as i64,
            column_index: i as i32 + 1,
        })
        .collect();

    let mut rows = Vec::new();
    let mut offset = command.offset;
    let mut limit = command.limit;

    for (row, row_id) in access::RowScan::new(table) {
        if limit == 0 {
            break;
        }
        if !row_matches(&row, row_id, where_terms)? {
            continue;
        }
        if offset > 0 {
            offset -= 1;
            continue;
        }
        limit -= 1;

        let mut values = Vec::with_capacity(columns.len());
        for col in &columns {
            if let Some(cb) = &col.read_cb {
                cb(&col.table, &col.name, row_id).map_err(|_| EngineError::BadTrigger(col.name.clone()))?;
            }
            values.push(access::read_cell(col, &row)?.format());
        }
        rows.push(values);
    }

    Ok(ExecResult::Select { fields, rows })
}

fn resolve_assignments(table: &TableRef, assignments: &[Assignment], check_readonly: bool) -> Result<Vec<(ColumnDescriptor, CellValue)>> {
    assignments
        .iter()
        .map(|a| {
            let col = table.column(&a.column).ok_or_else(|| EngineError::NoColumn(a.column.clone()))?.clone();
            if check_readonly && col.is_readonly() {
                return Err(EngineError::NoWrite(col.name.clone()));
            }
            let value = typecheck_literal(&col, &a.literal, true)?;
            Ok((col, value))
        })
        .collect()
}

/// Returns `true` if any assigned column of the row just updated/inserted
/// carries DISKSAVE, the trigger the caller (`Engine`) uses to decide
/// whether to invoke the savefile engine.
pub fn any_disksave(assignments: &[(ColumnDescriptor, CellValue)]) -> bool {
    assignments.iter().any(|(col, _)| col.is_disksave())
}

fn exec_update(
    table: &TableRef,
    command: &Command,
    where_terms: &[(ColumnDescriptor, RelOp, CellValue)],
) -> Result<(ExecResult, bool)> {
    let assignments = resolve_assignments(table, &command.assignments, true)?;

    let mut count = 0usize;
    let mut offset = command.offset;
    let mut limit = command.limit;
    let mut triggered_save = false;

    for (row, row_id) in access::RowScan::new(table) {
        if limit == 0 {
            break;
        }
        if !row_matches(&row, row_id, where_terms)? {
            continue;
        }
        if offset > 0 {
            offset -= 1;
            continue;
        }
        limit -= 1;

        let snapshot = row.snapshot();
        for (col, value) in &assignments {
            access::write_cell(col, &row, value)?;
        }

        let mut failed = None;
        for (col, _) in &assignments {
            if let Some(cb) = &col.write_cb {
                if cb(&col.table, &col.name, &command.sql_text, &row, row_id, Some(&snapshot)).is_err() {
                    failed = Some(col.name.clone());
                    break;
                }
            }
        }
        if let Some(failed_col) = failed {
            row.restore(&snapshot);
            return Err(EngineError::BadTrigger(failed_col));
        }

        count += 1;
        if any_disksave(&assignments) {
            triggered_save = true;
        }
    }

    Ok((ExecResult::Update { count }, triggered_save && table.has_savefile()))
}

fn exec_delete(
    table: &TableRef,
    command: &Command,
    where_terms: &[(ColumnDescriptor, RelOp, CellValue)],
) -> Result<(ExecResult, bool)> {
    if !table.supports_delete() {
        return Err(EngineError::NoDelete(table.name.clone()));
    }
    let delete_cb = table.delete_cb.as_ref().unwrap();

    // Snapshot the scan before mutating any row: the callback is free to
    // unlink/free the row it is given, which would otherwise perturb the
    // index-based `next()` an array-backed table's iterator relies on
    // (§5 "row handles are advanced before any mutating callback runs").
    let snapshot: Vec<(RowHandle, usize)> = access::RowScan::new(table).collect();

    let mut count = 0usize;
    let mut offset = command.offset;
    let mut limit = command.limit;

    for (row, row_id) in snapshot {
        if limit == 0 {
            break;
        }
        if !row_matches(&row, row_id, where_terms)? {
            continue;
        }
        if offset > 0 {
            offset -= 1;
            continue;
        }
        limit -= 1;
        // `delete_cb` unlinks the row and may read its columns (including
        // indirect ones) before tearing it down; the engine-owned indirect
        // pointees must still be live for that call and are only freed once
        // it returns (§3 Lifecycle: "DELETE callbacks must free those before
        // freeing the row").
        delete_cb(&table.name, &row).map_err(|_| EngineError::BadTrigger(table.name.clone()))?;
        access::free_row_indirects(table, &row);
        count += 1;
    }

    let triggers_save = count > 0 && table.columns.iter().any(|c| c.is_disksave()) && table.has_savefile();
    Ok((ExecResult::Delete { count }, triggers_save))
}

fn exec_insert(table: &TableRef, command: &Command) -> Result<(ExecResult, bool)> {
    if !table.supports_insert() {
        return Err(EngineError::NoInsert(table.name.clone()));
    }
    let assignments = resolve_assignments(table, &command.assignments, false)?;

    let row = access::allocate_row(table);
    for (col, value) in &assignments {
        access::write_cell(col, &row, value)?;
    }

    let insert_cb = table.insert_cb.as_ref().unwrap();
    let oid = match insert_cb(&table.name, &command.sql_text, &row) {
        Ok(oid) if oid >= 0 => oid,
        _ => {
            access::free_row_indirects(table, &row);
            return Err(EngineError::BadInsert(table.name.clone()));
        }
    };

    for col in &table.columns {
        if let Some(cb) = &col.write_cb {
            if cb(&col.table, &col.name, &command.sql_text, &row, oid as usize, None).is_err() {
                if let Some(delete_cb) = &table.delete_cb {
                    let _ = delete_cb(&table.name, &row);
                }
                access::free_row_indirects(table, &row);
                return Err(EngineError::BadTrigger(col.name.clone()));
            }
        }
    }

    let triggers_save = table.columns.iter().any(|c| c.is_disksave()) && table.has_savefile();
    Ok((ExecResult::Insert { oid }, triggers_save))
}

/// Runs one already-parsed `Command` against `table` (already resolved by
/// the caller, which is `rta_`-meta-table-aware in a way this module isn't).
/// Returns the result plus whether the caller should invoke the savefile
/// engine for this table.
pub fn execute(table: &TableRef, table_index: usize, command: &Command) -> Result<(ExecResult, bool)> {
    let where_terms = resolve_where_terms(table, &command.where_terms)?;

    match command.kind {
        CommandKind::Select => exec_select(table, table_index, command, &where_terms).map(|r| (r, false)),
        CommandKind::Update => exec_update(table, command, &where_terms),
        CommandKind::Insert => exec_insert(table, command),
        CommandKind::Delete => exec_delete(table, command, &where_terms),
    }
}
