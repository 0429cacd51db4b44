//! Self-describing meta-tables: `rta_tables`, `rta_columns`, `rta_dbg`,
//! `rta_stat`. Built fresh from the live `Registry`/`Stat`/`DbgConfig` on
//! every query rather than stored as registered `TableDescriptor`s, which
//! sidesteps a reference cycle (a registered meta-table would need to hold
//! a handle back to the very `Registry` that contains it) while still
//! satisfying "views over the registry" (§4.9): each build reads current
//! state, so two queries bracketing an `add_table` see different row counts.
//!
//! Naming follows §8 scenario 3 (`SELECT * FROM rta_tables`) rather than the
//! unprefixed names used in prose elsewhere in the design (§4.9's "tables",
//! "columns", "dbg", "stat") — the `rta_` prefix is the one concrete,
//! testable spelling, so it is what this implementation registers under.

use std::rc::Rc;

use catalog::{CellValue, ColumnDescriptor, ColumnKind, Registry, RowHandle, RowStorage, TableDescriptor};
use common::Result;

use crate::dbg::DbgConfig;
use crate::stat::Stat;

pub const RTA_TABLES: &str = "rta_tables";
pub const RTA_COLUMNS: &str = "rta_columns";
pub const RTA_DBG: &str = "rta_dbg";
pub const RTA_STAT: &str = "rta_stat";

pub fn is_meta_table(name: &str) -> bool {
    matches!(name, RTA_TABLES | RTA_COLUMNS | RTA_DBG | RTA_STAT)
}

fn kind_name(kind: &ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Str(_) => "str",
        ColumnKind::IndirectStr(_) => "indirect_str",
        ColumnKind::Int => "int",
        ColumnKind::Short => "short",
        ColumnKind::UChar => "uchar",
        ColumnKind::Long => "long",
        ColumnKind::Float => "float",
        ColumnKind::Double => "double",
        ColumnKind::Pointer => "pointer",
        ColumnKind::IndirectInt => "indirect_int",
        ColumnKind::IndirectLong => "indirect_long",
        ColumnKind::IndirectFloat => "indirect_float",
    }
}

/// Writes one logical row's worth of cells into a freshly zeroed
/// `RowHandle`, given the same column descriptors the synthesized table is
/// built with. Keeps row construction going through `access::write_cell`
/// rather than hand-poking bytes, so the meta-tables are laid out exactly
/// the way a host-registered table would be.
fn build_row(columns: &[ColumnDescriptor], values: Vec<CellValue>) -> Result<RowHandle> {
    let row_size = columns.iter().map(|c| c.offset + c.kind.slot_size()).max().unwrap_or(0);
    let row = RowHandle::zeroed(row_size);
    for (col, value) in columns.iter().zip(values) {
        access::write_cell(col, &row, &value)?;
    }
    Ok(row)
}

fn offsets(kinds: &[ColumnKind]) -> Vec<usize> {
    let mut offset = 0usize;
    let mut out = Vec::with_capacity(kinds.len());
    for kind in kinds {
        out.push(offset);
        offset += kind.slot_size();
    }
    out
}

pub fn build_rta_tables(registry: &Registry) -> Result<TableDescriptor> {
    let kinds = [
        ColumnKind::Str(101),
        ColumnKind::Int,
        ColumnKind::Int,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::Int,
        ColumnKind::Str(256),
        ColumnKind::Str(1001),
    ];
    let offs = offsets(&kinds);
    let names = ["name", "row_size", "row_count", "has_iterator", "has_insert", "has_delete", "column_count", "savefile", "help"];
    let columns: Vec<ColumnDescriptor> = names
        .iter()
        .zip(kinds.iter())
        .zip(offs.iter())
        .map(|((name, kind), offset)| ColumnDescriptor::new(RTA_TABLES, *name, *kind, *offset))
        .collect();

    let mut rows = Vec::new();
    for t in registry.tables() {
        let values = vec![
            CellValue::Str(t.name.clone()),
            CellValue::Int(t.row_size as i32),
            CellValue::Int(t.storage.count() as i32),
            CellValue::UChar(matches!(t.storage, RowStorage::Iterator(_)) as u8),
            CellValue::UChar(t.supports_insert() as u8),
            CellValue::UChar(t.supports_delete() as u8),
            CellValue::Int(t.columns.len() as i32),
            CellValue::Str(t.savefile.clone()),
            CellValue::Str(t.help.clone()),
        ];
        rows.push(build_row(&columns, values)?);
    }

    let row_size = columns.iter().map(|c| c.offset + c.kind.slot_size()).max().unwrap_or(0);
    Ok(TableDescriptor::new(RTA_TABLES, row_size, RowStorage::array(rows)).with_columns(columns))
}

pub fn build_rta_columns(registry: &Registry) -> Result<TableDescriptor> {
    let kinds = [
        ColumnKind::Str(101),
        ColumnKind::Str(101),
        ColumnKind::Str(32),
        ColumnKind::Int,
        ColumnKind::Int,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::Str(1001),
    ];
    let offs = offsets(&kinds);
    let names = ["table_name", "name", "kind", "capacity", "offset", "disksave", "readonly", "help"];
    let columns: Vec<ColumnDescriptor> = names
        .iter()
        .zip(kinds.iter())
        .zip(offs.iter())
        .map(|((name, kind), offset)| ColumnDescriptor::new(RTA_COLUMNS, *name, *kind, *offset))
        .collect();

    let mut rows = Vec::new();
    for t in registry.tables() {
        for c in &t.columns {
            let values = vec![
                CellValue::Str(t.name.clone()),
                CellValue::Str(c.name.clone()),
                CellValue::Str(kind_name(&c.kind).to_string()),
                CellValue::Int(c.kind.str_capacity().unwrap_or(0) as i32),
                CellValue::Int(c.offset as i32),
                CellValue::UChar(c.is_disksave() as u8),
                CellValue::UChar(c.is_readonly() as u8),
                CellValue::Str(c.help.clone()),
            ];
            rows.push(build_row(&columns, values)?);
        }
    }

    let row_size = columns.iter().map(|c| c.offset + c.kind.slot_size()).max().unwrap_or(0);
    Ok(TableDescriptor::new(RTA_COLUMNS, row_size, RowStorage::array(rows)).with_columns(columns))
}

/// `rta_dbg` is a single-row, writable table: its write callbacks mutate
/// the shared `DbgConfig` directly, which is how `UPDATE rta_dbg SET
/// trace=1` takes effect for the rest of the process (§4.9, §4.10).
pub fn build_rta_dbg(dbg: Rc<DbgConfig>) -> Result<TableDescriptor> {
    let kinds = [
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::UChar,
        ColumnKind::Str(64),
    ];
    let offs = offsets(&kinds);

    // Each write callback re-reads its own slot at its own offset (captured
    // here, not reconstructed from the column name) and pokes the shared
    // `DbgConfig` directly — there is no other row to roll back to, since a
    // `dbg` write either lands or the whole statement already failed type
    // checking before any callback ran.
    let mk_bool_write = |offset: usize, dbg: Rc<DbgConfig>, setter: fn(&DbgConfig, bool)| -> catalog::WriteCallback {
        let probe = ColumnDescriptor::new(RTA_DBG, "_", ColumnKind::UChar, offset);
        Rc::new(move |_t, _c, _sql, row, _row_id, _old| {
            let value = access::read_cell(&probe, row)?;
            setter(&dbg, matches!(value, CellValue::UChar(v) if v != 0));
            Ok(())
        })
    };

    let target_dbg = dbg.clone();
    let target_probe = ColumnDescriptor::new(RTA_DBG, "_", ColumnKind::UChar, offs[4]);
    let priority_dbg = dbg.clone();
    let priority_probe = ColumnDescriptor::new(RTA_DBG, "_", ColumnKind::UChar, offs[5]);
    let facility_dbg = dbg.clone();
    let facility_probe = ColumnDescriptor::new(RTA_DBG, "_", ColumnKind::UChar, offs[6]);
    let ident_dbg = dbg.clone();
    let ident_probe = ColumnDescriptor::new(RTA_DBG, "_", ColumnKind::Str(64), offs[7]);

    let columns = vec![
        ColumnDescriptor::new(RTA_DBG, "syserr", kinds[0], offs[0])
            .with_write_cb(mk_bool_write(offs[0], dbg.clone(), |d, v| d.syserr.set(v))),
        ColumnDescriptor::new(RTA_DBG, "internalerr", kinds[1], offs[1])
            .with_write_cb(mk_bool_write(offs[1], dbg.clone(), |d, v| d.internalerr.set(v))),
        ColumnDescriptor::new(RTA_DBG, "sqlerr", kinds[2], offs[2])
            .with_write_cb(mk_bool_write(offs[2], dbg.clone(), |d, v| d.sqlerr.set(v))),
        ColumnDescriptor::new(RTA_DBG, "trace", kinds[3], offs[3])
            .with_write_cb(mk_bool_write(offs[3], dbg.clone(), |d, v| d.trace.set(v))),
        ColumnDescriptor::new(RTA_DBG, "target", kinds[4], offs[4]).with_write_cb(Rc::new(move |_t, _c, _sql, row, _id, _old| {
            if let CellValue::UChar(v) = access::read_cell(&target_probe, row)? {
                target_dbg.target.set(v);
            }
            Ok(())
        })),
        ColumnDescriptor::new(RTA_DBG, "priority", kinds[5], offs[5]).with_write_cb(Rc::new(move |_t, _c, _sql, row, _id, _old| {
            if let CellValue::UChar(v) = access::read_cell(&priority_probe, row)? {
                priority_dbg.priority.set(v);
            }
            Ok(())
        })),
        ColumnDescriptor::new(RTA_DBG, "facility", kinds[6], offs[6]).with_write_cb(Rc::new(move |_t, _c, _sql, row, _id, _old| {
            if let CellValue::UChar(v) = access::read_cell(&facility_probe, row)? {
                facility_dbg.facility.set(v);
            }
            Ok(())
        })),
        ColumnDescriptor::new(RTA_DBG, "ident", ColumnKind::Str(64), offs[7]).with_write_cb(Rc::new(move |_t, _c, _sql, row, _id, _old| {
            if let CellValue::Str(s) = access::read_cell(&ident_probe, row)? {
                *ident_dbg.ident.borrow_mut() = s;
            }
            Ok(())
        })),
    ];

    let values = vec![
        CellValue::UChar(dbg.syserr.get() as u8),
        CellValue::UChar(dbg.internalerr.get() as u8),
        CellValue::UChar(dbg.sqlerr.get() as u8),
        CellValue::UChar(dbg.trace.get() as u8),
        CellValue::UChar(dbg.target.get()),
        CellValue::UChar(dbg.priority.get()),
        CellValue::UChar(dbg.facility.get()),
        CellValue::Str(dbg.ident.borrow().clone()),
    ];
    let row = build_row(&columns, values)?;

    let row_size = columns.iter().map(|c| c.offset + c.kind.slot_size()).max().unwrap_or(0);
    Ok(TableDescriptor::new(RTA_DBG, row_size, RowStorage::array(vec![row])).with_columns(columns))
}

pub fn build_rta_stat(stat: Rc<Stat>) -> Result<TableDescriptor> {
    let kinds = [ColumnKind::Long; 8];
    let offs = offsets(&kinds);
    let names = ["syserr", "internalerr", "sqlerr", "connections", "n_select", "n_update", "n_insert", "n_delete"];
    let columns: Vec<ColumnDescriptor> = names
        .iter()
        .zip(offs.iter())
        .map(|(name, offset)| ColumnDescriptor::new(RTA_STAT, *name, ColumnKind::Long, *offset).with_flags(catalog::ColumnFlags::READONLY))
        .collect();

    let values = vec![
        CellValue::Long(stat.syserr.get() as i64),
        CellValue::Long(stat.internalerr.get() as i64),
        CellValue::Long(stat.sqlerr.get() as i64),
        CellValue::Long(stat.connections.get() as i64),
        CellValue::Long(stat.n_select.get() as i64),
        CellValue::Long(stat.n_update.get() as i64),
        CellValue::Long(stat.n_insert.get() as i64),
        CellValue::Long(stat.n_delete.get() as i64),
    ];
    let row = build_row(&columns, values)?;

    let row_size = columns.iter().map(|c| c.offset + c.kind.slot_size()).max().unwrap_or(0);
    Ok(TableDescriptor::new(RTA_STAT, row_size, RowStorage::array(vec![row])).with_columns(columns))
}
