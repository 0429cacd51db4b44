//! The worked example's demo table (§8 scenario 1): `mytable` with
//! `myint:int`, `myfloat:float`, `notes:str(30)`, `seton:str(30, READONLY)`,
//! 20 zeroed rows. `notes`'s write callback mirrors the reversed string into
//! `seton` so the scenario's "seton becomes 'olleh'" assertion has something
//! to observe.

use std::rc::Rc;

use catalog::{CellValue, ColumnDescriptor, ColumnFlags, ColumnKind, RowHandle, RowStorage, TableDescriptor, TableRef};

const TABLE_NAME: &str = "mytable";
const ROW_COUNT: usize = 20;
const NOTES_OFFSET: usize = 8;
const SETON_OFFSET: usize = 38;
const ROW_SIZE: usize = 68;

pub fn build_mytable() -> TableRef {
    let notes_probe = ColumnDescriptor::new(TABLE_NAME, "_", ColumnKind::Str(30), NOTES_OFFSET);
    let seton_probe = ColumnDescriptor::new(TABLE_NAME, "_", ColumnKind::Str(30), SETON_OFFSET);

    let mirror_reversed: catalog::WriteCallback = Rc::new(move |_table, _col, _sql, row, _row_id, _old| {
        if let CellValue::Str(notes) = access::read_cell(&notes_probe, row)? {
            let reversed: String = notes.chars().rev().collect();
            access::write_cell(&seton_probe, row, &CellValue::Str(reversed))?;
        }
        Ok(())
    });

    let columns = vec![
        ColumnDescriptor::new(TABLE_NAME, "myint", ColumnKind::Int, 0),
        ColumnDescriptor::new(TABLE_NAME, "myfloat", ColumnKind::Float, 4),
        ColumnDescriptor::new(TABLE_NAME, "notes", ColumnKind::Str(30), NOTES_OFFSET).with_write_cb(mirror_reversed),
        ColumnDescriptor::new(TABLE_NAME, "seton", ColumnKind::Str(30), SETON_OFFSET).with_flags(ColumnFlags::READONLY),
    ];

    let rows: Vec<RowHandle> = (0..ROW_COUNT).map(|_| RowHandle::zeroed(ROW_SIZE)).collect();
    Rc::new(TableDescriptor::new(TABLE_NAME, ROW_SIZE, RowStorage::array(rows)).with_columns(columns))
}
