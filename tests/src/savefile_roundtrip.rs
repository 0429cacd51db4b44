//! §8: round-trip persistence and snapshot rollback, driven through
//! `Engine` rather than the `savefile` module directly.

use std::rc::Rc;

use catalog::{CellValue, ColumnDescriptor, ColumnFlags, ColumnKind, RowHandle, RowStorage, TableDescriptor, TableRef};
use common::err::EngineError;
use engine::Engine;

fn notes_table(rows: usize) -> TableRef {
    let handles: Vec<RowHandle> = (0..rows).map(|_| RowHandle::zeroed(34)).collect();
    Rc::new(
        TableDescriptor::new("notes_tbl", 34, RowStorage::array(handles)).with_columns(vec![
            ColumnDescriptor::new("notes_tbl", "myint", ColumnKind::Int, 0),
            ColumnDescriptor::new("notes_tbl", "notes", ColumnKind::Str(30), 4).with_flags(ColumnFlags::DISKSAVE),
        ]),
    )
}

#[test]
fn scenario_5_save_then_load_reproduces_disksave_column_byte_for_byte() {
    let mut engine = Engine::new();
    engine.add_table(notes_table(3)).unwrap();
    engine.execute_sql(r#"UPDATE notes_tbl SET notes="first" WHERE myint=0 LIMIT 1 OFFSET 0"#).unwrap();
    engine.execute_sql(r#"UPDATE notes_tbl SET notes='has "quotes"' WHERE myint=0 LIMIT 1 OFFSET 1"#).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes_tbl.sql");
    engine.save("notes_tbl", path.to_str().unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.ends_with('\n'));
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().next().unwrap().starts_with("UPDATE notes_tbl SET notes="));

    let mut reloaded = Engine::new();
    reloaded.add_table(notes_table(3)).unwrap();
    reloaded.load("notes_tbl", path.to_str().unwrap()).unwrap();

    let result = reloaded.execute_sql("SELECT notes FROM notes_tbl").unwrap();
    match result {
        engine::ExecResult::Select { rows, .. } => {
            assert_eq!(rows[0][0], "first");
            assert_eq!(rows[1][0], r#"has "quotes""#);
            assert_eq!(rows[2][0], "");
        }
        _ => panic!("expected select"),
    }
}

/// A write callback that fails whenever the new value is the literal
/// string "reject", so the rollback path has something to exercise.
fn table_with_failing_callback(savefile: &str) -> TableRef {
    let notes_probe = ColumnDescriptor::new("guarded", "_", ColumnKind::Str(30), 4);
    let guard_cb: catalog::WriteCallback = Rc::new(move |_t, _c, _sql, row, _id, _old| {
        if let CellValue::Str(s) = access::read_cell(&notes_probe, row)? {
            if s == "reject" {
                return Err(EngineError::BadTrigger("notes".to_string()));
            }
        }
        Ok(())
    });

    let row = RowHandle::zeroed(34);
    Rc::new(
        TableDescriptor::new("guarded", 34, RowStorage::array(vec![row]))
            .with_columns(vec![
                ColumnDescriptor::new("guarded", "myint", ColumnKind::Int, 0),
                ColumnDescriptor::new("guarded", "notes", ColumnKind::Str(30), 4)
                    .with_flags(ColumnFlags::DISKSAVE)
                    .with_write_cb(guard_cb),
            ])
            .with_savefile(savefile.to_string()),
    )
}

#[test]
fn failing_write_callback_rolls_back_the_row_and_does_not_rewrite_the_savefile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guarded.sql");

    let mut engine = Engine::new();
    engine.add_table(table_with_failing_callback(path.to_str().unwrap())).unwrap();
    engine.execute_sql(r#"UPDATE guarded SET notes="kept""#).unwrap();
    let saved_after_success = std::fs::read_to_string(&path).unwrap();
    assert!(saved_after_success.contains("kept"));

    let err = engine.execute_sql(r#"UPDATE guarded SET notes="reject""#).unwrap_err();
    assert!(matches!(err, EngineError::BadTrigger(_)));

    let result = engine.execute_sql("SELECT notes FROM guarded").unwrap();
    match result {
        engine::ExecResult::Select { rows, .. } => assert_eq!(rows, vec![vec!["kept".to_string()]]),
        _ => panic!("expected select"),
    }

    let saved_after_failure = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved_after_failure, saved_after_success, "savefile must not be rewritten on rollback");
}
