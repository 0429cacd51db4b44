//! §8: "Iteration under DELETE" and "LIMIT/OFFSET" testable properties,
//! against an array-backed table whose delete callback actually removes the
//! row from the backing `Vec` (the scenario a naive "advance after free"
//! scan would get wrong).

use std::cell::RefCell;
use std::rc::Rc;

use catalog::{CellValue, ColumnDescriptor, ColumnKind, RowHandle, RowStorage, TableDescriptor, TableRef};
use engine::{Engine, ExecResult};

fn deletable_table(count: i32) -> TableRef {
    let rows: Vec<RowHandle> = (0..count)
        .map(|i| {
            let row = RowHandle::zeroed(4);
            access::write_cell(&ColumnDescriptor::new("t", "id", ColumnKind::Int, 0), &row, &CellValue::Int(i)).unwrap();
            row
        })
        .collect();
    let shared = Rc::new(RefCell::new(rows));
    let delete_rows = shared.clone();
    let delete_cb: catalog::DeleteCallback = Rc::new(move |_table, row| {
        delete_rows.borrow_mut().retain(|r| !r.same_row(row));
        Ok(())
    });

    Rc::new(
        TableDescriptor::new("t", 4, RowStorage::shared_array(shared))
            .with_columns(vec![ColumnDescriptor::new("t", "id", ColumnKind::Int, 0)])
            .with_delete_cb(delete_cb),
    )
}

fn ids(engine: &Engine) -> Vec<i32> {
    match engine.execute_sql("SELECT id FROM t").unwrap() {
        ExecResult::Select { rows, .. } => rows.into_iter().map(|r| r[0].parse().unwrap()).collect(),
        _ => panic!("expected select"),
    }
}

#[test]
fn delete_with_no_where_removes_every_row() {
    let mut engine = Engine::new();
    engine.add_table(deletable_table(5)).unwrap();

    let result = engine.execute_sql("DELETE FROM t").unwrap();
    assert_eq!(result, ExecResult::Delete { count: 5 });
    assert!(ids(&engine).is_empty());
}

#[test]
fn delete_with_limit_leaves_the_remaining_rows_contiguous_in_order() {
    let mut engine = Engine::new();
    engine.add_table(deletable_table(5)).unwrap();

    let result = engine.execute_sql("DELETE FROM t LIMIT 2").unwrap();
    assert_eq!(result, ExecResult::Delete { count: 2 });
    assert_eq!(ids(&engine), vec![2, 3, 4]);
}

#[test]
fn limit_zero_returns_no_rows() {
    let mut engine = Engine::new();
    engine.add_table(deletable_table(5)).unwrap();

    let result = engine.execute_sql("SELECT id FROM t LIMIT 0").unwrap();
    match result {
        ExecResult::Select { rows, .. } => assert!(rows.is_empty()),
        _ => panic!("expected select"),
    }
}

#[test]
fn offset_past_the_end_returns_no_rows() {
    let mut engine = Engine::new();
    engine.add_table(deletable_table(5)).unwrap();

    let result = engine.execute_sql("SELECT id FROM t LIMIT 10 OFFSET 100").unwrap();
    match result {
        ExecResult::Select { rows, .. } => assert!(rows.is_empty()),
        _ => panic!("expected select"),
    }
}

#[test]
fn limit_and_offset_together_skip_then_bound() {
    let mut engine = Engine::new();
    engine.add_table(deletable_table(5)).unwrap();

    let result = engine.execute_sql("SELECT id FROM t LIMIT 2 OFFSET 1").unwrap();
    match result {
        ExecResult::Select { rows, .. } => {
            let got: Vec<i32> = rows.into_iter().map(|r| r[0].parse().unwrap()).collect();
            assert_eq!(got, vec![1, 2]);
        }
        _ => panic!("expected select"),
    }
}
