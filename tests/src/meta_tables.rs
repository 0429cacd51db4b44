//! §8: registry testable properties and scenario 3 (`rta_tables` exposes the
//! four built-in meta-tables plus every user-registered one).

use std::rc::Rc;

use catalog::{ColumnDescriptor, ColumnKind, RowHandle, RowStorage, TableDescriptor, TableRef};
use common::err::EngineError;
use engine::{Engine, ExecResult};

fn one_column_table(name: &str) -> TableRef {
    let row = RowHandle::zeroed(4);
    Rc::new(
        TableDescriptor::new(name, 4, RowStorage::array(vec![row]))
            .with_columns(vec![ColumnDescriptor::new(name, "id", ColumnKind::Int, 0)]),
    )
}

#[test]
fn scenario_3_rta_tables_lists_meta_tables_and_user_table() {
    let mut engine = Engine::new();
    engine.add_table(one_column_table("mytable")).unwrap();

    let result = engine.execute_sql("SELECT * FROM rta_tables").unwrap();
    match result {
        ExecResult::Select { fields, rows } => {
            // rta_tables, rta_columns, rta_dbg, rta_stat plus mytable itself.
            assert!(rows.len() >= 5, "expected at least 5 tables, got {}", rows.len());
            assert!(!fields.is_empty());
            let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
            assert!(names.contains(&"mytable"));
        }
        _ => panic!("expected select"),
    }
}

#[test]
fn registering_a_table_makes_it_visible_exactly_once() {
    let mut engine = Engine::new();
    engine.add_table(one_column_table("widgets")).unwrap();

    let result = engine.execute_sql("SELECT name FROM rta_tables WHERE name=widgets").unwrap();
    match result {
        ExecResult::Select { rows, .. } => assert_eq!(rows, vec![vec!["widgets".to_string()]]),
        _ => panic!("expected select"),
    }
}

#[test]
fn duplicate_registration_fails_and_leaves_registry_unchanged() {
    let mut engine = Engine::new();
    engine.add_table(one_column_table("widgets")).unwrap();
    let err = engine.add_table(one_column_table("widgets")).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateTable(_)));

    let result = engine.execute_sql("SELECT name FROM rta_tables WHERE name=widgets").unwrap();
    match result {
        ExecResult::Select { rows, .. } => assert_eq!(rows.len(), 1),
        _ => panic!("expected select"),
    }
}

#[test]
fn reserved_word_guard_blocks_table_and_column_names_case_insensitively() {
    let mut engine = Engine::new();
    assert!(matches!(engine.add_table(one_column_table("select")).unwrap_err(), EngineError::ReservedWord(_)));
    assert!(matches!(engine.add_table(one_column_table("Select")).unwrap_err(), EngineError::ReservedWord(_)));

    let row = RowHandle::zeroed(4);
    let bad_column = Rc::new(
        TableDescriptor::new("ok_table", 4, RowStorage::array(vec![row]))
            .with_columns(vec![ColumnDescriptor::new("ok_table", "WHERE", ColumnKind::Int, 0)]),
    );
    assert!(matches!(engine.add_table(bad_column).unwrap_err(), EngineError::ReservedWord(_)));
}
