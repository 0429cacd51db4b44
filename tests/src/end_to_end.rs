//! §8 scenarios 1, 2 and 4: a worked `mytable`/`demo` table driven through
//! the wire protocol exactly as a client would, asserting on the bytes that
//! come back rather than on any crate's internal `ExecResult`.

use std::rc::Rc;

use byteorder::{BigEndian, ByteOrder};
use catalog::{CellValue, ColumnDescriptor, ColumnFlags, ColumnKind, RowHandle, RowStorage, TableDescriptor, TableRef};
use engine::Engine;
use wire::{WireOutcome, WireSession};

const NOTES_OFFSET: usize = 8;
const SETON_OFFSET: usize = 38;
const ROW_SIZE: usize = 68;

/// `mytable`: `myint:int`, `myfloat:float`, `notes:str(30)`,
/// `seton:str(30, READONLY)`, 20 zeroed rows. `notes`'s write callback
/// mirrors the reversed string into `seton`, matching §8 scenario 1.
fn build_mytable() -> TableRef {
    let notes_probe = ColumnDescriptor::new("mytable", "_", ColumnKind::Str(30), NOTES_OFFSET);
    let seton_probe = ColumnDescriptor::new("mytable", "_", ColumnKind::Str(30), SETON_OFFSET);

    let mirror_reversed: catalog::WriteCallback = Rc::new(move |_table, _col, _sql, row, _row_id, _old| {
        if let CellValue::Str(notes) = access::read_cell(&notes_probe, row)? {
            let reversed: String = notes.chars().rev().collect();
            access::write_cell(&seton_probe, row, &CellValue::Str(reversed))?;
        }
        Ok(())
    });

    let columns = vec![
        ColumnDescriptor::new("mytable", "myint", ColumnKind::Int, 0),
        ColumnDescriptor::new("mytable", "myfloat", ColumnKind::Float, 4),
        ColumnDescriptor::new("mytable", "notes", ColumnKind::Str(30), NOTES_OFFSET).with_write_cb(mirror_reversed),
        ColumnDescriptor::new("mytable", "seton", ColumnKind::Str(30), SETON_OFFSET).with_flags(ColumnFlags::READONLY),
    ];

    let rows: Vec<RowHandle> = (0..20).map(|_| RowHandle::zeroed(ROW_SIZE)).collect();
    Rc::new(TableDescriptor::new("mytable", ROW_SIZE, RowStorage::array(rows)).with_columns(columns))
}

fn startup_packet() -> Vec<u8> {
    let mut packet = vec![0x00, 0x00, 0x00, 0x00];
    packet.extend_from_slice(&0x0003_0000u32.to_be_bytes());
    packet.extend_from_slice(b"user\0postgres\0\0");
    let len = packet.len() as u32;
    BigEndian::write_u32(&mut packet[0..4], len);
    packet
}

fn query_packet(sql: &str) -> Vec<u8> {
    let mut body = sql.as_bytes().to_vec();
    body.push(0);
    let mut packet = vec![b'Q'];
    packet.extend_from_slice(&((4 + body.len()) as u32).to_be_bytes());
    packet.extend_from_slice(&body);
    packet
}

fn started_session(engine: &Engine) -> WireSession<'_> {
    let mut session = WireSession::new(engine);
    let mut out = Vec::new();
    session.feed_wire(&startup_packet(), &mut out, 1 << 16).unwrap();
    session
}

fn run_query(session: &mut WireSession<'_>, sql: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let packet = query_packet(sql);
    let outcome = session.feed_wire(&packet, &mut out, 1 << 16).unwrap();
    assert_eq!(outcome, WireOutcome::Success { consumed: packet.len() });
    out
}

#[test]
fn scenario_1_update_fires_write_callback_and_mirrors_seton() {
    let mut engine = Engine::new();
    engine.add_table(build_mytable()).unwrap();
    let mut session = started_session(&engine);

    let out = run_query(&mut session, r#"UPDATE mytable SET notes="hello" WHERE myint=0 LIMIT 1"#);

    let text = String::from_utf8_lossy(&out);
    assert!(out.starts_with(&[b'C']));
    assert!(text.contains("UPDATE 1"));

    let select = engine.execute_sql("SELECT seton FROM mytable WHERE myint=0 LIMIT 1").unwrap();
    match select {
        engine::ExecResult::Select { rows, .. } => assert_eq!(rows, vec![vec!["olleh".to_string()]]),
        _ => panic!("expected select"),
    }
}

#[test]
fn scenario_2_select_with_limit_offset_returns_exactly_three_rows() {
    let mut engine = Engine::new();
    engine.add_table(build_mytable()).unwrap();
    let mut session = started_session(&engine);

    let out = run_query(&mut session, "SELECT myint, notes FROM mytable LIMIT 3 OFFSET 0");

    assert_eq!(out[0], b'T');
    let field_count = BigEndian::read_u16(&out[5..7]);
    assert_eq!(field_count, 2);

    let data_row_count = out.iter().filter(|&&b| b == b'D').count();
    assert_eq!(data_row_count, 3);

    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("SELECT"));
}

/// Builds a `demo` table whose insert callback refuses any row whose
/// `dllong` column carries the value 5 (§8 scenario 4).
fn build_demo_with_picky_insert() -> TableRef {
    use std::cell::RefCell;

    let rows = Rc::new(RefCell::new(Vec::<RowHandle>::new()));
    let insert_rows = rows.clone();
    let dllong_probe = ColumnDescriptor::new("demo", "_", ColumnKind::Long, 0);
    let insert_cb: catalog::InsertCallback = Rc::new(move |_table, _sql, row| {
        let value = access::read_cell(&dllong_probe, row)?;
        if value.as_i64() == Some(5) {
            return Err(common::err::EngineError::BadInsert("demo".to_string()));
        }
        let oid = insert_rows.borrow().len() as i64;
        insert_rows.borrow_mut().push(row.clone());
        Ok(oid)
    });

    Rc::new(
        TableDescriptor::new("demo", 8, RowStorage::shared_array(rows))
            .with_columns(vec![ColumnDescriptor::new("demo", "dllong", ColumnKind::Long, 0)])
            .with_insert_cb(insert_cb),
    )
}

#[test]
fn scenario_4_insert_rejection_then_acceptance() {
    let mut engine = Engine::new();
    engine.add_table(build_demo_with_picky_insert()).unwrap();
    let mut session = started_session(&engine);

    let rejected = run_query(&mut session, "INSERT INTO demo (dllong) VALUES (5)");
    assert_eq!(rejected[0], b'E');
    let rejected_text = String::from_utf8_lossy(&rejected);
    assert!(rejected_text.contains("Failed INSERT on relation 'demo'"));

    let count_after_reject = engine.execute_sql("SELECT dllong FROM demo").unwrap();
    match count_after_reject {
        engine::ExecResult::Select { rows, .. } => assert!(rows.is_empty()),
        _ => panic!("expected select"),
    }

    let accepted = run_query(&mut session, "INSERT INTO demo (dllong) VALUES (7)");
    assert_eq!(accepted[0], b'C');
    let accepted_text = String::from_utf8_lossy(&accepted);
    assert!(accepted_text.contains("INSERT 0 1"));

    let count_after_accept = engine.execute_sql("SELECT dllong FROM demo").unwrap();
    match count_after_accept {
        engine::ExecResult::Select { rows, .. } => assert_eq!(rows, vec![vec!["7".to_string()]]),
        _ => panic!("expected select"),
    }
}
