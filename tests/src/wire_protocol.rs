//! §8 scenario 6 and the "Framing laziness" testable property, driven
//! against a real `Engine` rather than a bare `WireSession` in isolation.

use byteorder::{BigEndian, ByteOrder};
use engine::Engine;
use wire::{WireOutcome, WireSession};

#[test]
fn scenario_6_ssl_request_yields_single_n_and_consumes_eight_bytes() {
    let engine = Engine::new();
    let mut session = WireSession::new(&engine);
    let mut out = Vec::new();

    let mut in_buf: Vec<u8> = vec![0x00, 0x00, 0x00, 0x08, 0x04, 0xd2, 0x16, 0x2f];
    let in_len_before = in_buf.len();

    let outcome = session.feed_wire(&in_buf, &mut out, 4096).unwrap();
    let consumed = match outcome {
        WireOutcome::Success { consumed } => consumed,
        other => panic!("expected Success, got {:?}", other),
    };
    in_buf.drain(..consumed);

    assert_eq!(out, vec![b'N']);
    assert_eq!(in_len_before - in_buf.len(), 8);
}

#[test]
fn startup_packet_yields_exactly_164_bytes() {
    let engine = Engine::new();
    let mut session = WireSession::new(&engine);
    let mut out = Vec::new();

    let mut packet = vec![0x00, 0x00, 0x00, 0x00];
    packet.extend_from_slice(&0x0003_0000u32.to_be_bytes());
    packet.extend_from_slice(b"user\0postgres\0\0");
    let len = packet.len() as u32;
    BigEndian::write_u32(&mut packet[0..4], len);

    session.feed_wire(&packet, &mut out, 4096).unwrap();
    assert_eq!(out.len(), 164);
}

#[test]
fn feeding_a_query_one_byte_at_a_time_runs_exactly_once_at_completion() {
    let engine = Engine::new();
    let mut session = WireSession::new(&engine);
    let mut out = Vec::new();

    let mut startup = vec![0x00, 0x00, 0x00, 0x00];
    startup.extend_from_slice(&0x0003_0000u32.to_be_bytes());
    startup.extend_from_slice(b"\0");
    let len = startup.len() as u32;
    BigEndian::write_u32(&mut startup[0..4], len);
    session.feed_wire(&startup, &mut out, 4096).unwrap();
    out.clear();

    let sql = b"SELECT syserr FROM rta_stat\0";
    let mut query = vec![b'Q'];
    query.extend_from_slice(&((4 + sql.len()) as u32).to_be_bytes());
    query.extend_from_slice(sql);

    let mut completions = 0usize;
    for n in 1..=query.len() {
        out.clear();
        let outcome = session.feed_wire(&query[..n], &mut out, 4096).unwrap();
        if n < query.len() {
            assert_eq!(outcome, WireOutcome::NoCompleteCommand, "byte {n} of {}", query.len());
            assert!(out.is_empty());
        } else {
            assert_eq!(outcome, WireOutcome::Success { consumed: query.len() });
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert!(!out.is_empty());
}
