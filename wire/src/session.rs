//! Per-connection framer state (§4.8, §5): classifies and consumes frontend
//! packets, drives the engine, and appends backend packets to the caller's
//! output buffer. One `WireSession` per accepted connection; the demo server
//! (`server` crate) owns one per `TcpStream`.

use byteorder::{BigEndian, ByteOrder};

use common::Result;
use engine::Engine;

use crate::encode;
use crate::outcome::WireOutcome;
use crate::startup::{canned_greeting, classify, PreStartupPacket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    PreStartup,
    Ready,
}

pub struct WireSession<'e> {
    engine: &'e Engine,
    state: State,
}

impl<'e> WireSession<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        WireSession {
            engine,
            state: State::PreStartup,
        }
    }

    /// Consumes as much of `in_buf` as forms one complete frame, appending
    /// any backend response to `out_buf`. `out_capacity` bounds the response
    /// this call is allowed to produce before falling back to an E_FULLBUF
    /// error (or, if even the error doesn't fit, `WireOutcome::NoBuf`).
    pub fn feed_wire(&mut self, in_buf: &[u8], out_buf: &mut Vec<u8>, out_capacity: usize) -> Result<WireOutcome> {
        match self.state {
            State::PreStartup => self.feed_pre_startup(in_buf, out_buf),
            State::Ready => self.feed_query(in_buf, out_buf, out_capacity),
        }
    }

    fn feed_pre_startup(&mut self, in_buf: &[u8], out_buf: &mut Vec<u8>) -> Result<WireOutcome> {
        match classify(in_buf) {
            PreStartupPacket::Incomplete => Ok(WireOutcome::NoCompleteCommand),
            PreStartupPacket::SslRequest { consumed } => {
                out_buf.push(b'N');
                Ok(WireOutcome::Success { consumed })
            }
            PreStartupPacket::Cancel { consumed } => Ok(WireOutcome::Success { consumed }),
            PreStartupPacket::Startup { consumed } => {
                out_buf.extend_from_slice(&canned_greeting());
                self.engine.stat().bump_connections();
                self.state = State::Ready;
                Ok(WireOutcome::Success { consumed })
            }
            PreStartupPacket::Other { consumed } => Ok(WireOutcome::Success { consumed }),
        }
    }

    fn feed_query(&mut self, in_buf: &[u8], out_buf: &mut Vec<u8>, out_capacity: usize) -> Result<WireOutcome> {
        if in_buf.is_empty() {
            return Ok(WireOutcome::NoCompleteCommand);
        }
        let msg_type = in_buf[0];
        if in_buf.len() < 5 {
            return Ok(WireOutcome::NoCompleteCommand);
        }
        let declared_len = BigEndian::read_u32(&in_buf[1..5]) as usize;
        let total = 1 + declared_len;
        if declared_len < 4 || in_buf.len() < total {
            return Ok(WireOutcome::NoCompleteCommand);
        }

        match msg_type {
            b'Q' => {
                let payload = &in_buf[5..total];
                let sql_text = std::str::from_utf8(payload).unwrap_or("").trim_end_matches('\0');
                if self.run_query(sql_text, out_buf, out_capacity)? {
                    Ok(WireOutcome::Success { consumed: total })
                } else {
                    Ok(WireOutcome::NoBuf)
                }
            }
            b'X' => Ok(WireOutcome::Close),
            other => {
                tracing::debug!(msg_type = other as char, "unrecognized frontend packet, closing");
                Ok(WireOutcome::Close)
            }
        }
    }

    /// Runs one query and appends its encoded response to `out_buf`. Returns
    /// `false` when even the fallback `E_FULLBUF` error packet doesn't fit in
    /// `out_capacity` — the caller surfaces that as `WireOutcome::NoBuf`
    /// (§4.8: "Output buffer overflow is a recoverable E_FULLBUF error...
    /// or, if even the error doesn't fit, `WireOutcome::NoBuf`").
    fn run_query(&self, sql_text: &str, out_buf: &mut Vec<u8>, out_capacity: usize) -> Result<bool> {
        let mut scratch = Vec::new();
        match self.engine.execute_sql(sql_text) {
            Ok(result) => encode::encode_result(&mut scratch, &result),
            Err(err) => encode::encode_error(&mut scratch, &err),
        }

        if scratch.len() > out_capacity {
            scratch.clear();
            encode::encode_error(&mut scratch, &common::err::EngineError::FullBuf);
            if scratch.len() > out_capacity {
                return Ok(false);
            }
        }
        out_buf.extend_from_slice(&scratch);
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use catalog::{ColumnDescriptor, ColumnKind, RowHandle, RowStorage, TableDescriptor};
    use std::rc::Rc;

    fn engine_with_demo_table() -> Engine {
        let mut engine = Engine::new();
        let row = RowHandle::zeroed(4);
        let table = Rc::new(
            TableDescriptor::new("mytable", 4, RowStorage::array(vec![row]))
                .with_columns(vec![ColumnDescriptor::new("mytable", "myint", ColumnKind::Int, 0)]),
        );
        engine.add_table(table).unwrap();
        engine
    }

    #[test]
    fn ssl_request_replies_with_single_n_and_consumes_eight_bytes() {
        let engine = Engine::new();
        let mut session = WireSession::new(&engine);
        let mut out = Vec::new();
        let outcome = session.feed_wire(&[0x00, 0x00, 0x00, 0x08, 0x04, 0xd2, 0x16, 0x2f], &mut out, 4096).unwrap();
        assert_eq!(outcome, WireOutcome::Success { consumed: 8 });
        assert_eq!(out, vec![b'N']);
    }

    #[test]
    fn startup_packet_yields_164_byte_greeting() {
        let engine = Engine::new();
        let mut session = WireSession::new(&engine);
        let mut packet = vec![0x00, 0x00, 0x00, 0x00];
        packet.extend_from_slice(&0x0003_0000u32.to_be_bytes());
        packet.extend_from_slice(b"user\0postgres\0\0");
        let len = packet.len() as u32;
        BigEndian::write_u32(&mut packet[0..4], len);

        let mut out = Vec::new();
        let outcome = session.feed_wire(&packet, &mut out, 4096).unwrap();
        assert_eq!(outcome, WireOutcome::Success { consumed: packet.len() });
        assert_eq!(out.len(), 164);
    }

    #[test]
    fn query_runs_after_startup_and_emits_select_tag() {
        let engine = engine_with_demo_table();
        let mut session = WireSession::new(&engine);
        let mut out = Vec::new();

        let mut startup = vec![0x00, 0x00, 0x00, 0x00];
        startup.extend_from_slice(&0x0003_0000u32.to_be_bytes());
        startup.extend_from_slice(b"\0");
        let len = startup.len() as u32;
        BigEndian::write_u32(&mut startup[0..4], len);
        session.feed_wire(&startup, &mut out, 4096).unwrap();
        out.clear();

        let sql = b"SELECT myint FROM mytable\0";
        let mut query = vec![b'Q'];
        query.extend_from_slice(&((4 + sql.len()) as u32).to_be_bytes());
        query.extend_from_slice(sql);

        let outcome = session.feed_wire(&query, &mut out, 4096).unwrap();
        assert_eq!(outcome, WireOutcome::Success { consumed: query.len() });
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("SELECT"));
    }

    #[test]
    fn partial_frame_reports_no_complete_command_and_consumes_nothing() {
        let engine = Engine::new();
        let mut session = WireSession::new(&engine);
        let mut out = Vec::new();
        for n in 1..8 {
            let outcome = session.feed_wire(&[0x00, 0x00, 0x00, 0x08, 0x04, 0xd2, 0x16, 0x2f][..n], &mut out, 4096).unwrap();
            assert_eq!(outcome, WireOutcome::NoCompleteCommand);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn terminate_packet_requests_close() {
        let engine = engine_with_demo_table();
        let mut session = WireSession::new(&engine);
        let mut out = Vec::new();
        let mut startup = vec![0x00, 0x00, 0x00, 0x00];
        startup.extend_from_slice(&0x0003_0000u32.to_be_bytes());
        startup.extend_from_slice(b"\0");
        let len = startup.len() as u32;
        BigEndian::write_u32(&mut startup[0..4], len);
        session.feed_wire(&startup, &mut out, 4096).unwrap();

        let terminate = [b'X', 0, 0, 0, 4];
        let outcome = session.feed_wire(&terminate, &mut out, 4096).unwrap();
        assert_eq!(outcome, WireOutcome::Close);
    }

    #[test]
    fn query_reports_nobuf_when_even_the_error_packet_does_not_fit() {
        let engine = engine_with_demo_table();
        let mut session = WireSession::new(&engine);
        let mut out = Vec::new();
        let mut startup = vec![0x00, 0x00, 0x00, 0x00];
        startup.extend_from_slice(&0x0003_0000u32.to_be_bytes());
        startup.extend_from_slice(b"\0");
        let len = startup.len() as u32;
        BigEndian::write_u32(&mut startup[0..4], len);
        session.feed_wire(&startup, &mut out, 4096).unwrap();
        out.clear();

        let sql = b"SELECT myint FROM mytable\0";
        let mut query = vec![b'Q'];
        query.extend_from_slice(&((4 + sql.len()) as u32).to_be_bytes());
        query.extend_from_slice(sql);

        let outcome = session.feed_wire(&query, &mut out, 0).unwrap();
        assert_eq!(outcome, WireOutcome::NoBuf);
        assert!(out.is_empty());
    }
}
