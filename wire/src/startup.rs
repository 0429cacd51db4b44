//! Pre-startup packet handling (§4.8): the SSL negotiation request, the
//! startup packet, and cancel requests. None of these carry a type byte —
//! only the frontend's very first few packets are shaped this way.

use byteorder::{BigEndian, ByteOrder};

/// `SSLRequest`'s fixed body: protocol-major 1234, protocol-minor 5679,
/// matching PG's reserved "is this SSL" sentinel (§4.8).
const SSL_REQUEST_CODE: u32 = 0x04d2_162f;
/// Protocol version 3.0, the only one this framer understands.
const STARTUP_PROTOCOL_V3: u32 = 0x0003_0000;
const CANCEL_REQUEST_LEN: u32 = 16;

pub enum PreStartupPacket {
    /// Not enough bytes buffered yet; consume nothing.
    Incomplete,
    SslRequest { consumed: usize },
    Startup { consumed: usize },
    Cancel { consumed: usize },
    /// Anything else: consumed per the advertised length, no response.
    Other { consumed: usize },
}

/// Classifies the next pre-startup packet in `buf`, which has no type byte —
/// just a 4-byte big-endian length that includes itself (§4.8).
pub fn classify(buf: &[u8]) -> PreStartupPacket {
    if buf.len() < 4 {
        return PreStartupPacket::Incomplete;
    }
    let total_len = BigEndian::read_u32(&buf[0..4]) as usize;
    if buf.len() < total_len || total_len < 4 {
        return PreStartupPacket::Incomplete;
    }

    if total_len == 8 && BigEndian::read_u32(&buf[4..8]) == SSL_REQUEST_CODE {
        return PreStartupPacket::SslRequest { consumed: 8 };
    }
    if total_len as u32 == CANCEL_REQUEST_LEN {
        return PreStartupPacket::Cancel { consumed: total_len };
    }
    if total_len >= 8 && BigEndian::read_u32(&buf[4..8]) == STARTUP_PROTOCOL_V3 {
        return PreStartupPacket::Startup { consumed: total_len };
    }
    PreStartupPacket::Other { consumed: total_len }
}

/// The canned post-startup greeting (§4.8, §6): authentication-OK, five
/// parameter-status entries, one backend-key-data, one ready-for-query.
/// Bit-for-bit compatible with PG 7.4, 164 bytes total.
pub fn canned_greeting() -> Vec<u8> {
    let mut out = Vec::with_capacity(164);

    // AuthenticationOk: 'R' length=8 authtype=0
    out.push(b'R');
    write_len(&mut out, 8);
    out.extend_from_slice(&0u32.to_be_bytes());

    for (key, value) in [
        ("client_encoding", "SQL_ASCII"),
        ("DateStyle", "ISO, MDY"),
        ("is_superuser", "on"),
        ("server_version", "7.4"),
        ("session_authorization", "postgres"),
    ] {
        write_param_status(&mut out, key, value);
    }

    // BackendKeyData: 'K' length=12 pid=0 secret=0
    out.push(b'K');
    write_len(&mut out, 12);
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());

    // ReadyForQuery: 'Z' length=5 status='I'
    out.push(b'Z');
    write_len(&mut out, 5);
    out.push(b'I');

    out
}

fn write_len(out: &mut Vec<u8>, len: u32) {
    out.extend_from_slice(&len.to_be_bytes());
}

fn write_param_status(out: &mut Vec<u8>, key: &str, value: &str) {
    let body_len = 4 + key.len() + 1 + value.len() + 1;
    out.push(b'S');
    write_len(out, body_len as u32);
    out.extend_from_slice(key.as_bytes());
    out.push(0);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
}
