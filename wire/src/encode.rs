//! Backend response encoding (§4.6 "Row-description emission", §4.8
//! query-time packets, §7 error framing).

use common::err::EngineError;
use engine::ExecResult;

/// Generic PostgreSQL `text` type OID; every value this engine emits is
/// already formatted as text (§4.1), so every field reports the same OID
/// and a format code of 0.
const TEXT_TYPE_OID: u32 = 25;
const SQLSTATE_SYNTAX_ERROR: &str = "42601";

fn write_len(out: &mut Vec<u8>, len: u32) {
    out.extend_from_slice(&len.to_be_bytes());
}

fn write_row_description(out: &mut Vec<u8>, fields: &[engine::FieldDescriptor]) {
    let mut body = Vec::new();
    body.extend_from_slice(&(fields.len() as u16).to_be_bytes());
    for field in fields {
        body.extend_from_slice(field.name.as_bytes());
        body.push(0);
        body.extend_from_slice(&(field.table_oid as u32).to_be_bytes());
        body.extend_from_slice(&(field.column_index as u16).to_be_bytes());
        body.extend_from_slice(&TEXT_TYPE_OID.to_be_bytes());
        body.extend_from_slice(&(-1i16).to_be_bytes()); // typlen: variable
        body.extend_from_slice(&(-1i32).to_be_bytes()); // typmod: none
        body.extend_from_slice(&0i16.to_be_bytes()); // format: text
    }
    out.push(b'T');
    write_len(out, 4 + body.len() as u32);
    out.extend_from_slice(&body);
}

fn write_data_row(out: &mut Vec<u8>, values: &[String]) {
    let mut body = Vec::new();
    body.extend_from_slice(&(values.len() as u16).to_be_bytes());
    for v in values {
        body.extend_from_slice(&(v.len() as u32).to_be_bytes());
        body.extend_from_slice(v.as_bytes());
    }
    out.push(b'D');
    write_len(out, 4 + body.len() as u32);
    out.extend_from_slice(&body);
}

fn write_command_complete(out: &mut Vec<u8>, tag: &str) {
    out.push(b'C');
    write_len(out, (4 + tag.len() + 1) as u32);
    out.extend_from_slice(tag.as_bytes());
    out.push(0);
}

/// Encodes one executed statement's result as the backend packets §4.8
/// describes: row description + data rows for SELECT, just a command-complete
/// tag for the mutating verbs.
pub fn encode_result(out: &mut Vec<u8>, result: &ExecResult) {
    match result {
        ExecResult::Select { fields, rows } => {
            write_row_description(out, fields);
            for row in rows {
                write_data_row(out, row);
            }
            write_command_complete(out, "SELECT");
        }
        ExecResult::Update { count } => write_command_complete(out, &format!("UPDATE {}", count)),
        ExecResult::Insert { oid } => write_command_complete(out, &format!("INSERT {} 1", oid)),
        ExecResult::Delete { count } => write_command_complete(out, &format!("DELETE {}", count)),
    }
}

/// Encodes an `'E'` error packet (§7): severity `ERROR`, SQLSTATE 42601,
/// free-form message, terminated by an extra null byte past the message
/// fields. Never forwards a raw `EngineError::Io`'s OS message — that detail
/// stays in the log, the client gets the variant's own `Display`.
pub fn encode_error(out: &mut Vec<u8>, err: &EngineError) {
    let message = if matches!(err, EngineError::Io(_)) {
        "internal error".to_string()
    } else {
        err.to_string()
    };

    let mut body = Vec::new();
    body.push(b'S');
    body.extend_from_slice(b"ERROR\0");
    body.push(b'C');
    body.extend_from_slice(SQLSTATE_SYNTAX_ERROR.as_bytes());
    body.push(0);
    body.push(b'M');
    body.extend_from_slice(message.as_bytes());
    body.push(0);
    body.push(0); // terminator

    out.push(b'E');
    write_len(out, (4 + body.len()) as u32);
    out.extend_from_slice(&body);
}

#[cfg(test)]
mod test {
    use super::*;
    use engine::FieldDescriptor;

    #[test]
    fn select_result_emits_row_description_data_and_complete() {
        let mut out = Vec::new();
        let result = ExecResult::Select {
            fields: vec![FieldDescriptor { name: "myint".to_string(), table_oid: 0, column_index: 1 }],
            rows: vec![vec!["7".to_string()]],
        };
        encode_result(&mut out, &result);
        assert_eq!(out[0], b'T');
        assert!(out.contains(&b'D'));
        let tail = &out[out.len() - 8..];
        assert_eq!(&tail[1..7], b"SELECT");
    }

    #[test]
    fn update_result_emits_count_in_tag() {
        let mut out = Vec::new();
        encode_result(&mut out, &ExecResult::Update { count: 3 });
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("UPDATE 3"));
    }

    #[test]
    fn error_packet_carries_sqlstate_and_message() {
        let mut out = Vec::new();
        encode_error(&mut out, &EngineError::NoTable("foo".to_string()));
        assert_eq!(out[0], b'E');
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("42601"));
        assert!(text.contains("Relation 'foo' does not exist"));
    }

    #[test]
    fn io_error_message_is_redacted_on_the_wire() {
        let mut out = Vec::new();
        let io_err = EngineError::Io(std::io::Error::new(std::io::ErrorKind::Other, "/secret/path failed"));
        encode_error(&mut out, &io_err);
        let text = String::from_utf8_lossy(&out);
        assert!(!text.contains("/secret/path"));
        assert!(text.contains("internal error"));
    }
}
