//! Codec Tests
//!
//! Tests for request line encoding and argument validation.

use mcadmin::protocol::{encode_command, parse_stats, parse_status, Command, StatsKind, StatusReply};
use mcadmin::ErrorKind;

fn encode(command: Command) -> Vec<u8> {
    encode_command(&command).unwrap()
}

fn rejected(command: Command) -> ErrorKind {
    encode_command(&command).unwrap_err().kind()
}

// =============================================================================
// Request Lines
// =============================================================================

#[test]
fn test_encode_stats_variants() {
    assert_eq!(encode(Command::Stats(StatsKind::General)), b"stats\r\n");
    assert_eq!(encode(Command::Stats(StatsKind::Settings)), b"stats settings\r\n");
    assert_eq!(encode(Command::Stats(StatsKind::Slabs)), b"stats slabs\r\n");
    assert_eq!(encode(Command::Stats(StatsKind::Items)), b"stats items\r\n");
}

#[test]
fn test_encode_cachedump() {
    let cmd = Command::CacheDump { slab_id: 3, limit: 0 };
    assert_eq!(encode(cmd), b"stats cachedump 3 0\r\n");

    let cmd = Command::CacheDump { slab_id: 12, limit: 100 };
    assert_eq!(encode(cmd), b"stats cachedump 12 100\r\n");
}

#[test]
fn test_encode_single_line_commands() {
    let key = || "user:42".to_string();

    assert_eq!(encode(Command::Get { key: key() }), b"get user:42\r\n");
    assert_eq!(encode(Command::Delete { key: key() }), b"delete user:42\r\n");
    assert_eq!(encode(Command::Incr { key: key(), value: 5 }), b"incr user:42 5\r\n");
    assert_eq!(encode(Command::Decr { key: key(), value: 2 }), b"decr user:42 2\r\n");
    assert_eq!(encode(Command::FlushAll { delay: 0 }), b"flush_all 0\r\n");
    assert_eq!(encode(Command::FlushAll { delay: 30 }), b"flush_all 30\r\n");
}

#[test]
fn test_encode_set_two_part_command() {
    let cmd = Command::Set {
        key: "greeting".to_string(),
        flags: 7,
        exptime: 60,
        data: b"hello".to_vec(),
    };
    assert_eq!(encode(cmd), b"set greeting 7 60 5\r\nhello\r\n");
}

#[test]
fn test_encode_set_declares_byte_length_not_char_count() {
    let data = "héllo".as_bytes().to_vec();
    assert_eq!("héllo".chars().count(), 5);
    assert_eq!(data.len(), 6);

    let cmd = Command::Set {
        key: "k".to_string(),
        flags: 0,
        exptime: 0,
        data,
    };
    let encoded = encode(cmd);

    let header_end = encoded.windows(2).position(|w| w == b"\r\n").unwrap();
    assert_eq!(&encoded[..header_end], b"set k 0 0 6");
    assert_eq!(&encoded[header_end + 2..], "héllo\r\n".as_bytes());
}

#[test]
fn test_encode_set_binary_payload() {
    let data: Vec<u8> = vec![0x00, b'\r', b'\n', 0xFF];
    let cmd = Command::Set {
        key: "bin".to_string(),
        flags: 0,
        exptime: 0,
        data: data.clone(),
    };
    let encoded = encode(cmd);

    let mut expected = b"set bin 0 0 4\r\n".to_vec();
    expected.extend_from_slice(&data);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(encoded, expected);
}

#[test]
fn test_encode_raw_line_appends_crlf() {
    let cmd = Command::Raw { line: "stats conns".to_string() };
    assert_eq!(encode(cmd), b"stats conns\r\n");
}

// =============================================================================
// Argument Validation
// =============================================================================

#[test]
fn test_reject_keys_that_cannot_be_framed() {
    for key in ["", "has space", "tab\there", "line\nbreak", "nul\0byte", "bell\x07"] {
        let kind = rejected(Command::Get { key: key.to_string() });
        assert_eq!(kind, ErrorKind::InvalidArgument, "key {:?}", key);
    }
}

#[test]
fn test_reject_overlong_key() {
    let key = "k".repeat(251);
    assert_eq!(rejected(Command::Delete { key }), ErrorKind::InvalidArgument);

    let key = "k".repeat(250);
    assert!(encode_command(&Command::Delete { key }).is_ok());
}

#[test]
fn test_reject_negative_numeric_arguments() {
    assert_eq!(rejected(Command::FlushAll { delay: -1 }), ErrorKind::InvalidArgument);
    assert_eq!(
        rejected(Command::Incr { key: "c".to_string(), value: -3 }),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        rejected(Command::Decr { key: "c".to_string(), value: -3 }),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        rejected(Command::Set {
            key: "c".to_string(),
            flags: 0,
            exptime: -10,
            data: Vec::new(),
        }),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_reject_multi_line_raw_command() {
    let cmd = Command::Raw { line: "get a\r\nflush_all".to_string() };
    assert_eq!(rejected(cmd), ErrorKind::InvalidArgument);

    let cmd = Command::Raw { line: "   ".to_string() };
    assert_eq!(rejected(cmd), ErrorKind::InvalidArgument);
}

// =============================================================================
// Integer Round Trip
// =============================================================================

#[test]
fn test_stat_integers_survive_encode_and_reply() {
    let raw = b"STAT curr_items 0\r\nSTAT total_items 42\r\nSTAT limit_maxbytes 9223372036854775807\r\nEND\r\n";
    let stats = parse_stats(raw).unwrap();

    for line in stats.iter() {
        let v: i64 = line.value.parse().unwrap();

        let request = encode(Command::Incr { key: "counter".to_string(), value: v });
        assert_eq!(request, format!("incr counter {}\r\n", v).into_bytes());

        let reply = format!("{}\r\n", v);
        assert_eq!(parse_status(reply.as_bytes()).unwrap(), StatusReply::Value(v as u64));
    }
}
