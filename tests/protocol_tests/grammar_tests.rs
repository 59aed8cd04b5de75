//! Grammar Tests
//!
//! Completion rules for each reply shape.

use mcadmin::protocol::{Command, Grammar, Scan, StatsKind};

#[test]
fn test_commands_map_to_their_grammar() {
    assert_eq!(Command::Stats(StatsKind::General).grammar(), Grammar::EndSentinel);
    assert_eq!(Command::CacheDump { slab_id: 1, limit: 0 }.grammar(), Grammar::EndSentinel);
    assert_eq!(Command::Get { key: "k".into() }.grammar(), Grammar::Retrieval);
    assert_eq!(Command::FlushAll { delay: 0 }.grammar(), Grammar::Line);
    assert_eq!(Command::Delete { key: "k".into() }.grammar(), Grammar::Line);
    assert_eq!(Command::Raw { line: "version".into() }.grammar(), Grammar::Passthrough);
}

#[test]
fn test_end_sentinel_completes_on_end_line() {
    let reply = b"STAT pid 1\r\nSTAT uptime 5\r\nEND\r\n";
    assert_eq!(Grammar::EndSentinel.scan(&reply[..20]), Scan::Incomplete);
    assert_eq!(Grammar::EndSentinel.scan(reply), Scan::Complete(reply.len()));
}

#[test]
fn test_end_sentinel_stops_on_error_line() {
    let reply = b"SERVER_ERROR no such slab\r\n";
    assert_eq!(Grammar::EndSentinel.scan(reply), Scan::Complete(reply.len()));
}

#[test]
fn test_end_sentinel_waits_for_end_not_prefix() {
    assert_eq!(Grammar::EndSentinel.scan(b"ENDING\r\n"), Scan::Incomplete);
    assert_eq!(Grammar::EndSentinel.scan(b"EN"), Scan::Incomplete);
}

#[test]
fn test_retrieval_miss() {
    assert_eq!(Grammar::Retrieval.scan(b"END\r\n"), Scan::Complete(5));
}

#[test]
fn test_retrieval_waits_for_whole_block() {
    let reply = b"VALUE foo 0 5\r\nhello\r\nEND\r\n";
    for cut in 0..reply.len() {
        assert_eq!(Grammar::Retrieval.scan(&reply[..cut]), Scan::Incomplete, "cut at {}", cut);
    }
    assert_eq!(Grammar::Retrieval.scan(reply), Scan::Complete(reply.len()));
}

#[test]
fn test_retrieval_completes_early_on_length_mismatch() {
    // declared 5, data is 6 bytes: the block does not end in CRLF
    let reply = "VALUE foo 0 5\r\nhéllo\r\nEND\r\n".as_bytes();
    match Grammar::Retrieval.scan(reply) {
        Scan::Complete(len) => assert!(len < reply.len()),
        Scan::Incomplete => panic!("mismatched block should be handed to the parser"),
    }
}

#[test]
fn test_retrieval_huge_declared_length_is_handed_to_parser() {
    let reply = b"VALUE k 0 18446744073709551615\r\nhi\r\nEND\r\n";
    assert_eq!(Grammar::Retrieval.scan(reply), Scan::Complete(32));
    assert_eq!(Grammar::Passthrough.scan(reply), Scan::Complete(32));
}

#[test]
fn test_line_is_complete_after_first_crlf() {
    assert_eq!(Grammar::Line.scan(b"12\r\n"), Scan::Complete(4));
    assert_eq!(Grammar::Line.scan(b"NOT_FOUND\r\nextra"), Scan::Complete(11));
}

#[test]
fn test_passthrough_terminal_tokens() {
    assert_eq!(Grammar::Passthrough.scan(b"VERSION 1.6.21\r\n"), Scan::Complete(16));
    assert_eq!(Grammar::Passthrough.scan(b"STAT a 1\r\nEND\r\n"), Scan::Complete(15));
    assert_eq!(Grammar::Passthrough.scan(b"TOUCHED\r\n"), Scan::Complete(9));
    assert_eq!(Grammar::Passthrough.scan(b"STAT a 1\r\n"), Scan::Incomplete);
    assert!(Grammar::Passthrough.ends_on_idle());
    assert!(!Grammar::EndSentinel.ends_on_idle());
}
