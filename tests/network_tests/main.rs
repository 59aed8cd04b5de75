//! Network tests: terminator-driven reads and the TCP connector.

#[path = "../common/mod.rs"]
mod common;

mod tcp_tests;
