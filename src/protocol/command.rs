//! Command definitions
//!
//! Logical commands sent to a server, with argument validation.

use crate::error::{McError, Result};
use super::Grammar;

/// Longest key the text protocol accepts
pub const MAX_KEY_LENGTH: usize = 250;

/// Which `stats` listing to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    /// `stats`
    General,
    /// `stats settings`
    Settings,
    /// `stats slabs`
    Slabs,
    /// `stats items`
    Items,
}

/// A logical command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Stats(StatsKind),

    /// List items of a slab (`limit` 0 = everything the server allows)
    CacheDump { slab_id: u32, limit: u32 },

    Get { key: String },

    Set {
        key: String,
        flags: u32,
        exptime: i64,
        data: Vec<u8>,
    },

    Delete { key: String },

    Incr { key: String, value: i64 },

    Decr { key: String, value: i64 },

    /// Invalidate everything after `delay` seconds (0 = now)
    FlushAll { delay: i64 },

    /// Arbitrary single-line command, sent verbatim
    Raw { line: String },
}

impl Command {
    /// Protocol verb, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Stats(StatsKind::General) => "stats",
            Command::Stats(StatsKind::Settings) => "stats settings",
            Command::Stats(StatsKind::Slabs) => "stats slabs",
            Command::Stats(StatsKind::Items) => "stats items",
            Command::CacheDump { .. } => "stats cachedump",
            Command::Get { .. } => "get",
            Command::Set { .. } => "set",
            Command::Delete { .. } => "delete",
            Command::Incr { .. } => "incr",
            Command::Decr { .. } => "decr",
            Command::FlushAll { .. } => "flush_all",
            Command::Raw { .. } => "raw",
        }
    }

    /// How the reply to this command is terminated
    pub fn grammar(&self) -> Grammar {
        match self {
            Command::Stats(_) | Command::CacheDump { .. } => Grammar::EndSentinel,
            Command::Get { .. } => Grammar::Retrieval,
            Command::Set { .. }
            | Command::Delete { .. }
            | Command::Incr { .. }
            | Command::Decr { .. }
            | Command::FlushAll { .. } => Grammar::Line,
            Command::Raw { .. } => Grammar::Passthrough,
        }
    }

    /// Reject arguments the text protocol cannot represent
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Stats(_) | Command::CacheDump { .. } => Ok(()),
            Command::Get { key } | Command::Delete { key } => validate_key(key),
            Command::Set { key, exptime, .. } => {
                validate_key(key)?;
                non_negative("exptime", *exptime)
            }
            Command::Incr { key, value } | Command::Decr { key, value } => {
                validate_key(key)?;
                non_negative("value", *value)
            }
            Command::FlushAll { delay } => non_negative("delay", *delay),
            Command::Raw { line } => validate_raw_line(line),
        }
    }
}

/// Check that a key can be sent on a whitespace-delimited line
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(McError::invalid("key must not be empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(McError::invalid(format!(
            "key is {} bytes (max {})",
            key.len(),
            MAX_KEY_LENGTH
        )));
    }
    if let Some(b) = key.bytes().find(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(McError::invalid(format!(
            "key {:?} contains whitespace or control byte 0x{:02x}",
            key, b
        )));
    }
    Ok(())
}

fn non_negative(name: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(McError::invalid(format!("{} must not be negative (got {})", name, value)));
    }
    Ok(())
}

fn validate_raw_line(line: &str) -> Result<()> {
    if line.trim().is_empty() {
        return Err(McError::invalid("command must not be empty"));
    }
    if line.contains(['\r', '\n']) {
        return Err(McError::invalid("command must be a single line"));
    }
    Ok(())
}
