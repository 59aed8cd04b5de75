//! Protocol codec
//!
//! Encoding of commands into text-protocol request lines.
//!
//! ## Wire Format
//!
//! ```text
//! stats [settings|slabs|items]\r\n
//! stats cachedump <slab_id> <limit>\r\n
//! get <key>\r\n
//! set <key> <flags> <exptime> <bytes>\r\n<data>\r\n
//! delete <key>\r\n
//! incr|decr <key> <value>\r\n
//! flush_all <delay>\r\n
//! ```

use std::io::Write;

use crate::error::Result;
use super::{Command, StatsKind};

/// Line terminator used by every request and reply line
pub const CRLF: &[u8] = b"\r\n";

/// Encode a command to bytes
///
/// Arguments are validated first, so nothing that cannot be represented on
/// the wire is ever produced.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    command.validate()?;

    let mut out = Vec::new();
    match command {
        Command::Stats(kind) => {
            out.extend_from_slice(b"stats");
            match kind {
                StatsKind::General => {}
                StatsKind::Settings => out.extend_from_slice(b" settings"),
                StatsKind::Slabs => out.extend_from_slice(b" slabs"),
                StatsKind::Items => out.extend_from_slice(b" items"),
            }
        }
        Command::CacheDump { slab_id, limit } => {
            write!(out, "stats cachedump {} {}", slab_id, limit)?;
        }
        Command::Get { key } => {
            write!(out, "get {}", key)?;
        }
        Command::Set {
            key,
            flags,
            exptime,
            data,
        } => {
            // <bytes> is the payload's byte length, not its character count
            write!(out, "set {} {} {} {}", key, flags, exptime, data.len())?;
            out.extend_from_slice(CRLF);
            out.extend_from_slice(data);
        }
        Command::Delete { key } => {
            write!(out, "delete {}", key)?;
        }
        Command::Incr { key, value } => {
            write!(out, "incr {} {}", key, value)?;
        }
        Command::Decr { key, value } => {
            write!(out, "decr {} {}", key, value)?;
        }
        Command::FlushAll { delay } => {
            write!(out, "flush_all {}", delay)?;
        }
        Command::Raw { line } => {
            out.extend_from_slice(line.trim_end().as_bytes());
        }
    }
    out.extend_from_slice(CRLF);

    Ok(out)
}
