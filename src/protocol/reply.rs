//! Reply parsing
//!
//! One parser per command family. Multi-line parsers run a small state
//! machine over the CRLF-delimited lines of a complete reply:
//!
//! ```text
//! AwaitingLine ──line──▶ Accumulating ──END──▶ Terminated
//!       │                    │
//!       └──── bad line / error token / no END ────▶ Failed
//! ```

use std::borrow::Cow;

use crate::error::{McError, Result};
use super::grammar::{find_crlf, is_error_line};
use super::{ItemDescriptor, Expiration, RawValue, SlabStats, SlabSummary, Stats, StatusReply};

// =============================================================================
// Line Iteration
// =============================================================================

/// CRLF-delimited lines of a reply, with byte offsets
struct Lines<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw, pos: 0 }
    }

    /// Offset of the first byte after the last line returned
    fn position(&self) -> usize {
        self.pos
    }

    fn skip_to(&mut self, pos: usize) {
        self.pos = pos;
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let end = find_crlf(self.raw, self.pos)?;
        let line = &self.raw[self.pos..end];
        self.pos = end + 2;
        Some(line)
    }
}

fn text(line: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(line)
}

fn parse_int<T: std::str::FromStr>(what: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| McError::parse(format!("{} is not an integer: {:?}", what, value)))
}

// =============================================================================
// Listing State Machine
// =============================================================================

enum ParseState {
    AwaitingLine,
    Accumulating,
    Terminated,
    Failed(McError),
}

/// Drive `on_line` over every line before the `END` sentinel
fn parse_listing<F>(raw: &[u8], mut on_line: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let mut lines = Lines::new(raw);
    let mut state = ParseState::AwaitingLine;

    loop {
        state = match state {
            ParseState::AwaitingLine | ParseState::Accumulating => match lines.next() {
                None => ParseState::Failed(McError::parse("reply ended before END")),
                Some(b"END") => ParseState::Terminated,
                Some(line) if is_error_line(line) => {
                    ParseState::Failed(McError::UnexpectedReply(text(line).into_owned()))
                }
                Some(line) => match on_line(&text(line)) {
                    Ok(()) => ParseState::Accumulating,
                    Err(e) => ParseState::Failed(e),
                },
            },
            ParseState::Terminated => return Ok(()),
            ParseState::Failed(e) => return Err(e),
        }
    }
}

/// Split `STAT <name> <value>` into name and value
fn split_stat(line: &str) -> Result<(&str, &str)> {
    let rest = line
        .strip_prefix("STAT ")
        .ok_or_else(|| McError::parse(format!("expected STAT line, got {:?}", line)))?;
    let (name, value) = rest
        .split_once(' ')
        .ok_or_else(|| McError::parse(format!("STAT line without a value: {:?}", line)))?;
    if name.is_empty() {
        return Err(McError::parse(format!("STAT line without a name: {:?}", line)));
    }
    Ok((name, value))
}

// =============================================================================
// Stats / Settings
// =============================================================================

/// Parse a `stats` or `stats settings` reply
///
/// An immediate `END` is a valid, empty listing.
pub fn parse_stats(raw: &[u8]) -> Result<Stats> {
    let mut stats = Stats::new();
    parse_listing(raw, |line| {
        let (name, value) = split_stat(line)?;
        stats.push(name.to_string(), value.to_string());
        Ok(())
    })?;
    Ok(stats)
}

// =============================================================================
// Slabs
// =============================================================================

/// Parse a `stats slabs` reply
///
/// `STAT <slab_id>:<field> <value>` lines are grouped by slab id; plain
/// `STAT <field> <value>` lines form the summary.
pub fn parse_slabs(raw: &[u8]) -> Result<SlabStats> {
    let mut stats = SlabStats::default();
    parse_listing(raw, |line| {
        let (name, value) = split_stat(line)?;
        let value: u64 = parse_int(name, value)?;

        match name.split_once(':') {
            Some((slab, field)) => {
                let slab_id: u32 = parse_int("slab id", slab)?;
                stats
                    .slabs
                    .entry(slab_id)
                    .or_insert_with(|| SlabSummary::new(slab_id))
                    .set_field(field, value);
            }
            None => {
                match name {
                    "active_slabs" => stats.active_slabs = value,
                    "total_malloced" => stats.total_malloced = value,
                    _ => {}
                }
                stats.summary.insert(name.to_string(), value);
            }
        }
        Ok(())
    })?;
    Ok(stats)
}

/// Merge a `stats items` reply into slab rows
///
/// Lines look like `STAT items:<slab_id>:<field> <value>`.
pub fn merge_items(stats: &mut SlabStats, raw: &[u8]) -> Result<()> {
    parse_listing(raw, |line| {
        let (name, value) = split_stat(line)?;
        let rest = name
            .strip_prefix("items:")
            .ok_or_else(|| McError::parse(format!("expected items:<id>:<field>, got {:?}", name)))?;
        let (slab, field) = rest
            .split_once(':')
            .ok_or_else(|| McError::parse(format!("expected items:<id>:<field>, got {:?}", name)))?;
        let slab_id: u32 = parse_int("slab id", slab)?;
        let value: u64 = parse_int(name, value)?;

        stats
            .slabs
            .entry(slab_id)
            .or_insert_with(|| SlabSummary::new(slab_id))
            .item_fields
            .insert(field.to_string(), value);
        Ok(())
    })
}

// =============================================================================
// Cachedump
// =============================================================================

/// Parse one `ITEM <key> [<bytes> b; <exptime> s]` line
pub fn parse_item_line(line: &str) -> Result<ItemDescriptor> {
    let rest = line
        .strip_prefix("ITEM ")
        .ok_or_else(|| McError::parse(format!("expected ITEM line, got {:?}", line)))?;
    let (key, meta) = rest
        .split_once(' ')
        .ok_or_else(|| McError::parse(format!("ITEM line without metadata: {:?}", line)))?;
    let meta = meta
        .trim()
        .strip_prefix('[')
        .and_then(|m| m.strip_suffix(']'))
        .ok_or_else(|| McError::parse(format!("ITEM metadata not bracketed: {:?}", line)))?;

    let mut parts = meta.split(';').map(str::trim);
    let size = unit_value(parts.next(), "b", line)?;
    let exptime = unit_value(parts.next(), "s", line)?;
    let last_access = match parts.next() {
        Some(part) => part.split_ascii_whitespace().next().and_then(|n| n.parse().ok()),
        None => None,
    };

    Ok(ItemDescriptor {
        key: key.to_string(),
        size_bytes: parse_int("item size", size)?,
        expiration: Expiration(parse_int("item exptime", exptime)?),
        last_access_hint: last_access,
    })
}

fn unit_value<'a>(part: Option<&'a str>, unit: &str, line: &str) -> Result<&'a str> {
    part.and_then(|p| p.strip_suffix(unit))
        .map(str::trim)
        .ok_or_else(|| McError::parse(format!("ITEM field without '{}' unit: {:?}", unit, line)))
}

/// Parse a `stats cachedump` reply
///
/// Malformed item lines are skipped with a warning; the rest of the listing
/// is still returned.
pub fn parse_cachedump(raw: &[u8]) -> Result<Vec<ItemDescriptor>> {
    let mut items = Vec::new();
    parse_listing(raw, |line| {
        match parse_item_line(line) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!("Skipping malformed cachedump line: {}", e),
        }
        Ok(())
    })?;
    Ok(items)
}

// =============================================================================
// Get
// =============================================================================

/// Parse a `get` reply
///
/// A bare `END` is a miss and yields `Ok(None)`.
pub fn parse_get(raw: &[u8]) -> Result<Option<RawValue>> {
    let mut lines = Lines::new(raw);

    let header = lines
        .next()
        .ok_or_else(|| McError::parse("empty reply to get"))?;
    if header == b"END" {
        return Ok(None);
    }
    if is_error_line(header) {
        return Err(McError::UnexpectedReply(text(header).into_owned()));
    }

    let header = text(header);
    let fields: Vec<&str> = header.split_ascii_whitespace().collect();
    if fields.len() < 4 || fields.len() > 5 || fields[0] != "VALUE" {
        return Err(McError::parse(format!("expected VALUE header, got {:?}", header)));
    }
    let flags: u32 = parse_int("flags", fields[2])?;
    let len: usize = parse_int("byte count", fields[3])?;

    let start = lines.position();
    let mismatch = || {
        McError::ProtocolViolation(format!(
            "value for {:?} does not match declared length {}",
            fields[1], len
        ))
    };
    let end = start.checked_add(len).ok_or_else(mismatch)?;
    let block_end = end.checked_add(2).ok_or_else(mismatch)?;
    if raw.len() < block_end || &raw[end..block_end] != b"\r\n" {
        return Err(mismatch());
    }
    let bytes = raw[start..end].to_vec();
    lines.skip_to(block_end);

    match lines.next() {
        Some(b"END") => Ok(Some(RawValue {
            key: fields[1].to_string(),
            flags,
            bytes,
        })),
        Some(other) => Err(McError::parse(format!(
            "expected END after value, got {:?}",
            text(other)
        ))),
        None => Err(McError::parse("reply ended before END")),
    }
}

// =============================================================================
// Single-line Status
// =============================================================================

/// Parse the one-line reply of set/delete/incr/decr/flush_all
pub fn parse_status(raw: &[u8]) -> Result<StatusReply> {
    let line = match find_crlf(raw, 0) {
        Some(end) => &raw[..end],
        None => raw,
    };

    let status = match line {
        b"STORED" => StatusReply::Stored,
        b"NOT_STORED" => StatusReply::NotStored,
        b"EXISTS" => StatusReply::Exists,
        b"DELETED" => StatusReply::Deleted,
        b"NOT_FOUND" => StatusReply::NotFound,
        b"OK" => StatusReply::Ok,
        b"ERROR" => StatusReply::Error,
        digits if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) => {
            StatusReply::Value(parse_int("counter value", &text(digits))?)
        }
        other => return Err(McError::UnexpectedReply(text(other).into_owned())),
    };
    Ok(status)
}

// =============================================================================
// Passthrough
// =============================================================================

/// Raw text of a passthrough reply
pub fn parse_passthrough(raw: &[u8]) -> String {
    text(raw).into_owned()
}
