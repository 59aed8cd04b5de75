//! Data model
//!
//! Structured results produced by the reply parsers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A target cache instance
///
/// Supplied by the caller for each call; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServerEndpoint {
    hostname: String,
    port: u16,
}

impl ServerEndpoint {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// One `STAT <name> <value>` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub key: String,
    pub value: String,
}

/// A stats or settings listing, in server order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stats {
    lines: Vec<StatLine>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: String, value: String) {
        self.lines.push(StatLine { key, value });
    }

    /// Value of the first line named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.key == key)
            .map(|line| line.value.as_str())
    }

    /// Value of `key` parsed as an unsigned integer
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl IntoIterator for Stats {
    type Item = StatLine;
    type IntoIter = std::vec::IntoIter<StatLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

/// One row of the slabs listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlabSummary {
    pub slab_id: u32,
    pub chunk_size: u64,
    pub used_chunks: u64,
    pub total_chunks: u64,

    /// Every `STAT <slab_id>:<field>` counter, including the three above
    pub fields: BTreeMap<String, u64>,

    /// `STAT items:<slab_id>:<field>` counters from `stats items`
    pub item_fields: BTreeMap<String, u64>,
}

impl SlabSummary {
    pub fn new(slab_id: u32) -> Self {
        Self {
            slab_id,
            ..Self::default()
        }
    }

    /// Record a slab counter; a repeated field overwrites the earlier one
    pub(crate) fn set_field(&mut self, field: &str, value: u64) {
        match field {
            "chunk_size" => self.chunk_size = value,
            "used_chunks" => self.used_chunks = value,
            "total_chunks" => self.total_chunks = value,
            _ => {}
        }
        self.fields.insert(field.to_string(), value);
    }

    /// Number of items currently stored in this slab, if reported
    pub fn item_count(&self) -> Option<u64> {
        self.item_fields.get("number").copied()
    }
}

/// Parsed `stats slabs` reply (optionally merged with `stats items`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlabStats {
    /// Per-slab rows keyed by slab id
    pub slabs: BTreeMap<u32, SlabSummary>,

    pub active_slabs: u64,
    pub total_malloced: u64,

    /// Every top-level `STAT <field> <value>` line
    pub summary: BTreeMap<String, u64>,
}

impl SlabStats {
    pub fn slab_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.slabs.keys().copied()
    }
}

/// Expiration value of a listed item
///
/// `0` never expires; other values are what the server reported
/// (an absolute unix time on modern servers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expiration(pub i64);

impl Expiration {
    pub fn never_expires(&self) -> bool {
        self.0 == 0
    }

    /// Already expired at `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.0 < 0 || (self.0 > 0 && self.0 <= now)
    }
}

/// One item of a cachedump listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDescriptor {
    pub key: String,
    pub size_bytes: u64,
    pub expiration: Expiration,
    pub last_access_hint: Option<i64>,
}

/// A value returned by `get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawValue {
    pub key: String,
    pub flags: u32,
    pub bytes: Vec<u8>,
}

impl RawValue {
    /// The payload as text, if it is valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// The single-token reply of a mutation command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusReply {
    Stored,
    NotStored,
    Exists,
    Deleted,
    NotFound,
    Ok,
    Error,
    /// New counter value after incr/decr
    Value(u64),
}

impl StatusReply {
    /// True for the positive outcome of each command family
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            StatusReply::Stored | StatusReply::Deleted | StatusReply::Ok | StatusReply::Value(_)
        )
    }
}

impl fmt::Display for StatusReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusReply::Stored => f.write_str("STORED"),
            StatusReply::NotStored => f.write_str("NOT_STORED"),
            StatusReply::Exists => f.write_str("EXISTS"),
            StatusReply::Deleted => f.write_str("DELETED"),
            StatusReply::NotFound => f.write_str("NOT_FOUND"),
            StatusReply::Ok => f.write_str("OK"),
            StatusReply::Error => f.write_str("ERROR"),
            StatusReply::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Size and expiration detail attached to a search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDetail {
    pub size_bytes: u64,
    pub expiration: Expiration,
}

/// One key matched by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub key: String,
    pub slab_id: u32,

    /// Present when the search asked for detail (`level`)
    pub detail: Option<ItemDetail>,

    /// Present when the search fetched values (`more`) and the key still existed
    pub value: Option<RawValue>,
}
