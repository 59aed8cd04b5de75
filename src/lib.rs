//! # mcadmin
//!
//! An administrative client for memcache-compatible servers:
//! - Text-protocol commands: stats, settings, slabs, items, get, set,
//!   delete, incr, decr, flush_all, search and raw passthrough
//! - Per-command reply grammars (sentinel line, byte-counted block, status line)
//! - Structured results with an explicit failure taxonomy
//! - One bounded, exclusively owned connection per operation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CommandClient                           │
//! │           (validate → connect → execute → parse)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Encoder    │          │ ReplyParser │
//!   │  (codec)    │          │  (reply)    │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌────────────────────────────────────────┐
//!   │ Connection (read until Grammar says so) │
//!   └────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
mod search;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, McError, Result};
pub use config::ClientConfig;
pub use client::{CommandClient, Session};
pub use protocol::{
    Expiration, ItemDescriptor, ItemDetail, RawValue, SearchHit, ServerEndpoint, SlabStats,
    SlabSummary, Stats, StatusReply,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mcadmin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
