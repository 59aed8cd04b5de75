//! Configuration for mcadmin
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

use crate::error::{McError, Result};

/// Largest reply accepted from a server before giving up (16 MB)
pub const DEFAULT_MAX_REPLY_BYTES: usize = 16 * 1024 * 1024;

/// Client configuration shared by every operation
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Upper bound on establishing a TCP connection (milliseconds)
    pub connect_timeout_ms: u64,

    /// Upper bound on receiving a complete reply (milliseconds)
    pub read_timeout_ms: u64,

    /// Upper bound on a single socket write (milliseconds)
    pub write_timeout_ms: u64,

    /// Quiet period that ends a passthrough reply with no known terminator
    pub telnet_idle_ms: u64,

    // -------------------------------------------------------------------------
    // Reply Limits
    // -------------------------------------------------------------------------
    /// Byte budget for a single reply
    pub max_reply_bytes: usize,

    /// `<limit>` sent with `stats cachedump` (0 = server-defined cap)
    pub cachedump_limit: u32,

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------
    /// Maximum number of `get` requests a search runs in parallel
    pub search_fetch_concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            telnet_idle_ms: 500,
            max_reply_bytes: DEFAULT_MAX_REPLY_BYTES,
            cachedump_limit: 0,
            search_fetch_concurrency: 4,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn telnet_idle(&self) -> Duration {
        Duration::from_millis(self.telnet_idle_ms)
    }

    /// Check that every bound is usable
    ///
    /// A zero timeout would mean "block forever" for std sockets, which the
    /// client never allows.
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("read_timeout_ms", self.read_timeout_ms),
            ("write_timeout_ms", self.write_timeout_ms),
            ("telnet_idle_ms", self.telnet_idle_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(McError::Config(format!("{} must be greater than zero", name)));
            }
        }
        if self.max_reply_bytes == 0 {
            return Err(McError::Config("max_reply_bytes must be greater than zero".to_string()));
        }
        if self.search_fetch_concurrency == 0 {
            return Err(McError::Config(
                "search_fetch_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set connect, read and write timeouts at once
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.connect_timeout_ms(ms).read_timeout_ms(ms).write_timeout_ms(ms)
    }

    /// Set the passthrough idle window (in milliseconds)
    pub fn telnet_idle_ms(mut self, ms: u64) -> Self {
        self.config.telnet_idle_ms = ms;
        self
    }

    /// Set the per-reply byte budget
    pub fn max_reply_bytes(mut self, bytes: usize) -> Self {
        self.config.max_reply_bytes = bytes;
        self
    }

    /// Set the cachedump item limit
    pub fn cachedump_limit(mut self, limit: u32) -> Self {
        self.config.cachedump_limit = limit;
        self
    }

    /// Set the cap on parallel fetches during search
    pub fn search_fetch_concurrency(mut self, count: usize) -> Self {
        self.config.search_fetch_concurrency = count;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
