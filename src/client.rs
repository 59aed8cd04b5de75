//! Command Client
//!
//! The public entry point. Each [`CommandClient`] operation validates its
//! arguments, opens its own connection, runs one command family, and closes
//! the connection again. Nothing is cached or shared between calls, so a
//! client may be used from many threads at once.
//!
//! A [`Session`] keeps one connection open for several commands when the
//! caller asks for it explicitly.

use bytes::Bytes;

use crate::config::ClientConfig;
use crate::error::{McError, Result};
use crate::network::{Connection, Connector, TcpConnector, Transport};
use crate::protocol::{
    merge_items, parse_cachedump, parse_get, parse_passthrough, parse_slabs, parse_stats,
    parse_status, validate_key, Command, ItemDescriptor, RawValue, SearchHit, ServerEndpoint,
    SlabStats, Stats, StatsKind, StatusReply,
};
use crate::search;

// =============================================================================
// Session
// =============================================================================

/// Several commands over one explicitly opened connection
pub struct Session<T: Transport> {
    connection: Connection<T>,
    cachedump_limit: u32,
}

impl<T: Transport> Session<T> {
    /// Wrap an open connection
    pub fn new(connection: Connection<T>, config: &ClientConfig) -> Self {
        Self {
            connection,
            cachedump_limit: config.cachedump_limit,
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        self.connection.endpoint()
    }

    fn call(&mut self, command: &Command) -> Result<Bytes> {
        self.connection.execute(command)
    }

    /// General server statistics (`stats`)
    pub fn stats(&mut self) -> Result<Stats> {
        let raw = self.call(&Command::Stats(StatsKind::General))?;
        parse_stats(&raw)
    }

    /// Server settings (`stats settings`)
    pub fn settings(&mut self) -> Result<Stats> {
        let raw = self.call(&Command::Stats(StatsKind::Settings))?;
        parse_stats(&raw)
    }

    /// Slab statistics merged with per-slab item counters
    pub fn slabs(&mut self) -> Result<SlabStats> {
        let raw = self.call(&Command::Stats(StatsKind::Slabs))?;
        let mut slabs = parse_slabs(&raw)?;

        let raw = self.call(&Command::Stats(StatsKind::Items))?;
        merge_items(&mut slabs, &raw)?;
        Ok(slabs)
    }

    /// Items stored in one slab (`stats cachedump`)
    pub fn items(&mut self, slab_id: u32) -> Result<Vec<ItemDescriptor>> {
        let raw = self.call(&Command::CacheDump {
            slab_id,
            limit: self.cachedump_limit,
        })?;
        parse_cachedump(&raw)
    }

    /// Fetch one key; `None` when the server does not hold it
    pub fn get(&mut self, key: &str) -> Result<Option<RawValue>> {
        let raw = self.call(&Command::Get {
            key: key.to_string(),
        })?;

        match parse_get(&raw)? {
            Some(value) if value.key != key => Err(McError::ProtocolViolation(format!(
                "requested {:?} but server returned {:?}",
                key, value.key
            ))),
            value => Ok(value),
        }
    }

    /// Store `data` under `key` for `duration` seconds (0 = no expiry)
    pub fn set(&mut self, key: &str, data: &[u8], duration: i64) -> Result<StatusReply> {
        self.set_with_flags(key, 0, data, duration)
    }

    /// Store `data` under `key` with explicit client flags
    pub fn set_with_flags(
        &mut self,
        key: &str,
        flags: u32,
        data: &[u8],
        duration: i64,
    ) -> Result<StatusReply> {
        let raw = self.call(&Command::Set {
            key: key.to_string(),
            flags,
            exptime: duration,
            data: data.to_vec(),
        })?;
        parse_status(&raw)
    }

    pub fn delete(&mut self, key: &str) -> Result<StatusReply> {
        let raw = self.call(&Command::Delete {
            key: key.to_string(),
        })?;
        parse_status(&raw)
    }

    pub fn increment(&mut self, key: &str, value: i64) -> Result<StatusReply> {
        let raw = self.call(&Command::Incr {
            key: key.to_string(),
            value,
        })?;
        parse_status(&raw)
    }

    pub fn decrement(&mut self, key: &str, value: i64) -> Result<StatusReply> {
        let raw = self.call(&Command::Decr {
            key: key.to_string(),
            value,
        })?;
        parse_status(&raw)
    }

    /// Invalidate all items after `delay` seconds (0 = immediately)
    pub fn flush_all(&mut self, delay: i64) -> Result<StatusReply> {
        let raw = self.call(&Command::FlushAll { delay })?;
        parse_status(&raw)
    }

    /// Find keys containing `pattern`, fetching values one by one when `more`
    pub fn search(&mut self, pattern: &str, level: bool, more: bool) -> Result<Vec<SearchHit>> {
        let mut hits = search::scan_matches(self, pattern, level)?;
        if more {
            for hit in hits.iter_mut() {
                hit.value = self.get(&hit.key)?;
            }
        }
        Ok(hits)
    }

    /// Send an arbitrary command line and return the raw reply text
    pub fn telnet(&mut self, command: &str) -> Result<String> {
        let raw = self.call(&Command::Raw {
            line: command.to_string(),
        })?;
        Ok(parse_passthrough(&raw))
    }
}

// =============================================================================
// Command Client
// =============================================================================

/// Administrative client; one connection per operation
pub struct CommandClient<C: Connector = TcpConnector> {
    connector: C,
    config: ClientConfig,
}

impl CommandClient<TcpConnector> {
    /// Create a TCP client with the given config
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_connector(TcpConnector, config)
    }
}

impl<C: Connector> CommandClient<C> {
    /// Create a client that opens connections through `connector`
    pub fn with_connector(connector: C, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { connector, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a session on `server:port`
    pub fn session(&self, server: &str, port: u16) -> Result<Session<C::Transport>> {
        let endpoint = ServerEndpoint::new(server, port);
        let connection = Connection::open(&self.connector, &endpoint, &self.config)?;
        Ok(Session::new(connection, &self.config))
    }

    /// Run `op` on a fresh session that is closed afterwards
    fn with_session<R, F>(&self, server: &str, port: u16, what: &str, op: F) -> Result<R>
    where
        F: FnOnce(&mut Session<C::Transport>) -> Result<R>,
    {
        let result = self.session(server, port).and_then(|mut session| op(&mut session));
        if let Err(ref e) = result {
            tracing::warn!("{} on {}:{} failed ({:?}): {}", what, server, port, e.kind(), e);
        }
        result
    }

    pub fn stats(&self, server: &str, port: u16) -> Result<Stats> {
        self.with_session(server, port, "stats", |s| s.stats())
    }

    pub fn settings(&self, server: &str, port: u16) -> Result<Stats> {
        self.with_session(server, port, "stats settings", |s| s.settings())
    }

    pub fn slabs(&self, server: &str, port: u16) -> Result<SlabStats> {
        self.with_session(server, port, "stats slabs", |s| s.slabs())
    }

    pub fn items(&self, server: &str, port: u16, slab_id: u32) -> Result<Vec<ItemDescriptor>> {
        self.with_session(server, port, "stats cachedump", |s| s.items(slab_id))
    }

    pub fn get(&self, server: &str, port: u16, key: &str) -> Result<Option<RawValue>> {
        validate_key(key)?;
        self.with_session(server, port, "get", |s| s.get(key))
    }

    pub fn set(
        &self,
        server: &str,
        port: u16,
        key: &str,
        data: &[u8],
        duration: i64,
    ) -> Result<StatusReply> {
        Command::Set {
            key: key.to_string(),
            flags: 0,
            exptime: duration,
            data: Vec::new(),
        }
        .validate()?;
        self.with_session(server, port, "set", |s| s.set(key, data, duration))
    }

    pub fn delete(&self, server: &str, port: u16, key: &str) -> Result<StatusReply> {
        validate_key(key)?;
        self.with_session(server, port, "delete", |s| s.delete(key))
    }

    pub fn increment(&self, server: &str, port: u16, key: &str, value: i64) -> Result<StatusReply> {
        Command::Incr {
            key: key.to_string(),
            value,
        }
        .validate()?;
        self.with_session(server, port, "incr", |s| s.increment(key, value))
    }

    pub fn decrement(&self, server: &str, port: u16, key: &str, value: i64) -> Result<StatusReply> {
        Command::Decr {
            key: key.to_string(),
            value,
        }
        .validate()?;
        self.with_session(server, port, "decr", |s| s.decrement(key, value))
    }

    pub fn flush_all(&self, server: &str, port: u16, delay: i64) -> Result<StatusReply> {
        Command::FlushAll { delay }.validate()?;
        self.with_session(server, port, "flush_all", |s| s.flush_all(delay))
    }

    /// Find keys containing `pattern` across every slab
    ///
    /// `level` attaches size and expiration to each hit. `more` fetches the
    /// value of every hit with one `get` each, at most
    /// `search_fetch_concurrency` at a time.
    pub fn search(
        &self,
        server: &str,
        port: u16,
        pattern: &str,
        level: bool,
        more: bool,
    ) -> Result<Vec<SearchHit>> {
        let mut hits = self.with_session(server, port, "search", |s| {
            search::scan_matches(s, pattern, level)
        })?;
        if more {
            search::fetch_values(self, server, port, &mut hits)?;
        }
        Ok(hits)
    }

    /// Send an arbitrary single-line command and return the raw reply
    pub fn telnet(&self, server: &str, port: u16, command: &str) -> Result<String> {
        Command::Raw {
            line: command.to_string(),
        }
        .validate()?;
        self.with_session(server, port, "telnet", |s| s.telnet(command))
    }
}
