//! Connection
//!
//! A single exclusively-owned connection to one server. The transport is
//! closed when the connection is dropped, on every exit path.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};

use crate::config::ClientConfig;
use crate::error::{McError, Result};
use crate::protocol::{encode_command, Command, Grammar, Scan, ServerEndpoint};
use super::{Connector, Transport};

/// Size of each socket read
const READ_CHUNK: usize = 8 * 1024;

/// An open connection to a server
pub struct Connection<T: Transport> {
    /// Underlying byte stream (owned; never shared)
    transport: T,

    /// Bytes received but not yet handed out as a reply
    buffer: BytesMut,

    /// Target endpoint, for logging and error detail
    endpoint: ServerEndpoint,

    read_timeout: Duration,
    idle_timeout: Duration,
    max_reply_bytes: usize,
}

impl<T: Transport> Connection<T> {
    /// Open a connection through `connector`
    pub fn open<C>(connector: &C, endpoint: &ServerEndpoint, config: &ClientConfig) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(endpoint, config)?;
        tracing::debug!("Connected to {} ({})", endpoint, transport.peer_label());
        Ok(Self::new(transport, endpoint.clone(), config))
    }

    /// Wrap an already connected transport
    pub fn new(transport: T, endpoint: ServerEndpoint, config: &ClientConfig) -> Self {
        Self {
            transport,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            endpoint,
            read_timeout: config.read_timeout(),
            idle_timeout: config.telnet_idle(),
            max_reply_bytes: config.max_reply_bytes,
        }
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Send raw request bytes
    pub fn send(&mut self, request: &[u8]) -> Result<()> {
        let during = format!("writing to {}", self.endpoint);
        self.transport
            .write_all(request)
            .map_err(|e| McError::from_io(e, &during))?;
        self.transport
            .flush()
            .map_err(|e| McError::from_io(e, &during))?;
        tracing::trace!("Sent {} bytes to {}", request.len(), self.endpoint);
        Ok(())
    }

    /// Send one text line, appending CRLF
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let mut request = Vec::with_capacity(line.len() + 2);
        request.extend_from_slice(line.as_bytes());
        request.extend_from_slice(b"\r\n");
        self.send(&request)
    }

    /// Encode `command`, send it, and read its complete reply
    pub fn execute(&mut self, command: &Command) -> Result<Bytes> {
        let request = encode_command(command)?;
        tracing::debug!("Sending '{}' to {}", command.name(), self.endpoint);
        self.send(&request)?;
        self.read_reply(command.grammar())
    }

    /// Read until `grammar` reports a complete reply
    ///
    /// The whole read is bounded by the read timeout. Passthrough replies
    /// with no recognised terminator end after the idle window instead.
    pub fn read_reply(&mut self, grammar: Grammar) -> Result<Bytes> {
        let result = self.read_until(grammar);
        self.set_read_timeout(self.read_timeout)?;

        let reply = result?;
        tracing::trace!("Received {} byte reply from {}", reply.len(), self.endpoint);
        Ok(reply)
    }

    fn read_until(&mut self, grammar: Grammar) -> Result<Bytes> {
        let deadline = Instant::now() + self.read_timeout;
        let per_read = if grammar.ends_on_idle() {
            self.idle_timeout
        } else {
            self.read_timeout
        };
        let during = format!("reading reply from {}", self.endpoint);
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Scan::Complete(len) = grammar.scan(&self.buffer) {
                return Ok(self.buffer.split_to(len).freeze());
            }
            if self.buffer.len() > self.max_reply_bytes {
                return Err(McError::ProtocolViolation(format!(
                    "reply from {} exceeds {} bytes",
                    self.endpoint, self.max_reply_bytes
                )));
            }
            // no single read may outlast the deadline
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(McError::Timeout { during });
            }
            self.set_read_timeout(remaining.min(per_read))?;

            match self.transport.read(&mut chunk) {
                Ok(0) if grammar.ends_on_idle() && !self.buffer.is_empty() => {
                    return Ok(self.take_all());
                }
                Ok(0) => {
                    return Err(McError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} closed the connection after {} bytes of reply",
                            self.endpoint,
                            self.buffer.len()
                        ),
                    )));
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) && grammar.ends_on_idle() => {
                    // quiet line: done if something arrived, otherwise keep
                    // waiting until the deadline
                    if !self.buffer.is_empty() {
                        return Ok(self.take_all());
                    }
                }
                Err(e) => return Err(McError::from_io(e, &during)),
            }
        }
    }

    fn take_all(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.transport.set_read_timeout(Some(timeout))?;
        Ok(())
    }

    /// Close the connection
    pub fn close(self) {
        drop(self);
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            tracing::debug!(
                "Discarding {} unread bytes from {}",
                self.buffer.len(),
                self.endpoint
            );
        }
        tracing::debug!("Closing connection to {}", self.endpoint);
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
