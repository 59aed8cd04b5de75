//! Transports
//!
//! The byte stream a connection runs over, and the connector that opens it.
//! TCP is the production transport; tests substitute in-memory streams.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{McError, Result};
use crate::protocol::ServerEndpoint;

/// A connected byte stream
pub trait Transport: Read + Write + Send {
    /// Bound each blocking read; `None` blocks indefinitely
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Label for log lines
    fn peer_label(&self) -> String;
}

impl Transport for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn peer_label(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

/// Opens transports to server endpoints
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(&self, endpoint: &ServerEndpoint, config: &ClientConfig) -> Result<Self::Transport>;
}

/// Connects over TCP with bounded connect, read and write timeouts
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    fn resolve(endpoint: &ServerEndpoint) -> Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (endpoint.hostname(), endpoint.port())
            .to_socket_addrs()
            .map_err(|e| McError::Connect {
                endpoint: endpoint.to_string(),
                reason: format!("cannot resolve host: {}", e),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(McError::Connect {
                endpoint: endpoint.to_string(),
                reason: "host resolved to no addresses".to_string(),
            });
        }
        Ok(addrs)
    }
}

impl Connector for TcpConnector {
    type Transport = TcpStream;

    fn connect(&self, endpoint: &ServerEndpoint, config: &ClientConfig) -> Result<TcpStream> {
        let mut last_err = None;

        for addr in Self::resolve(endpoint)? {
            match TcpStream::connect_timeout(&addr, config.connect_timeout()) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(config.read_timeout()))?;
                    stream.set_write_timeout(Some(config.write_timeout()))?;
                    // Disable Nagle's algorithm; requests are small and latency-bound
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} ({}) failed: {}", endpoint, addr, e);
                    last_err = Some(e);
                }
            }
        }

        let reason = match last_err {
            Some(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                format!("timed out after {} ms", config.connect_timeout_ms)
            }
            Some(e) => e.to_string(),
            None => "no address could be tried".to_string(),
        };
        Err(McError::Connect {
            endpoint: endpoint.to_string(),
            reason,
        })
    }
}
