//! Network Module
//!
//! Connections to cache servers.
//!
//! ## Model
//! - Blocking I/O, every read and write bounded by a timeout
//! - One connection per operation unless a session is requested
//! - No pooling: a connection belongs to the call that opened it

mod connection;
mod transport;

pub use connection::Connection;
pub use transport::{Connector, TcpConnector, Transport};
