//! TCP connector tests against loopback listeners.

use mcadmin::network::{Connection, Connector, TcpConnector};
use mcadmin::protocol::{Command, StatsKind};
use mcadmin::{ClientConfig, ErrorKind, ServerEndpoint};

use crate::common::{closed_port, spawn_loopback_server, spawn_silent_server};

fn config() -> ClientConfig {
    ClientConfig::builder().timeout_ms(300).build()
}

#[test]
fn test_connect_and_execute() {
    let port = spawn_loopback_server();
    let endpoint = ServerEndpoint::new("127.0.0.1", port);

    let mut conn = Connection::open(&TcpConnector, &endpoint, &config()).unwrap();
    let raw = conn.execute(&Command::Stats(StatsKind::General)).unwrap();
    assert!(raw.ends_with(b"END\r\n"));
    conn.close();
}

#[test]
fn test_refused_connection_is_connect_error() {
    let endpoint = ServerEndpoint::new("127.0.0.1", closed_port());
    let err = TcpConnector.connect(&endpoint, &config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectError);
    assert!(err.to_string().contains(&endpoint.to_string()));
}

#[test]
fn test_silent_server_times_out() {
    let port = spawn_silent_server();
    let endpoint = ServerEndpoint::new("127.0.0.1", port);

    let mut conn = Connection::open(&TcpConnector, &endpoint, &config()).unwrap();
    let err = conn.execute(&Command::Stats(StatsKind::General)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}
