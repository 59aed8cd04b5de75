//! Concurrency Tests
//!
//! One client shared by many threads against a loopback server. Each call
//! owns its connection, so replies never cross between callers.

use std::sync::Arc;
use std::thread;

use mcadmin::{ClientConfig, CommandClient, StatusReply};

use crate::common::{loopback_value, spawn_loopback_server, LOOPBACK_KEYS};

const HOST: &str = "127.0.0.1";

fn client() -> CommandClient {
    CommandClient::new(ClientConfig::builder().timeout_ms(2000).build()).unwrap()
}

#[test]
fn test_concurrent_gets_do_not_cross_talk() {
    let port = spawn_loopback_server();
    let client = Arc::new(client());
    let mut handles = vec![];

    for t in 0..8 {
        let client = Arc::clone(&client);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let key = format!("thread{}:key{}", t, i);
                let value = client.get(HOST, port, &key).unwrap().unwrap();
                assert_eq!(value.key, key);
                assert_eq!(value.as_text(), Some(loopback_value(&key).as_str()));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_mixed_operations() {
    let port = spawn_loopback_server();
    let client = Arc::new(client());
    let mut handles = vec![];

    for t in 0..4 {
        let client = Arc::clone(&client);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                let missing = format!("missing:{}:{}", t, i);
                assert_eq!(client.get(HOST, port, &missing).unwrap(), None);
                assert_eq!(
                    client.delete(HOST, port, &missing).unwrap(),
                    StatusReply::Deleted
                );
                assert_eq!(client.stats(HOST, port).unwrap().get("pid"), Some("1"));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_search_fetches_values_in_parallel() {
    let port = spawn_loopback_server();
    let config = ClientConfig::builder()
        .timeout_ms(2000)
        .search_fetch_concurrency(3)
        .build();
    let client = CommandClient::new(config).unwrap();

    let hits = client.search(HOST, port, "user:", true, true).unwrap();

    let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
    let expected: Vec<&str> = LOOPBACK_KEYS
        .iter()
        .copied()
        .filter(|k| k.contains("user:"))
        .collect();
    assert_eq!(keys, expected);

    for hit in &hits {
        assert_eq!(hit.slab_id, 1);
        let detail = hit.detail.as_ref().unwrap();
        assert_eq!(detail.size_bytes as usize, loopback_value(&hit.key).len());
        if hit.key.starts_with("missing") {
            // listed but gone by the time it was fetched
            assert_eq!(hit.value, None);
        } else {
            let value = hit.value.as_ref().unwrap();
            assert_eq!(value.key, hit.key);
            assert_eq!(value.as_text(), Some(loopback_value(&hit.key).as_str()));
        }
    }
}
