//! Key search
//!
//! Search is built on the slab and cachedump listings: every slab the server
//! reports is dumped and keys are matched by substring. Value fetches for
//! matched keys are an explicit work list, never recursion.

use std::io;

use crossbeam::channel;

use crate::client::{CommandClient, Session};
use crate::error::{McError, Result};
use crate::network::{Connector, Transport};
use crate::protocol::{ItemDetail, RawValue, SearchHit};

/// Collect hits for `pattern` from every slab on the session's server
pub(crate) fn scan_matches<T: Transport>(
    session: &mut Session<T>,
    pattern: &str,
    level: bool,
) -> Result<Vec<SearchHit>> {
    let slab_ids: Vec<u32> = session.slabs()?.slab_ids().collect();
    let mut hits = Vec::new();

    for slab_id in slab_ids {
        for item in session.items(slab_id)? {
            if !item.key.contains(pattern) {
                continue;
            }
            let detail = level.then(|| ItemDetail {
                size_bytes: item.size_bytes,
                expiration: item.expiration,
            });
            hits.push(SearchHit {
                key: item.key,
                slab_id,
                detail,
                value: None,
            });
        }
    }

    tracing::debug!(
        "Search for {:?} on {} matched {} keys",
        pattern,
        session.endpoint(),
        hits.len()
    );
    Ok(hits)
}

/// Fetch the value of every hit, one `get` (and connection) per key
///
/// At most `search_fetch_concurrency` fetches run at once. The first failed
/// fetch, in hit order, fails the whole search.
pub(crate) fn fetch_values<C: Connector>(
    client: &CommandClient<C>,
    server: &str,
    port: u16,
    hits: &mut [SearchHit],
) -> Result<()> {
    let workers = client.config().search_fetch_concurrency.min(hits.len());
    if workers == 0 {
        return Ok(());
    }

    let (job_tx, job_rx) = channel::unbounded::<usize>();
    for index in 0..hits.len() {
        // receiver is alive until the end of this function
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    let (result_tx, result_rx) = channel::unbounded::<(usize, Result<Option<RawValue>>)>();
    let keys: Vec<&str> = hits.iter().map(|hit| hit.key.as_str()).collect();

    crossbeam::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let keys = &keys;
            scope.spawn(move |_| {
                for index in job_rx.iter() {
                    let result = client.get(server, port, keys[index]);
                    let failed = result.is_err();
                    if result_tx.send((index, result)).is_err() || failed {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| McError::Io(io::Error::new(io::ErrorKind::Other, "search fetch worker panicked")))?;

    drop(result_tx);
    drop(keys);

    let mut results: Vec<(usize, Result<Option<RawValue>>)> = result_rx.iter().collect();
    results.sort_by_key(|(index, _)| *index);

    let mut values = Vec::with_capacity(results.len());
    for (index, result) in results {
        values.push((index, result?));
    }
    for (index, value) in values {
        hits[index].value = value;
    }
    Ok(())
}
