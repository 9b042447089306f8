//! Append-only per-client request timestamp log.
//!
//! The sliding-window limiter never mutates records; it appends one per
//! observed request and counts how many fall inside each window. The store
//! is deliberately narrow so the algorithm can be tested against the
//! in-memory backend and swapped for a durable one without changes.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Counting result for one window cutoff, taken before the new record was
/// appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowObservation {
    /// Records strictly newer than the cutoff.
    pub count: u64,
    /// Oldest timestamp inside the window, if any.
    pub oldest_ms: Option<u64>,
}

/// Persistent record of per-client request timestamps.
///
/// Timestamps are milliseconds since the Unix epoch. A record with a
/// timestamp in the future (clock went backward) counts as inside every
/// window rather than being discarded, so counts never undercount.
pub trait WindowCounterStore: Send + Sync {
    /// Append one observation for `client_key` at `now_ms`.
    fn append(&self, client_key: &str, now_ms: u64) -> Result<()>;

    /// Number of records for `client_key` with `timestamp > since_ms`.
    fn count_since(&self, client_key: &str, since_ms: u64) -> Result<u64>;

    /// Observe every window and append the new record as one atomic step.
    ///
    /// For each cutoff in `cutoffs_ms`, returns the count of existing
    /// records newer than the cutoff and the oldest such timestamp, then
    /// appends `now_ms` under the same lock. Two concurrent requests can
    /// therefore never both observe the last free quota slot.
    fn append_and_observe(
        &self,
        client_key: &str,
        now_ms: u64,
        cutoffs_ms: &[u64],
    ) -> Result<Vec<WindowObservation>>;

    /// Drop records older than `cutoff_ms`. Housekeeping only; stale
    /// records fall outside every sliding window and never affect counts.
    fn prune_older_than(&self, cutoff_ms: u64) -> Result<usize>;
}

/// In-memory counter store backed by a single mutex-guarded timestamp map.
pub struct MemoryCounterStore {
    records: Mutex<HashMap<String, Vec<u64>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u64>>>> {
        self.records
            .lock()
            .map_err(|_| Error::StorageUnavailable("counter store lock poisoned".to_string()))
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowCounterStore for MemoryCounterStore {
    fn append(&self, client_key: &str, now_ms: u64) -> Result<()> {
        let mut records = self.lock()?;
        records
            .entry(client_key.to_string())
            .or_default()
            .push(now_ms);
        Ok(())
    }

    fn count_since(&self, client_key: &str, since_ms: u64) -> Result<u64> {
        let records = self.lock()?;
        Ok(records
            .get(client_key)
            .map(|timestamps| timestamps.iter().filter(|&&ts| ts > since_ms).count() as u64)
            .unwrap_or(0))
    }

    fn append_and_observe(
        &self,
        client_key: &str,
        now_ms: u64,
        cutoffs_ms: &[u64],
    ) -> Result<Vec<WindowObservation>> {
        let mut records = self.lock()?;
        let timestamps = records.entry(client_key.to_string()).or_default();

        let observations = cutoffs_ms
            .iter()
            .map(|&cutoff| {
                let mut count = 0u64;
                let mut oldest_ms: Option<u64> = None;
                for &ts in timestamps.iter() {
                    if ts > cutoff {
                        count += 1;
                        oldest_ms = Some(oldest_ms.map_or(ts, |oldest| oldest.min(ts)));
                    }
                }
                WindowObservation { count, oldest_ms }
            })
            .collect();

        timestamps.push(now_ms);
        Ok(observations)
    }

    fn prune_older_than(&self, cutoff_ms: u64) -> Result<usize> {
        let mut records = self.lock()?;
        let mut removed = 0;
        records.retain(|_, timestamps| {
            let before = timestamps.len();
            timestamps.retain(|&ts| ts >= cutoff_ms);
            removed += before - timestamps.len();
            !timestamps.is_empty()
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_count_excludes_records_at_or_before_cutoff() {
        let store = MemoryCounterStore::new();
        store.append("1.2.3.4", 1_000).unwrap();
        store.append("1.2.3.4", 2_000).unwrap();
        store.append("1.2.3.4", 3_000).unwrap();

        assert_eq!(store.count_since("1.2.3.4", 2_000).unwrap(), 1);
        assert_eq!(store.count_since("1.2.3.4", 0).unwrap(), 3);
        assert_eq!(store.count_since("other", 0).unwrap(), 0);
    }

    #[test]
    fn test_append_and_observe_reports_state_before_append() {
        let store = MemoryCounterStore::new();
        store.append("k", 1_000).unwrap();
        store.append("k", 5_000).unwrap();

        let obs = store.append_and_observe("k", 10_000, &[0, 4_000]).unwrap();
        assert_eq!(obs[0], WindowObservation { count: 2, oldest_ms: Some(1_000) });
        assert_eq!(obs[1], WindowObservation { count: 1, oldest_ms: Some(5_000) });

        // The appended record is visible to the next call.
        assert_eq!(store.count_since("k", 0).unwrap(), 3);
    }

    #[test]
    fn test_future_timestamps_counted() {
        let store = MemoryCounterStore::new();
        store.append("k", 99_000).unwrap();

        // A record ahead of "now" still counts inside the window.
        assert_eq!(store.count_since("k", 10_000).unwrap(), 1);
    }

    #[test]
    fn test_prune_drops_only_stale_records() {
        let store = MemoryCounterStore::new();
        store.append("a", 1_000).unwrap();
        store.append("a", 9_000).unwrap();
        store.append("b", 500).unwrap();

        let removed = store.prune_older_than(5_000).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count_since("a", 0).unwrap(), 1);
        assert_eq!(store.count_since("b", 0).unwrap(), 0);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let store = Arc::new(MemoryCounterStore::new());
        let mut handles = Vec::new();
        for thread in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    store
                        .append_and_observe("shared", thread * 1_000 + i, &[0])
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count_since("shared", 0).unwrap(), 400);
    }
}
