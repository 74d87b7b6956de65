//! In-process counter store.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use super::backend::CounterStore;
use super::key::BucketKey;
use super::policy::Policy;
use super::verdict::{Denial, Verdict};

/// Minimum time between eviction sweeps.
const SWEEP_INTERVAL_MS: u64 = 60_000;
/// Sweeps only run once the map grows past this many entries.
const SWEEP_MIN_ENTRIES: usize = 1_000;

/// One bucket's counter state.
#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u32,
    reset_at_ms: u64,
}

impl CounterEntry {
    /// Open a fresh window with this request already counted.
    fn open(policy: Policy, now_ms: u64) -> Self {
        Self {
            count: 1,
            reset_at_ms: now_ms + policy.window.as_millis() as u64,
        }
    }
}

/// An in-process, time-windowed counter store.
///
/// Used when no distributed store is configured or constructible. Counts
/// are per process: across processes this is a degraded mode with no
/// shared ordering. Expired buckets are evicted by a sweep that piggybacks
/// on request handling; the store spawns no background tasks.
pub struct LocalCounterStore {
    buckets: DashMap<BucketKey, CounterEntry>,
    last_sweep_ms: Mutex<u64>,
}

impl LocalCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
            last_sweep_ms: Mutex::new(0),
        }
    }

    /// Atomically check the budget for `key` and count the request.
    ///
    /// The whole read-modify-write runs under the key's map entry guard, so
    /// two concurrent requests for one key serialize here. A denial leaves
    /// the stored count untouched.
    pub fn check_and_increment(&self, key: &BucketKey, policy: Policy, now_ms: u64) -> Verdict {
        self.maybe_sweep(now_ms);

        match self.buckets.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.reset_at_ms <= now_ms {
                    // Window elapsed: this request opens the next one.
                    *entry = CounterEntry::open(policy, now_ms);
                    Verdict::Allowed
                } else if entry.count < policy.max_requests {
                    entry.count += 1;
                    Verdict::Allowed
                } else {
                    Verdict::Denied(Denial::new(policy.max_requests, entry.reset_at_ms, now_ms))
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CounterEntry::open(policy, now_ms));
                Verdict::Allowed
            }
        }
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drop expired buckets, at most once per [`SWEEP_INTERVAL_MS`] and
    /// only once the map holds more than [`SWEEP_MIN_ENTRIES`] entries.
    fn maybe_sweep(&self, now_ms: u64) {
        if self.buckets.len() <= SWEEP_MIN_ENTRIES {
            return;
        }

        {
            let mut last = self.last_sweep_ms.lock();
            if now_ms.saturating_sub(*last) < SWEEP_INTERVAL_MS {
                return;
            }
            *last = now_ms;
        }

        let before = self.buckets.len();
        self.buckets.retain(|_, entry| entry.reset_at_ms > now_ms);
        debug!(
            before,
            after = self.buckets.len(),
            "Swept expired rate limit buckets"
        );
    }
}

impl Default for LocalCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for LocalCounterStore {
    async fn check_and_increment(&self, key: &BucketKey, policy: Policy, now_ms: u64) -> Verdict {
        LocalCounterStore::check_and_increment(self, key, policy, now_ms)
    }
}
