//! Redis-backed distributed counter store.
//!
//! Counters live in a Redis-compatible service so admission decisions hold
//! across processes. One Lua script performs the whole check-and-increment
//! atomically server-side, and every bucket carries its own expiry so
//! nothing needs sweeping here.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use tracing::{debug, info, warn};

use crate::error::Result;

use super::backend::CounterStore;
use super::key::BucketKey;
use super::policy::{Action, Policy};
use super::verdict::{Denial, Verdict};

/// Namespace prefix for every key this store writes.
const KEY_PREFIX: &str = "floodgate";

/// Atomic sliding-window check-and-increment.
///
/// KEYS[1] bucket hash; ARGV[1] max requests, ARGV[2] window length in
/// milliseconds, ARGV[3] caller clock in epoch milliseconds. Replies with
/// `{allowed, count, reset_at_ms}`.
const CHECK_AND_INCREMENT: &str = r#"
local key = KEYS[1]
local max_requests = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])
local now_ms = tonumber(ARGV[3])

local reset_at = tonumber(redis.call('HGET', key, 'reset_at') or '0')
local count = tonumber(redis.call('HGET', key, 'count') or '0')

if reset_at <= now_ms then
    reset_at = now_ms + window_ms
    redis.call('HSET', key, 'count', 1, 'reset_at', reset_at)
    redis.call('PEXPIRE', key, window_ms)
    return {1, 1, reset_at}
end

if count < max_requests then
    count = redis.call('HINCRBY', key, 'count', 1)
    return {1, count, reset_at}
end

return {0, count, reset_at}
"#;

/// Per-action limiter holding the script handle for that action's buckets.
struct ActionLimiter {
    script: Script,
}

impl ActionLimiter {
    fn new(action: Action) -> Self {
        debug!(action = %action, "Creating distributed limiter");
        Self {
            script: Script::new(CHECK_AND_INCREMENT),
        }
    }
}

/// A counter store backed by a Redis-compatible service.
///
/// One [`ActionLimiter`] per action is built lazily on first use and
/// cached for the process lifetime, so the backend client is never
/// reconfigured per request. The registry is written once per action and
/// read-shared afterwards.
pub struct RedisCounterStore {
    connection: ConnectionManager,
    limiters: DashMap<Action, Arc<ActionLimiter>>,
}

impl RedisCounterStore {
    /// Connect to the counter store at `url`.
    ///
    /// This can fail only here, at construction. Once built, backend
    /// errors during checks are absorbed by the fail-open policy and the
    /// connection manager reconnects on its own.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        info!("Connected to distributed counter store");

        Ok(Self {
            connection,
            limiters: DashMap::new(),
        })
    }

    fn limiter_for(&self, action: Action) -> Arc<ActionLimiter> {
        self.limiters
            .entry(action)
            .or_insert_with(|| Arc::new(ActionLimiter::new(action)))
            .clone()
    }

    async fn invoke(
        &self,
        key: &BucketKey,
        policy: Policy,
        now_ms: u64,
    ) -> std::result::Result<(i64, i64, u64), RedisError> {
        let limiter = self.limiter_for(key.action());
        let mut connection = self.connection.clone();

        limiter
            .script
            .key(storage_key(key))
            .arg(policy.max_requests)
            .arg(policy.window.as_millis() as u64)
            .arg(now_ms)
            .invoke_async(&mut connection)
            .await
    }
}

fn storage_key(key: &BucketKey) -> String {
    format!("{KEY_PREFIX}:{key}")
}

/// Map a backend reply (or failure) to a verdict.
///
/// A backend error admits the request: enforcement degrades before
/// availability does, and the error is logged rather than surfaced.
fn verdict_from_reply(
    reply: std::result::Result<(i64, i64, u64), RedisError>,
    policy: Policy,
    now_ms: u64,
) -> Verdict {
    match reply {
        Ok((allowed, _count, _reset_at_ms)) if allowed == 1 => Verdict::Allowed,
        Ok((_, count, reset_at_ms)) => {
            debug!(count, reset_at_ms, "Distributed rate limit exceeded");
            Verdict::Denied(Denial::new(policy.max_requests, reset_at_ms, now_ms))
        }
        Err(error) => {
            warn!(%error, "Distributed counter store unavailable, admitting request");
            Verdict::Allowed
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn check_and_increment(&self, key: &BucketKey, policy: Policy, now_ms: u64) -> Verdict {
        let reply = self.invoke(key, policy, now_ms).await;
        verdict_from_reply(reply, policy, now_ms)
    }
}
