//! Counter store trait abstracting local and distributed backends.

use async_trait::async_trait;

use super::key::BucketKey;
use super::policy::Policy;
use super::verdict::Verdict;

/// Strategy interface over the two counter stores.
///
/// The facade selects an implementation once at construction, so the
/// request path never branches on configuration. Implementations own their
/// failure handling: a verdict always comes back, errors never reach the
/// caller.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically check the budget for `key` and count the request.
    ///
    /// `now_ms` is the caller's clock in epoch milliseconds; taking it as a
    /// parameter keeps window arithmetic testable with simulated time.
    async fn check_and_increment(&self, key: &BucketKey, policy: Policy, now_ms: u64) -> Verdict;
}
