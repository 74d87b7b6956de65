//! Core limiter facade.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use tracing::{debug, info, trace, warn};

use crate::config::FloodgateConfig;
use crate::http::{client_ip, rejection_response};

use super::backend::CounterStore;
use super::distributed::RedisCounterStore;
use super::key::BucketKey;
use super::local::LocalCounterStore;
use super::policy::{Action, PolicyTable};
use super::verdict::Verdict;

/// Outcome of the non-HTTP call shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the caller may proceed.
    pub success: bool,
    /// Human-readable denial reason, present only on failure.
    pub error: Option<String>,
}

/// The request-admission rate limiter.
///
/// Resolves the policy for an action, derives the bucket key from the
/// caller identity and delegates the check to the configured counter
/// store. Constructed once per process and shared across request tasks;
/// nothing here ever returns an error to a caller.
pub struct RateLimiter {
    policies: PolicyTable,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Build a limiter from runtime configuration.
    ///
    /// Selects the distributed store when a Redis URL is configured and a
    /// client can be constructed, otherwise falls back to in-process
    /// counters. The choice is made once here, never per request.
    pub async fn from_config(config: &FloodgateConfig) -> Self {
        let store: Arc<dyn CounterStore> = match config.redis_url.as_deref() {
            Some(url) => match RedisCounterStore::connect(url).await {
                Ok(store) => Arc::new(store),
                Err(error) => {
                    warn!(%error, "Distributed counter store unavailable, using in-process counters");
                    Arc::new(LocalCounterStore::new())
                }
            },
            None => {
                info!("No distributed counter store configured, using in-process counters");
                Arc::new(LocalCounterStore::new())
            }
        };

        Self {
            policies: PolicyTable::new(config.environment),
            store,
        }
    }

    /// Build a limiter over an explicit store.
    ///
    /// This is the injection seam: tests and embedders pass the store in
    /// rather than relying on a hidden process-wide singleton.
    pub fn with_store(policies: PolicyTable, store: Arc<dyn CounterStore>) -> Self {
        Self { policies, store }
    }

    /// Evaluation core shared by both call shapes.
    pub async fn check(&self, action: Action, identity: &str) -> Verdict {
        let policy = self.policies.resolve(action);
        let key = BucketKey::new(action, identity);
        let now_ms = Utc::now().timestamp_millis() as u64;

        trace!(key = %key, limit = policy.max_requests, "Checking rate limit");

        let verdict = self.store.check_and_increment(&key, policy, now_ms).await;
        if let Verdict::Denied(denial) = &verdict {
            debug!(
                key = %key,
                retry_after_secs = denial.retry_after_secs,
                "Rate limit exceeded"
            );
        }
        verdict
    }

    /// Gate shape for inbound request handlers.
    ///
    /// Returns `None` when the request may proceed, or a fully-formed 429
    /// response for the handler to return as-is.
    pub async fn gate(&self, headers: &HeaderMap, action: Action) -> Option<Response> {
        let identity = client_ip(headers);
        match self.check(action, &identity).await {
            Verdict::Allowed => None,
            Verdict::Denied(denial) => Some(rejection_response(&denial)),
        }
    }

    /// Action shape for callers without an HTTP request in hand.
    ///
    /// The identity is whatever stable identifier the caller attributes
    /// the work to, typically an already-extracted client IP.
    pub async fn check_action(&self, identifier: &str, action: Action) -> ActionOutcome {
        match self.check(action, identifier).await {
            Verdict::Allowed => ActionOutcome {
                success: true,
                error: None,
            },
            Verdict::Denied(denial) => ActionOutcome {
                success: false,
                error: Some(format!(
                    "Too many requests. Please try again in {} seconds.",
                    denial.retry_after_secs
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, StatusCode};

    use super::*;
    use crate::config::Environment;

    fn local_limiter() -> RateLimiter {
        RateLimiter::with_store(
            PolicyTable::new(Environment::Production),
            Arc::new(LocalCounterStore::new()),
        )
    }

    fn headers_for(ip: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static(ip));
        headers
    }

    #[tokio::test]
    async fn test_gate_allows_within_budget_then_rejects() {
        let limiter = local_limiter();
        let headers = headers_for("203.0.113.10");

        // login-otp allows 5 per window in production.
        for i in 0..5 {
            let rejection = limiter.gate(&headers, Action::LoginOtp).await;
            assert!(rejection.is_none(), "request {} should pass", i + 1);
        }

        let response = limiter
            .gate(&headers, Action::LoginOtp)
            .await
            .expect("6th request must be rejected");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["X-RateLimit-Limit"], "5");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
        assert!(response.headers().contains_key("Retry-After"));
    }

    #[tokio::test]
    async fn test_gate_isolates_identities() {
        let limiter = local_limiter();
        let first = headers_for("203.0.113.11");
        let second = headers_for("203.0.113.12");

        for _ in 0..5 {
            assert!(limiter.gate(&first, Action::LoginOtp).await.is_none());
        }
        assert!(limiter.gate(&first, Action::LoginOtp).await.is_some());

        assert!(limiter.gate(&second, Action::LoginOtp).await.is_none());
    }

    #[tokio::test]
    async fn test_gate_isolates_actions() {
        let limiter = local_limiter();
        let headers = headers_for("203.0.113.13");

        assert!(limiter.gate(&headers, Action::Teapot).await.is_none());
        assert!(limiter.gate(&headers, Action::Teapot).await.is_some());

        // The same identity still has budget on other actions.
        assert!(limiter.gate(&headers, Action::Checkout).await.is_none());
    }

    #[tokio::test]
    async fn test_unattributed_requests_share_the_loopback_bucket() {
        let limiter = local_limiter();
        let empty = HeaderMap::new();

        assert!(limiter.gate(&empty, Action::Teapot).await.is_none());
        assert!(limiter.gate(&empty, Action::Teapot).await.is_some());
    }

    #[tokio::test]
    async fn test_action_shape_reports_denial_as_error_string() {
        let limiter = local_limiter();

        let outcome = limiter.check_action("198.51.100.7", Action::Teapot).await;
        assert!(outcome.success);
        assert!(outcome.error.is_none());

        let outcome = limiter.check_action("198.51.100.7", Action::Teapot).await;
        assert!(!outcome.success);
        let error = outcome.error.expect("denial must carry an error string");
        assert!(error.starts_with("Too many requests. Please try again in "));
        assert!(error.ends_with(" seconds."));
    }

    #[tokio::test]
    async fn test_check_returns_verdict_directly() {
        let limiter = local_limiter();

        assert!(limiter.check(Action::Teapot, "198.51.100.8").await.is_allowed());
        match limiter.check(Action::Teapot, "198.51.100.8").await {
            Verdict::Denied(denial) => {
                assert_eq!(denial.limit, 1);
                assert!((1..=5).contains(&denial.retry_after_secs));
            }
            Verdict::Allowed => panic!("second teapot request must be denied"),
        }
    }
}
