//! HTTP mapping for admission verdicts.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::ratelimit::Denial;

/// JSON body returned alongside a 429.
#[derive(Debug, Serialize)]
struct RejectionBody {
    error: &'static str,
    #[serde(rename = "retryAfter")]
    retry_after: u64,
}

/// Build the rejection response for a denied request.
///
/// Status 429 with the standard rate-limit headers and a machine-readable
/// JSON body.
pub fn rejection_response(denial: &Denial) -> Response {
    let body = RejectionBody {
        error: "Too many requests. Please try again later.",
        retry_after: denial.retry_after_secs,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(denial.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(denial.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(denial.reset_at_ms));
    headers.insert("Retry-After", HeaderValue::from(denial.retry_after_secs));

    response
}

/// Headers advertised on the success path.
///
/// Only the limit: computing remaining/reset would cost an extra counter
/// read on every allowed request.
pub fn success_headers(limit: u32) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denial() -> Denial {
        Denial {
            limit: 5,
            remaining: 0,
            reset_at_ms: 1_700_000_030_000,
            retry_after_secs: 30,
        }
    }

    #[tokio::test]
    async fn test_rejection_status_and_headers() {
        let response = rejection_response(&denial());

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["X-RateLimit-Limit"], "5");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
        assert_eq!(response.headers()["X-RateLimit-Reset"], "1700000030000");
        assert_eq!(response.headers()["Retry-After"], "30");
    }

    #[tokio::test]
    async fn test_rejection_body_shape() {
        let response = rejection_response(&denial());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"], "Too many requests. Please try again later.");
        assert_eq!(body["retryAfter"], 30);
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_success_headers_expose_only_the_limit() {
        let headers = success_headers(10);
        assert_eq!(headers["X-RateLimit-Limit"], "10");
        assert_eq!(headers.len(), 1);
    }
}
