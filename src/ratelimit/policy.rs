//! Action policies and their resolution.

use std::time::Duration;

use crate::config::Environment;

use super::window::parse_window;

/// Factor applied to request budgets outside production.
const RELAXED_LIMIT_FACTOR: u32 = 10;

/// A protected operation with its own rate-limit policy.
///
/// The set is closed: adding an action is a compile-time change enforced by
/// the exhaustive match in [`PolicyTable::resolve`], not a runtime lookup
/// that can silently miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Checkout session creation.
    Checkout,
    /// One-time-password login requests.
    LoginOtp,
    /// License key claiming.
    LicenseClaim,
    /// File upload initiation.
    FileUpload,
    /// Content create/update/delete mutations.
    ContentMutation,
    /// Deliberately strict limit for the teapot easter egg.
    Teapot,
    /// Everything without a dedicated policy.
    Default,
}

impl Action {
    /// Stable name used in bucket keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Checkout => "checkout",
            Action::LoginOtp => "login-otp",
            Action::LicenseClaim => "license-claim",
            Action::FileUpload => "file-upload",
            Action::ContentMutation => "content-mutation",
            Action::Teapot => "teapot",
            Action::Default => "default",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved rate-limit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Maximum requests allowed in the window.
    pub max_requests: u32,
    /// Length of the counting window.
    pub window: Duration,
}

/// Maps each action to its policy.
///
/// The relaxed-limit multiplier is computed once at construction and scales
/// `max_requests` only; windows are never scaled.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    multiplier: u32,
}

impl PolicyTable {
    /// Create a policy table for the given environment.
    pub fn new(environment: Environment) -> Self {
        let multiplier = match environment {
            Environment::Production => 1,
            Environment::Development => RELAXED_LIMIT_FACTOR,
        };
        Self { multiplier }
    }

    /// Resolve the policy for an action.
    pub fn resolve(&self, action: Action) -> Policy {
        let (max_requests, window) = match action {
            Action::Checkout => (10, "1 m"),
            Action::LoginOtp => (5, "10 m"),
            Action::LicenseClaim => (5, "1 m"),
            Action::FileUpload => (20, "1 m"),
            Action::ContentMutation => (30, "1 m"),
            Action::Teapot => (1, "5 s"),
            Action::Default => (60, "1 m"),
        };

        Policy {
            max_requests: max_requests * self.multiplier,
            window: parse_window(window),
        }
    }
}
