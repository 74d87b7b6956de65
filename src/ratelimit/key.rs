//! Bucket key generation and handling.

use super::policy::Action;

/// A key that uniquely identifies one counting bucket.
///
/// The key pairs an action with a client identity; requests sharing both
/// share a budget, different identities never interact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    action: Action,
    identity: String,
}

impl BucketKey {
    /// Create a new bucket key.
    pub fn new(action: Action, identity: &str) -> Self {
        Self {
            action,
            identity: identity.to_string(),
        }
    }

    /// The action component of this key.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The identity component of this key.
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.action.as_str(), self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = BucketKey::new(Action::Checkout, "203.0.113.7");
        assert_eq!(key.to_string(), "checkout:203.0.113.7");
    }

    #[test]
    fn test_same_pair_is_equal() {
        let a = BucketKey::new(Action::LoginOtp, "10.0.0.1");
        let b = BucketKey::new(Action::LoginOtp, "10.0.0.1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_and_action_both_distinguish() {
        let base = BucketKey::new(Action::LoginOtp, "10.0.0.1");
        assert_ne!(base, BucketKey::new(Action::LoginOtp, "10.0.0.2"));
        assert_ne!(base, BucketKey::new(Action::Checkout, "10.0.0.1"));
    }
}
