//! Configuration management for Floodgate.

use serde::{Deserialize, Serialize};

/// Environment variable selecting the distributed counter store.
const REDIS_URL_VAR: &str = "FLOODGATE_REDIS_URL";
/// Environment variable naming the deployment environment.
const APP_ENV_VAR: &str = "APP_ENV";

/// Deployment environment the limiter runs in.
///
/// Outside production every request budget is relaxed by a fixed factor so
/// local development and integration tests do not trip the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// Detect the environment from `APP_ENV`.
    ///
    /// Anything other than `production` counts as development.
    pub fn from_env() -> Self {
        match std::env::var(APP_ENV_VAR) {
            Ok(value) if value.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Main configuration for the Floodgate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodgateConfig {
    /// Redis connection URL for the distributed counter store.
    ///
    /// When absent the limiter runs on in-process counters only.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Deployment environment, drives the relaxed-limit multiplier.
    #[serde(default = "default_environment")]
    pub environment: Environment,
}

impl Default for FloodgateConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            environment: default_environment(),
        }
    }
}

fn default_environment() -> Environment {
    Environment::Development
}

impl FloodgateConfig {
    /// Build configuration from process environment variables.
    ///
    /// `FLOODGATE_REDIS_URL` selects the distributed backend when set and
    /// non-empty; `APP_ENV` selects the environment.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var(REDIS_URL_VAR)
                .ok()
                .filter(|value| !value.is_empty()),
            environment: Environment::from_env(),
        }
    }

    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: FloodgateConfig = serde_yaml::from_str(&contents)
            .map_err(|e| crate::error::FloodgateError::Config(e.to_string()))?;
        Ok(config)
    }
}
