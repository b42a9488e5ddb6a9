// src/config.rs
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::FailurePolicy;

pub const ENV_API_URL: &str = "ECG_MONITOR_API_URL";
pub const ENV_WINDOW: &str = "ECG_MONITOR_WINDOW";
pub const ENV_TICK_MS: &str = "ECG_MONITOR_TICK_MS";
pub const ENV_TIMEOUT_SECS: &str = "ECG_MONITOR_TIMEOUT_SECS";
pub const ENV_ON_FAILURE: &str = "ECG_MONITOR_ON_FAILURE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("unknown failure policy {0:?}; expected \"fallback\" or \"fail\"")]
    InvalidPolicy(String),
    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),
}

/// How classifier failures reach the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Mask failures behind the fixed demo diagnosis.
    #[default]
    Fallback,
    Fail,
}

impl FailureMode {
    pub fn policy(self) -> FailurePolicy {
        match self {
            FailureMode::Fallback => FailurePolicy::default(),
            FailureMode::Fail => FailurePolicy::Fail,
        }
    }
}

impl FromStr for FailureMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(FailureMode::Fallback),
            "fail" => Ok(FailureMode::Fail),
            _ => Err(ConfigError::InvalidPolicy(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Classifier base URL; requests go to `{base_url}/analyze`.
    pub base_url: String,
    pub window_capacity: usize,
    pub tick_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub failure_policy: FailureMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            window_capacity: 50,
            tick_interval_ms: 100,
            request_timeout_secs: 30,
            failure_policy: FailureMode::Fallback,
        }
    }
}

impl MonitorConfig {
    /// Defaults overridden by any `ECG_MONITOR_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_WINDOW) {
            config.window_capacity = parse_number(ENV_WINDOW, &raw)? as usize;
        }
        if let Some(raw) = lookup(ENV_TICK_MS) {
            config.tick_interval_ms = parse_number(ENV_TICK_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = parse_number(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ON_FAILURE) {
            config.failure_policy = raw.parse()?;
        }
        Ok(config)
    }

    pub fn from_json_str(doc: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(doc)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_local_backend() {
        let config = MonitorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.window_capacity, 50);
    }

    #[test]
    fn env_overrides_apply() {
        let config = MonitorConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://ecg.example.org"),
            (ENV_WINDOW, "120"),
            (ENV_ON_FAILURE, "FAIL"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://ecg.example.org");
        assert_eq!(config.window_capacity, 120);
        assert_eq!(config.failure_policy, FailureMode::Fail);
        assert_eq!(config.failure_policy.policy(), FailurePolicy::Fail);
    }

    #[test]
    fn bad_number_is_reported() {
        let err = MonitorConfig::from_lookup(lookup(&[(ENV_TICK_MS, "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key: ENV_TICK_MS, .. }));
    }

    #[test]
    fn unknown_policy_is_reported() {
        let err = MonitorConfig::from_lookup(lookup(&[(ENV_ON_FAILURE, "retry")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPolicy(_)));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = MonitorConfig::from_json_str(r#"{"tick_interval_ms": 40}"#).unwrap();
        assert_eq!(config.tick_interval_ms, 40);
        assert_eq!(config.window_capacity, 50);
        assert_eq!(config.failure_policy, FailureMode::Fallback);
    }
}
