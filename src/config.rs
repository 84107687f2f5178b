//! Client configuration
//!
//! Everything is read from the environment once at startup. Unset variables
//! fall back to defaults; set-but-invalid values are errors.

use crate::state_machine::DispatchPolicy;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CHATBOT_ENDPOINT must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),
    #[error("CHATBOT_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
    #[error("CHATBOT_DISPATCH must be \"concurrent\" or \"serialized\", got {0:?}")]
    InvalidPolicy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub dispatch_policy: DispatchPolicy,
    pub prefs_path: PathBuf,
    pub log_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = match var("CHATBOT_ENDPOINT") {
            Some(raw) => validate_endpoint(raw.trim())?,
            None => DEFAULT_ENDPOINT.to_string(),
        };

        let timeout = match var("CHATBOT_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let dispatch_policy = match var("CHATBOT_DISPATCH") {
            Some(raw) => DispatchPolicy::parse(&raw).ok_or(ConfigError::InvalidPolicy(raw))?,
            None => DispatchPolicy::default(),
        };

        let data_dir = PathBuf::from(var("HOME").unwrap_or_else(|| "/tmp".to_string()))
            .join(".chatbot");
        let prefs_path = var("CHATBOT_PREFS_PATH")
            .map_or_else(|| data_dir.join("prefs.db"), PathBuf::from);
        let log_path = var("CHATBOT_LOG_PATH")
            .map_or_else(|| data_dir.join("chatbot.log"), PathBuf::from);

        Ok(Self {
            endpoint,
            timeout,
            dispatch_policy,
            prefs_path,
            log_path,
        })
    }
}

fn validate_endpoint(raw: &str) -> Result<String, ConfigError> {
    match reqwest::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(raw.to_string())
        }
        _ => Err(ConfigError::InvalidEndpoint(raw.to_string())),
    }
}
