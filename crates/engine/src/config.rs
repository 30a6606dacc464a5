use std::path::Path;

use anyhow::Context;
use cometd_mock_core::{ExpiryPolicy, ReconnectPolicy};
use serde::{Deserialize, Deserializer};

use crate::error::EngineError;

type Result<T> = anyhow::Result<T>;

/// Settings the mock runs with. Loaded from TOML, then overridden from the CLI.
///
/// Thresholds are `Option`s: `None` disables the check, it never means zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `advice.interval` (ms) handed out on connect.
    #[serde(default)]
    pub connect_interval: u64,
    /// `advice.timeout` (ms) handed out on handshake and connect.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Connects allowed before the client is advised to reconnect.
    #[serde(
        default = "default_reconnection_interval",
        deserialize_with = "deserialize_threshold"
    )]
    pub reconnection_interval: Option<u64>,
    /// Session age (s) after which the client is advised to reconnect.
    #[serde(default, deserialize_with = "deserialize_threshold")]
    pub reconnection_interval_seconds: Option<u64>,
    /// Connect count at which the session is dropped.
    #[serde(default, deserialize_with = "deserialize_threshold")]
    pub expire_after_count: Option<u64>,
    /// Session age (s) at which the session is dropped.
    #[serde(default, deserialize_with = "deserialize_threshold")]
    pub expire_after_seconds: Option<u64>,
    #[serde(default)]
    pub no_validation: bool,
    #[serde(default)]
    pub debug: bool,
    /// HTTP status of validation failures.
    #[serde(default = "default_validation_error_status")]
    pub validation_error_status: u16,
    #[serde(default = "default_validators")]
    pub validators: Vec<String>,
    #[serde(default = "default_adapters")]
    pub adapters: Vec<String>,
}

impl MockConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize mock config")
    }

    /// Rejects settings no request could be served with.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if !(400..500).contains(&self.validation_error_status) {
            return Err(EngineError::Config(format!(
                "validation_error_status must be a 4xx code, got {}",
                self.validation_error_status
            )));
        }
        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_connections: self.reconnection_interval,
            max_age_secs: self.reconnection_interval_seconds,
        }
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            after_count: self.expire_after_count,
            after_secs: self.expire_after_seconds,
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_interval: 0,
            connect_timeout: default_connect_timeout(),
            reconnection_interval: default_reconnection_interval(),
            reconnection_interval_seconds: None,
            expire_after_count: None,
            expire_after_seconds: None,
            no_validation: false,
            debug: false,
            validation_error_status: default_validation_error_status(),
            validators: default_validators(),
            adapters: default_adapters(),
        }
    }
}

/// Parses a threshold as written on the command line or in TOML:
/// a non-negative integer, or `none`/`off` to disable it.
pub fn parse_threshold(raw: &str) -> std::result::Result<Option<u64>, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| format!("expected a non-negative integer or `none`, got `{raw}`"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawThreshold {
    Limit(u64),
    Word(String),
}

fn deserialize_threshold<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawThreshold::deserialize(deserializer)? {
        RawThreshold::Limit(limit) => Ok(Some(limit)),
        RawThreshold::Word(word) => parse_threshold(&word).map_err(serde::de::Error::custom),
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_connect_timeout() -> u64 {
    45_000
}

fn default_reconnection_interval() -> Option<u64> {
    Some(5)
}

fn default_validation_error_status() -> u16 {
    400
}

fn default_validators() -> Vec<String> {
    vec!["request".to_string(), "client_id".to_string()]
}

fn default_adapters() -> Vec<String> {
    vec!["expire".to_string(), "reconnect".to_string()]
}
