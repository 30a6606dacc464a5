use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cometd_mock_engine::MockConfig;
use cometd_mock_engine::config::parse_threshold;

/// A connect/expiry limit from the command line; `none` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(pub Option<u64>);

fn parse_threshold_arg(raw: &str) -> Result<Threshold, String> {
    parse_threshold(raw).map(Threshold)
}

/// Mock Bayeux (CometD) long-polling server.
#[derive(Parser, Debug)]
#[command(name = "cometd-mock", version, about = "Mock Bayeux/CometD long-polling server")]
pub struct Cli {
    /// TOML config file; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,

    /// `advice.interval` (ms) returned on connect.
    #[arg(long)]
    pub connect_interval: Option<u64>,

    /// `advice.timeout` (ms) returned on handshake and connect.
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Connects before the client is advised to reconnect, or `none`.
    #[arg(long, value_parser = parse_threshold_arg)]
    pub reconnection_interval: Option<Threshold>,

    /// Session age in seconds before the client is advised to reconnect, or `none`.
    #[arg(long, value_parser = parse_threshold_arg)]
    pub reconnection_interval_seconds: Option<Threshold>,

    /// Connect count at which a client id is dropped, or `none`.
    #[arg(long = "expire-client-ids-after", value_parser = parse_threshold_arg)]
    pub expire_after_count: Option<Threshold>,

    /// Session age in seconds at which a client id is dropped, or `none`.
    #[arg(long = "expire-client-ids-after-seconds", value_parser = parse_threshold_arg)]
    pub expire_after_seconds: Option<Threshold>,

    /// Skip validators; handlers accept whatever arrives.
    #[arg(long)]
    pub no_validation: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    pub debug: bool,

    /// Validator chain, in order (request, required_fields, client_id).
    #[arg(long, value_delimiter = ',')]
    pub validators: Option<Vec<String>>,

    /// Adapter chain, in order (expire, reconnect, chaos).
    #[arg(long, value_delimiter = ',')]
    pub adapters: Option<Vec<String>>,
}

impl Cli {
    /// Config file (or defaults) with the flags applied on top.
    pub fn load_config(&self) -> anyhow::Result<MockConfig> {
        let mut config = match &self.config {
            Some(path) => MockConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => MockConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut MockConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(interval) = self.connect_interval {
            config.connect_interval = interval;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(Threshold(limit)) = self.reconnection_interval {
            config.reconnection_interval = limit;
        }
        if let Some(Threshold(limit)) = self.reconnection_interval_seconds {
            config.reconnection_interval_seconds = limit;
        }
        if let Some(Threshold(limit)) = self.expire_after_count {
            config.expire_after_count = limit;
        }
        if let Some(Threshold(limit)) = self.expire_after_seconds {
            config.expire_after_seconds = limit;
        }
        if self.no_validation {
            config.no_validation = true;
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(validators) = &self.validators {
            config.validators = validators.clone();
        }
        if let Some(adapters) = &self.adapters {
            config.adapters = adapters.clone();
        }
    }
}
