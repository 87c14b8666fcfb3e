//! Node configuration loading and management.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use xpay_core::{Drops, EngineConfig, RoutingTag, SettlementMode, DEFAULT_EXPOSURE_CAP, DEFAULT_ROUTING_TAG_BASE};
use xpay_settlement::JsonRpcConfig;

/// Environment variable that overrides `ledger.merchant_secret`.
pub const MERCHANT_SECRET_ENV: &str = "XPAY_MERCHANT_SECRET";

/// Full configuration for the XPay node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct XPayConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Exposure and routing policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Ledger connection and settlement mode.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Authorization for mutating endpoints.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process maps; state is lost on restart.
    #[default]
    Memory,
    /// RocksDB under `data_dir`.
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Cap for claims that name no registered device.
    #[serde(default = "default_exposure_cap")]
    pub exposure_cap_drops: Drops,
    /// First routing tag assigned to devices.
    #[serde(default = "default_routing_tag_base")]
    pub routing_tag_base: RoutingTag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub mode: SettlementMode,
    /// rippled JSON-RPC endpoint. Without one the node runs offline.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Merchant classic address, the channel destination.
    #[serde(default)]
    pub merchant_address: Option<String>,
    /// Merchant signing secret. Prefer the environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_secret: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every request is authorized. Development only.
    #[default]
    Open,
    /// `Authorization: Bearer <token>` must match a configured token.
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    3000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_exposure_cap() -> Drops {
    DEFAULT_EXPOSURE_CAP
}
fn default_routing_tag_base() -> RoutingTag {
    DEFAULT_ROUTING_TAG_BASE
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_max_polls() -> u32 {
    20
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            exposure_cap_drops: default_exposure_cap(),
            routing_tag_base: default_routing_tag_base(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: SettlementMode::default(),
            rpc_url: None,
            merchant_address: None,
            merchant_secret: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl XPayConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: XPayConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Pull secrets from the environment into the config.
    pub fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var(MERCHANT_SECRET_ENV) {
            if !secret.trim().is_empty() {
                self.ledger.merchant_secret = Some(secret.trim().to_string());
            }
        }
    }

    /// Reject combinations the node cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(address) = &self.ledger.merchant_address {
            if !xpay_crypto::is_valid_classic_address(address) {
                bail!("ledger.merchant_address {:?} is not a valid classic address", address);
            }
        }
        if self.engine_config().effective_mode() == SettlementMode::Live {
            if self.ledger.rpc_url.is_none() {
                bail!("live settlement needs ledger.rpc_url");
            }
            if self.ledger.merchant_secret.is_none() {
                bail!("live settlement needs a merchant secret ({} or ledger.merchant_secret)", MERCHANT_SECRET_ENV);
            }
        }
        if self.auth.mode == AuthMode::Bearer && self.auth.tokens.iter().all(|t| t.trim().is_empty()) {
            bail!("auth.mode = \"bearer\" needs at least one token in auth.tokens");
        }
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => bail!("logging.format must be \"text\" or \"json\", got {:?}", other),
        }
        Ok(())
    }

    /// Get the full API listen address.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_exposure_cap: self.policy.exposure_cap_drops,
            routing_tag_base: self.policy.routing_tag_base,
            settlement_mode: self.ledger.mode,
            merchant_address: self.ledger.merchant_address.clone(),
        }
    }

    /// JSON-RPC client settings, when an endpoint is configured.
    pub fn json_rpc_config(&self) -> Option<JsonRpcConfig> {
        self.ledger.rpc_url.as_ref().map(|url| JsonRpcConfig {
            rpc_url: url.clone(),
            poll_interval: Duration::from_millis(self.ledger.poll_interval_ms),
            max_polls: self.ledger.max_polls,
            request_timeout: Duration::from_secs(self.ledger.request_timeout_secs),
        })
    }
}
