use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};
use crate::registry::DuplicatePolicy;

/// Wallet configuration.
///
/// Every section has defaults, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub registry: RegistryConfig,
    pub subscription: SubscriptionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Tick of polling subscriptions, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
        }
    }
}

impl SubscriptionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(WalletError::Config(format!(
                "unknown log format {other:?}, expected \"text\" or \"json\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"wallet_core=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl WalletConfig {
    pub fn from_toml_str(s: &str) -> WalletResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> WalletResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overridden by `WALLET_*` environment variables.
    pub fn from_env() -> WalletResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `WALLET_DUPLICATE_POLICY`, `WALLET_POLL_INTERVAL_MS`,
    /// `WALLET_LOG_LEVEL` and `WALLET_LOG_FORMAT` as returned by `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> WalletResult<()> {
        if let Some(policy) = lookup("WALLET_DUPLICATE_POLICY") {
            self.registry.duplicate_policy = policy.parse()?;
        }
        if let Some(interval) = lookup("WALLET_POLL_INTERVAL_MS") {
            self.subscription.poll_interval_ms = interval.trim().parse().map_err(|_| {
                WalletError::Config(format!("WALLET_POLL_INTERVAL_MS is not a number: {interval:?}"))
            })?;
        }
        if let Some(level) = lookup("WALLET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("WALLET_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> WalletResult<()> {
        if self.subscription.poll_interval_ms == 0 {
            return Err(WalletError::Config(
                "subscription.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(WalletError::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }
}
