//! Configuration for planpay.

use crate::error::{Error, Result};
use crate::plan::PlanCatalog;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the provider key secret (HMAC key).
pub const PROVIDER_SECRET_ENV: &str = "PLANPAY_PROVIDER_SECRET";

/// Environment variable holding the session-token secret.
pub const AUTH_SECRET_ENV: &str = "PLANPAY_AUTH_SECRET";

/// Payment-provider settings (public half; the key secret comes from the
/// environment and never appears in the config file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider API.
    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,

    /// Publishable key id for the checkout widget.
    #[serde(default)]
    pub key_id: String,

    /// Timeout for provider API calls, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_provider_endpoint(),
            key_id: String::new(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Payment-provider settings.
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Currency all plans are denominated in.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Free job applications before a plan is required.
    #[serde(default = "default_free_job_limit")]
    pub free_job_limit: u32,

    /// Capacity of the pending-order registry.
    #[serde(default = "default_pending_capacity")]
    pub pending_capacity: usize,

    /// Capacity of the processed-payment cache.
    #[serde(default = "default_processed_capacity")]
    pub processed_capacity: usize,

    /// Plans the portal sells.
    #[serde(default)]
    pub catalog: PlanCatalog,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            provider: ProviderSettings::default(),
            currency: default_currency(),
            free_job_limit: default_free_job_limit(),
            pending_capacity: default_pending_capacity(),
            processed_capacity: default_processed_capacity(),
            catalog: PlanCatalog::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    // Bind loopback by default; deployments front this with a reverse proxy.
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_provider_endpoint() -> String {
    "https://api.gateway.example".to_string()
}

const fn default_provider_timeout_secs() -> u64 {
    15
}

fn default_currency() -> String {
    "INR".to_string()
}

const fn default_free_job_limit() -> u32 {
    3
}

const fn default_pending_capacity() -> usize {
    10_000
}

const fn default_processed_capacity() -> usize {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location (`<config dir>/planpay/config.toml`).
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "planpay")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("planpay.toml"))
    }
}

/// Process-wide secrets, loaded from the environment only.
///
/// Excluded from `Debug` output; never serialized, logged, or returned to
/// clients.
#[derive(Clone)]
pub struct Secrets {
    /// Provider key secret shared with the payment gateway (HMAC key).
    pub provider_key_secret: String,
    /// Secret the identity provider signs session tokens with.
    pub auth_token_secret: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

impl Secrets {
    /// Load secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the missing variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider_key_secret: require_env(PROVIDER_SECRET_ENV)?,
            auth_token_secret: require_env(AUTH_SECRET_ENV)?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "environment variable {name} must be set"
        ))),
    }
}
