//! Command-line interface definition.

use clap::Parser;
use planpay::config::ServiceConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Payment-order lifecycle and credit-ledger service for the placement portal.
#[derive(Parser, Debug)]
#[command(name = "planpay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, short, env = "PLANPAY_BIND_ADDR")]
    pub bind_addr: Option<SocketAddr>,

    /// Payment provider API endpoint.
    #[arg(long, env = "PLANPAY_PROVIDER_ENDPOINT")]
    pub provider_endpoint: Option<String>,

    /// Publishable provider key id for the checkout widget.
    #[arg(long, env = "PLANPAY_PROVIDER_KEY_ID")]
    pub provider_key_id: Option<String>,

    /// Free job applications before a plan is required.
    #[arg(long, env = "PLANPAY_FREE_JOB_LIMIT")]
    pub free_job_limit: Option<u32>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a `ServiceConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn into_config(self) -> color_eyre::Result<ServiceConfig> {
        // Start with the explicit config file, the default location if a
        // file exists there, or built-in defaults.
        let mut config = if let Some(ref path) = self.config {
            ServiceConfig::from_file(path)?
        } else {
            let default_path = ServiceConfig::default_path();
            if default_path.exists() {
                ServiceConfig::from_file(&default_path)?
            } else {
                ServiceConfig::default()
            }
        };

        // Override with CLI arguments
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(endpoint) = self.provider_endpoint {
            config.provider.endpoint = endpoint;
        }
        if let Some(key_id) = self.provider_key_id {
            config.provider.key_id = key_id;
        }
        if let Some(limit) = self.free_job_limit {
            config.free_job_limit = limit;
        }
        config.log_level = self.log_level;

        Ok(config)
    }
}
