//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::WalletConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `network.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "TRANSFER_WALLET_RPC_URL";

/// Overrides `network.chain_id`.
pub const CHAIN_ID_ENV_VAR: &str = "TRANSFER_WALLET_CHAIN_ID";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WalletConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: WalletConfig = toml::from_str(&content)?;

    finish(config, |var| std::env::var(var).ok())
}

/// Load from `path` if given, otherwise start from defaults.
///
/// Environment overrides and validation apply in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<WalletConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(WalletConfig::default(), |var| std::env::var(var).ok()),
    }
}

fn finish<F>(mut config: WalletConfig, lookup: F) -> Result<WalletConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides through `lookup`.
pub fn apply_env_overrides<F>(config: &mut WalletConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(RPC_URL_ENV_VAR) {
        config.network.rpc_url = url;
    }
    if let Some(raw) = lookup(CHAIN_ID_ENV_VAR) {
        config.network.chain_id = raw.trim().parse().map_err(|e| ConfigError::Env {
            var: CHAIN_ID_ENV_VAR,
            message: format!("'{}': {}", raw, e),
        })?;
    }
    Ok(())
}
