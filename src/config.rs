//! Configuration management for contract-tx
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Env var naming the configuration file
pub const CONFIG_ENV: &str = "CONTRACT_TX_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

lazy_static! {
    static ref ENV_VAR: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is valid");
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Env var holding the hex private key used when a request has none
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: default_private_key_env(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_chain_id() -> u64 {
    1
}

fn default_private_key_env() -> String {
    "CONTRACT_TX_PRIVATE_KEY".to_string()
}

fn default_log_filter() -> String {
    "info,contract_tx=debug".to_string()
}

impl Settings {
    /// Load settings from `CONTRACT_TX_CONFIG` or `config/default.toml`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text
    pub fn from_toml(config_str: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let rpc_url = self.network.rpc_url.trim();
        if rpc_url.is_empty() {
            anyhow::bail!("network.rpc_url must be set");
        }
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            anyhow::bail!("network.rpc_url must be an http(s) url, got {}", rpc_url);
        }
        if self.network.chain_id == 0 {
            anyhow::bail!("network.chain_id must be greater than zero");
        }
        if self.wallet.private_key_env.is_empty() {
            tracing::warn!("wallet.private_key_env is empty - requests must carry fromKey");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR
        .replace_all(input, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("CONTRACT_TX_TEST_VAR", "test_value");
        let input = "url = \"https://rpc.example.com/${CONTRACT_TX_TEST_VAR}/endpoint\"";
        let result = substitute_env_vars(input);
        assert_eq!(result, "url = \"https://rpc.example.com/test_value/endpoint\"");
    }

    #[test]
    fn test_unset_var_becomes_empty() {
        let result = substitute_env_vars("key = \"${CONTRACT_TX_SURELY_UNSET_VAR}\"");
        assert_eq!(result, "key = \"\"");
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            "#,
        )
        .unwrap();
        assert_eq!(settings.network.chain_id, 1);
        assert_eq!(settings.wallet.private_key_env, "CONTRACT_TX_PRIVATE_KEY");
        assert_eq!(settings.logging.filter, "info,contract_tx=debug");
    }

    #[test]
    fn test_load_from_file() {
        env::set_var("CONTRACT_TX_TEST_RPC", "http://127.0.0.1:8545");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [network]
            rpc_url = "${{CONTRACT_TX_TEST_RPC}}"
            chain_id = 31337

            [wallet]
            private_key_env = "DEPLOYER_KEY"
            "#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.network.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(settings.network.chain_id, 31337);
        assert_eq!(settings.wallet.private_key_env, "DEPLOYER_KEY");
    }

    #[test]
    fn test_rejects_invalid_network() {
        let bad_url = Settings::from_toml("[network]\nrpc_url = \"ws://localhost:8546\"\n");
        assert!(bad_url.is_err());

        let zero_chain =
            Settings::from_toml("[network]\nrpc_url = \"http://localhost:8545\"\nchain_id = 0\n");
        assert!(zero_chain.is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Settings::load_from(Path::new("/nonexistent/contract-tx.toml")).is_err());
    }
}
