//! Configuration module for the zkSync client.
//!
//! This module provides structures and utilities for managing client
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` and `${VAR:-default}` environment interpolation and validates
//! every section before handing the configuration out.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use zks_types::utils::{
	DEFAULT_GAS_PER_PUBDATA_LIMIT, DEFAULT_POLLING_INTERVAL_MS,
	REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
};
use zks_types::{Network, PrivateKey};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Settlement layer endpoint.
	pub l1: L1Config,
	/// Rollup endpoint; defaults to the localhost network.
	#[serde(default)]
	pub l2: L2Config,
	/// Credential used to sign transactions. Read-only usage needs none.
	pub account: Option<AccountConfig>,
	/// Receipt and status polling.
	#[serde(default)]
	pub polling: PollingSection,
	/// L1->L2 deposit defaults.
	#[serde(default)]
	pub deposit: DepositConfig,
	/// L2 transaction defaults.
	#[serde(default)]
	pub tx: TxConfig,
}

/// Settlement layer endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct L1Config {
	/// JSON-RPC URL of the L1 node.
	pub rpc_url: String,
}

/// Rollup endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct L2Config {
	/// Explicit JSON-RPC URL. When absent the client uses the
	/// `ZKSYNC_WEB3_API_URL` environment variable, then the network default.
	pub rpc_url: Option<String>,
	/// Predefined network used when no URL is given.
	#[serde(default)]
	pub network: Network,
}

/// Signing credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded private key. Prefer `${ENV_VAR}` interpolation over a literal.
	pub private_key: PrivateKey,
}

/// Polling behaviour for receipt, status and finalization waits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingSection {
	/// Delay between polls in milliseconds.
	#[serde(default = "default_polling_interval_ms")]
	pub interval_ms: u64,
	/// Maximum number of polls; unbounded when absent.
	#[serde(default)]
	pub max_attempts: Option<u32>,
}

impl Default for PollingSection {
	fn default() -> Self {
		Self {
			interval_ms: default_polling_interval_ms(),
			max_attempts: None,
		}
	}
}

fn default_polling_interval_ms() -> u64 {
	DEFAULT_POLLING_INTERVAL_MS
}

/// L1->L2 deposit defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepositConfig {
	/// Gas-per-pubdata limit of priority operations.
	#[serde(default = "default_deposit_gas_per_pubdata")]
	pub gas_per_pubdata: u64,
}

impl Default for DepositConfig {
	fn default() -> Self {
		Self {
			gas_per_pubdata: default_deposit_gas_per_pubdata(),
		}
	}
}

fn default_deposit_gas_per_pubdata() -> u64 {
	REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT
}

/// L2 transaction defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TxConfig {
	/// Gas-per-pubdata limit signed into rollup-native transactions.
	#[serde(default = "default_tx_gas_per_pubdata")]
	pub gas_per_pubdata: u64,
}

impl Default for TxConfig {
	fn default() -> Self {
		Self {
			gas_per_pubdata: default_tx_gas_per_pubdata(),
		}
	}
}

fn default_tx_gas_per_pubdata() -> u64 {
	DEFAULT_GAS_PER_PUBDATA_LIMIT
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

fn validate_url(section: &str, url: &str) -> Result<(), ConfigError> {
	if url.trim().is_empty() {
		return Err(ConfigError::Validation(format!(
			"{}.rpc_url cannot be empty",
			section
		)));
	}
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(ConfigError::Validation(format!(
			"{}.rpc_url must be an http(s) URL, got '{}'",
			section, url
		)));
	}
	Ok(())
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_url("l1", &self.l1.rpc_url)?;
		if let Some(url) = &self.l2.rpc_url {
			validate_url("l2", url)?;
		}

		if let Some(account) = &self.account {
			if account.private_key.is_empty() {
				return Err(ConfigError::Validation(
					"account.private_key cannot be empty".into(),
				));
			}
			account
				.private_key
				.to_bytes()
				.map_err(|e| ConfigError::Validation(e.to_string()))?;
		}

		if self.polling.interval_ms == 0 {
			return Err(ConfigError::Validation(
				"polling.interval_ms must be greater than 0".into(),
			));
		}
		if self.polling.max_attempts == Some(0) {
			return Err(ConfigError::Validation(
				"polling.max_attempts must be at least 1 when set".into(),
			));
		}

		if self.deposit.gas_per_pubdata == 0 {
			return Err(ConfigError::Validation(
				"deposit.gas_per_pubdata must be greater than 0".into(),
			));
		}
		if self.tx.gas_per_pubdata == 0 {
			return Err(ConfigError::Validation(
				"tx.gas_per_pubdata must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

/// Parses a configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const KEY: &str = "0x7726827caac94a7f9e1b160f7ea819f172f7b6f9d2a97f992c38edeab82d4110";

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("ZKS_TEST_HOST", "localhost");
		std::env::set_var("ZKS_TEST_PORT", "8545");

		let input = "url = \"http://${ZKS_TEST_HOST}:${ZKS_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("ZKS_TEST_HOST");
		std::env::remove_var("ZKS_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${ZKS_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${ZKS_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("ZKS_MISSING_VAR"));
	}

	#[test]
	fn test_oversized_input_rejected() {
		let input = "a".repeat(1024 * 1024 + 1);
		assert!(matches!(
			resolve_env_vars(&input),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_minimal_config_defaults() {
		let config: Config = r#"
[l1]
rpc_url = "http://localhost:8545"
"#
		.parse()
		.unwrap();

		assert!(config.l2.rpc_url.is_none());
		assert_eq!(config.l2.network, Network::Localhost);
		assert!(config.account.is_none());
		assert_eq!(config.polling.interval_ms, 500);
		assert_eq!(config.polling.max_attempts, None);
		assert_eq!(config.deposit.gas_per_pubdata, 800);
		assert_eq!(config.tx.gas_per_pubdata, 50_000);
	}

	#[test]
	fn test_full_config_with_env_key() {
		std::env::set_var("ZKS_TEST_PRIVATE_KEY", KEY);

		let config: Config = r#"
[l1]
rpc_url = "https://goerli.example.org"

[l2]
network = "goerli"

[account]
private_key = "${ZKS_TEST_PRIVATE_KEY}"

[polling]
interval_ms = 250
max_attempts = 40
"#
		.parse()
		.unwrap();

		assert_eq!(config.l2.network, Network::Goerli);
		assert_eq!(config.polling.max_attempts, Some(40));
		let account = config.account.unwrap();
		assert_eq!(account.private_key.to_bytes().unwrap()[0], 0x77);
		assert!(!format!("{:?}", account).contains("7726827c"));

		std::env::remove_var("ZKS_TEST_PRIVATE_KEY");
	}

	#[test]
	fn test_validation_errors() {
		let bad_url = "[l1]\nrpc_url = \"localhost:8545\"\n";
		assert!(matches!(
			bad_url.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		let bad_key = "[l1]\nrpc_url = \"http://localhost:8545\"\n[account]\nprivate_key = \"0x1234\"\n";
		assert!(matches!(
			bad_key.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		let zero_attempts =
			"[l1]\nrpc_url = \"http://localhost:8545\"\n[polling]\nmax_attempts = 0\n";
		assert!(matches!(
			zero_attempts.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_parse_error_is_reported() {
		let result = "[l1]\nrpc_url = 5\n".parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}

	#[tokio::test]
	async fn test_from_file() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");
		fs::write(
			&config_path,
			"[l1]\nrpc_url = \"http://localhost:8545\"\n[l2]\nrpc_url = \"http://localhost:3050\"\n",
		)
		.unwrap();

		let config = Config::from_file(&config_path).await.unwrap();
		assert_eq!(config.l2.rpc_url.as_deref(), Some("http://localhost:3050"));

		let missing = Config::from_file(temp_dir.path().join("missing.toml")).await;
		assert!(matches!(missing, Err(ConfigError::Io(_))));
	}
}
