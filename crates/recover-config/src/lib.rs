//! Configuration for the recover check.
//!
//! `RecoverConfig` is built once, from an optional TOML file, environment
//! overrides and command-line overrides (in that order), then validated and
//! passed down to the components that need it.

use recover_types::{
	check_http_url, check_private_key, hex_private_key, http_url, Address, CheckError, Field,
	FieldType, PollPolicy, Schema, ValidationError,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Schema error: {0}")]
	Schema(#[from] ValidationError),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<ConfigError> for CheckError {
	fn from(err: ConfigError) -> Self {
		CheckError::Config(err.to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoverConfig {
	#[serde(default)]
	pub network: NetworkConfig,
	#[serde(default)]
	pub poll: PollConfig,
	#[serde(default)]
	pub message: MessageConfig,
}

impl RecoverConfig {
	/// Key used to sign the message digest; falls back to the transaction key.
	pub fn signer_key(&self) -> &str {
		self.network
			.signer_key
			.as_deref()
			.unwrap_or(&self.network.private_key)
	}
}

/// Node endpoint and keys.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// HTTP JSON-RPC endpoint.
	#[serde(default)]
	pub rpc_url: String,
	/// Hex key that signs and pays for transactions.
	#[serde(default)]
	pub private_key: String,
	/// Hex key that signs the message digest.
	#[serde(default)]
	pub signer_key: Option<String>,
}

impl std::fmt::Debug for NetworkConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NetworkConfig")
			.field("rpc_url", &self.rpc_url)
			.field("private_key", &"<redacted>")
			.field("signer_key", &self.signer_key.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Receipt polling schedule, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_initial_delay_secs")]
	pub initial_delay_secs: u64,
	#[serde(default = "default_step_delay_secs")]
	pub step_delay_secs: u64,
	#[serde(default = "default_query_timeout_secs")]
	pub query_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
	10
}

fn default_initial_delay_secs() -> u64 {
	6
}

fn default_step_delay_secs() -> u64 {
	5
}

fn default_query_timeout_secs() -> u64 {
	3
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			initial_delay_secs: default_initial_delay_secs(),
			step_delay_secs: default_step_delay_secs(),
			query_timeout_secs: default_query_timeout_secs(),
		}
	}
}

impl PollConfig {
	pub fn policy(&self) -> PollPolicy {
		PollPolicy {
			max_attempts: self.max_attempts,
			initial_delay: Duration::from_secs(self.initial_delay_secs),
			step_delay: Duration::from_secs(self.step_delay_secs),
			query_timeout: Duration::from_secs(self.query_timeout_secs),
		}
	}
}

/// The access grant whose digest gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageConfig {
	#[serde(default = "default_access")]
	pub access: Address,
	#[serde(default = "default_amount")]
	pub amount: u64,
	#[serde(default = "default_allowed")]
	pub allowed: bool,
}

fn default_access() -> Address {
	Address([
		0x5b, 0x38, 0xda, 0x6a, 0x70, 0x1c, 0x56, 0x85, 0x45, 0xdc, 0xfc, 0xb0, 0x3f, 0xcb, 0x87,
		0x5f, 0x56, 0xbe, 0xdd, 0xc4,
	])
}

fn default_amount() -> u64 {
	1
}

fn default_allowed() -> bool {
	true
}

impl Default for MessageConfig {
	fn default() -> Self {
		Self {
			access: default_access(),
			amount: default_amount(),
			allowed: default_allowed(),
		}
	}
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub rpc_url: Option<String>,
	pub private_key: Option<String>,
	pub signer_key: Option<String>,
}

/// Schema the raw TOML file is checked against before deserialization.
fn file_schema() -> Schema {
	let seconds = || FieldType::Integer {
		min: Some(0),
		max: None,
	};

	Schema::new(
		vec![],
		vec![
			Field::new(
				"network",
				FieldType::Table(Schema::new(
					vec![],
					vec![
						Field::new("rpc_url", FieldType::String).with_validator(http_url),
						Field::new("private_key", FieldType::String)
							.with_validator(hex_private_key),
						Field::new("signer_key", FieldType::String)
							.with_validator(hex_private_key),
					],
				)),
			),
			Field::new(
				"poll",
				FieldType::Table(Schema::new(
					vec![],
					vec![
						Field::new(
							"max_attempts",
							FieldType::Integer {
								min: Some(1),
								max: Some(u32::MAX as i64),
							},
						),
						Field::new("initial_delay_secs", seconds()),
						Field::new("step_delay_secs", seconds()),
						Field::new(
							"query_timeout_secs",
							FieldType::Integer {
								min: Some(1),
								max: None,
							},
						),
					],
				)),
			),
			Field::new(
				"message",
				FieldType::Table(Schema::new(
					vec![],
					vec![
						Field::new("access", FieldType::String).with_validator(|value| {
							value
								.as_str()
								.unwrap_or_default()
								.parse::<Address>()
								.map(|_| ())
								.map_err(|e| e.to_string())
						}),
						Field::new(
							"amount",
							FieldType::Integer {
								min: Some(0),
								max: None,
							},
						),
						Field::new("allowed", FieldType::Boolean),
					],
				)),
			),
		],
	)
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
	overrides: Overrides,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "RECOVER_".to_string(),
			overrides: Overrides::default(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub fn with_overrides(mut self, overrides: Overrides) -> Self {
		self.overrides = overrides;
		self
	}

	pub async fn load(&self) -> Result<RecoverConfig, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) => self.load_from_file(path).await?,
			None => RecoverConfig::default(),
		};

		self.apply_env_overrides(&mut config)?;
		self.apply_overrides(&mut config);
		self.validate_config(&config)?;

		debug!(?config, "Configuration loaded");
		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<RecoverConfig, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		let table: toml::Table =
			toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		let mut raw = toml::Value::Table(table);
		let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;
		substitute_env_vars(&re, &mut raw)?;

		file_schema().validate(&raw)?;

		raw.try_into().map_err(|e| ConfigError::ParseError(e.to_string()))
	}

	fn apply_env_overrides(&self, config: &mut RecoverConfig) -> Result<(), ConfigError> {
		if let Ok(rpc_url) = env::var(format!("{}ETH", self.env_prefix)) {
			config.network.rpc_url = rpc_url;
		}

		if let Ok(private_key) = env::var(format!("{}SK", self.env_prefix)) {
			config.network.private_key = private_key;
		}

		if let Ok(signer_key) = env::var(format!("{}SIGNER_KEY", self.env_prefix)) {
			config.network.signer_key = Some(signer_key);
		}

		if let Ok(max_attempts) = env::var(format!("{}MAX_ATTEMPTS", self.env_prefix)) {
			config.poll.max_attempts = max_attempts.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid max attempts: {}", e))
			})?;
		}

		Ok(())
	}

	fn apply_overrides(&self, config: &mut RecoverConfig) {
		if let Some(rpc_url) = &self.overrides.rpc_url {
			config.network.rpc_url = rpc_url.clone();
		}
		if let Some(private_key) = &self.overrides.private_key {
			config.network.private_key = private_key.clone();
		}
		if let Some(signer_key) = &self.overrides.signer_key {
			config.network.signer_key = Some(signer_key.clone());
		}
	}

	fn validate_config(&self, config: &RecoverConfig) -> Result<(), ConfigError> {
		if config.network.rpc_url.is_empty() {
			return Err(ConfigError::ValidationError(
				"RPC endpoint is required (--eth or network.rpc_url)".to_string(),
			));
		}
		check_http_url(&config.network.rpc_url).map_err(ConfigError::ValidationError)?;

		if config.network.private_key.is_empty() {
			return Err(ConfigError::ValidationError(
				"Private key is required (--sk or network.private_key)".to_string(),
			));
		}
		check_private_key(&config.network.private_key)
			.map_err(|e| ConfigError::ValidationError(format!("private_key: {}", e)))?;

		if let Some(signer_key) = &config.network.signer_key {
			check_private_key(signer_key)
				.map_err(|e| ConfigError::ValidationError(format!("signer_key: {}", e)))?;
		}

		if config.poll.max_attempts == 0 {
			return Err(ConfigError::ValidationError(
				"poll.max_attempts must be at least 1".to_string(),
			));
		}

		if config.poll.query_timeout_secs == 0 {
			return Err(ConfigError::ValidationError(
				"poll.query_timeout_secs must be at least 1".to_string(),
			));
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` inside string values with the environment
/// variable's value. Comments and keys are left alone.
fn substitute_env_vars(re: &Regex, value: &mut toml::Value) -> Result<(), ConfigError> {
	match value {
		toml::Value::String(text) => {
			let mut result = text.clone();
			for cap in re.captures_iter(text) {
				let var_name = &cap[1];
				let env_value = env::var(var_name)
					.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
				result = result.replace(&cap[0], &env_value);
			}
			*text = result;
		}
		toml::Value::Array(items) => {
			for item in items {
				substitute_env_vars(re, item)?;
			}
		}
		toml::Value::Table(table) => {
			for (_, item) in table.iter_mut() {
				substitute_env_vars(re, item)?;
			}
		}
		_ => {}
	}

	Ok(())
}
