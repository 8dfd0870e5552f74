//! Configuration loading for the adapter registrar.
//!
//! Settings come from environment variables. The adapter list is either the
//! built-in default (Velar and ALEX, deployed by the deployer) or a TOML file
//! named by `ADAPTERS_CONFIG`, in which `${VAR}` references are substituted
//! from the same variable source.

use registrar_types::{
	default_adapters, ContractId, Network, ProtocolAdapter, RegistrationConfig, RetryOptions,
	SecretString, StacksAddress,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::env;
use thiserror::Error;
use tracing::{debug, info};

pub const NETWORK: &str = "NETWORK";
pub const DEPLOYER_ADDRESS: &str = "DEPLOYER_ADDRESS";
pub const DEPLOYER_PRIVATE_KEY: &str = "DEPLOYER_PRIVATE_KEY";
pub const STACKS_API_URL: &str = "STACKS_API_URL";
pub const ROUTER_CONTRACT_NAME: &str = "ROUTER_CONTRACT_NAME";
pub const ADAPTERS_CONFIG: &str = "ADAPTERS_CONFIG";
pub const MAX_RETRIES: &str = "REGISTRAR_MAX_RETRIES";
pub const RETRY_DELAY_MS: &str = "REGISTRAR_RETRY_DELAY_MS";
pub const BACKOFF_MULTIPLIER: &str = "REGISTRAR_BACKOFF_MULTIPLIER";

pub const DEFAULT_ROUTER_CONTRACT_NAME: &str = "router";

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("{0} environment variable not set")]
	MissingVar(String),

	#[error("Invalid {name}: {message}")]
	InvalidValue { name: String, message: String },

	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl ConfigError {
	fn invalid(name: &str, message: impl ToString) -> Self {
		Self::InvalidValue {
			name: name.to_string(),
			message: message.to_string(),
		}
	}
}

/// Everything the registrar binary needs for one run.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	pub registration: RegistrationConfig,
	pub adapters: Vec<ProtocolAdapter>,
	pub retry: RetryOptions,
	/// Node API base URL, without a trailing slash.
	pub api_url: String,
}

/// Adapter list file layout.
#[derive(Debug, Deserialize)]
struct AdaptersFile {
	adapters: Vec<AdapterEntry>,
}

#[derive(Debug, Deserialize)]
struct AdapterEntry {
	name: String,
	contract_name: String,
	/// Defaults to the deployer address.
	contract_address: Option<String>,
}

/// Configuration loader reading from an explicit variable source.
#[derive(Debug, Default)]
pub struct ConfigLoader {
	vars: HashMap<String, String>,
}

impl ConfigLoader {
	/// Loader over the current process environment.
	pub fn from_env() -> Self {
		Self {
			vars: env::vars().collect(),
		}
	}

	/// Loader over an explicit set of variables.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: vars
				.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		}
	}

	pub async fn load(&self) -> Result<LoadedConfig, ConfigError> {
		let network = match self.var(NETWORK) {
			Some(value) => value
				.parse::<Network>()
				.map_err(|e| ConfigError::invalid(NETWORK, e))?,
			None => Network::default(),
		};

		let deployer_address: StacksAddress = self
			.required(DEPLOYER_ADDRESS)?
			.parse()
			.map_err(|e| ConfigError::invalid(DEPLOYER_ADDRESS, e))?;
		let private_key = SecretString::from(self.required(DEPLOYER_PRIVATE_KEY)?);

		let router_name = self
			.var(ROUTER_CONTRACT_NAME)
			.unwrap_or(DEFAULT_ROUTER_CONTRACT_NAME);
		let router_contract = ContractId::new(deployer_address, router_name)
			.map_err(|e| ConfigError::invalid(ROUTER_CONTRACT_NAME, e))?;

		let api_url = self
			.var(STACKS_API_URL)
			.unwrap_or(network.default_api_url())
			.trim_end_matches('/')
			.to_string();

		let adapters = match self.var(ADAPTERS_CONFIG) {
			Some(path) => self.load_adapters_file(path, &deployer_address).await?,
			None => default_adapters(&deployer_address),
		};

		let retry = self.retry_options()?;

		let config = LoadedConfig {
			registration: RegistrationConfig {
				network,
				router_contract,
				deployer_address,
				private_key,
			},
			adapters,
			retry,
			api_url,
		};

		self.validate_config(&config)?;

		info!(
			"Loaded configuration for {} with {} adapters",
			config.registration.network,
			config.adapters.len()
		);

		Ok(config)
	}

	/// Non-empty value of `name`.
	fn var(&self, name: &str) -> Option<&str> {
		self.vars
			.get(name)
			.map(|value| value.trim())
			.filter(|value| !value.is_empty())
	}

	fn required(&self, name: &str) -> Result<&str, ConfigError> {
		self.var(name)
			.ok_or_else(|| ConfigError::MissingVar(name.to_string()))
	}

	fn parsed<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
	where
		T: std::str::FromStr,
		T::Err: std::fmt::Display,
	{
		match self.var(name) {
			Some(value) => value.parse().map_err(|e| ConfigError::invalid(name, e)),
			None => Ok(default),
		}
	}

	fn retry_options(&self) -> Result<RetryOptions, ConfigError> {
		let defaults = RetryOptions::default();
		Ok(RetryOptions {
			max_retries: self.parsed(MAX_RETRIES, defaults.max_retries)?,
			delay_ms: self.parsed(RETRY_DELAY_MS, defaults.delay_ms)?,
			backoff_multiplier: self.parsed(BACKOFF_MULTIPLIER, defaults.backoff_multiplier)?,
		})
	}

	async fn load_adapters_file(
		&self,
		path: &str,
		deployer: &StacksAddress,
	) -> Result<Vec<ProtocolAdapter>, ConfigError> {
		debug!("Loading adapters from {}", path);

		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(path.to_string())
			} else {
				ConfigError::IoError(e)
			}
		})?;

		let substituted_content = self.substitute_vars(&content)?;

		let file: AdaptersFile = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		file.adapters
			.into_iter()
			.map(|entry| {
				let address = match entry.contract_address.as_deref() {
					Some(address) => address.parse().map_err(|e| {
						ConfigError::ValidationError(format!(
							"adapter '{}' has an invalid contract address: {}",
							entry.name, e
						))
					})?,
					None => *deployer,
				};
				ProtocolAdapter::new(entry.name.clone(), entry.contract_name, address).map_err(
					|e| ConfigError::ValidationError(format!("adapter '{}': {}", entry.name, e)),
				)
			})
			.collect()
	}

	/// Replaces `${VAR_NAME}` references with values from the variable source.
	fn substitute_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		let re = regex::Regex::new(r"\$\{([^}]+)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let value = self
				.vars
				.get(var_name)
				.ok_or_else(|| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, value);
		}

		Ok(result)
	}

	fn validate_config(&self, config: &LoadedConfig) -> Result<(), ConfigError> {
		let registration = &config.registration;
		let network = registration.network;

		if !network.accepts_address(&registration.deployer_address) {
			return Err(ConfigError::ValidationError(format!(
				"deployer address {} is not a {} address",
				registration.deployer_address, network
			)));
		}

		if config.adapters.is_empty() {
			return Err(ConfigError::ValidationError(
				"At least one adapter must be configured".to_string(),
			));
		}

		let mut seen = HashSet::new();
		for adapter in &config.adapters {
			if !seen.insert(adapter.protocol_id()) {
				return Err(ConfigError::ValidationError(format!(
					"duplicate adapter '{}'",
					adapter.name()
				)));
			}
			if !network.accepts_address(adapter.contract_address()) {
				return Err(ConfigError::ValidationError(format!(
					"adapter '{}' address {} is not a {} address",
					adapter.name(),
					adapter.contract_address(),
					network
				)));
			}
		}

		let multiplier = config.retry.backoff_multiplier;
		if !multiplier.is_finite() || multiplier < 1.0 {
			return Err(ConfigError::invalid(
				BACKOFF_MULTIPLIER,
				"must be a finite number of at least 1",
			));
		}

		Ok(())
	}
}
