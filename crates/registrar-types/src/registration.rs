//! Registration run configuration and per-phase results.

use crate::address::{ContractId, StacksAddress};
use crate::network::Network;
use crate::secret_string::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a registration run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
	pub network: Network,
	/// Router contract, `address.name`.
	pub router_contract: ContractId,
	pub deployer_address: StacksAddress,
	/// Signing key for `register-protocol` transactions. Never logged.
	pub private_key: SecretString,
}

/// Outcome of checking that an adapter contract is deployed and callable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub is_valid: bool,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
}

impl ValidationResult {
	pub fn valid() -> Self {
		Self {
			is_valid: true,
			errors: Vec::new(),
			warnings: Vec::new(),
		}
	}

	pub fn invalid(error: impl Into<String>) -> Self {
		Self {
			is_valid: false,
			errors: vec![error.into()],
			warnings: Vec::new(),
		}
	}

	pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
		self.warnings.push(warning.into());
		self
	}
}

/// Point-in-time registration state of one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
	pub adapter: String,
	pub is_registered: bool,
	pub error: Option<String>,
}

impl RegistrationStatus {
	pub fn new(adapter: impl Into<String>, is_registered: bool) -> Self {
		Self {
			adapter: adapter.into(),
			is_registered,
			error: None,
		}
	}

	/// A status that could not be determined. Never counts as registered.
	pub fn unknown(adapter: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			adapter: adapter.into(),
			is_registered: false,
			error: Some(error.into()),
		}
	}
}

/// Counts derived from one status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
	pub total: usize,
	pub registered: usize,
}

impl StatusSummary {
	pub fn from_statuses(statuses: &[RegistrationStatus]) -> Self {
		Self {
			total: statuses.len(),
			registered: statuses.iter().filter(|s| s.is_registered).count(),
		}
	}

	pub fn not_registered(&self) -> usize {
		self.total - self.registered
	}

	pub fn all_registered(&self) -> bool {
		self.registered == self.total
	}
}

/// Exponential backoff policy for registration attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryOptions {
	/// Retries after the first attempt; total attempts are `max_retries + 1`.
	pub max_retries: u32,
	/// Delay before the first retry, in milliseconds.
	pub delay_ms: u64,
	/// Factor applied to the delay after every retry.
	pub backoff_multiplier: f64,
}

impl RetryOptions {
	pub fn initial_delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}

	/// No retries and no delay.
	pub fn none() -> Self {
		Self {
			max_retries: 0,
			delay_ms: 0,
			backoff_multiplier: 1.0,
		}
	}
}

impl Default for RetryOptions {
	fn default() -> Self {
		Self {
			max_retries: 3,
			delay_ms: 2000,
			backoff_multiplier: 2.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validation_result_constructors() {
		let ok = ValidationResult::valid();
		assert!(ok.is_valid);
		assert!(ok.errors.is_empty());
		assert!(ok.warnings.is_empty());

		let failed = ValidationResult::invalid("Contract not found");
		assert!(!failed.is_valid);
		assert_eq!(failed.errors, vec!["Contract not found".to_string()]);

		let warned = ValidationResult::valid().with_warning("get-name returned an error");
		assert!(warned.is_valid);
		assert_eq!(warned.warnings.len(), 1);
	}

	#[test]
	fn test_unknown_status_is_not_registered() {
		let status = RegistrationStatus::unknown("Velar", "connection refused");
		assert!(!status.is_registered);
		assert_eq!(status.error.as_deref(), Some("connection refused"));
	}

	#[test]
	fn test_status_summary() {
		let statuses = vec![
			RegistrationStatus::new("Velar", true),
			RegistrationStatus::new("ALEX", false),
		];
		let summary = StatusSummary::from_statuses(&statuses);
		assert_eq!(summary.total, 2);
		assert_eq!(summary.registered, 1);
		assert_eq!(summary.not_registered(), 1);
		assert!(!summary.all_registered());
	}

	#[test]
	fn test_default_retry_policy() {
		let options = RetryOptions::default();
		assert_eq!(options.max_retries, 3);
		assert_eq!(options.initial_delay(), Duration::from_millis(2000));
		assert_eq!(options.backoff_multiplier, 2.0);
	}
}
