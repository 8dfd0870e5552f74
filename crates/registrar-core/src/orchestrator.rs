//! Registration run orchestration.
//!
//! A run goes through four phases: validate, check status, register and a
//! final status check. Each phase returns a value and the orchestrator decides
//! from those values whether to continue.

use crate::{
	registrar::register_adapters,
	status::{check_all_adapters_status, display_status_summary},
	validator::validate_all_adapters,
};
use registrar_config::LoadedConfig;
use registrar_types::{
	default_adapters, errors::Result, AdapterMap, NetworkClient, ProtocolAdapter, RegistrarError,
	RegistrationConfig, RegistrationOutcomes, RegistrationStatus, RetryOptions, StatusSummary,
	ValidationResult,
};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// How a registration run ended.
#[derive(Debug)]
pub enum RunOutcome {
	/// At least one adapter contract failed validation; nothing was registered.
	ValidationFailed {
		validations: AdapterMap<ValidationResult>,
	},
	/// Every adapter was registered before the run; nothing was submitted.
	AlreadyRegistered { statuses: Vec<RegistrationStatus> },
	/// Registration was attempted for every adapter.
	Completed {
		outcomes: RegistrationOutcomes,
		final_statuses: Vec<RegistrationStatus>,
		summary: StatusSummary,
	},
}

impl RunOutcome {
	pub fn is_success(&self) -> bool {
		match self {
			RunOutcome::ValidationFailed { .. } => false,
			RunOutcome::AlreadyRegistered { .. } => true,
			RunOutcome::Completed { outcomes, .. } => outcomes.failure_count() == 0,
		}
	}

	/// Process exit status: 0 on success, 1 otherwise.
	pub fn exit_code(&self) -> u8 {
		if self.is_success() {
			0
		} else {
			1
		}
	}
}

pub struct Orchestrator {
	client: Arc<dyn NetworkClient>,
	config: RegistrationConfig,
	adapters: Vec<ProtocolAdapter>,
	retry: RetryOptions,
}

impl Orchestrator {
	pub fn builder() -> OrchestratorBuilder {
		OrchestratorBuilder::new()
	}

	pub fn adapters(&self) -> &[ProtocolAdapter] {
		&self.adapters
	}

	pub fn config(&self) -> &RegistrationConfig {
		&self.config
	}

	/// Validation phase on its own.
	pub async fn validate(&self) -> AdapterMap<ValidationResult> {
		validate_all_adapters(self.client.as_ref(), &self.adapters).await
	}

	/// Status snapshot of every adapter, in order.
	pub async fn check_status(&self) -> Vec<RegistrationStatus> {
		check_all_adapters_status(self.client.as_ref(), &self.adapters, &self.config).await
	}

	/// Runs all phases once.
	pub async fn run(&self) -> RunOutcome {
		let run_id = Uuid::new_v4();
		let span = tracing::info_span!("registration_run", %run_id);
		self.run_phases().instrument(span).await
	}

	async fn run_phases(&self) -> RunOutcome {
		info!("Validating adapter contracts...");
		let validations = self.validate().await;
		if validations.values().any(|result| !result.is_valid) {
			error!("Adapter validation failed, aborting registration");
			return RunOutcome::ValidationFailed { validations };
		}

		info!("Checking current registration status...");
		let statuses = self.check_status().await;
		if statuses.iter().all(|status| status.is_registered) {
			info!("All adapters already registered");
			return RunOutcome::AlreadyRegistered { statuses };
		}

		info!("Registering adapters...");
		let outcomes = register_adapters(
			self.client.as_ref(),
			&self.adapters,
			&self.config,
			&self.retry,
		)
		.await;

		info!("Checking final registration status...");
		let final_statuses = self.check_status().await;
		let summary = display_status_summary(&final_statuses);

		if outcomes.failure_count() > 0 {
			warn!(
				"{} of {} registrations failed",
				outcomes.failure_count(),
				outcomes.len()
			);
		} else {
			info!("All registrations submitted");
		}

		RunOutcome::Completed {
			outcomes,
			final_statuses,
			summary,
		}
	}
}

/// Builder for creating an Orchestrator instance
#[derive(Default)]
pub struct OrchestratorBuilder {
	client: Option<Arc<dyn NetworkClient>>,
	config: Option<RegistrationConfig>,
	adapters: Option<Vec<ProtocolAdapter>>,
	retry: Option<RetryOptions>,
}

impl OrchestratorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_client(mut self, client: Arc<dyn NetworkClient>) -> Self {
		self.client = Some(client);
		self
	}

	/// Takes registration settings, adapters and retry policy from a loaded
	/// configuration.
	pub fn with_config(mut self, config: LoadedConfig) -> Self {
		self.config = Some(config.registration);
		self.adapters = Some(config.adapters);
		self.retry = Some(config.retry);
		self
	}

	pub fn with_registration_config(mut self, config: RegistrationConfig) -> Self {
		self.config = Some(config);
		self
	}

	pub fn with_adapters(mut self, adapters: Vec<ProtocolAdapter>) -> Self {
		self.adapters = Some(adapters);
		self
	}

	pub fn with_retry_options(mut self, retry: RetryOptions) -> Self {
		self.retry = Some(retry);
		self
	}

	pub fn build(self) -> Result<Orchestrator> {
		let client = self.client.ok_or_else(|| {
			RegistrarError::Config("No network client provided".to_string())
		})?;
		let config = self.config.ok_or_else(|| {
			RegistrarError::Config("No registration configuration provided".to_string())
		})?;

		if client.network() != config.network {
			return Err(RegistrarError::Config(format!(
				"network client targets {} but configuration targets {}",
				client.network(),
				config.network
			)));
		}

		let adapters = self
			.adapters
			.unwrap_or_else(|| default_adapters(&config.deployer_address));

		Ok(Orchestrator {
			client,
			config,
			adapters,
			retry: self.retry.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{adapter, test_config, MockRouter};
	use registrar_types::Network;

	fn orchestrator(router: Arc<MockRouter>, adapters: Vec<ProtocolAdapter>) -> Orchestrator {
		Orchestrator::builder()
			.with_client(router)
			.with_registration_config(test_config())
			.with_adapters(adapters)
			.with_retry_options(RetryOptions::none())
			.build()
			.unwrap()
	}

	#[test]
	fn test_builder_defaults_to_shipped_adapters() {
		let orchestrator = Orchestrator::builder()
			.with_client(Arc::new(MockRouter::new()))
			.with_registration_config(test_config())
			.build()
			.unwrap();

		let names: Vec<_> = orchestrator.adapters().iter().map(|a| a.name()).collect();
		assert_eq!(names, vec!["Velar", "ALEX"]);
	}

	#[test]
	fn test_builder_requires_client_and_config() {
		assert!(Orchestrator::builder()
			.with_registration_config(test_config())
			.build()
			.is_err());
		assert!(Orchestrator::builder()
			.with_client(Arc::new(MockRouter::new()))
			.build()
			.is_err());
	}

	#[test]
	fn test_builder_rejects_network_mismatch() {
		let mut config = test_config();
		config.network = Network::Mainnet;

		let result = Orchestrator::builder()
			.with_client(Arc::new(MockRouter::new()))
			.with_registration_config(config)
			.build();
		assert!(matches!(result, Err(RegistrarError::Config(_))));
	}

	#[tokio::test]
	async fn test_registers_unregistered_adapters() {
		let router = Arc::new(MockRouter::new());
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		assert_eq!(outcome.exit_code(), 0);
		match outcome {
			RunOutcome::Completed {
				outcomes,
				final_statuses,
				summary,
			} => {
				assert_eq!(outcomes.len(), 2);
				assert_eq!(outcomes.success_count(), 2);
				assert!(final_statuses.iter().all(|status| status.is_registered));
				assert!(summary.all_registered());
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert_eq!(router.contract_calls().len(), 2);
	}

	#[tokio::test]
	async fn test_already_registered_makes_no_calls() {
		let router = Arc::new(MockRouter::new().with_registered("velar").with_registered("alex"));
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		assert!(matches!(outcome, RunOutcome::AlreadyRegistered { ref statuses } if statuses.len() == 2));
		assert_eq!(outcome.exit_code(), 0);
		assert!(router.contract_calls().is_empty());
	}

	#[tokio::test]
	async fn test_validation_failure_blocks_all_registrations() {
		let router = Arc::new(MockRouter::new().with_missing_contract("alex-adapter"));
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		match &outcome {
			RunOutcome::ValidationFailed { validations } => {
				assert_eq!(validations.len(), 2);
				assert!(validations.get("Velar").unwrap().is_valid);
				assert!(!validations.get("ALEX").unwrap().is_valid);
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
		assert_eq!(outcome.exit_code(), 1);
		assert!(router.contract_calls().is_empty());
	}

	#[tokio::test]
	async fn test_partial_failure_exits_nonzero() {
		let router = Arc::new(MockRouter::new().with_failing_registration("alex", u32::MAX));
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		assert_eq!(outcome.exit_code(), 1);
		match outcome {
			RunOutcome::Completed {
				outcomes,
				final_statuses,
				summary,
			} => {
				assert!(outcomes.get("Velar").unwrap().is_ok());
				assert!(outcomes.get("ALEX").unwrap().is_err());
				assert_eq!(final_statuses.len(), 2);
				assert_eq!(summary.registered, 1);
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_registered_adapters_are_not_filtered_out() {
		let router = Arc::new(MockRouter::new().with_registered("velar"));
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		assert_eq!(outcome.exit_code(), 0);
		// the full list is submitted once a registration is needed
		assert_eq!(router.contract_calls().len(), 2);
	}

	#[tokio::test]
	async fn test_status_error_counts_as_unregistered() {
		let router = Arc::new(
			MockRouter::new()
				.with_registered("velar")
				.with_registered("alex")
				.with_status_error("alex"),
		);
		let outcome = orchestrator(router.clone(), vec![adapter("Velar"), adapter("ALEX")])
			.run()
			.await;

		assert!(matches!(outcome, RunOutcome::Completed { .. }));
		assert_eq!(router.contract_calls().len(), 2);
	}
}
