use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registrar_chains::{HiroClient, StacksPrivateKey};
use registrar_config::{ConfigLoader, LoadedConfig};
use registrar_core::{display_status_summary, Orchestrator, OrchestratorBuilder, RunOutcome};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "register-adapters")]
#[command(about = "Registers protocol adapters with the router contract", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
	#[arg(long, env = "REGISTRAR_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
	/// Validate, register unregistered adapters and report (default)
	Register,
	/// Only validate the adapter contracts
	Validate,
	/// Only report the current registration status
	Status,
}

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	if let Err(e) = setup_tracing(&cli.log_level) {
		eprintln!("Error: {:#}", e);
		return ExitCode::FAILURE;
	}

	match run(cli.command.unwrap_or(Commands::Register)).await {
		Ok(code) => ExitCode::from(code),
		Err(e) => {
			eprintln!("Error: {:#}", e);
			ExitCode::FAILURE
		}
	}
}

async fn run(command: Commands) -> Result<u8> {
	let config = ConfigLoader::from_env().load().await?;

	print_header(&config);
	check_deployer_key(&config)?;

	let client = HiroClient::builder(config.registration.network)
		.with_api_url(config.api_url.clone())
		.build()
		.context("Failed to create network client")?;

	let orchestrator = OrchestratorBuilder::new()
		.with_client(Arc::new(client))
		.with_config(config)
		.build()
		.context("Failed to build orchestrator")?;

	match command {
		Commands::Register => {
			let outcome = orchestrator.run().await;
			for line in outcome_lines(&outcome) {
				info!("{}", line);
			}
			Ok(outcome.exit_code())
		}
		Commands::Validate => validate_only(&orchestrator).await,
		Commands::Status => status_only(&orchestrator).await,
	}
}

async fn validate_only(orchestrator: &Orchestrator) -> Result<u8> {
	let validations = orchestrator.validate().await;
	let invalid = validations.values().filter(|result| !result.is_valid).count();

	if invalid == 0 {
		info!("All {} adapters are valid", validations.len());
		Ok(0)
	} else {
		warn!("{} of {} adapters failed validation", invalid, validations.len());
		Ok(1)
	}
}

async fn status_only(orchestrator: &Orchestrator) -> Result<u8> {
	let statuses = orchestrator.check_status().await;
	display_status_summary(&statuses);

	if statuses.iter().any(|status| status.error.is_some()) {
		warn!("Some registration statuses could not be determined");
		return Ok(1);
	}
	Ok(0)
}

fn print_header(config: &LoadedConfig) {
	let registration = &config.registration;
	info!("Adapter registration");
	info!("  Network: {}", registration.network);
	info!("  Deployer: {}", registration.deployer_address);
	info!("  Router: {}", registration.router_contract);
	info!("  API: {}", config.api_url);
}

/// Fails on an unusable key and warns when the key does not belong to the
/// deployer account.
fn check_deployer_key(config: &LoadedConfig) -> Result<()> {
	let registration = &config.registration;
	let key = StacksPrivateKey::from_hex(registration.private_key.expose_secret())
		.context("Invalid DEPLOYER_PRIVATE_KEY")?;
	let derived = key.address(registration.network)?;

	if derived != registration.deployer_address {
		warn!(
			"DEPLOYER_PRIVATE_KEY signs for {}, not DEPLOYER_ADDRESS {}",
			derived, registration.deployer_address
		);
	}
	Ok(())
}

/// Human-readable summary of a finished run.
fn outcome_lines(outcome: &RunOutcome) -> Vec<String> {
	let mut lines = Vec::new();

	match outcome {
		RunOutcome::ValidationFailed { validations } => {
			lines.push("Validation failed, no adapters were registered:".to_string());
			for (adapter, result) in validations.iter().filter(|(_, r)| !r.is_valid) {
				lines.push(format!("  ✗ {}: {}", adapter, result.errors.join(", ")));
			}
		}
		RunOutcome::AlreadyRegistered { statuses } => {
			lines.push(format!(
				"All {} adapters are already registered, nothing to do",
				statuses.len()
			));
		}
		RunOutcome::Completed {
			outcomes, summary, ..
		} => {
			lines.push("Registration results:".to_string());
			for (adapter, result) in outcomes.iter() {
				match result {
					Ok(txid) => lines.push(format!("  ✓ {}: {}", adapter, txid)),
					// errors already carry the adapter name
					Err(e) => lines.push(format!("  ✗ {}", e)),
				}
			}
			lines.push(format!(
				"{} succeeded, {} failed; {}/{} registered on chain",
				outcomes.success_count(),
				outcomes.failure_count(),
				summary.registered,
				summary.total
			));
		}
	}

	lines
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.with_context(|| format!("Invalid log level '{}'", log_level))?;

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.context("Failed to install tracing subscriber")?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use registrar_types::{
		AdapterMap, RegistrarError, RegistrationOutcomes, StatusSummary, ValidationResult,
	};

	#[test]
	fn test_cli_defaults_to_register() {
		let cli = Cli::try_parse_from(["register-adapters", "--log-level", "debug"]).unwrap();
		assert_eq!(cli.command, None);
		assert_eq!(cli.log_level, "debug");
	}

	#[test]
	fn test_cli_subcommands() {
		let cli = Cli::try_parse_from(["register-adapters", "status"]).unwrap();
		assert_eq!(cli.command, Some(Commands::Status));

		let cli = Cli::try_parse_from(["register-adapters", "validate"]).unwrap();
		assert_eq!(cli.command, Some(Commands::Validate));

		assert!(Cli::try_parse_from(["register-adapters", "--network", "mainnet"]).is_err());
	}

	#[test]
	fn test_completed_outcome_lines() {
		let mut outcomes = RegistrationOutcomes::new();
		outcomes.insert("Velar", Ok("0xabc".to_string()));
		outcomes.insert(
			"ALEX",
			Err(RegistrarError::registration(
				"ALEX",
				RegistrarError::Broadcast("no txid received".to_string()),
			)),
		);
		let outcome = RunOutcome::Completed {
			outcomes,
			final_statuses: Vec::new(),
			summary: StatusSummary {
				total: 2,
				registered: 1,
			},
		};

		let lines = outcome_lines(&outcome);
		assert_eq!(lines[1], "  ✓ Velar: 0xabc");
		assert_eq!(
			lines[2],
			"  ✗ ALEX: Transaction broadcast failed: no txid received"
		);
		assert_eq!(lines[3], "1 succeeded, 1 failed; 1/2 registered on chain");
	}

	#[test]
	fn test_validation_failed_lines_list_only_invalid() {
		let mut validations = AdapterMap::new();
		validations.insert("Velar", ValidationResult::valid());
		validations.insert("ALEX", ValidationResult::invalid("Contract not found"));

		let lines = outcome_lines(&RunOutcome::ValidationFailed { validations });
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[1], "  ✗ ALEX: Contract not found");
	}
}
