//! Router registration status checks.

use registrar_types::{
	ClarityValue, NetworkClient, ProtocolAdapter, ReadOnlyCall, RegistrationConfig,
	RegistrationStatus, StatusSummary,
};
use tracing::{info, warn};

pub const IS_REGISTERED_FUNCTION: &str = "is-protocol-registered";

/// Asks the router whether `adapter` is registered.
///
/// Any failure, including an unexpected answer, yields a status that is not
/// registered and carries the error message.
pub async fn check_adapter_registration(
	client: &dyn NetworkClient,
	adapter: &ProtocolAdapter,
	config: &RegistrationConfig,
) -> RegistrationStatus {
	let router = &config.router_contract;
	let call = ReadOnlyCall::new(router.clone(), IS_REGISTERED_FUNCTION, *router.address())
		.with_args(vec![ClarityValue::string_ascii(adapter.protocol_id())]);

	match client.call_read_only(&call).await {
		Ok(value) => match value.as_bool() {
			Some(is_registered) => RegistrationStatus::new(adapter.name(), is_registered),
			None => RegistrationStatus::unknown(
				adapter.name(),
				format!("unexpected response from {}: {}", IS_REGISTERED_FUNCTION, value),
			),
		},
		Err(e) => RegistrationStatus::unknown(adapter.name(), e.to_string()),
	}
}

/// Checks every adapter in order, one status per adapter.
pub async fn check_all_adapters_status(
	client: &dyn NetworkClient,
	adapters: &[ProtocolAdapter],
	config: &RegistrationConfig,
) -> Vec<RegistrationStatus> {
	let mut statuses = Vec::with_capacity(adapters.len());

	for adapter in adapters {
		let status = check_adapter_registration(client, adapter, config).await;

		match (&status.error, status.is_registered) {
			(Some(error), _) => warn!("✗ {}: Error - {}", adapter.name(), error),
			(None, true) => info!("✓ {}: Registered", adapter.name()),
			(None, false) => info!("✗ {}: Not registered", adapter.name()),
		}

		statuses.push(status);
	}

	statuses
}

pub fn display_status_summary(statuses: &[RegistrationStatus]) -> StatusSummary {
	let summary = StatusSummary::from_statuses(statuses);

	info!("Registration summary:");
	info!("  Total adapters: {}", summary.total);
	info!("  Registered: {}", summary.registered);
	info!("  Not registered: {}", summary.not_registered());

	if summary.all_registered() {
		info!("{}", summary_verdict(&summary));
	} else {
		warn!("{}", summary_verdict(&summary));
	}

	summary
}

/// Closing line of the status summary.
pub fn summary_verdict(summary: &StatusSummary) -> &'static str {
	if summary.all_registered() {
		"All adapters are registered!"
	} else {
		"Some adapters are not registered"
	}
}
