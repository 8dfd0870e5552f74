//! Adapter contract validation.
//!
//! An adapter is valid when its contract answers the read-only `get-name`
//! call. Validation never stops early: every adapter gets a result.

use registrar_types::{
	AdapterMap, ContractId, NetworkClient, ProtocolAdapter, ReadOnlyCall, StacksAddress,
	ValidationResult,
};
use tracing::{error, info, warn};

pub const GET_NAME_FUNCTION: &str = "get-name";

/// Checks that `contract_address.contract_name` is deployed and callable.
pub async fn validate_adapter_contract(
	client: &dyn NetworkClient,
	contract_address: &StacksAddress,
	contract_name: &str,
) -> ValidationResult {
	let not_accessible = |cause: &dyn std::fmt::Display| {
		ValidationResult::invalid(format!(
			"Contract {}.{} not found or not accessible: {}",
			contract_address, contract_name, cause
		))
	};

	let contract = match ContractId::new(*contract_address, contract_name) {
		Ok(contract) => contract,
		Err(e) => return not_accessible(&e),
	};

	let call = ReadOnlyCall::new(contract, GET_NAME_FUNCTION, *contract_address);
	match client.call_read_only(&call).await {
		Ok(value) if value.is_response_err() => ValidationResult::valid()
			.with_warning(format!("get-name returned an error response: {}", value)),
		Ok(_) => ValidationResult::valid(),
		Err(e) => not_accessible(&e),
	}
}

/// Validates every adapter in order. The result has one entry per adapter.
pub async fn validate_all_adapters(
	client: &dyn NetworkClient,
	adapters: &[ProtocolAdapter],
) -> AdapterMap<ValidationResult> {
	let mut results = AdapterMap::with_capacity(adapters.len());

	for adapter in adapters {
		let result =
			validate_adapter_contract(client, adapter.contract_address(), adapter.contract_name())
				.await;

		if result.is_valid {
			info!("✓ {} adapter valid", adapter.name());
		} else {
			error!(
				"✗ {} adapter invalid: {}",
				adapter.name(),
				result.errors.join(", ")
			);
		}
		for warning in &result.warnings {
			warn!("{}: {}", adapter.name(), warning);
		}

		results.insert(adapter.name(), result);
	}

	results
}
