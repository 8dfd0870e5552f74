//! `register-protocol` submission.

use crate::retry::retry_with_backoff;
use registrar_types::{
	errors::Result, BroadcastResponse, ClarityValue, ContractCall, NetworkClient, ProtocolAdapter,
	RegistrarError, RegistrationConfig, RegistrationOutcomes, RetryOptions, TxId,
};
use tracing::{error, info};

pub const REGISTER_FUNCTION: &str = "register-protocol";

/// `(register-protocol (protocol-id (string-ascii)) (adapter principal))`
pub fn register_call(adapter: &ProtocolAdapter, config: &RegistrationConfig) -> ContractCall {
	ContractCall::new(
		config.router_contract.clone(),
		REGISTER_FUNCTION,
		vec![
			ClarityValue::string_ascii(adapter.protocol_id()),
			ClarityValue::contract_principal(adapter.contract_id().clone()),
		],
	)
}

/// Turns a broadcast reply into a txid. Rejections and replies without a txid
/// are failures.
fn accepted_txid(response: BroadcastResponse) -> Result<TxId> {
	if let Some(error) = response.error {
		let detail = match response.reason {
			Some(reason) => format!("{} ({})", error, reason),
			None => error,
		};
		return Err(RegistrarError::Broadcast(detail));
	}

	response
		.txid
		.filter(|txid| !txid.is_empty())
		.ok_or_else(|| RegistrarError::Broadcast("no txid received".to_string()))
}

async fn submit_registration(
	client: &dyn NetworkClient,
	adapter: &ProtocolAdapter,
	config: &RegistrationConfig,
) -> Result<TxId> {
	let call = register_call(adapter, config);
	client
		.call_contract(&call, &config.private_key)
		.await
		.and_then(accepted_txid)
		.map_err(|e| RegistrarError::registration(adapter.name(), e))
}

/// Registers one adapter, retrying failed submissions with backoff.
pub async fn register_adapter(
	client: &dyn NetworkClient,
	adapter: &ProtocolAdapter,
	config: &RegistrationConfig,
	retry_options: &RetryOptions,
) -> Result<TxId> {
	retry_with_backoff(
		|| submit_registration(client, adapter, config),
		retry_options,
	)
	.await
}

/// Registers every adapter in order. A failure is recorded and the next
/// adapter is still attempted.
pub async fn register_adapters(
	client: &dyn NetworkClient,
	adapters: &[ProtocolAdapter],
	config: &RegistrationConfig,
	retry_options: &RetryOptions,
) -> RegistrationOutcomes {
	let mut outcomes = RegistrationOutcomes::with_capacity(adapters.len());

	for adapter in adapters {
		info!("Registering {} adapter...", adapter.name());

		let outcome = register_adapter(client, adapter, config, retry_options).await;
		match &outcome {
			Ok(txid) => info!("✓ {} registered: {}", adapter.name(), txid),
			Err(e) => error!("✗ {} registration failed: {}", adapter.name(), e),
		}

		outcomes.insert(adapter.name(), outcome);
	}

	outcomes
}
