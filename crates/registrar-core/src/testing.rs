//! In-memory router and adapter contracts for tests.

use async_trait::async_trait;
use registrar_types::{
	errors::Result, BroadcastResponse, ClarityValue, ContractCall, Network, NetworkClient,
	ProtocolAdapter, ReadOnlyCall, RegistrarError, RegistrationConfig, SecretString,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

pub(crate) fn test_config() -> RegistrationConfig {
	RegistrationConfig {
		network: Network::Testnet,
		router_contract: format!("{}.router", DEPLOYER).parse().unwrap(),
		deployer_address: DEPLOYER.parse().unwrap(),
		private_key: SecretString::from("test-key"),
	}
}

pub(crate) fn adapter(name: &str) -> ProtocolAdapter {
	ProtocolAdapter::new(
		name,
		format!("{}-adapter", name.to_lowercase()),
		DEPLOYER.parse().unwrap(),
	)
	.unwrap()
}

#[derive(Default)]
struct RouterState {
	registered: HashSet<String>,
	missing_contracts: HashSet<String>,
	get_name_errors: HashSet<String>,
	status_errors: HashSet<String>,
	/// Protocol id to remaining transport failures.
	failing: HashMap<String, u32>,
	rejecting: HashSet<String>,
	without_txid: HashSet<String>,
	read_calls: Vec<String>,
	contract_calls: Vec<ContractCall>,
	next_tx: u64,
}

/// Router test double. Registration flips the protocol id to registered, so a
/// status check after a successful call sees it.
pub(crate) struct MockRouter {
	state: Mutex<RouterState>,
}

impl MockRouter {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(RouterState::default()),
		}
	}

	fn update(self, f: impl FnOnce(&mut RouterState)) -> Self {
		f(&mut self.state.lock().unwrap());
		self
	}

	pub fn with_registered(self, protocol_id: &str) -> Self {
		self.update(|s| {
			s.registered.insert(protocol_id.to_string());
		})
	}

	pub fn with_missing_contract(self, contract_name: &str) -> Self {
		self.update(|s| {
			s.missing_contracts.insert(contract_name.to_string());
		})
	}

	pub fn with_get_name_error(self, contract_name: &str) -> Self {
		self.update(|s| {
			s.get_name_errors.insert(contract_name.to_string());
		})
	}

	pub fn with_status_error(self, protocol_id: &str) -> Self {
		self.update(|s| {
			s.status_errors.insert(protocol_id.to_string());
		})
	}

	/// The next `times` registration calls for `protocol_id` fail in transport.
	pub fn with_failing_registration(self, protocol_id: &str, times: u32) -> Self {
		self.update(|s| {
			s.failing.insert(protocol_id.to_string(), times);
		})
	}

	pub fn with_rejected_registration(self, protocol_id: &str) -> Self {
		self.update(|s| {
			s.rejecting.insert(protocol_id.to_string());
		})
	}

	pub fn with_missing_txid(self, protocol_id: &str) -> Self {
		self.update(|s| {
			s.without_txid.insert(protocol_id.to_string());
		})
	}

	pub fn contract_calls(&self) -> Vec<ContractCall> {
		self.state.lock().unwrap().contract_calls.clone()
	}

	/// `contract::function` of every read-only call, in order.
	pub fn read_calls(&self) -> Vec<String> {
		self.state.lock().unwrap().read_calls.clone()
	}

	pub fn is_registered(&self, protocol_id: &str) -> bool {
		self.state.lock().unwrap().registered.contains(protocol_id)
	}
}

fn protocol_id_arg(args: &[ClarityValue]) -> Result<String> {
	match args.first() {
		Some(ClarityValue::StringAscii(id)) => Ok(id.clone()),
		_ => Err(RegistrarError::ContractCall(
			"expected a string-ascii protocol id".to_string(),
		)),
	}
}

#[async_trait]
impl NetworkClient for MockRouter {
	fn network(&self) -> Network {
		Network::Testnet
	}

	async fn call_read_only(&self, call: &ReadOnlyCall) -> Result<ClarityValue> {
		let mut state = self.state.lock().unwrap();
		state
			.read_calls
			.push(format!("{}::{}", call.contract, call.function_name));

		match call.function_name.as_str() {
			"get-name" => {
				let name = call.contract.name();
				if state.missing_contracts.contains(name) {
					return Err(RegistrarError::ContractCall(format!(
						"NoSuchContract(\"{}\")",
						call.contract
					)));
				}
				if state.get_name_errors.contains(name) {
					return Ok(ClarityValue::ResponseErr(Box::new(ClarityValue::UInt(1))));
				}
				Ok(ClarityValue::ResponseOk(Box::new(ClarityValue::string_ascii(
					name,
				))))
			}
			"is-protocol-registered" => {
				let protocol_id = protocol_id_arg(&call.function_args)?;
				if state.status_errors.contains(&protocol_id) {
					return Err(RegistrarError::Network("connection refused".to_string()));
				}
				Ok(ClarityValue::Bool(state.registered.contains(&protocol_id)))
			}
			other => Err(RegistrarError::ContractCall(format!(
				"UndefinedFunction(\"{}\")",
				other
			))),
		}
	}

	async fn call_contract(
		&self,
		call: &ContractCall,
		_sender_key: &SecretString,
	) -> Result<BroadcastResponse> {
		let mut state = self.state.lock().unwrap();
		state.contract_calls.push(call.clone());

		let protocol_id = protocol_id_arg(&call.function_args)?;

		if let Some(remaining) = state.failing.get_mut(&protocol_id) {
			if *remaining > 0 {
				*remaining -= 1;
				return Err(RegistrarError::Network("connection reset".to_string()));
			}
		}
		if state.rejecting.contains(&protocol_id) {
			return Ok(BroadcastResponse::rejected(
				"transaction rejected",
				Some("BadNonce".to_string()),
			));
		}
		if state.without_txid.contains(&protocol_id) {
			return Ok(BroadcastResponse::default());
		}

		state.registered.insert(protocol_id);
		state.next_tx += 1;
		Ok(BroadcastResponse::accepted(format!("0x{:064x}", state.next_tx)))
	}
}
