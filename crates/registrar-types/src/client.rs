//! The network client the registrar components talk to.

use crate::{
	address::{ContractId, StacksAddress},
	clarity::ClarityValue,
	errors::Result,
	network::Network,
	secret_string::SecretString,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A read-only contract function call. Needs no signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyCall {
	pub contract: ContractId,
	pub function_name: String,
	pub function_args: Vec<ClarityValue>,
	pub sender_address: StacksAddress,
}

impl ReadOnlyCall {
	pub fn new(
		contract: ContractId,
		function_name: impl Into<String>,
		sender_address: StacksAddress,
	) -> Self {
		Self {
			contract,
			function_name: function_name.into(),
			function_args: Vec::new(),
			sender_address,
		}
	}

	pub fn with_args(mut self, args: Vec<ClarityValue>) -> Self {
		self.function_args = args;
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AnchorMode {
	OnChainOnly = 0x01,
	OffChainOnly = 0x02,
	#[default]
	Any = 0x03,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PostConditionMode {
	#[default]
	Allow = 0x01,
	Deny = 0x02,
}

/// A state-changing contract call to be signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
	pub contract: ContractId,
	pub function_name: String,
	pub function_args: Vec<ClarityValue>,
	pub anchor_mode: AnchorMode,
	pub post_condition_mode: PostConditionMode,
}

impl ContractCall {
	pub fn new(
		contract: ContractId,
		function_name: impl Into<String>,
		function_args: Vec<ClarityValue>,
	) -> Self {
		Self {
			contract,
			function_name: function_name.into(),
			function_args,
			anchor_mode: AnchorMode::Any,
			post_condition_mode: PostConditionMode::Allow,
		}
	}
}

/// What the node answered to a broadcast.
///
/// A rejected transaction is not a transport error: the node replies with an
/// `error` and usually a `reason`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
	pub txid: Option<String>,
	pub error: Option<String>,
	pub reason: Option<String>,
}

impl BroadcastResponse {
	pub fn accepted(txid: impl Into<String>) -> Self {
		Self {
			txid: Some(txid.into()),
			..Default::default()
		}
	}

	pub fn rejected(error: impl Into<String>, reason: Option<String>) -> Self {
		Self {
			txid: None,
			error: Some(error.into()),
			reason,
		}
	}

	pub fn is_rejected(&self) -> bool {
		self.error.is_some()
	}
}

/// Read-only queries and signed contract calls against one Stacks network.
#[async_trait]
pub trait NetworkClient: Send + Sync {
	fn network(&self) -> Network;

	/// Calls a read-only function and returns its decoded result.
	async fn call_read_only(&self, call: &ReadOnlyCall) -> Result<ClarityValue>;

	/// Signs `call` with `sender_key` and broadcasts it.
	async fn call_contract(
		&self,
		call: &ContractCall,
		sender_key: &SecretString,
	) -> Result<BroadcastResponse>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_contract_call_defaults() {
		let router: ContractId = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.router"
			.parse()
			.unwrap();
		let call = ContractCall::new(router, "register-protocol", vec![]);
		assert_eq!(call.anchor_mode, AnchorMode::Any);
		assert_eq!(call.post_condition_mode, PostConditionMode::Allow);
		assert_eq!(call.anchor_mode as u8, 0x03);
	}

	#[test]
	fn test_broadcast_response_helpers() {
		let accepted = BroadcastResponse::accepted("0xabc");
		assert!(!accepted.is_rejected());
		assert_eq!(accepted.txid.as_deref(), Some("0xabc"));

		let rejected =
			BroadcastResponse::rejected("transaction rejected", Some("BadNonce".to_string()));
		assert!(rejected.is_rejected());
		assert!(rejected.txid.is_none());
	}
}
