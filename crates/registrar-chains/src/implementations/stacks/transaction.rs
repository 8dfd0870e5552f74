//! Contract-call transactions: wire encoding, sighash and signing.
//!
//! Only standard single-signature (P2PKH) authorization is supported, which is
//! all the registrar needs to send `register-protocol` calls.

use super::keys::StacksPrivateKey;
use registrar_types::{
	errors::Result, AnchorMode, ContractCall, ContractId, Network, PostConditionMode,
	RegistrarError,
};
use sha2::{Digest, Sha512_256};

const AUTH_TYPE_STANDARD: u8 = 0x04;
const HASH_MODE_P2PKH: u8 = 0x00;
const KEY_ENCODING_COMPRESSED: u8 = 0x00;
const KEY_ENCODING_UNCOMPRESSED: u8 = 0x01;
const PAYLOAD_CONTRACT_CALL: u8 = 0x02;
const MAX_FUNCTION_NAME_LENGTH: usize = 128;

/// SHA-512/256 digest used for sighashes and transaction ids.
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
	let mut out = [0u8; 32];
	out.copy_from_slice(&Sha512_256::digest(data));
	out
}

/// A single-sig contract-call transaction.
#[derive(Debug, Clone)]
pub struct ContractCallTransaction {
	network: Network,
	signer: [u8; 20],
	key_encoding: u8,
	nonce: u64,
	fee: u64,
	signature: [u8; 65],
	anchor_mode: AnchorMode,
	post_condition_mode: PostConditionMode,
	contract: ContractId,
	function_name: String,
	function_args: Vec<Vec<u8>>,
}

impl ContractCallTransaction {
	/// Builds an unsigned transaction for `call`, paid for by `key`. Nonce and
	/// fee start at zero.
	pub fn new(network: Network, call: &ContractCall, key: &StacksPrivateKey) -> Result<Self> {
		let function_name = &call.function_name;
		if function_name.is_empty()
			|| function_name.len() > MAX_FUNCTION_NAME_LENGTH
			|| !function_name.is_ascii()
		{
			return Err(RegistrarError::ContractCall(format!(
				"invalid function name '{}'",
				function_name
			)));
		}

		Ok(Self {
			network,
			signer: key.public_key_hash(),
			key_encoding: if key.is_compressed() {
				KEY_ENCODING_COMPRESSED
			} else {
				KEY_ENCODING_UNCOMPRESSED
			},
			nonce: 0,
			fee: 0,
			signature: [0u8; 65],
			anchor_mode: call.anchor_mode,
			post_condition_mode: call.post_condition_mode,
			contract: call.contract.clone(),
			function_name: function_name.clone(),
			function_args: call.function_args.iter().map(|arg| arg.serialize()).collect(),
		})
	}

	pub fn with_nonce(mut self, nonce: u64) -> Self {
		self.nonce = nonce;
		self
	}

	pub fn with_fee(mut self, fee: u64) -> Self {
		self.fee = fee;
		self
	}

	pub fn nonce(&self) -> u64 {
		self.nonce
	}

	pub fn fee(&self) -> u64 {
		self.fee
	}

	pub fn signature(&self) -> &[u8; 65] {
		&self.signature
	}

	/// Encoded contract-call payload, as sent to fee estimation.
	pub fn payload_bytes(&self) -> Vec<u8> {
		let address = self.contract.address();
		let name = self.contract.name().as_bytes();
		let function = self.function_name.as_bytes();

		let mut out = Vec::with_capacity(64 + name.len() + function.len());
		out.push(PAYLOAD_CONTRACT_CALL);
		out.push(address.version());
		out.extend_from_slice(address.hash160());
		// Lengths are bounded by name validation (40 and 128).
		out.push(name.len() as u8);
		out.extend_from_slice(name);
		out.push(function.len() as u8);
		out.extend_from_slice(function);
		out.extend_from_slice(&(self.function_args.len() as u32).to_be_bytes());
		for arg in &self.function_args {
			out.extend_from_slice(arg);
		}
		out
	}

	pub fn serialize(&self) -> Vec<u8> {
		let payload = self.payload_bytes();
		let mut out = Vec::with_capacity(115 + payload.len());

		out.push(self.network.transaction_version());
		out.extend_from_slice(&self.network.chain_id().to_be_bytes());

		out.push(AUTH_TYPE_STANDARD);
		out.push(HASH_MODE_P2PKH);
		out.extend_from_slice(&self.signer);
		out.extend_from_slice(&self.nonce.to_be_bytes());
		out.extend_from_slice(&self.fee.to_be_bytes());
		out.push(self.key_encoding);
		out.extend_from_slice(&self.signature);

		out.push(self.anchor_mode as u8);
		out.push(self.post_condition_mode as u8);
		// no post-conditions
		out.extend_from_slice(&0u32.to_be_bytes());

		out.extend_from_slice(&payload);
		out
	}

	/// Signs in place with `key`, which must be the key the transaction was
	/// built for.
	pub fn sign(&mut self, key: &StacksPrivateKey) -> Result<()> {
		if key.public_key_hash() != self.signer {
			return Err(RegistrarError::Signing(
				"signing key does not match the transaction signer".to_string(),
			));
		}
		let digest = self.presign_sighash();
		self.signature = key.sign_recoverable(&digest)?;
		Ok(())
	}

	/// Hex transaction id of the transaction in its current state.
	pub fn txid(&self) -> String {
		hex::encode(sha512_256(&self.serialize()))
	}

	/// Hash of the transaction with its spending condition cleared.
	pub(crate) fn initial_sighash(&self) -> [u8; 32] {
		let cleared = Self {
			nonce: 0,
			fee: 0,
			signature: [0u8; 65],
			..self.clone()
		};
		sha512_256(&cleared.serialize())
	}

	/// Digest the signer commits to: the initial sighash bound to auth type,
	/// fee and nonce.
	pub(crate) fn presign_sighash(&self) -> [u8; 32] {
		let mut data = Vec::with_capacity(32 + 1 + 8 + 8);
		data.extend_from_slice(&self.initial_sighash());
		data.push(AUTH_TYPE_STANDARD);
		data.extend_from_slice(&self.fee.to_be_bytes());
		data.extend_from_slice(&self.nonce.to_be_bytes());
		sha512_256(&data)
	}
}
