//! Error types for the registrar.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistrarError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrarError {
	#[error("Network error: {0}")]
	Network(String),

	#[error("Contract call failed: {0}")]
	ContractCall(String),

	#[error("Signing error: {0}")]
	Signing(String),

	#[error("Transaction broadcast failed: {0}")]
	Broadcast(String),

	#[error("{adapter}: {message}")]
	Registration { adapter: String, message: String },

	#[error("Configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Codec(#[from] CodecError),
}

impl RegistrarError {
	/// Wraps any error into a registration failure attributed to `adapter`.
	pub fn registration(adapter: impl Into<String>, error: impl std::fmt::Display) -> Self {
		Self::Registration {
			adapter: adapter.into(),
			message: error.to_string(),
		}
	}
}

/// Errors raised while decoding addresses or Clarity values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("Invalid c32 character '{0}'")]
	InvalidC32Char(char),

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Address checksum mismatch for {0}")]
	ChecksumMismatch(String),

	#[error("Invalid contract identifier: {0}")]
	InvalidContractId(String),

	#[error("Invalid contract name: {0}")]
	InvalidContractName(String),

	#[error("Unexpected end of input")]
	UnexpectedEof,

	#[error("Unknown Clarity type prefix 0x{0:02x}")]
	UnknownTypePrefix(u8),

	#[error("Invalid Clarity value: {0}")]
	InvalidValue(String),

	#[error("Invalid hex: {0}")]
	InvalidHex(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registration_error_is_prefixed_with_adapter() {
		let error = RegistrarError::registration(
			"Velar",
			RegistrarError::Broadcast("no txid received".to_string()),
		);
		assert_eq!(
			error.to_string(),
			"Velar: Transaction broadcast failed: no txid received"
		);
	}

	#[test]
	fn test_codec_error_is_transparent() {
		let error: RegistrarError = CodecError::UnknownTypePrefix(0x42).into();
		assert_eq!(error.to_string(), "Unknown Clarity type prefix 0x42");
	}
}
