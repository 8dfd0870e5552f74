//! Stacks addresses and contract identifiers.
//!
//! Addresses use the c32check encoding: `S`, the c32 version character, then
//! the c32 encoding of `hash160 ‖ checksum` where the checksum is the first
//! four bytes of a double SHA-256 over `version ‖ hash160`.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Longest contract name accepted for deployment.
pub const CONTRACT_NAME_MAX_LENGTH: usize = 40;

/// Address version bytes.
pub mod version {
	pub const MAINNET_SINGLE_SIG: u8 = 22;
	pub const MAINNET_MULTI_SIG: u8 = 20;
	pub const TESTNET_SINGLE_SIG: u8 = 26;
	pub const TESTNET_MULTI_SIG: u8 = 21;
}

/// Encodes bytes as c32, one `0` per leading zero byte.
pub fn c32_encode(data: &[u8]) -> String {
	let leading_zeros = data.iter().take_while(|byte| **byte == 0).count();

	// base-32 digits, least significant first
	let mut digits: Vec<u8> = Vec::new();
	for &byte in &data[leading_zeros..] {
		let mut carry = byte as u32;
		for digit in digits.iter_mut() {
			carry += (*digit as u32) << 8;
			*digit = (carry % 32) as u8;
			carry /= 32;
		}
		while carry > 0 {
			digits.push((carry % 32) as u8);
			carry /= 32;
		}
	}

	let mut encoded = String::with_capacity(leading_zeros + digits.len());
	encoded.extend(std::iter::repeat('0').take(leading_zeros));
	encoded.extend(
		digits
			.iter()
			.rev()
			.map(|digit| C32_ALPHABET[*digit as usize] as char),
	);
	encoded
}

/// Decodes c32 text. Lowercase input and the `O`/`I`/`L` look-alikes are accepted.
pub fn c32_decode(input: &str) -> Result<Vec<u8>, CodecError> {
	let normalized: Vec<char> = input.chars().map(c32_normalize).collect();
	let leading_zeros = normalized.iter().take_while(|c| **c == '0').count();

	// bytes, least significant first
	let mut bytes: Vec<u8> = Vec::new();
	for &c in &normalized[leading_zeros..] {
		let mut carry = c32_value(c)? as u32;
		for byte in bytes.iter_mut() {
			carry += (*byte as u32) * 32;
			*byte = (carry & 0xff) as u8;
			carry >>= 8;
		}
		while carry > 0 {
			bytes.push((carry & 0xff) as u8);
			carry >>= 8;
		}
	}

	let mut decoded = vec![0u8; leading_zeros];
	decoded.extend(bytes.iter().rev());
	Ok(decoded)
}

fn c32_normalize(c: char) -> char {
	match c.to_ascii_uppercase() {
		'O' => '0',
		'I' | 'L' => '1',
		other => other,
	}
}

fn c32_value(c: char) -> Result<u8, CodecError> {
	C32_ALPHABET
		.iter()
		.position(|symbol| *symbol as char == c)
		.map(|position| position as u8)
		.ok_or(CodecError::InvalidC32Char(c))
}

fn c32_checksum(version: u8, hash160: &[u8; 20]) -> [u8; 4] {
	let mut hasher = Sha256::new();
	hasher.update([version]);
	hasher.update(hash160);
	let digest = Sha256::digest(hasher.finalize());

	let mut checksum = [0u8; 4];
	checksum.copy_from_slice(&digest[..4]);
	checksum
}

/// A standard (account) principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StacksAddress {
	version: u8,
	hash160: [u8; 20],
}

impl StacksAddress {
	pub fn new(version: u8, hash160: [u8; 20]) -> Result<Self, CodecError> {
		if version >= 32 {
			return Err(CodecError::InvalidAddress(format!(
				"version {} does not fit in one c32 character",
				version
			)));
		}
		Ok(Self { version, hash160 })
	}

	pub fn version(&self) -> u8 {
		self.version
	}

	pub fn hash160(&self) -> &[u8; 20] {
		&self.hash160
	}

	pub fn is_mainnet(&self) -> bool {
		matches!(
			self.version,
			version::MAINNET_SINGLE_SIG | version::MAINNET_MULTI_SIG
		)
	}

	pub fn is_testnet(&self) -> bool {
		matches!(
			self.version,
			version::TESTNET_SINGLE_SIG | version::TESTNET_MULTI_SIG
		)
	}
}

impl fmt::Display for StacksAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut payload = self.hash160.to_vec();
		payload.extend_from_slice(&c32_checksum(self.version, &self.hash160));
		write!(
			f,
			"S{}{}",
			C32_ALPHABET[self.version as usize] as char,
			c32_encode(&payload)
		)
	}
}

impl FromStr for StacksAddress {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = |reason: &str| CodecError::InvalidAddress(format!("{}: {}", s, reason));

		if !s.is_ascii() || s.len() < 5 {
			return Err(invalid("too short"));
		}
		if !s.starts_with('S') {
			return Err(invalid("must start with 'S'"));
		}

		let mut chars = s[1..].chars();
		let version = chars
			.next()
			.map(c32_normalize)
			.ok_or_else(|| invalid("missing version"))
			.and_then(|c| c32_value(c).map_err(|_| invalid("bad version character")))?;

		let decoded = c32_decode(chars.as_str())?;
		if decoded.len() != 24 {
			return Err(invalid("wrong payload length"));
		}

		let mut hash160 = [0u8; 20];
		hash160.copy_from_slice(&decoded[..20]);
		if decoded[20..] != c32_checksum(version, &hash160) {
			return Err(CodecError::ChecksumMismatch(s.to_string()));
		}

		Self::new(version, hash160)
	}
}

impl TryFrom<String> for StacksAddress {
	type Error = CodecError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<StacksAddress> for String {
	fn from(address: StacksAddress) -> Self {
		address.to_string()
	}
}

/// A contract principal, written `address.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId {
	address: StacksAddress,
	name: String,
}

impl ContractId {
	pub fn new(address: StacksAddress, name: impl Into<String>) -> Result<Self, CodecError> {
		let name = name.into();
		validate_contract_name(&name)?;
		Ok(Self { address, name })
	}

	pub fn address(&self) -> &StacksAddress {
		&self.address
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// Contract names start with a letter followed by letters, digits, `-` or `_`.
pub fn validate_contract_name(name: &str) -> Result<(), CodecError> {
	let mut chars = name.chars();
	let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
	let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

	if !starts_with_letter || !rest_valid || name.len() > CONTRACT_NAME_MAX_LENGTH {
		return Err(CodecError::InvalidContractName(name.to_string()));
	}
	Ok(())
}

impl fmt::Display for ContractId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.address, self.name)
	}
}

impl FromStr for ContractId {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (address, name) = s
			.split_once('.')
			.ok_or_else(|| CodecError::InvalidContractId(s.to_string()))?;
		Self::new(address.parse()?, name)
	}
}

impl TryFrom<String> for ContractId {
	type Error = CodecError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<ContractId> for String {
	fn from(contract: ContractId) -> Self {
		contract.to_string()
	}
}
