//! Clarity values and their consensus serialization.
//!
//! Contract arguments are sent to the node as hex-encoded serialized values and
//! read-only call results come back the same way.

use crate::address::{ContractId, StacksAddress};
use crate::errors::CodecError;
use std::collections::BTreeMap;
use std::fmt;

/// Nesting limit when decoding values received from the network.
const MAX_DECODE_DEPTH: usize = 32;

mod type_prefix {
	pub const INT: u8 = 0x00;
	pub const UINT: u8 = 0x01;
	pub const BUFFER: u8 = 0x02;
	pub const BOOL_TRUE: u8 = 0x03;
	pub const BOOL_FALSE: u8 = 0x04;
	pub const PRINCIPAL_STANDARD: u8 = 0x05;
	pub const PRINCIPAL_CONTRACT: u8 = 0x06;
	pub const RESPONSE_OK: u8 = 0x07;
	pub const RESPONSE_ERR: u8 = 0x08;
	pub const OPTIONAL_NONE: u8 = 0x09;
	pub const OPTIONAL_SOME: u8 = 0x0a;
	pub const LIST: u8 = 0x0b;
	pub const TUPLE: u8 = 0x0c;
	pub const STRING_ASCII: u8 = 0x0d;
	pub const STRING_UTF8: u8 = 0x0e;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
	Int(i128),
	UInt(u128),
	Buffer(Vec<u8>),
	Bool(bool),
	StandardPrincipal(StacksAddress),
	ContractPrincipal(ContractId),
	ResponseOk(Box<ClarityValue>),
	ResponseErr(Box<ClarityValue>),
	OptionalNone,
	OptionalSome(Box<ClarityValue>),
	List(Vec<ClarityValue>),
	Tuple(BTreeMap<String, ClarityValue>),
	StringAscii(String),
	StringUtf8(String),
}

impl ClarityValue {
	pub fn string_ascii(value: impl Into<String>) -> Self {
		Self::StringAscii(value.into())
	}

	pub fn contract_principal(contract: ContractId) -> Self {
		Self::ContractPrincipal(contract)
	}

	/// The boolean carried by `true`/`false` or by an `(ok <bool>)` response.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			Self::ResponseOk(inner) => match inner.as_ref() {
				Self::Bool(value) => Some(*value),
				_ => None,
			},
			_ => None,
		}
	}

	pub fn is_response_err(&self) -> bool {
		matches!(self, Self::ResponseErr(_))
	}

	pub fn serialize(&self) -> Vec<u8> {
		let mut out = Vec::new();
		self.write_to(&mut out);
		out
	}

	/// `0x`-prefixed hex of the serialized value, as the node API expects.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.serialize()))
	}

	pub fn deserialize(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut reader = Reader::new(bytes);
		let value = Self::read_from(&mut reader, 0)?;
		if !reader.is_empty() {
			return Err(CodecError::InvalidValue(format!(
				"{} trailing bytes",
				reader.remaining()
			)));
		}
		Ok(value)
	}

	pub fn from_hex(input: &str) -> Result<Self, CodecError> {
		let stripped = input.strip_prefix("0x").unwrap_or(input);
		let bytes = hex::decode(stripped).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
		Self::deserialize(&bytes)
	}

	fn write_to(&self, out: &mut Vec<u8>) {
		match self {
			Self::Int(value) => {
				out.push(type_prefix::INT);
				out.extend_from_slice(&value.to_be_bytes());
			}
			Self::UInt(value) => {
				out.push(type_prefix::UINT);
				out.extend_from_slice(&value.to_be_bytes());
			}
			Self::Buffer(bytes) => {
				out.push(type_prefix::BUFFER);
				write_length_prefixed(out, bytes);
			}
			Self::Bool(true) => out.push(type_prefix::BOOL_TRUE),
			Self::Bool(false) => out.push(type_prefix::BOOL_FALSE),
			Self::StandardPrincipal(address) => {
				out.push(type_prefix::PRINCIPAL_STANDARD);
				write_address(out, address);
			}
			Self::ContractPrincipal(contract) => {
				out.push(type_prefix::PRINCIPAL_CONTRACT);
				write_address(out, contract.address());
				out.push(contract.name().len() as u8);
				out.extend_from_slice(contract.name().as_bytes());
			}
			Self::ResponseOk(inner) => {
				out.push(type_prefix::RESPONSE_OK);
				inner.write_to(out);
			}
			Self::ResponseErr(inner) => {
				out.push(type_prefix::RESPONSE_ERR);
				inner.write_to(out);
			}
			Self::OptionalNone => out.push(type_prefix::OPTIONAL_NONE),
			Self::OptionalSome(inner) => {
				out.push(type_prefix::OPTIONAL_SOME);
				inner.write_to(out);
			}
			Self::List(items) => {
				out.push(type_prefix::LIST);
				out.extend_from_slice(&(items.len() as u32).to_be_bytes());
				for item in items {
					item.write_to(out);
				}
			}
			Self::Tuple(fields) => {
				out.push(type_prefix::TUPLE);
				out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
				// BTreeMap iteration keeps the keys in the sorted order the node requires
				for (name, value) in fields {
					out.push(name.len() as u8);
					out.extend_from_slice(name.as_bytes());
					value.write_to(out);
				}
			}
			Self::StringAscii(value) => {
				out.push(type_prefix::STRING_ASCII);
				write_length_prefixed(out, value.as_bytes());
			}
			Self::StringUtf8(value) => {
				out.push(type_prefix::STRING_UTF8);
				write_length_prefixed(out, value.as_bytes());
			}
		}
	}

	fn read_from(reader: &mut Reader<'_>, depth: usize) -> Result<Self, CodecError> {
		if depth > MAX_DECODE_DEPTH {
			return Err(CodecError::InvalidValue("value nested too deeply".to_string()));
		}

		let prefix = reader.read_u8()?;
		let value = match prefix {
			type_prefix::INT => Self::Int(i128::from_be_bytes(reader.read_array()?)),
			type_prefix::UINT => Self::UInt(u128::from_be_bytes(reader.read_array()?)),
			type_prefix::BUFFER => {
				let len = reader.read_u32()? as usize;
				Self::Buffer(reader.take(len)?.to_vec())
			}
			type_prefix::BOOL_TRUE => Self::Bool(true),
			type_prefix::BOOL_FALSE => Self::Bool(false),
			type_prefix::PRINCIPAL_STANDARD => Self::StandardPrincipal(read_address(reader)?),
			type_prefix::PRINCIPAL_CONTRACT => {
				let address = read_address(reader)?;
				let len = reader.read_u8()? as usize;
				let name = read_ascii(reader.take(len)?)?;
				Self::ContractPrincipal(ContractId::new(address, name)?)
			}
			type_prefix::RESPONSE_OK => {
				Self::ResponseOk(Box::new(Self::read_from(reader, depth + 1)?))
			}
			type_prefix::RESPONSE_ERR => {
				Self::ResponseErr(Box::new(Self::read_from(reader, depth + 1)?))
			}
			type_prefix::OPTIONAL_NONE => Self::OptionalNone,
			type_prefix::OPTIONAL_SOME => {
				Self::OptionalSome(Box::new(Self::read_from(reader, depth + 1)?))
			}
			type_prefix::LIST => {
				let len = reader.read_u32()? as usize;
				let mut items = Vec::with_capacity(len.min(reader.remaining()));
				for _ in 0..len {
					items.push(Self::read_from(reader, depth + 1)?);
				}
				Self::List(items)
			}
			type_prefix::TUPLE => {
				let len = reader.read_u32()? as usize;
				let mut fields = BTreeMap::new();
				for _ in 0..len {
					let name_len = reader.read_u8()? as usize;
					let name = read_ascii(reader.take(name_len)?)?;
					fields.insert(name, Self::read_from(reader, depth + 1)?);
				}
				Self::Tuple(fields)
			}
			type_prefix::STRING_ASCII => {
				let len = reader.read_u32()? as usize;
				Self::StringAscii(read_ascii(reader.take(len)?)?)
			}
			type_prefix::STRING_UTF8 => {
				let len = reader.read_u32()? as usize;
				let value = std::str::from_utf8(reader.take(len)?)
					.map_err(|e| CodecError::InvalidValue(e.to_string()))?;
				Self::StringUtf8(value.to_string())
			}
			other => return Err(CodecError::UnknownTypePrefix(other)),
		};
		Ok(value)
	}
}

fn write_length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
	out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
	out.extend_from_slice(bytes);
}

fn write_address(out: &mut Vec<u8>, address: &StacksAddress) {
	out.push(address.version());
	out.extend_from_slice(address.hash160());
}

fn read_address(reader: &mut Reader<'_>) -> Result<StacksAddress, CodecError> {
	let version = reader.read_u8()?;
	StacksAddress::new(version, reader.read_array()?)
}

fn read_ascii(bytes: &[u8]) -> Result<String, CodecError> {
	if !bytes.is_ascii() {
		return Err(CodecError::InvalidValue("non-ASCII string".to_string()));
	}
	Ok(String::from_utf8_lossy(bytes).into_owned())
}

struct Reader<'a> {
	bytes: &'a [u8],
}

impl<'a> Reader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self { bytes }
	}

	fn remaining(&self) -> usize {
		self.bytes.len()
	}

	fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
		if self.bytes.len() < len {
			return Err(CodecError::UnexpectedEof);
		}
		let (head, tail) = self.bytes.split_at(len);
		self.bytes = tail;
		Ok(head)
	}

	fn read_u8(&mut self) -> Result<u8, CodecError> {
		Ok(self.take(1)?[0])
	}

	fn read_u32(&mut self) -> Result<u32, CodecError> {
		Ok(u32::from_be_bytes(self.read_array()?))
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
		let mut array = [0u8; N];
		array.copy_from_slice(self.take(N)?);
		Ok(array)
	}
}

impl fmt::Display for ClarityValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{}", value),
			Self::UInt(value) => write!(f, "u{}", value),
			Self::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
			Self::Bool(value) => write!(f, "{}", value),
			Self::StandardPrincipal(address) => write!(f, "'{}", address),
			Self::ContractPrincipal(contract) => write!(f, "'{}", contract),
			Self::ResponseOk(inner) => write!(f, "(ok {})", inner),
			Self::ResponseErr(inner) => write!(f, "(err {})", inner),
			Self::OptionalNone => write!(f, "none"),
			Self::OptionalSome(inner) => write!(f, "(some {})", inner),
			Self::List(items) => {
				write!(f, "(list")?;
				for item in items {
					write!(f, " {}", item)?;
				}
				write!(f, ")")
			}
			Self::Tuple(fields) => {
				write!(f, "(tuple")?;
				for (name, value) in fields {
					write!(f, " ({} {})", name, value)?;
				}
				write!(f, ")")
			}
			Self::StringAscii(value) => write!(f, "{:?}", value),
			Self::StringUtf8(value) => write!(f, "u{:?}", value),
		}
	}
}
