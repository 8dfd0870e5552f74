//! Protocol adapters and per-adapter result collections.

use crate::address::{ContractId, StacksAddress};
use crate::errors::{CodecError, RegistrarError};
use serde::Serialize;

/// A yield protocol adapter contract the router should route through.
///
/// Adapters come from static configuration and are never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolAdapter {
	name: String,
	contract: ContractId,
}

impl ProtocolAdapter {
	pub fn new(
		name: impl Into<String>,
		contract_name: impl Into<String>,
		contract_address: StacksAddress,
	) -> Result<Self, CodecError> {
		let name = name.into();
		if name.trim().is_empty() || !name.is_ascii() {
			return Err(CodecError::InvalidValue(format!(
				"adapter name '{}' must be non-empty ASCII",
				name
			)));
		}
		Ok(Self {
			contract: ContractId::new(contract_address, contract_name)?,
			name,
		})
	}

	/// Display label, e.g. `Velar`.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn contract_name(&self) -> &str {
		self.contract.name()
	}

	pub fn contract_address(&self) -> &StacksAddress {
		self.contract.address()
	}

	pub fn contract_id(&self) -> &ContractId {
		&self.contract
	}

	/// Identifier the router registers the adapter under.
	pub fn protocol_id(&self) -> String {
		self.name.to_ascii_lowercase()
	}
}

/// The adapters shipped with the router: Velar and ALEX, both deployed by the
/// deployer account.
pub fn default_adapters(deployer: &StacksAddress) -> Vec<ProtocolAdapter> {
	[("Velar", "velar-adapter"), ("ALEX", "alex-adapter")]
		.into_iter()
		.filter_map(|(name, contract_name)| {
			ProtocolAdapter::new(name, contract_name, *deployer).ok()
		})
		.collect()
}

/// Insertion-ordered map from adapter name to a per-adapter result.
///
/// Each adapter gets at most one entry: inserting a name that is already
/// present leaves the existing entry untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterMap<T> {
	entries: Vec<(String, T)>,
}

impl<T> AdapterMap<T> {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: Vec::with_capacity(capacity),
		}
	}

	/// Returns `false` when the adapter already has an entry.
	pub fn insert(&mut self, adapter: impl Into<String>, value: T) -> bool {
		let adapter = adapter.into();
		if self.contains(&adapter) {
			return false;
		}
		self.entries.push((adapter, value));
		true
	}

	pub fn get(&self, adapter: &str) -> Option<&T> {
		self.entries
			.iter()
			.find(|(name, _)| name == adapter)
			.map(|(_, value)| value)
	}

	pub fn contains(&self, adapter: &str) -> bool {
		self.get(adapter).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value))
	}

	pub fn values(&self) -> impl Iterator<Item = &T> {
		self.entries.iter().map(|(_, value)| value)
	}
}

impl<T> Default for AdapterMap<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// Transaction id returned by a successful broadcast.
pub type TxId = String;

/// Result of the registration phase: adapter name to txid or error.
pub type RegistrationOutcomes = AdapterMap<Result<TxId, RegistrarError>>;

impl AdapterMap<Result<TxId, RegistrarError>> {
	pub fn success_count(&self) -> usize {
		self.values().filter(|outcome| outcome.is_ok()).count()
	}

	pub fn failure_count(&self) -> usize {
		self.values().filter(|outcome| outcome.is_err()).count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn deployer() -> StacksAddress {
		"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap()
	}

	#[test]
	fn test_adapter_identifiers() {
		let adapter = ProtocolAdapter::new("ALEX", "alex-adapter", deployer()).unwrap();

		assert_eq!(adapter.name(), "ALEX");
		assert_eq!(adapter.contract_name(), "alex-adapter");
		assert_eq!(adapter.contract_address(), &deployer());
		assert_eq!(adapter.protocol_id(), "alex");
		assert_eq!(
			adapter.contract_id().to_string(),
			"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.alex-adapter"
		);
	}

	#[test]
	fn test_adapter_rejects_bad_input() {
		assert!(ProtocolAdapter::new("", "velar-adapter", deployer()).is_err());
		assert!(ProtocolAdapter::new("Velar", "velar adapter", deployer()).is_err());
	}

	#[test]
	fn test_default_adapters() {
		let adapters = default_adapters(&deployer());
		let names: Vec<_> = adapters.iter().map(|a| a.name()).collect();
		assert_eq!(names, vec!["Velar", "ALEX"]);
		assert_eq!(adapters[0].contract_name(), "velar-adapter");
		assert_eq!(adapters[1].contract_name(), "alex-adapter");
	}

	#[test]
	fn test_adapter_map_keeps_first_entry() {
		let mut map = AdapterMap::new();
		assert!(map.insert("Velar", 1));
		assert!(map.insert("ALEX", 2));
		assert!(!map.insert("Velar", 3));

		assert_eq!(map.len(), 2);
		assert_eq!(map.get("Velar"), Some(&1));
		let order: Vec<_> = map.iter().map(|(name, _)| name).collect();
		assert_eq!(order, vec!["Velar", "ALEX"]);
	}

	#[test]
	fn test_outcome_counts() {
		let mut outcomes = RegistrationOutcomes::new();
		outcomes.insert("Velar", Ok("0xabc".to_string()));
		outcomes.insert(
			"ALEX",
			Err(RegistrarError::Broadcast("no txid received".to_string())),
		);

		assert_eq!(outcomes.success_count(), 1);
		assert_eq!(outcomes.failure_count(), 1);
	}
}
