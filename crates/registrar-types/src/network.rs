//! Stacks network selection.

use crate::address::{version, StacksAddress};
use crate::errors::RegistrarError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	#[default]
	Testnet,
	Mainnet,
}

impl Network {
	/// Public Hiro API endpoint for the network.
	pub fn default_api_url(&self) -> &'static str {
		match self {
			Network::Testnet => "https://api.testnet.hiro.so",
			Network::Mainnet => "https://api.mainnet.hiro.so",
		}
	}

	/// Leading version byte of serialized transactions.
	pub fn transaction_version(&self) -> u8 {
		match self {
			Network::Testnet => 0x80,
			Network::Mainnet => 0x00,
		}
	}

	pub fn chain_id(&self) -> u32 {
		match self {
			Network::Testnet => 0x8000_0000,
			Network::Mainnet => 0x0000_0001,
		}
	}

	/// Address version for single-signature accounts on this network.
	pub fn single_sig_version(&self) -> u8 {
		match self {
			Network::Testnet => version::TESTNET_SINGLE_SIG,
			Network::Mainnet => version::MAINNET_SINGLE_SIG,
		}
	}

	pub fn accepts_address(&self, address: &StacksAddress) -> bool {
		match self {
			Network::Testnet => address.is_testnet(),
			Network::Mainnet => address.is_mainnet(),
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Network::Testnet => write!(f, "testnet"),
			Network::Mainnet => write!(f, "mainnet"),
		}
	}
}

impl FromStr for Network {
	type Err = RegistrarError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"testnet" => Ok(Network::Testnet),
			"mainnet" => Ok(Network::Mainnet),
			other => Err(RegistrarError::Config(format!(
				"Unsupported network '{}': expected testnet or mainnet",
				other
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_network_parsing() {
		assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
		assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
		assert!("devnet".parse::<Network>().is_err());
		assert_eq!(Network::default(), Network::Testnet);
	}

	#[test]
	fn test_network_wire_constants() {
		assert_eq!(Network::Mainnet.transaction_version(), 0x00);
		assert_eq!(Network::Testnet.transaction_version(), 0x80);
		assert_eq!(Network::Mainnet.chain_id(), 1);
		assert_eq!(Network::Testnet.chain_id(), 0x8000_0000);
	}

	#[test]
	fn test_address_network_check() {
		let testnet: StacksAddress = "ST000000000000000000002AMW42H".parse().unwrap();
		let mainnet: StacksAddress = "SP000000000000000000002Q6VF78".parse().unwrap();

		assert!(Network::Testnet.accepts_address(&testnet));
		assert!(!Network::Testnet.accepts_address(&mainnet));
		assert!(Network::Mainnet.accepts_address(&mainnet));
		assert!(!Network::Mainnet.accepts_address(&testnet));
	}
}
