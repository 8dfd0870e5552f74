//! secp256k1 signing keys in the Stacks hex format.
//!
//! A key is 32 bytes of hex (the account uses the uncompressed public key) or
//! 33 bytes ending in `01` (compressed public key), optionally `0x`-prefixed.

use k256::ecdsa::SigningKey;
use registrar_types::{errors::Result, Network, RegistrarError, StacksAddress};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

/// RIPEMD-160 over SHA-256, the account hash used in addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
	let digest = Ripemd160::digest(Sha256::digest(data));
	let mut hash = [0u8; 20];
	hash.copy_from_slice(&digest);
	hash
}

pub struct StacksPrivateKey {
	signing_key: SigningKey,
	compressed: bool,
}

impl StacksPrivateKey {
	/// Parses a hex private key. Error messages never include key material.
	pub fn from_hex(input: &str) -> Result<Self> {
		let trimmed = input.trim();
		let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);

		let mut bytes = hex::decode(stripped)
			.map_err(|_| RegistrarError::Signing("private key is not valid hex".to_string()))?;

		let compressed = match bytes.len() {
			32 => false,
			33 if bytes[32] == 0x01 => {
				bytes.truncate(32);
				true
			}
			len => {
				bytes.zeroize();
				return Err(RegistrarError::Signing(format!(
					"private key must be 32 bytes, or 33 bytes ending in 01 (got {} bytes)",
					len
				)));
			}
		};

		let signing_key = SigningKey::from_slice(&bytes);
		bytes.zeroize();
		let signing_key = signing_key.map_err(|_| {
			RegistrarError::Signing("private key is not a valid secp256k1 scalar".to_string())
		})?;

		Ok(Self {
			signing_key,
			compressed,
		})
	}

	pub fn is_compressed(&self) -> bool {
		self.compressed
	}

	/// SEC1-encoded public key, compressed or not to match the private key.
	pub fn public_key_bytes(&self) -> Vec<u8> {
		self.signing_key
			.verifying_key()
			.to_encoded_point(self.compressed)
			.as_bytes()
			.to_vec()
	}

	pub fn public_key_hash(&self) -> [u8; 20] {
		hash160(&self.public_key_bytes())
	}

	/// Single-signature address of this key on `network`.
	pub fn address(&self, network: Network) -> Result<StacksAddress> {
		Ok(StacksAddress::new(
			network.single_sig_version(),
			self.public_key_hash(),
		)?)
	}

	/// Signs a 32-byte digest, returning the recoverable signature as
	/// `recovery id ‖ r ‖ s`.
	pub fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<[u8; 65]> {
		let (signature, recovery_id) = self
			.signing_key
			.sign_prehash_recoverable(digest)
			.map_err(|e| RegistrarError::Signing(format!("failed to sign: {}", e)))?;

		let mut out = [0u8; 65];
		out[0] = recovery_id.to_byte();
		out[1..].copy_from_slice(&signature.to_bytes());
		Ok(out)
	}
}

impl fmt::Debug for StacksPrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StacksPrivateKey")
			.field("key", &"[REDACTED]")
			.field("compressed", &self.compressed)
			.finish()
	}
}
