//! Stacks network client.
//!
//! The client handles:
//! - read-only contract calls (`/v2/contracts/call-read`)
//! - nonce lookup and fee estimation for the signing account
//! - building, signing and broadcasting contract-call transactions

mod hiro_client;
mod keys;
mod transaction;

pub use hiro_client::{HiroClient, HiroClientBuilder, DEFAULT_FALLBACK_FEE};
pub use keys::{hash160, StacksPrivateKey};
pub use transaction::{sha512_256, ContractCallTransaction};
