//! Shared types for the adapter registrar.
//!
//! Everything the other crates exchange lives here: the adapter and
//! registration data model, Stacks addresses and Clarity values, the error
//! types, and the `NetworkClient` trait that the registrar components are
//! written against.

pub mod adapter;
pub mod address;
pub mod clarity;
pub mod client;
pub mod errors;
pub mod network;
pub mod registration;
pub mod secret_string;

pub use adapter::*;
pub use address::{ContractId, StacksAddress};
pub use clarity::ClarityValue;
pub use client::*;
pub use errors::{CodecError, RegistrarError, Result};
pub use network::Network;
pub use registration::*;
pub use secret_string::SecretString;
