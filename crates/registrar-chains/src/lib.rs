//! Network clients for the chains the registrar talks to.
//!
//! This crate provides the concrete `NetworkClient` used by the registrar
//! binary. It abstracts the node HTTP API and the transaction wire format so
//! the registrar components only ever see `ReadOnlyCall`, `ContractCall` and
//! `ClarityValue`.
//!
//! # Architecture
//!
//! - `implementations::stacks`: Hiro/Stacks node API client, key handling,
//!   and contract-call transaction building and signing

pub mod implementations;

pub use implementations::stacks::{
	ContractCallTransaction, HiroClient, HiroClientBuilder, StacksPrivateKey,
};
