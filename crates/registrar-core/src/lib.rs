//! Adapter registration workflow.
//!
//! The registrar reconciles a fixed list of protocol adapters against the
//! router contract in four phases:
//!
//! 1. `validator`: every adapter contract answers `get-name`
//! 2. `status`: which adapters the router already knows
//! 3. `registrar`: `register-protocol` per adapter, retried with backoff
//! 4. `status` again, for the final snapshot
//!
//! `orchestrator` runs the phases and decides the exit status. All adapter
//! loops run strictly in list order, one network call at a time, so that
//! transactions from the deployer account never race for a nonce.

pub mod orchestrator;
pub mod registrar;
pub mod retry;
pub mod status;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{Orchestrator, OrchestratorBuilder, RunOutcome};
pub use registrar::{register_adapter, register_adapters};
pub use retry::retry_with_backoff;
pub use status::{check_adapter_registration, check_all_adapters_status, display_status_summary};
pub use validator::{validate_adapter_contract, validate_all_adapters};
