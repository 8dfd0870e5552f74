//! Network client implementations.
//!
//! - `stacks`: Stacks blockchain through the node/Hiro HTTP API

pub mod stacks;
