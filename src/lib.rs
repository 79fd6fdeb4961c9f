//! Blockfall (workspace facade crate).
//!
//! Re-exports the crates under `crates/` as `blockfall::{core,input,relay,states,term,types}`
//! and holds the glue the binaries share.

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_relay as relay;
pub use blockfall_states as states;
pub use blockfall_term as term;
pub use blockfall_types as types;

pub mod relay_bridge;
