//! Terminal input module.
//!
//! Maps `crossterm` key events into [`crate::types::InputSymbol`]s. What a
//! symbol means is up to whichever state receives it.

pub mod map;

pub use blockfall_types as types;

pub use map::{map_key_event, should_quit};
