//! Input boundary: raw device events are mapped elsewhere; the core only
//! sees four movement intents and a single "begin" trigger.
//!
//! # Invariants
//! - Intents are level-triggered (held until released).
//! - The begin trigger is edge-triggered and consumed once.

pub mod action;

pub use action::{Action, Direction, InputState, MoveIntent, ParseDirectionError};

pub fn crate_info() -> &'static str {
    "vigil-input v0.1.0"
}
