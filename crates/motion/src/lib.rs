//! Observer motion: a one-way Falling -> Walking state machine.
//!
//! # Invariants
//! - The observer never ends a step below ground height.
//! - While walking, a step either commits its whole candidate position or
//!   leaves the observer exactly where it was.
//! - Falling ignores input and collision.

pub mod observer;

pub use observer::{
    MotionParams, MotionPhase, MovementResolver, Obstacles, ObserverState, StepOutcome,
    forward_from_angles, horizontal_basis,
};

pub fn crate_info() -> &'static str {
    "vigil-motion v0.1.0"
}
