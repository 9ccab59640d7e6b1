//! Proximity LOD: which records carry a label this frame, and how strongly.
//!
//! # Invariants
//! - A record has a label handle iff its tier is not `Hidden`.
//! - Tier changes between visible tiers update the handle in place.
//! - Re-evaluating an unchanged observer position produces no transitions.
//! - Full and bucketed scans produce the same transitions.

mod engine;
mod policy;
mod timer;

pub use engine::{LabelHandle, LabelTransition, LodEngine, LodFrame, LodScan, LodStats};
pub use policy::{LodOpacities, LodPolicy, LodRules, LodThresholds, LodTier};
pub use timer::{FrameTimer, TimingSummary};

pub fn crate_info() -> &'static str {
    "vigil-lod v0.1.0"
}
