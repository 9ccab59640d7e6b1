//! Shared types for the memorial field engine.
//!
//! # Invariants
//! - A `PlacedRecord` never changes after it is handed out by the kernel.
//! - Every label creation carries a fresh `LabelId`.

mod types;

pub use types::{
    BLOCK_HALF_WIDTH, BLOCK_HEIGHT, GridCell, LabelId, PlacedRecord, Record,
};
