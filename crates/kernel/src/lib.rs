//! Field Kernel: deterministic grid layout and the append-only ingest buffer.
//!
//! # Invariants
//! - Record indices are dense and 0-based over `[0, total_count)`.
//! - The grid side is fixed when the layout is created; it never changes.
//! - A placed record never moves. Batches are appended whole or not at all.

pub mod field;
pub mod layout;

pub use field::{AnchorPolicy, Field, FieldEvent, IngestError};
pub use layout::{GridLayout, LayoutError, place_index};
