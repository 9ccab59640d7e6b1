//! Collision: one immutable axis-aligned box per placed record.
//!
//! # Invariants
//! - Bounds are added in index order and never removed or mutated.
//! - A query against an empty index reports no intersection.
//! - Bucketed queries answer exactly like a linear scan.
//!
//! Bounds are bucketed on a fixed XZ grid so a movement query only visits
//! the cells under the query sphere instead of every block in the field.

mod grid;
mod index;

pub use grid::{BucketGrid, CellCoord};
pub use index::{ColliderBound, CollisionError, CollisionIndex};

pub fn crate_info() -> &'static str {
    "vigil-collision v0.1.0"
}
