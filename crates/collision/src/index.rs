use glam::Vec3;
use vigil_common::{BLOCK_HALF_WIDTH, BLOCK_HEIGHT, PlacedRecord};

use crate::grid::BucketGrid;

/// Immutable axis-aligned box around one placed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBound {
    pub index: usize,
    pub min: Vec3,
    pub max: Vec3,
}

impl ColliderBound {
    /// Box covering the block footprint of a placed record.
    pub fn for_record(placed: &PlacedRecord) -> Self {
        let p = placed.world_position;
        Self {
            index: placed.index,
            min: Vec3::new(p.x - BLOCK_HALF_WIDTH, p.y, p.z - BLOCK_HALF_WIDTH),
            max: Vec3::new(p.x + BLOCK_HALF_WIDTH, p.y + BLOCK_HEIGHT, p.z + BLOCK_HALF_WIDTH),
        }
    }

    /// Sphere/box test. Touching counts as intersecting.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// Errors from collider registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollisionError {
    #[error("bound for index {got} added out of order, expected {expected}")]
    OutOfOrder { expected: usize, got: usize },
}

/// Append-only collider store with XZ bucket acceleration.
#[derive(Debug, Clone)]
pub struct CollisionIndex {
    bounds: Vec<ColliderBound>,
    buckets: BucketGrid,
}

impl CollisionIndex {
    /// Create an empty index bucketing on cells of `cell_size`.
    ///
    /// # Panics
    ///
    /// If `cell_size` is not positive. Callers pass a validated grid spacing.
    pub fn new(cell_size: f32) -> Self {
        Self {
            bounds: Vec::new(),
            buckets: BucketGrid::new(cell_size),
        }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn bounds(&self) -> &[ColliderBound] {
        &self.bounds
    }

    pub fn get(&self, index: usize) -> Option<&ColliderBound> {
        self.bounds.get(index)
    }

    /// Build and store the bound for a placed record.
    ///
    /// Records must be added in index order, the same order the kernel
    /// places them.
    pub fn add_bound(&mut self, placed: &PlacedRecord) -> Result<(), CollisionError> {
        let expected = self.bounds.len();
        if placed.index != expected {
            tracing::error!(expected, got = placed.index, "collider added out of order");
            return Err(CollisionError::OutOfOrder {
                expected,
                got: placed.index,
            });
        }
        let bound = ColliderBound::for_record(placed);
        self.buckets.insert_extent(bound.min, bound.max, bound.index);
        self.bounds.push(bound);
        Ok(())
    }

    /// Whether a sphere at `center` intersects any stored bound.
    pub fn query(&self, center: Vec3, radius: f32) -> bool {
        if self.bounds.is_empty() || radius.is_nan() || radius < 0.0 {
            return false;
        }
        let reach = Vec3::new(radius, 0.0, radius);
        let mut hit = false;
        self.buckets
            .for_each_in_extent(center - reach, center + reach, |index| {
                hit = self.bounds[index].intersects_sphere(center, radius);
                !hit
            });
        hit
    }

    /// Reference O(n) scan. Answers exactly like [`CollisionIndex::query`].
    pub fn query_linear(&self, center: Vec3, radius: f32) -> bool {
        if radius.is_nan() || radius < 0.0 {
            return false;
        }
        self.bounds
            .iter()
            .any(|b| b.intersects_sphere(center, radius))
    }

    /// Indices of every bound the sphere touches, ascending.
    pub fn hits(&self, center: Vec3, radius: f32) -> Vec<usize> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let reach = Vec3::new(radius, 0.0, radius);
        self.buckets
            .items_in_extent(center - reach, center + reach)
            .into_iter()
            .filter(|&i| self.bounds[i].intersects_sphere(center, radius))
            .collect()
    }
}
