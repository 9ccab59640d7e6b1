use glam::Vec3;
use vigil_common::GridCell;

/// Errors from layout construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout: total_count={total_count}, spacing={spacing}")]
    InvalidLayout { total_count: usize, spacing: f32 },
}

/// Square grid layout for a dataset of known size.
///
/// Index `i` lands in row `i / side`, column `i % side`, where
/// `side = ceil(sqrt(total_count))`. The grid is centered on the origin:
/// cell `(0, 0)` sits at `(-half, -half)` with `half = (side - 1) * spacing / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    total_count: usize,
    spacing: f32,
    grid_side: u32,
    half: f32,
}

impl GridLayout {
    /// Create a layout for `total_count` records spaced `spacing` apart.
    pub fn new(total_count: usize, spacing: f32) -> Result<Self, LayoutError> {
        if total_count == 0 || !spacing.is_finite() || spacing <= 0.0 {
            return Err(LayoutError::InvalidLayout {
                total_count,
                spacing,
            });
        }
        let grid_side = ceil_sqrt(total_count as u64) as u32;
        let half = (grid_side - 1) as f32 * spacing / 2.0;
        Ok(Self {
            total_count,
            spacing,
            grid_side,
            half,
        })
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Number of cells along one side of the square grid.
    pub fn grid_side(&self) -> u32 {
        self.grid_side
    }

    /// Side length of the square floor plane that covers the grid.
    pub fn ground_extent(&self) -> f32 {
        self.grid_side as f32 * self.spacing
    }

    /// Grid cell for an index. Indices are expected in `[0, total_count)`.
    pub fn cell_of(&self, index: usize) -> GridCell {
        let side = self.grid_side as usize;
        GridCell::new((index / side) as u32, (index % side) as u32)
    }

    /// World-space `(x, z)` of an index.
    pub fn place(&self, index: usize) -> (f32, f32) {
        let cell = self.cell_of(index);
        (
            cell.col as f32 * self.spacing - self.half,
            cell.row as f32 * self.spacing - self.half,
        )
    }

    /// Ground-level world position of an index.
    pub fn world_position(&self, index: usize) -> Vec3 {
        let (x, z) = self.place(index);
        Vec3::new(x, 0.0, z)
    }
}

/// Stateless form of [`GridLayout::place`].
pub fn place_index(index: usize, total_count: usize, spacing: f32) -> Result<(f32, f32), LayoutError> {
    Ok(GridLayout::new(total_count, spacing)?.place(index))
}

/// Smallest `s` with `s * s >= n`, exact for all `u64` inputs in range.
fn ceil_sqrt(n: u64) -> u64 {
    let mut s = (n as f64).sqrt().ceil() as u64;
    while s * s < n {
        s += 1;
    }
    while s > 1 && (s - 1) * (s - 1) >= n {
        s -= 1;
    }
    s
}
