use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

/// A 2D cell coordinate in the bucket grid (ignoring Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Fixed-size XZ bucket grid over dense item indices.
///
/// An item may be registered in several cells when its footprint crosses
/// cell borders. Lookups over a rectangle return every item registered in
/// any overlapped cell, so callers still run their exact test per item.
#[derive(Debug, Clone)]
pub struct BucketGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<usize>>,
    /// Inclusive cell range holding at least one item.
    occupied: Option<(CellCoord, CellCoord)>,
}

impl BucketGrid {
    /// Create a new bucket grid with the given cell size.
    ///
    /// # Panics
    ///
    /// If `cell_size` is not positive (NaN included).
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            occupied: None,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Convert a world position to a cell coordinate.
    pub fn position_to_cell(&self, pos: Vec3) -> CellCoord {
        CellCoord {
            x: (pos.x / self.cell_size).floor() as i32,
            z: (pos.z / self.cell_size).floor() as i32,
        }
    }

    /// Register an item at a single point.
    pub fn insert_point(&mut self, pos: Vec3, item: usize) {
        let coord = self.position_to_cell(pos);
        self.cells.entry(coord).or_default().push(item);
        self.grow_occupied(coord, coord);
    }

    /// Register an item in every cell its XZ footprint `[min, max]` touches.
    pub fn insert_extent(&mut self, min: Vec3, max: Vec3, item: usize) {
        let lo = self.position_to_cell(min);
        let hi = self.position_to_cell(max);
        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                self.cells.entry(CellCoord::new(x, z)).or_default().push(item);
            }
        }
        self.grow_occupied(lo, hi);
    }

    fn grow_occupied(&mut self, lo: CellCoord, hi: CellCoord) {
        self.occupied = Some(match self.occupied {
            None => (lo, hi),
            Some((min, max)) => (
                CellCoord::new(min.x.min(lo.x), min.z.min(lo.z)),
                CellCoord::new(max.x.max(hi.x), max.z.max(hi.z)),
            ),
        });
    }

    /// Inclusive cell range that holds items, if any.
    pub fn occupied_range(&self) -> Option<(CellCoord, CellCoord)> {
        self.occupied
    }

    /// Items registered in a specific cell.
    pub fn items_in_cell(&self, coord: CellCoord) -> &[usize] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visit every item registered in a cell touched by the XZ rectangle
    /// `[min, max]`. Items spanning several cells are visited once per cell.
    ///
    /// Only cells inside the occupied range are looked up, so a huge
    /// rectangle costs no more than the populated area.
    pub fn for_each_in_extent(&self, min: Vec3, max: Vec3, mut visit: impl FnMut(usize) -> bool) {
        let Some((occ_lo, occ_hi)) = self.occupied else {
            return;
        };
        let lo = self.position_to_cell(min);
        let hi = self.position_to_cell(max);
        let lo = CellCoord::new(lo.x.max(occ_lo.x), lo.z.max(occ_lo.z));
        let hi = CellCoord::new(hi.x.min(occ_hi.x), hi.z.min(occ_hi.z));
        for x in lo.x..=hi.x {
            for z in lo.z..=hi.z {
                if let Some(items) = self.cells.get(&CellCoord::new(x, z)) {
                    for &item in items {
                        if !visit(item) {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Distinct items touched by the XZ rectangle `[min, max]`, ascending.
    pub fn items_in_extent(&self, min: Vec3, max: Vec3) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        self.for_each_in_extent(min, max, |item| {
            result.insert(item);
            true
        });
        result
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of item registrations across all cells.
    pub fn total_placements(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}
