use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Half of a block's footprint along X and Z. Blocks are 2 wide and 2 deep.
pub const BLOCK_HALF_WIDTH: f32 = 1.0;

/// Block height. Blocks rest on the ground plane at `y = 0`.
pub const BLOCK_HEIGHT: f32 = 4.0;

/// One entry of the source dataset.
///
/// Field names follow the dataset's JSON (`en_name`, `name`, `age`); any
/// other fields in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "en_name")]
    pub display_name: String,
    #[serde(rename = "name")]
    pub local_name: String,
    pub age: u32,
}

impl Record {
    pub fn new(display_name: impl Into<String>, local_name: impl Into<String>, age: u32) -> Self {
        Self {
            display_name: display_name.into(),
            local_name: local_name.into(),
            age,
        }
    }

    /// Text shown on the record's label.
    pub fn label_text(&self) -> String {
        format!(
            "{}\n{}\nAge: {}",
            self.display_name, self.local_name, self.age
        )
    }
}

/// Row/column of a record in the square layout grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

impl GridCell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A record bound to its grid cell and world position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRecord {
    pub index: usize,
    pub cell: GridCell,
    /// Ground-level center of the block's footprint (`y = 0`).
    pub world_position: Vec3,
    pub label_anchor: Vec3,
    pub record: Record,
}

impl PlacedRecord {
    /// Translation of the block primitive (box center).
    pub fn block_translation(&self) -> Vec3 {
        self.world_position + Vec3::new(0.0, BLOCK_HEIGHT / 2.0, 0.0)
    }
}

/// Identity of one label creation. Never reused across destroy/create cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub Uuid);

impl LabelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LabelId {
    fn default() -> Self {
        Self::new()
    }
}
