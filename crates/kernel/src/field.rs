use glam::Vec3;
use serde::{Deserialize, Serialize};
use vigil_common::{BLOCK_HALF_WIDTH, BLOCK_HEIGHT, PlacedRecord, Record};

use crate::layout::GridLayout;

/// Where a record's label sits relative to its block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnchorPolicy {
    /// Above the block: box center raised by `lift`.
    Above { lift: f32 },
    /// Beside the block's +X face, `gap` away from it, at box-center height.
    Side { gap: f32 },
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self::Above { lift: 3.0 }
    }
}

impl AnchorPolicy {
    pub fn anchor_for(&self, world_position: Vec3) -> Vec3 {
        let center = world_position + Vec3::new(0.0, BLOCK_HEIGHT / 2.0, 0.0);
        match *self {
            Self::Above { lift } => center + Vec3::new(0.0, lift, 0.0),
            Self::Side { gap } => center + Vec3::new(BLOCK_HALF_WIDTH + gap, 0.0, 0.0),
        }
    }
}

/// Errors from batch ingest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("batch of {batch_len} at index {next_index} overflows total count {total_count}")]
    Overflow {
        next_index: usize,
        batch_len: usize,
        total_count: usize,
    },
}

/// An event recorded by every ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldEvent {
    BatchIngested { first_index: usize, count: usize },
}

/// Append-only store of placed records.
///
/// Records are placed in stream order: the n-th record ever ingested gets
/// index n. Callers must present batches as contiguous, non-overlapping
/// slices of the dataset.
#[derive(Debug, Clone)]
pub struct Field {
    layout: GridLayout,
    anchor: AnchorPolicy,
    records: Vec<PlacedRecord>,
    event_log: Vec<FieldEvent>,
}

impl Field {
    pub fn new(layout: GridLayout, anchor: AnchorPolicy) -> Self {
        Self {
            layout,
            anchor,
            records: Vec::with_capacity(layout.total_count()),
            event_log: Vec::new(),
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn anchor_policy(&self) -> AnchorPolicy {
        self.anchor
    }

    /// Index the next ingested record will receive.
    pub fn next_index(&self) -> usize {
        self.records.len()
    }

    /// Records still expected before the layout is full.
    pub fn remaining(&self) -> usize {
        self.layout.total_count() - self.records.len()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PlacedRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&PlacedRecord> {
        self.records.get(index)
    }

    /// Place a batch and return the newly placed records.
    ///
    /// A batch that would run past `total_count` is rejected whole.
    pub fn ingest_batch(&mut self, batch: Vec<Record>) -> Result<&[PlacedRecord], IngestError> {
        let first_index = self.next_index();
        if batch.len() > self.remaining() {
            return Err(IngestError::Overflow {
                next_index: first_index,
                batch_len: batch.len(),
                total_count: self.layout.total_count(),
            });
        }

        let count = batch.len();
        for (offset, record) in batch.into_iter().enumerate() {
            let index = first_index + offset;
            let world_position = self.layout.world_position(index);
            self.records.push(PlacedRecord {
                index,
                cell: self.layout.cell_of(index),
                world_position,
                label_anchor: self.anchor.anchor_for(world_position),
                record,
            });
        }
        self.event_log
            .push(FieldEvent::BatchIngested { first_index, count });

        tracing::debug!(first_index, count, total = self.records.len(), "batch ingested");
        Ok(&self.records[first_index..])
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn events(&self) -> &[FieldEvent] {
        &self.event_log
    }

    /// Deterministic digest of every placed record, in index order.
    pub fn layout_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for placed in &self.records {
            mix(&mut h, &(placed.index as u64).to_le_bytes());
            mix(&mut h, &placed.cell.row.to_le_bytes());
            mix(&mut h, &placed.cell.col.to_le_bytes());
            for v in [placed.world_position, placed.label_anchor] {
                mix(&mut h, &v.x.to_le_bytes());
                mix(&mut h, &v.y.to_le_bytes());
                mix(&mut h, &v.z.to_le_bytes());
            }
            mix(&mut h, placed.record.display_name.as_bytes());
            mix(&mut h, placed.record.local_name.as_bytes());
            mix(&mut h, &placed.record.age.to_le_bytes());
        }
        h
    }
}
