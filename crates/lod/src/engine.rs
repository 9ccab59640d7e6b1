use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use vigil_collision::BucketGrid;
use vigil_common::{LabelId, PlacedRecord};

use crate::policy::{LodRules, LodTier};

/// How the engine picks which records to evaluate each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LodScan {
    /// Evaluate every placed record.
    Full,
    /// Evaluate records bucketed near the observer plus every labelled record.
    #[default]
    Bucketed,
}

/// A live label. Exists only while its record's tier is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelHandle {
    pub id: LabelId,
    pub index: usize,
    pub anchor: Vec3,
    pub text: String,
    pub tier: LodTier,
    pub opacity: f32,
}

/// A change the render boundary must mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelTransition {
    /// Attach a new label element.
    Created(LabelHandle),
    /// Restyle an existing element.
    OpacityChanged {
        id: LabelId,
        index: usize,
        tier: LodTier,
        opacity: f32,
    },
    /// Detach and drop the element.
    Destroyed { id: LabelId, index: usize },
}

/// Per-frame LOD statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct LodStats {
    pub evaluated: usize,
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub visible: usize,
    pub elapsed: Duration,
}

/// Result of one LOD pass.
#[derive(Debug, Clone, Default)]
pub struct LodFrame {
    pub transitions: Vec<LabelTransition>,
    pub stats: LodStats,
}

impl LodFrame {
    pub fn is_quiet(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// Owns every label handle and decides, once per frame, which records
/// carry one.
///
/// The engine reads the append-only placed-record slice each frame; records
/// ingested since the previous pass are picked up automatically.
#[derive(Debug)]
pub struct LodEngine {
    rules: LodRules,
    scan: LodScan,
    labels: Vec<Option<LabelHandle>>,
    visible: BTreeSet<usize>,
    anchors: BucketGrid,
    tracked: usize,
    stats: LodStats,
}

impl LodEngine {
    /// Engine with no labels yet.
    ///
    /// # Panics
    ///
    /// If `rules.reach()` is not positive; it sizes the anchor buckets.
    /// `FieldConfig::validate` guarantees this for session-built rules.
    pub fn new(rules: LodRules, scan: LodScan) -> Self {
        Self {
            rules,
            scan,
            labels: Vec::new(),
            visible: BTreeSet::new(),
            anchors: BucketGrid::new(rules.reach()),
            tracked: 0,
            stats: LodStats::default(),
        }
    }

    pub fn rules(&self) -> &LodRules {
        &self.rules
    }

    pub fn scan(&self) -> LodScan {
        self.scan
    }

    /// Live label for a record, if any.
    pub fn label(&self, index: usize) -> Option<&LabelHandle> {
        self.labels.get(index).and_then(Option::as_ref)
    }

    /// All live labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &LabelHandle> {
        self.visible.iter().filter_map(|&i| self.label(i))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Statistics from the last pass.
    pub fn stats(&self) -> &LodStats {
        &self.stats
    }

    /// Run one LOD pass for an observer at `observer`.
    pub fn evaluate(&mut self, observer: Vec3, records: &[PlacedRecord]) -> LodFrame {
        let _span = tracing::info_span!("lod_update").entered();
        let start = Instant::now();

        self.track(records);

        let mut transitions = Vec::new();
        let evaluated = match self.scan {
            LodScan::Full => {
                for placed in records {
                    self.evaluate_one(placed, observer, &mut transitions);
                }
                records.len()
            }
            LodScan::Bucketed => {
                let reach = Vec3::new(self.rules.reach(), 0.0, self.rules.reach());
                let mut candidates = self
                    .anchors
                    .items_in_extent(observer - reach, observer + reach);
                candidates.extend(self.visible.iter().copied());
                for &index in &candidates {
                    self.evaluate_one(&records[index], observer, &mut transitions);
                }
                candidates.len()
            }
        };

        let mut stats = LodStats {
            evaluated,
            visible: self.visible.len(),
            ..LodStats::default()
        };
        for t in &transitions {
            match t {
                LabelTransition::Created(_) => stats.created += 1,
                LabelTransition::OpacityChanged { .. } => stats.updated += 1,
                LabelTransition::Destroyed { .. } => stats.destroyed += 1,
            }
        }
        stats.elapsed = start.elapsed();

        tracing::trace!(
            evaluated = stats.evaluated,
            created = stats.created,
            updated = stats.updated,
            destroyed = stats.destroyed,
            visible = stats.visible,
            "lod update complete"
        );

        self.stats = stats.clone();
        LodFrame { transitions, stats }
    }

    /// Destroy every live label, e.g. when the session shuts down.
    pub fn clear(&mut self) -> Vec<LabelTransition> {
        let mut out = Vec::with_capacity(self.visible.len());
        for index in std::mem::take(&mut self.visible) {
            if let Some(handle) = self.labels[index].take() {
                out.push(LabelTransition::Destroyed {
                    id: handle.id,
                    index,
                });
            }
        }
        out
    }

    /// Grow per-record storage to cover newly placed records.
    fn track(&mut self, records: &[PlacedRecord]) {
        if records.len() <= self.tracked {
            return;
        }
        for placed in &records[self.tracked..] {
            self.anchors.insert_point(placed.label_anchor, placed.index);
        }
        self.labels.resize(records.len(), None);
        self.tracked = records.len();
    }

    fn evaluate_one(
        &mut self,
        placed: &PlacedRecord,
        observer: Vec3,
        out: &mut Vec<LabelTransition>,
    ) {
        let index = placed.index;
        let tier = self.rules.tier_for(observer.distance(placed.label_anchor));
        let slot = &mut self.labels[index];
        let current = slot.as_ref().map(|h| h.tier);

        match (current, self.rules.opacity(tier)) {
            (None, None) => {}
            (None, Some(opacity)) => {
                let handle = LabelHandle {
                    id: LabelId::new(),
                    index,
                    anchor: placed.label_anchor,
                    text: placed.record.label_text(),
                    tier,
                    opacity,
                };
                tracing::debug!(index, ?tier, "label created");
                out.push(LabelTransition::Created(handle.clone()));
                *slot = Some(handle);
                self.visible.insert(index);
            }
            (Some(old), Some(opacity)) if old != tier => {
                if let Some(handle) = slot.as_mut() {
                    handle.tier = tier;
                    handle.opacity = opacity;
                    out.push(LabelTransition::OpacityChanged {
                        id: handle.id,
                        index,
                        tier,
                        opacity,
                    });
                }
            }
            (Some(_), Some(_)) => {}
            (Some(_), None) => {
                if let Some(handle) = slot.take() {
                    tracing::debug!(index, "label destroyed");
                    out.push(LabelTransition::Destroyed {
                        id: handle.id,
                        index,
                    });
                }
                self.visible.remove(&index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{LodOpacities, LodPolicy, LodThresholds};
    use vigil_common::Record;
    use vigil_kernel::{AnchorPolicy, Field, GridLayout};

    #[test]
    #[should_panic(expected = "cell_size must be positive")]
    fn zero_reach_is_a_precondition() {
        let rules = LodRules {
            policy: LodPolicy::Binary,
            thresholds: LodThresholds {
                label_distance: 0.0,
                ..LodThresholds::default()
            },
            opacities: LodOpacities::default(),
        };
        LodEngine::new(rules, LodScan::Full);
    }

    fn field(total: usize, spacing: f32) -> Field {
        let mut f = Field::new(
            GridLayout::new(total, spacing).unwrap(),
            AnchorPolicy::Above { lift: 3.0 },
        );
        let records = (0..total)
            .map(|i| Record::new(format!("Name {i}"), format!("Local {i}"), i as u32))
            .collect();
        f.ingest_batch(records).unwrap();
        f
    }

    fn engine(policy: LodPolicy, scan: LodScan) -> LodEngine {
        LodEngine::new(
            LodRules::new(policy, LodThresholds::default(), LodOpacities::default()),
            scan,
        )
    }

    /// Observer standing `d` units from the single record's anchor.
    fn at_distance(d: f32) -> Vec3 {
        Vec3::new(d, 5.0, 0.0)
    }

    #[test]
    fn hidden_to_visible_creates_label() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Tiered, LodScan::Full);
        let frame = e.evaluate(at_distance(5.0), f.records());
        assert_eq!(frame.transitions.len(), 1);
        match &frame.transitions[0] {
            LabelTransition::Created(h) => {
                assert_eq!(h.index, 0);
                assert_eq!(h.opacity, 1.0);
                assert_eq!(h.tier, LodTier::Full);
                assert_eq!(h.text, "Name 0\nLocal 0\nAge: 0");
                assert_eq!(h.anchor, Vec3::new(0.0, 5.0, 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(e.visible_count(), 1);
    }

    #[test]
    fn far_observer_creates_nothing() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Tiered, LodScan::Full);
        assert!(e.evaluate(at_distance(45.0), f.records()).is_quiet());
        assert!(e.label(0).is_none());
    }

    #[test]
    fn tier_change_updates_in_place() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Tiered, LodScan::Full);
        e.evaluate(at_distance(9.9), f.records());
        let id = e.label(0).unwrap().id;

        let frame = e.evaluate(at_distance(10.1), f.records());
        assert_eq!(
            frame.transitions,
            vec![LabelTransition::OpacityChanged {
                id,
                index: 0,
                tier: LodTier::Dim,
                opacity: 0.3
            }]
        );
        assert_eq!(e.label(0).unwrap().id, id);

        e.evaluate(at_distance(20.0), f.records());
        let h = e.label(0).unwrap();
        assert_eq!((h.id, h.tier, h.opacity), (id, LodTier::Faint, 0.1));
    }

    #[test]
    fn leaving_range_destroys_label() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Tiered, LodScan::Full);
        e.evaluate(at_distance(12.0), f.records());
        let id = e.label(0).unwrap().id;

        let frame = e.evaluate(at_distance(30.0), f.records());
        assert_eq!(
            frame.transitions,
            vec![LabelTransition::Destroyed { id, index: 0 }]
        );
        assert!(e.label(0).is_none());
        assert_eq!(e.labels().count(), 0);
    }

    #[test]
    fn reentry_creates_fresh_label() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Binary, LodScan::Full);
        e.evaluate(at_distance(1.0), f.records());
        let first = e.label(0).unwrap().id;
        e.evaluate(at_distance(50.0), f.records());
        e.evaluate(at_distance(1.0), f.records());
        assert_ne!(e.label(0).unwrap().id, first);
    }

    #[test]
    fn same_position_is_idempotent() {
        let f = field(100, 5.0);
        for scan in [LodScan::Full, LodScan::Bucketed] {
            let mut e = engine(LodPolicy::Tiered, scan);
            let p = Vec3::new(3.0, 1.6, -4.0);
            let first = e.evaluate(p, f.records());
            assert!(!first.is_quiet());
            let second = e.evaluate(p, f.records());
            assert!(second.is_quiet(), "{scan:?} churned");
            assert_eq!(second.stats.visible, first.stats.visible);
        }
    }

    #[test]
    fn binary_threshold_edges() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Binary, LodScan::Full);
        e.evaluate(at_distance(9.9), f.records());
        assert_eq!(e.label(0).unwrap().opacity, 1.0);
        let frame = e.evaluate(at_distance(10.1), f.records());
        assert_eq!(frame.stats.destroyed, 1);
        assert!(e.label(0).is_none());
    }

    #[test]
    fn binary_has_no_intermediate_tiers() {
        let f = field(1, 5.0);
        let mut e = engine(LodPolicy::Binary, LodScan::Full);
        let mut d = 0.0;
        while d < 40.0 {
            e.evaluate(at_distance(d), f.records());
            if let Some(h) = e.label(0) {
                assert_eq!(h.tier, LodTier::Full);
            }
            d += 0.5;
        }
    }

    #[test]
    fn late_records_are_picked_up() {
        let mut f = Field::new(GridLayout::new(4, 5.0).unwrap(), AnchorPolicy::default());
        f.ingest_batch(vec![Record::new("a", "a", 1), Record::new("b", "b", 2)])
            .unwrap();
        let mut e = engine(LodPolicy::Tiered, LodScan::Bucketed);
        let p = Vec3::new(0.0, 1.6, 0.0);
        let frame = e.evaluate(p, f.records());
        assert_eq!(frame.stats.created, 2);

        f.ingest_batch(vec![Record::new("c", "c", 3), Record::new("d", "d", 4)])
            .unwrap();
        let frame = e.evaluate(p, f.records());
        assert_eq!(frame.stats.created, 2);
        assert_eq!(e.visible_count(), 4);
    }

    #[test]
    fn clear_destroys_everything() {
        let f = field(9, 5.0);
        let mut e = engine(LodPolicy::Tiered, LodScan::Full);
        e.evaluate(Vec3::new(0.0, 1.6, 0.0), f.records());
        let live = e.visible_count();
        assert!(live > 0);
        let out = e.clear();
        assert_eq!(out.len(), live);
        assert_eq!(e.labels().count(), 0);
    }

    #[test]
    fn bucketed_scan_matches_full_scan() {
        let f = field(900, 5.0);
        let mut full = engine(LodPolicy::Tiered, LodScan::Full);
        let mut bucketed = engine(LodPolicy::Tiered, LodScan::Bucketed);

        // Walk a diagonal across the field and back through the middle.
        let mut path = Vec::new();
        for step in 0..200 {
            let t = step as f32 * 0.5 - 50.0;
            path.push(Vec3::new(t, 1.6, t * 0.7));
        }
        for step in 0..60 {
            path.push(Vec3::new(0.0, 1.6, step as f32 * 1.3 - 40.0));
        }

        for p in path {
            full.evaluate(p, f.records());
            bucketed.evaluate(p, f.records());
            let a: Vec<(usize, LodTier)> = full.labels().map(|h| (h.index, h.tier)).collect();
            let b: Vec<(usize, LodTier)> =
                bucketed.labels().map(|h| (h.index, h.tier)).collect();
            assert_eq!(a, b, "diverged at {p}");
        }
        assert!(bucketed.stats().evaluated < full.stats().evaluated);
    }
}
