use std::collections::HashMap;

use glam::Vec3;
use vigil_common::LabelId;
use vigil_lod::{LabelTransition, LodTier};

/// Something that draws floating labels, e.g. a DOM overlay or a text
/// batch in a GPU pass.
pub trait LabelSurface {
    fn apply(&mut self, transition: &LabelTransition);

    fn apply_all(&mut self, transitions: &[LabelTransition]) {
        for t in transitions {
            self.apply(t);
        }
    }
}

/// A label as the surface holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceLabel {
    pub index: usize,
    pub anchor: Vec3,
    pub text: String,
    pub tier: LodTier,
    pub opacity: f32,
}

/// In-memory surface that mirrors the engine's live label set.
#[derive(Debug, Default)]
pub struct DebugLabelSurface {
    labels: HashMap<LabelId, SurfaceLabel>,
    created: usize,
    destroyed: usize,
}

impl DebugLabelSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, id: &LabelId) -> Option<&SurfaceLabel> {
        self.labels.get(id)
    }

    pub fn find_by_index(&self, index: usize) -> Option<&SurfaceLabel> {
        self.labels.values().find(|l| l.index == index)
    }

    /// Lifetime `(created, destroyed)` counts.
    pub fn churn(&self) -> (usize, usize) {
        (self.created, self.destroyed)
    }
}

impl LabelSurface for DebugLabelSurface {
    fn apply(&mut self, transition: &LabelTransition) {
        match transition {
            LabelTransition::Created(handle) => {
                self.created += 1;
                self.labels.insert(
                    handle.id,
                    SurfaceLabel {
                        index: handle.index,
                        anchor: handle.anchor,
                        text: handle.text.clone(),
                        tier: handle.tier,
                        opacity: handle.opacity,
                    },
                );
            }
            LabelTransition::OpacityChanged {
                id, tier, opacity, ..
            } => match self.labels.get_mut(id) {
                Some(label) => {
                    label.tier = *tier;
                    label.opacity = *opacity;
                }
                None => tracing::warn!(?id, "opacity change for unknown label"),
            },
            LabelTransition::Destroyed { id, .. } => {
                if self.labels.remove(id).is_some() {
                    self.destroyed += 1;
                } else {
                    tracing::warn!(?id, "destroy for unknown label");
                }
            }
        }
    }
}
