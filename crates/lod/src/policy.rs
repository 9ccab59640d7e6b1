use serde::{Deserialize, Serialize};

/// How distances map to label tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LodPolicy {
    /// One threshold: labels are either full or hidden.
    Binary,
    /// Three visible tiers fading with distance.
    #[default]
    Tiered,
}

/// Visibility tier of a label. Ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LodTier {
    Hidden,
    Faint,
    Dim,
    Full,
}

impl LodTier {
    pub fn is_visible(self) -> bool {
        self != Self::Hidden
    }
}

/// Distance thresholds, in world units from the label anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodThresholds {
    /// Tiered: below this distance the label is full.
    pub near: f32,
    /// Tiered: below this distance the label is dim.
    pub mid: f32,
    /// Tiered: below this distance the label is faint; at or beyond, hidden.
    pub far: f32,
    /// Binary: below this distance the label is full; at or beyond, hidden.
    pub label_distance: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            near: 10.0,
            mid: 15.0,
            far: 30.0,
            label_distance: 10.0,
        }
    }
}

/// Opacity for each visible tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodOpacities {
    pub full: f32,
    pub dim: f32,
    pub faint: f32,
}

impl Default for LodOpacities {
    fn default() -> Self {
        Self {
            full: 1.0,
            dim: 0.3,
            faint: 0.1,
        }
    }
}

/// Policy plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LodRules {
    pub policy: LodPolicy,
    pub thresholds: LodThresholds,
    pub opacities: LodOpacities,
}

impl LodRules {
    pub fn new(policy: LodPolicy, thresholds: LodThresholds, opacities: LodOpacities) -> Self {
        Self {
            policy,
            thresholds,
            opacities,
        }
    }

    /// Tier for a label `distance` away. NaN distances are hidden.
    pub fn tier_for(&self, distance: f32) -> LodTier {
        let t = &self.thresholds;
        match self.policy {
            LodPolicy::Binary => {
                if distance < t.label_distance {
                    LodTier::Full
                } else {
                    LodTier::Hidden
                }
            }
            LodPolicy::Tiered => {
                if distance < t.near {
                    LodTier::Full
                } else if distance < t.mid {
                    LodTier::Dim
                } else if distance < t.far {
                    LodTier::Faint
                } else {
                    LodTier::Hidden
                }
            }
        }
    }

    /// Opacity of a tier, `None` when hidden.
    pub fn opacity(&self, tier: LodTier) -> Option<f32> {
        match tier {
            LodTier::Hidden => None,
            LodTier::Faint => Some(self.opacities.faint),
            LodTier::Dim => Some(self.opacities.dim),
            LodTier::Full => Some(self.opacities.full),
        }
    }

    /// Distance at and beyond which every label is hidden.
    pub fn reach(&self) -> f32 {
        match self.policy {
            LodPolicy::Binary => self.thresholds.label_distance,
            LodPolicy::Tiered => self.thresholds.far,
        }
    }
}
