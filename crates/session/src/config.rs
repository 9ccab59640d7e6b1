use std::path::Path;

use serde::{Deserialize, Serialize};
use vigil_kernel::AnchorPolicy;
use vigil_lod::{LodOpacities, LodPolicy, LodRules, LodScan, LodThresholds};
use vigil_motion::MotionParams;

/// Errors from loading or validating a [`FieldConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Horizontal point the observer drops onto.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPoint {
    pub x: f32,
    pub z: f32,
}

/// Everything that varies between field themes.
///
/// Loaded from YAML; missing keys fall back to the somber preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub label_policy: LodPolicy,
    pub thresholds: LodThresholds,
    pub opacities: LodOpacities,
    pub lod_scan: LodScan,
    pub base_spacing: f32,
    pub spacing_multiplier: f32,
    pub anchor: AnchorPolicy,
    pub motion: MotionParams,
    /// Records requested per dataset fetch.
    pub chunk_size: usize,
    pub spawn: SpawnPoint,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::somber()
    }
}

impl FieldConfig {
    /// Tiered labels above the blocks, widened corridors, slow walk.
    pub fn somber() -> Self {
        Self {
            label_policy: LodPolicy::Tiered,
            thresholds: LodThresholds::default(),
            opacities: LodOpacities::default(),
            lod_scan: LodScan::Bucketed,
            base_spacing: 5.0,
            spacing_multiplier: 4.0 / 3.0,
            anchor: AnchorPolicy::Above { lift: 3.0 },
            motion: MotionParams::default(),
            chunk_size: 1000,
            spawn: SpawnPoint::default(),
        }
    }

    /// Single-threshold labels beside the blocks, tight grid, brisk walk.
    pub fn daylight() -> Self {
        Self {
            label_policy: LodPolicy::Binary,
            spacing_multiplier: 1.0,
            anchor: AnchorPolicy::Side { gap: 0.2 },
            motion: MotionParams {
                walk_speed: 10.0,
                ..MotionParams::default()
            },
            ..Self::somber()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "somber" => Some(Self::somber()),
            "daylight" => Some(Self::daylight()),
            _ => None,
        }
    }

    /// Distance between neighbouring block centers.
    pub fn spacing(&self) -> f32 {
        self.base_spacing * self.spacing_multiplier
    }

    pub fn lod_rules(&self) -> LodRules {
        LodRules::new(self.label_policy, self.thresholds, self.opacities)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !(positive(t.near) && t.near <= t.mid && t.mid <= t.far && t.far.is_finite()) {
            return Err(invalid(format!(
                "thresholds must satisfy 0 < near <= mid <= far, got {} / {} / {}",
                t.near, t.mid, t.far
            )));
        }
        if !positive(t.label_distance) {
            return Err(invalid(format!(
                "label_distance must be positive, got {}",
                t.label_distance
            )));
        }
        let o = &self.opacities;
        if [o.full, o.dim, o.faint]
            .iter()
            .any(|v| !(0.0..=1.0).contains(v))
        {
            return Err(invalid("opacities must lie in [0, 1]".into()));
        }
        if !positive(self.spacing()) {
            return Err(invalid(format!("spacing must be positive, got {}", self.spacing())));
        }
        let m = &self.motion;
        if !(m.walk_speed.is_finite() && m.walk_speed >= 0.0) {
            return Err(invalid(format!("walk_speed must be >= 0, got {}", m.walk_speed)));
        }
        if !positive(m.fall_speed) {
            return Err(invalid(format!("fall_speed must be positive, got {}", m.fall_speed)));
        }
        if !(m.ground_height.is_finite() && m.ground_height <= m.start_height) {
            return Err(invalid(format!(
                "ground_height {} must not exceed start_height {}",
                m.ground_height, m.start_height
            )));
        }
        if !(m.radius.is_finite() && m.radius >= 0.0) {
            return Err(invalid(format!("radius must be >= 0, got {}", m.radius)));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn presets_are_valid() {
        FieldConfig::somber().validate().unwrap();
        FieldConfig::daylight().validate().unwrap();
        assert_eq!(FieldConfig::default(), FieldConfig::somber());
    }

    #[test]
    fn somber_spacing_is_widened() {
        let c = FieldConfig::somber();
        assert!((c.spacing() - 20.0 / 3.0).abs() < 1e-6);
        assert_eq!(FieldConfig::daylight().spacing(), 5.0);
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(
            FieldConfig::preset("daylight").unwrap().label_policy,
            LodPolicy::Binary
        );
        assert!(FieldConfig::preset("neon").is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = FieldConfig::from_yaml_str(
            "label_policy: binary\nthresholds:\n  label_distance: 12.5\nmotion:\n  walk_speed: 6\n",
        )
        .unwrap();
        assert_eq!(c.label_policy, LodPolicy::Binary);
        assert_eq!(c.thresholds.label_distance, 12.5);
        assert_eq!(c.thresholds.far, 30.0);
        assert_eq!(c.motion.walk_speed, 6.0);
        assert_eq!(c.motion.fall_speed, 30.0);
        assert_eq!(c.chunk_size, 1000);
    }

    #[test]
    fn anchor_variant_from_yaml() {
        let c = FieldConfig::from_yaml_str("anchor:\n  kind: side\n  gap: 0.5\n").unwrap();
        assert_eq!(c.anchor, AnchorPolicy::Side { gap: 0.5 });
    }

    #[test]
    fn yaml_round_trip_of_preset() {
        let yaml = FieldConfig::daylight().to_yaml().unwrap();
        assert_eq!(FieldConfig::from_yaml_str(&yaml).unwrap(), FieldConfig::daylight());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let err = FieldConfig::from_yaml_str("thresholds:\n  near: 20\n  mid: 15\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_ground_above_start() {
        let mut c = FieldConfig::somber();
        c.motion.ground_height = 60.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_zero_chunk() {
        let mut c = FieldConfig::somber();
        c.chunk_size = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_opacity() {
        let mut c = FieldConfig::somber();
        c.opacities.dim = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lod_scan: full\nspawn:\n  x: 3.0\n  z: -1.0").unwrap();
        let c = FieldConfig::load(file.path()).unwrap();
        assert_eq!(c.lod_scan, LodScan::Full);
        assert_eq!(c.spawn, SpawnPoint { x: 3.0, z: -1.0 });
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FieldConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
