use glam::Vec3;
use vigil_kernel::Field;
use vigil_lod::LodEngine;

/// Camera configuration for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 50.0, 0.0),
            forward: Vec3::NEG_Z,
            fov_degrees: 75.0,
        }
    }
}

impl RenderView {
    /// View from the observer's eye along `forward`.
    pub fn looking(eye: Vec3, forward: Vec3) -> Self {
        Self {
            eye,
            forward: forward.normalize_or_zero(),
            ..Self::default()
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the placed blocks and the live labels for a view and
/// produces output.
pub trait Renderer {
    type Output;

    fn render(&self, field: &Field, labels: &LodEngine, view: &RenderView) -> Self::Output;
}

/// Plain-text renderer for the CLI, logs and tests.
#[derive(Debug)]
pub struct DebugTextRenderer {
    /// Print at most this many placements; the rest are summarized.
    pub max_blocks: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_blocks: 16 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, field: &Field, labels: &LodEngine, view: &RenderView) -> String {
        let layout = field.layout();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Field ({}/{} placed, side={}, ground={:.1}, anchor={:?}) ===\n",
            field.len(),
            layout.total_count(),
            layout.grid_side(),
            layout.ground_extent(),
            field.anchor_policy()
        ));
        out.push_str(&format!(
            "Eye: ({:.2}, {:.2}, {:.2}) facing ({:.2}, {:.2}, {:.2}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        ));

        for placed in field.records().iter().take(self.max_blocks) {
            let t = placed.block_translation();
            out.push_str(&format!(
                "  #{:<5} ({},{}) block=({:.2}, {:.2}, {:.2}) {}\n",
                placed.index,
                placed.cell.row,
                placed.cell.col,
                t.x,
                t.y,
                t.z,
                placed.record.display_name
            ));
        }
        if field.len() > self.max_blocks {
            out.push_str(&format!("  ... {} more\n", field.len() - self.max_blocks));
        }

        out.push_str(&format!("Labels: {}\n", labels.visible_count()));
        for label in labels.labels() {
            out.push_str(&format!(
                "  #{:<5} {:?} a={:.2} d={:.2} {}\n",
                label.index,
                label.tier,
                label.opacity,
                label.anchor.distance(view.eye),
                label.text.lines().next().unwrap_or_default()
            ));
        }
        out
    }
}
