//! Rendering Adapter: what a graphics backend sees of the field.
//!
//! # Invariants
//! - Renderers read placements and labels; they never mutate them.
//! - A label surface changes only through [`LabelTransition`]s.
//!
//! [`LabelTransition`]: vigil_lod::LabelTransition

mod renderer;
mod surface;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use surface::{DebugLabelSurface, LabelSurface, SurfaceLabel};

pub fn crate_info() -> &'static str {
    "vigil-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
