//! Drawing surfaces owned by the renderer.
//!
//! Sizes are in logical pixels; implementations multiply by their pixel
//! ratio when allocating backing storage.

use anyhow::Result;
use glam::UVec2;
use scenekit_core::{Camera, Plane, Scene};

/// Surface drawing the 3D meshes of a scene.
pub trait DrawSurface {
    /// Draw `scene` as seen from `camera`. Fragments on the non-positive side
    /// of any plane are discarded while local clipping is on.
    fn render(&mut self, scene: &Scene, camera: &Camera, clipping_planes: &[Plane]) -> Result<()>;

    /// Resize the drawing buffer.
    fn set_size(&mut self, width: u32, height: u32);

    /// Current size in logical pixels.
    fn size(&self) -> UVec2;

    /// Set the physical/logical pixel ratio.
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Enable or disable clipping-plane evaluation.
    fn set_local_clipping(&mut self, enabled: bool);

    /// Release every GPU resource. Safe to call twice.
    fn dispose(&mut self);
}

/// Surface drawing screen-space labels on top of the 3D output.
pub trait OverlaySurface {
    /// Draw the labels of `scene` as seen from `camera`.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;

    /// Resize the overlay.
    fn set_size(&mut self, width: u32, height: u32);

    /// Set the physical/logical pixel ratio.
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Release every resource. Safe to call twice.
    fn dispose(&mut self);
}
