#![warn(missing_docs)]
//! Rendering component and the wgpu/egui surfaces it drives.
//!
//! [`SimpleRenderer`] is generic over its two surfaces so it can run on
//! [`GpuSurface`] + [`LabelOverlay`] in the viewer and on recording
//! surfaces in tests.

mod context;
mod overlay;
mod pipeline;
mod renderer;
mod surface;

pub use context::GpuContext;
pub use overlay::{place_labels, LabelOverlay, PlacedLabel};
pub use pipeline::{
    scene_vertices, CameraUniform, ClippingUniform, GpuSurface, MeshVertex, MAX_CLIPPING_PLANES,
};
pub use renderer::SimpleRenderer;
pub use surface::{DrawSurface, OverlaySurface};

/// Renderer wired to the wgpu 3D surface and the egui label overlay.
pub type GpuRenderer = SimpleRenderer<GpuSurface, LabelOverlay>;
