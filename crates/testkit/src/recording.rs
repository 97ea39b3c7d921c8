//! Surfaces that record every call instead of drawing.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use glam::UVec2;
use scenekit_core::{Camera, Plane, Scene};
use scenekit_render::{DrawSurface, OverlaySurface};
use serde::Serialize;

/// One call made on a recording surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    /// 3D draw.
    Render {
        /// Name of the drawn scene.
        scene: String,
        /// Camera position.
        camera: [f32; 3],
        /// Planes handed to the surface.
        clipping_planes: usize,
    },
    /// Overlay draw.
    Overlay {
        /// Name of the drawn scene.
        scene: String,
        /// Visible labels in the scene.
        labels: usize,
    },
    /// Size change on either surface.
    SetSize {
        /// Which surface.
        surface: &'static str,
        /// Logical width.
        width: u32,
        /// Logical height.
        height: u32,
    },
    /// Pixel ratio change on either surface.
    SetPixelRatio {
        /// Which surface.
        surface: &'static str,
        /// Applied ratio.
        ratio: f32,
    },
    /// Disposal of either surface.
    Dispose {
        /// Which surface.
        surface: &'static str,
    },
}

/// Ordered call log shared by a recording surface pair.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    calls: Rc<RefCell<Vec<SurfaceCall>>>,
}

impl DrawLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: SurfaceCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Every call, in order.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    /// Scene names drawn by the 3D surface, in order.
    pub fn rendered_scenes(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Render { scene, .. } => Some(scene.clone()),
                _ => None,
            })
            .collect()
    }

    /// Scene names drawn by the overlay, in order.
    pub fn overlay_scenes(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Overlay { scene, .. } => Some(scene.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of 3D draws.
    pub fn render_count(&self) -> usize {
        self.rendered_scenes().len()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Dump the log as newline-delimited JSON, creating parent dirs if needed.
    pub fn write_jsonl<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path.as_ref())?;
        let calls = self.calls.borrow();
        for call in calls.iter() {
            let line = serde_json::to_string(call)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        tracing::debug!(path = %path.as_ref().display(), calls = calls.len(), "Wrote draw log");
        Ok(())
    }
}

/// [`DrawSurface`] that records its calls to a [`DrawLog`].
#[derive(Debug)]
pub struct RecordingSurface {
    log: DrawLog,
    size: UVec2,
    pixel_ratio: f32,
    local_clipping: bool,
    disposed: bool,
    fail_next: Option<String>,
}

impl RecordingSurface {
    /// Create a surface writing into `log`.
    pub fn new(log: DrawLog) -> Self {
        Self {
            log,
            size: UVec2::ZERO,
            pixel_ratio: 1.0,
            local_clipping: false,
            disposed: false,
            fail_next: None,
        }
    }

    /// Make the next `render` fail with `message`.
    pub fn fail_next_render(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Last applied pixel ratio.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Whether local clipping was enabled.
    pub fn local_clipping(&self) -> bool {
        self.local_clipping
    }

    /// Whether `dispose` was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl DrawSurface for RecordingSurface {
    fn render(&mut self, scene: &Scene, camera: &Camera, clipping_planes: &[Plane]) -> Result<()> {
        if let Some(message) = self.fail_next.take() {
            return Err(anyhow!(message));
        }
        self.log.push(SurfaceCall::Render {
            scene: scene.name.clone(),
            camera: camera.position.to_array(),
            clipping_planes: clipping_planes.len(),
        });
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = UVec2::new(width, height);
        self.log.push(SurfaceCall::SetSize {
            surface: "3d",
            width,
            height,
        });
    }

    fn size(&self) -> UVec2 {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
        self.log.push(SurfaceCall::SetPixelRatio {
            surface: "3d",
            ratio,
        });
    }

    fn set_local_clipping(&mut self, enabled: bool) {
        self.local_clipping = enabled;
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.log.push(SurfaceCall::Dispose { surface: "3d" });
    }
}

/// [`OverlaySurface`] that records its calls to a [`DrawLog`].
#[derive(Debug)]
pub struct RecordingOverlay {
    log: DrawLog,
    size: UVec2,
    pixel_ratio: f32,
    disposed: bool,
}

impl RecordingOverlay {
    /// Create an overlay writing into `log`.
    pub fn new(log: DrawLog) -> Self {
        Self {
            log,
            size: UVec2::ZERO,
            pixel_ratio: 1.0,
            disposed: false,
        }
    }

    /// Last applied size.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Last applied pixel ratio.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Whether `dispose` was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl OverlaySurface for RecordingOverlay {
    fn render(&mut self, scene: &Scene, _camera: &Camera) -> Result<()> {
        self.log.push(SurfaceCall::Overlay {
            scene: scene.name.clone(),
            labels: scene.visible_labels().count(),
        });
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = UVec2::new(width, height);
        self.log.push(SurfaceCall::SetSize {
            surface: "overlay",
            width,
            height,
        });
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
        self.log.push(SurfaceCall::SetPixelRatio {
            surface: "overlay",
            ratio,
        });
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.log.push(SurfaceCall::Dispose {
            surface: "overlay",
        });
    }
}
