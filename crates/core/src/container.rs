//! The element hosting the drawing surfaces.

use std::cell::{Cell, RefCell};

use glam::UVec2;

/// How a layer is positioned inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerPosition {
    /// Laid out in document order, filling the container.
    #[default]
    Static,
    /// Stacked over the previous layers at a fixed offset.
    Absolute,
}

/// Presentation of a layer inside a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    /// Positioning mode.
    pub position: LayerPosition,
    /// Offset from the top edge, in pixels.
    pub top: f32,
    /// Whether the layer receives pointer input.
    pub pointer_events: bool,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            position: LayerPosition::Static,
            top: 0.0,
            pointer_events: true,
        }
    }
}

impl LayerStyle {
    /// Style of an input-transparent overlay pinned to the top-left corner.
    pub fn overlay() -> Self {
        Self {
            position: LayerPosition::Absolute,
            top: 0.0,
            pointer_events: false,
        }
    }
}

/// Identifies a layer attached to a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

/// A surface attached to a container.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer id.
    pub id: LayerId,
    /// Debug label of the surface owning the layer.
    pub label: String,
    /// Presentation.
    pub style: LayerStyle,
}

/// Element hosting drawing surfaces: exposes its client size (logical
/// pixels) and keeps the ordered stack of attached layers (first appended is
/// at the bottom).
#[derive(Debug)]
pub struct Container {
    client_size: Cell<UVec2>,
    device_pixel_ratio: Cell<f32>,
    layers: RefCell<Vec<Layer>>,
    next_id: Cell<u64>,
}

impl Container {
    /// Create a container with an initial client size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            client_size: Cell::new(UVec2::new(width, height)),
            device_pixel_ratio: Cell::new(1.0),
            layers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Create a container matching a window's inner size and scale factor.
    pub fn from_window(window: &winit::window::Window) -> Self {
        let scale_factor = window.scale_factor();
        let size: winit::dpi::LogicalSize<u32> = window.inner_size().to_logical(scale_factor);
        let container = Self::new(size.width, size.height);
        container.set_device_pixel_ratio(scale_factor as f32);
        container
    }

    /// Physical pixels per logical pixel of the display showing the container.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.get()
    }

    /// Update the device pixel ratio (for example after moving to another
    /// monitor).
    pub fn set_device_pixel_ratio(&self, ratio: f32) {
        self.device_pixel_ratio.set(ratio);
    }

    /// Current client width and height in pixels.
    pub fn client_size(&self) -> UVec2 {
        self.client_size.get()
    }

    /// Update the client size (the host calls this when its layout changes).
    pub fn set_client_size(&self, width: u32, height: u32) {
        self.client_size.set(UVec2::new(width, height));
    }

    /// Attach a layer on top of the stack.
    pub fn append_layer(&self, label: impl Into<String>, style: LayerStyle) -> LayerId {
        let id = LayerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.layers.borrow_mut().push(Layer {
            id,
            label: label.into(),
            style,
        });
        id
    }

    /// Detach a layer. Returns `false` if it was not attached.
    pub fn remove_layer(&self, id: LayerId) -> bool {
        let mut layers = self.layers.borrow_mut();
        let before = layers.len();
        layers.retain(|layer| layer.id != id);
        layers.len() != before
    }

    /// Snapshot of the attached layers, bottom first.
    pub fn layers(&self) -> Vec<Layer> {
        self.layers.borrow().clone()
    }

    /// Whether a layer is currently attached.
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.borrow().iter().any(|layer| layer.id == id)
    }

    /// Topmost layer that accepts pointer input, if any.
    pub fn pointer_target(&self) -> Option<Layer> {
        self.layers
            .borrow()
            .iter()
            .rev()
            .find(|layer| layer.style.pointer_events)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_keep_append_order() {
        let container = Container::new(800, 600);
        let canvas = container.append_layer("canvas", LayerStyle::default());
        let overlay = container.append_layer("labels", LayerStyle::overlay());

        let labels: Vec<_> = container.layers().into_iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["canvas", "labels"]);

        assert!(container.remove_layer(canvas));
        assert!(!container.remove_layer(canvas));
        assert!(container.contains(overlay));
    }

    #[test]
    fn input_transparent_layer_is_skipped_by_pointer_target() {
        let container = Container::new(800, 600);
        container.append_layer("canvas", LayerStyle::default());
        container.append_layer("labels", LayerStyle::overlay());

        let target = container.pointer_target().expect("pointer target");
        assert_eq!(target.label, "canvas");
    }

    #[test]
    fn client_size_updates() {
        let container = Container::new(800, 600);
        container.set_client_size(1024, 768);
        assert_eq!(container.client_size(), UVec2::new(1024, 768));
        assert_eq!(container.device_pixel_ratio(), 1.0);
    }
}
