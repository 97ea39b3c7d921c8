//! Scene contents handed to the drawing surfaces.

use std::rc::Rc;

use glam::Vec3;

use crate::mesh::Mesh;

/// Screen-space text anchored to a world position, drawn by the overlay
/// surface on top of the 3D output.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Text content.
    pub text: String,
    /// World-space anchor.
    pub position: Vec3,
    /// Text color (RGBA).
    pub color: [f32; 4],
    /// Font size in points.
    pub font_size: f32,
    /// Hidden labels are skipped.
    pub visible: bool,
}

impl Label {
    /// Create a white label at `position`.
    pub fn new(position: Vec3, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position,
            color: [1.0, 1.0, 1.0, 1.0],
            font_size: 14.0,
            visible: true,
        }
    }

    /// Builder: set color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Builder: set font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }
}

/// Root of what gets drawn in one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Scene name, used in logs.
    pub name: String,
    /// Clear color (RGBA).
    pub background: [f32; 4],
    /// Meshes drawn by the 3D surface.
    pub meshes: Vec<Rc<Mesh>>,
    /// Labels drawn by the overlay surface.
    pub labels: Vec<Label>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: [0.05, 0.05, 0.1, 1.0],
            meshes: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Add a mesh and return the shared handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Rc<Mesh> {
        let mesh = Rc::new(mesh);
        self.meshes.push(Rc::clone(&mesh));
        mesh
    }

    /// Add a label.
    pub fn add_label(&mut self, label: Label) {
        self.labels.push(label);
    }

    /// Visible meshes, in insertion order.
    pub fn visible_meshes(&self) -> impl Iterator<Item = &Rc<Mesh>> {
        self.meshes.iter().filter(|mesh| mesh.visible)
    }

    /// Visible labels, in insertion order.
    pub fn visible_labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(|label| label.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_items_are_filtered() {
        let mut scene = Scene::new("test");
        scene.add_mesh(Mesh::quad("shown", 1.0, 1.0));
        let mut hidden = Mesh::quad("hidden", 1.0, 1.0);
        hidden.visible = false;
        scene.add_mesh(hidden);

        scene.add_label(Label::new(Vec3::ZERO, "a"));
        let mut label = Label::new(Vec3::ZERO, "b");
        label.visible = false;
        scene.add_label(label);

        let names: Vec<_> = scene.visible_meshes().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["shown"]);
        assert_eq!(scene.visible_labels().count(), 1);
    }
}
