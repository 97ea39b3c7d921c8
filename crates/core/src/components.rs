//! Host registry shared by the components.
//!
//! The registry is read by the raycaster and the renderer; the host decides
//! what is in it. Nothing here is owned by a component.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::camera::Camera;
use crate::container::Container;
use crate::geometry::Plane;
use crate::host::HostEvents;
use crate::mesh::Mesh;
use crate::scene::Scene;
use crate::Shared;

/// Current scene, camera, raycast candidates and clipping planes, plus the
/// container and host event dispatcher the components attach to.
#[derive(Debug)]
pub struct Components {
    scene: RefCell<Option<Shared<Scene>>>,
    camera: RefCell<Option<Shared<Camera>>>,
    meshes: RefCell<Vec<Rc<Mesh>>>,
    clipping_planes: RefCell<Vec<Plane>>,
    container: Rc<Container>,
    events: Rc<HostEvents>,
}

impl Components {
    /// Create an empty registry bound to a container and event dispatcher.
    pub fn new(container: Rc<Container>, events: Rc<HostEvents>) -> Self {
        Self {
            scene: RefCell::new(None),
            camera: RefCell::new(None),
            meshes: RefCell::new(Vec::new()),
            clipping_planes: RefCell::new(Vec::new()),
            container,
            events,
        }
    }

    /// Container hosting the drawing surfaces.
    pub fn container(&self) -> &Rc<Container> {
        &self.container
    }

    /// Host event dispatcher.
    pub fn events(&self) -> &Rc<HostEvents> {
        &self.events
    }

    /// Current scene, if any.
    pub fn scene(&self) -> Option<Shared<Scene>> {
        self.scene.borrow().clone()
    }

    /// Replace the current scene.
    pub fn set_scene(&self, scene: Option<Shared<Scene>>) {
        *self.scene.borrow_mut() = scene;
    }

    /// Current camera, if any.
    pub fn camera(&self) -> Option<Shared<Camera>> {
        self.camera.borrow().clone()
    }

    /// Replace the current camera.
    pub fn set_camera(&self, camera: Option<Shared<Camera>>) {
        *self.camera.borrow_mut() = camera;
    }

    /// Register a mesh as a raycast candidate.
    pub fn add_mesh(&self, mesh: Rc<Mesh>) {
        debug!(mesh = %mesh.name, "Registered raycast candidate");
        self.meshes.borrow_mut().push(mesh);
    }

    /// Unregister a mesh. Returns `false` if it was not registered.
    pub fn remove_mesh(&self, mesh: &Rc<Mesh>) -> bool {
        let mut meshes = self.meshes.borrow_mut();
        let before = meshes.len();
        meshes.retain(|candidate| !Rc::ptr_eq(candidate, mesh));
        meshes.len() != before
    }

    /// Snapshot of the raycast candidates.
    pub fn meshes(&self) -> Vec<Rc<Mesh>> {
        self.meshes.borrow().clone()
    }

    /// Snapshot of the active clipping planes.
    pub fn clipping_planes(&self) -> Vec<Plane> {
        self.clipping_planes.borrow().clone()
    }

    /// Replace the active clipping planes.
    pub fn set_clipping_planes(&self, planes: Vec<Plane>) {
        *self.clipping_planes.borrow_mut() = planes;
    }

    /// Add one clipping plane.
    pub fn add_clipping_plane(&self, plane: Plane) {
        self.clipping_planes.borrow_mut().push(plane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;
    use glam::Vec3;

    fn registry() -> Components {
        Components::new(Rc::new(Container::new(640, 480)), Rc::new(HostEvents::new()))
    }

    #[test]
    fn meshes_are_removed_by_identity() {
        let components = registry();
        let a = Rc::new(Mesh::quad("same", 1.0, 1.0));
        let b = Rc::new(Mesh::quad("same", 1.0, 1.0));
        components.add_mesh(Rc::clone(&a));
        components.add_mesh(Rc::clone(&b));

        assert!(components.remove_mesh(&a));
        assert!(!components.remove_mesh(&a));
        let remaining = components.meshes();
        assert_eq!(remaining.len(), 1);
        assert!(Rc::ptr_eq(&remaining[0], &b));
    }

    #[test]
    fn scene_and_camera_are_optional() {
        let components = registry();
        assert!(components.scene().is_none());
        assert!(components.camera().is_none());

        components.set_scene(Some(shared(Scene::new("main"))));
        components.set_camera(Some(shared(Camera::default())));
        assert_eq!(components.scene().unwrap().borrow().name, "main");
        assert!(components.camera().is_some());
    }

    #[test]
    fn clipping_planes_accumulate() {
        let components = registry();
        components.add_clipping_plane(Plane::new(Vec3::X, 0.0));
        components.add_clipping_plane(Plane::new(Vec3::Y, 1.0));
        assert_eq!(components.clipping_planes().len(), 2);

        components.set_clipping_planes(Vec::new());
        assert!(components.clipping_planes().is_empty());
    }
}
