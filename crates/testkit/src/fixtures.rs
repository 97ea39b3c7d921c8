//! Host harness and scene fixtures.

use std::rc::Rc;

use glam::Vec3;
use scenekit_core::{
    shared, Camera, Components, Container, HostEvent, HostEvents, Label, Mesh, RendererParameters,
    Scene, Shared,
};
use scenekit_render::SimpleRenderer;

use crate::recording::{DrawLog, RecordingOverlay, RecordingSurface};

/// Renderer over recording surfaces.
pub type RecordingRenderer = SimpleRenderer<RecordingSurface, RecordingOverlay>;

/// A host: container, event dispatcher and the registry bound to them.
#[derive(Debug)]
pub struct Harness {
    /// Container hosting the surfaces.
    pub container: Rc<Container>,
    /// Host event dispatcher.
    pub events: Rc<HostEvents>,
    /// Registry handed to components.
    pub components: Rc<Components>,
}

impl Harness {
    /// Create a harness with a `width` x `height` container and an empty
    /// registry.
    pub fn new(width: u32, height: u32) -> Self {
        let container = Rc::new(Container::new(width, height));
        let events = Rc::new(HostEvents::new());
        let components = Rc::new(Components::new(
            Rc::clone(&container),
            Rc::clone(&events),
        ));
        Self {
            container,
            events,
            components,
        }
    }

    /// Register a scene and a camera looking down `-Z` from `camera_z`.
    pub fn with_scene(self, scene: Scene, camera_z: f32) -> Self {
        self.components.set_scene(Some(shared(scene)));
        self.components
            .set_camera(Some(shared(camera_at(Vec3::new(0.0, 0.0, camera_z), &self.container))));
        self
    }

    /// Resize the container, then notify listeners the way a window would.
    pub fn resize(&self, width: u32, height: u32) {
        self.container.set_client_size(width, height);
        self.events.dispatch(&HostEvent::Resized { width, height });
    }

    /// Move the pointer to container pixel `(x, y)`.
    pub fn move_pointer(&self, x: f64, y: f64) {
        self.events.dispatch(&HostEvent::PointerMoved { x, y });
    }

    /// Create a renderer over recording surfaces sharing `log`.
    pub fn renderer(&self, log: &DrawLog, parameters: RendererParameters) -> RecordingRenderer {
        SimpleRenderer::new(
            Rc::clone(&self.components),
            Rc::clone(&self.container),
            RecordingSurface::new(log.clone()),
            RecordingOverlay::new(log.clone()),
            parameters,
        )
    }
}

/// Camera at `position` looking down `-Z`, with the container's aspect ratio.
pub fn camera_at(position: Vec3, container: &Container) -> Camera {
    let size = container.client_size();
    let aspect = if size.y == 0 {
        1.0
    } else {
        size.x as f32 / size.y as f32
    };
    Camera::new(aspect).with_position(position)
}

/// A `size` x `size` quad facing the camera at depth `z`.
pub fn wall(name: &str, z: f32, size: f32) -> Rc<Mesh> {
    Rc::new(Mesh::quad(name, size, size).with_translation(Vec3::new(0.0, 0.0, z)))
}

/// Scene with two walls (`front` at z = -5, `back` at z = -10) and one label.
pub fn two_wall_scene(name: &str) -> (Scene, Rc<Mesh>, Rc<Mesh>) {
    let mut scene = Scene::new(name);
    let front = wall("front", -5.0, 4.0);
    let back = wall("back", -10.0, 20.0);
    scene.meshes.push(Rc::clone(&front));
    scene.meshes.push(Rc::clone(&back));
    scene.add_label(Label::new(Vec3::new(0.0, 2.5, -5.0), "front"));
    (scene, front, back)
}

/// Shared scene/camera pair, for override tests.
pub fn shared_pair(name: &str, camera_position: Vec3) -> (Shared<Scene>, Shared<Camera>) {
    (
        shared(Scene::new(name)),
        shared(Camera::new(1.0).with_position(camera_position)),
    )
}
