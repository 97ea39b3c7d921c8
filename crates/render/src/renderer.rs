//! Renderer component driving a 3D surface and a label overlay.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use glam::UVec2;
use scenekit_core::{
    Camera, Component, Components, Container, Disposable, Event, HostEventKind, LayerId,
    LayerStyle, ListenerId, RendererParameters, Resizeable, Scene, Shared, Updateable,
};
use tracing::{debug, info};

use crate::surface::{DrawSurface, OverlaySurface};

struct RendererState<S, O> {
    components: Rc<Components>,
    container: Rc<Container>,
    parameters: RendererParameters,
    surface: RefCell<S>,
    overlay: RefCell<O>,
    enabled: Cell<bool>,
    disposed: Cell<bool>,
    override_scene: RefCell<Option<Shared<Scene>>>,
    override_camera: RefCell<Option<Shared<Camera>>>,
    on_before_update: Event<SimpleRenderer<S, O>>,
    on_after_update: Event<SimpleRenderer<S, O>>,
    on_resize: Event<SimpleRenderer<S, O>>,
    resize_listener: Cell<Option<ListenerId>>,
    layers: Cell<Option<(LayerId, LayerId)>>,
}

/// Owns a 3D drawing surface and a label overlay attached to the same
/// container, keeps both sized to it and draws the current scene through
/// both on every update.
///
/// The scene and camera come from the override pair when both are set,
/// otherwise from the registry. Neither is ever created or destroyed here.
///
/// Cloning yields another handle to the same renderer.
pub struct SimpleRenderer<S, O> {
    state: Rc<RendererState<S, O>>,
}

impl<S, O> Clone for SimpleRenderer<S, O> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S, O> SimpleRenderer<S, O>
where
    S: DrawSurface + 'static,
    O: OverlaySurface + 'static,
{
    /// Attach both surfaces to `container`, start following host resizes and
    /// perform the initial size sync.
    pub fn new(
        components: Rc<Components>,
        container: Rc<Container>,
        mut surface: S,
        mut overlay: O,
        parameters: RendererParameters,
    ) -> Self {
        let pixel_ratio = parameters.effective_pixel_ratio(container.device_pixel_ratio());
        surface.set_pixel_ratio(pixel_ratio);
        surface.set_local_clipping(parameters.local_clipping);
        overlay.set_pixel_ratio(pixel_ratio);

        let canvas = container.append_layer("canvas", LayerStyle::default());
        let labels = container.append_layer("labels", LayerStyle::overlay());

        let state = Rc::new(RendererState {
            components: Rc::clone(&components),
            container,
            parameters,
            surface: RefCell::new(surface),
            overlay: RefCell::new(overlay),
            enabled: Cell::new(true),
            disposed: Cell::new(false),
            override_scene: RefCell::new(None),
            override_camera: RefCell::new(None),
            on_before_update: Event::new(),
            on_after_update: Event::new(),
            on_resize: Event::new(),
            resize_listener: Cell::new(None),
            layers: Cell::new(Some((canvas, labels))),
        });

        let weak = Rc::downgrade(&state);
        let listener = components
            .events()
            .add_listener(HostEventKind::Resize, move |_| {
                if let Some(state) = weak.upgrade() {
                    SimpleRenderer { state }.sync_size();
                }
            });
        state.resize_listener.set(Some(listener));

        let renderer = Self { state };
        renderer.sync_size();

        info!(
            pixel_ratio,
            antialias = renderer.state.parameters.antialias,
            alpha = renderer.state.parameters.alpha,
            local_clipping = renderer.state.parameters.local_clipping,
            "Renderer created"
        );
        renderer
    }

    /// Parameters the renderer was created with.
    pub fn parameters(&self) -> &RendererParameters {
        &self.state.parameters
    }

    /// The label overlay surface.
    pub fn overlay(&self) -> Ref<'_, O> {
        self.state.overlay.borrow()
    }

    /// Draw `scene` from `camera` instead of the registry pair.
    pub fn set_override(&self, scene: Shared<Scene>, camera: Shared<Camera>) {
        self.set_override_scene(Some(scene));
        self.set_override_camera(Some(camera));
    }

    /// Set or clear the override scene. Only used while an override camera
    /// is also set.
    pub fn set_override_scene(&self, scene: Option<Shared<Scene>>) {
        *self.state.override_scene.borrow_mut() = scene;
    }

    /// Set or clear the override camera. Only used while an override scene
    /// is also set.
    pub fn set_override_camera(&self, camera: Option<Shared<Camera>>) {
        *self.state.override_camera.borrow_mut() = camera;
    }

    /// Go back to drawing the registry scene and camera.
    pub fn clear_override(&self) {
        self.set_override_scene(None);
        self.set_override_camera(None);
    }

    /// Whether the renderer has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.state.disposed.get()
    }

    fn draw_target(&self) -> Option<(Shared<Scene>, Shared<Camera>)> {
        let scene = self.state.override_scene.borrow().clone();
        let camera = self.state.override_camera.borrow().clone();
        if let (Some(scene), Some(camera)) = (scene, camera) {
            return Some((scene, camera));
        }
        Some((
            self.state.components.scene()?,
            self.state.components.camera()?,
        ))
    }

    fn sync_size(&self) {
        let size = self.state.container.client_size();
        self.state.surface.borrow_mut().set_size(size.x, size.y);
        self.state.overlay.borrow_mut().set_size(size.x, size.y);
        debug!(width = size.x, height = size.y, "Renderer resized");
        self.state.on_resize.trigger(self);
    }
}

impl<S, O> Component for SimpleRenderer<S, O>
where
    S: DrawSurface + 'static,
    O: OverlaySurface + 'static,
{
    type Handle<'a> = Ref<'a, S>;

    fn name(&self) -> &str {
        "SimpleRenderer"
    }

    fn enabled(&self) -> bool {
        self.state.enabled.get()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled.set(enabled);
    }

    fn get(&self) -> Self::Handle<'_> {
        self.state.surface.borrow()
    }
}

impl<S, O> Updateable for SimpleRenderer<S, O>
where
    S: DrawSurface + 'static,
    O: OverlaySurface + 'static,
{
    fn update(&mut self, _delta: f32) -> Result<()> {
        let this: &Self = self;
        if !this.state.enabled.get() {
            return Ok(());
        }
        this.state.on_before_update.trigger(this);

        let Some((scene, camera)) = this.draw_target() else {
            debug!("No scene or camera to draw, skipping frame");
            return Ok(());
        };

        {
            let scene = scene.borrow();
            let camera = camera.borrow();
            let planes = this.state.components.clipping_planes();
            this.state
                .surface
                .borrow_mut()
                .render(&scene, &camera, &planes)?;
            this.state.overlay.borrow_mut().render(&scene, &camera)?;
        }

        this.state.on_after_update.trigger(this);
        Ok(())
    }

    fn on_before_update(&self) -> &Event<Self> {
        &self.state.on_before_update
    }

    fn on_after_update(&self) -> &Event<Self> {
        &self.state.on_after_update
    }
}

impl<S, O> Resizeable for SimpleRenderer<S, O>
where
    S: DrawSurface + 'static,
    O: OverlaySurface + 'static,
{
    fn resize(&mut self) {
        self.sync_size();
    }

    fn get_size(&self) -> UVec2 {
        self.state.surface.borrow().size()
    }

    fn on_resize(&self) -> &Event<Self> {
        &self.state.on_resize
    }
}

impl<S, O> Disposable for SimpleRenderer<S, O>
where
    S: DrawSurface + 'static,
    O: OverlaySurface + 'static,
{
    fn dispose(&mut self) {
        if self.state.disposed.replace(true) {
            return;
        }
        self.state.enabled.set(false);

        if let Some(listener) = self.state.resize_listener.take() {
            self.state.components.events().remove_listener(listener);
        }
        if let Some((canvas, labels)) = self.state.layers.take() {
            self.state.container.remove_layer(canvas);
            self.state.container.remove_layer(labels);
        }

        self.state.surface.borrow_mut().dispose();
        self.state.overlay.borrow_mut().dispose();

        self.state.on_resize.reset();
        self.state.on_after_update.reset();
        self.state.on_before_update.reset();
        info!("Renderer disposed");
    }
}

impl<S, O> fmt::Debug for SimpleRenderer<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRenderer")
            .field("enabled", &self.state.enabled.get())
            .field("disposed", &self.state.disposed.get())
            .field("parameters", &self.state.parameters)
            .finish()
    }
}
