//! Windowed viewer wiring the components to winit.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glam::Vec3;
use scenekit_core::{
    shared, Camera, Components, Container, Disposable, HostEvent, HostEvents, RendererParameters,
    Resizeable, Shared, Updateable,
};
use scenekit_raycast::SimpleRaycaster;
use scenekit_render::{GpuContext, GpuRenderer, GpuSurface, LabelOverlay, SimpleRenderer};
use tracing::{error, info, warn};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::Window;

use crate::demo_scene;

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// Keep running.
    Continue,
    /// Exit the application.
    Quit,
}

/// Viewer window showing the demo scene.
pub struct Viewer {
    window: Arc<Window>,
    components: Rc<Components>,
    context: Rc<GpuContext>,
    renderer: GpuRenderer,
    raycaster: SimpleRaycaster,
    last_frame: Instant,
}

impl Viewer {
    /// Open the window and build the renderer and raycaster.
    pub fn new(
        event_loop: &EventLoopWindowTarget<()>,
        parameters: RendererParameters,
        size: (u32, u32),
    ) -> Result<Self> {
        let window = Arc::new(
            winit::window::WindowBuilder::new()
                .with_title("scenekit")
                .with_inner_size(winit::dpi::PhysicalSize::new(size.0, size.1))
                .build(event_loop)?,
        );

        let context = Rc::new(pollster::block_on(GpuContext::new(
            Arc::clone(&window),
            &parameters,
        ))?);
        let surface = GpuSurface::new(Rc::clone(&context), parameters.alpha)?;
        let overlay = LabelOverlay::new(Rc::clone(&context));

        let container = Rc::new(Container::from_window(&window));
        let events = Rc::new(HostEvents::new());
        let components = Rc::new(Components::new(Rc::clone(&container), events));

        let scene = demo_scene::build(&components);
        let camera = shared(demo_camera(&container));
        components.set_scene(Some(shared(scene)));
        components.set_camera(Some(Rc::clone(&camera)));

        let renderer = SimpleRenderer::new(
            Rc::clone(&components),
            container,
            surface,
            overlay,
            parameters,
        );
        follow_aspect(&renderer, camera);

        let raycaster = SimpleRaycaster::new(Rc::clone(&components));

        info!("Viewer ready");
        Ok(Self {
            window,
            components,
            context,
            renderer,
            raycaster,
            last_frame: Instant::now(),
        })
    }

    /// Handle an event.
    pub fn handle_event(&mut self, event: &Event<()>) -> ViewerAction {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.window.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        self.shutdown();
                        return ViewerAction::Quit;
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        self.components
                            .container()
                            .set_device_pixel_ratio(*scale_factor as f32);
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => self.pick(),
                    WindowEvent::RedrawRequested => {
                        return self.redraw();
                    }
                    _ => self.forward(event),
                }
            }
            Event::AboutToWait => {
                self.window.request_redraw();
            }
            _ => {}
        }

        ViewerAction::Continue
    }

    /// Keep the container in sync, then hand the event to the component
    /// listeners.
    fn forward(&self, event: &WindowEvent) {
        let Some(host_event) = HostEvent::from_window_event(event, self.window.scale_factor())
        else {
            return;
        };
        if let HostEvent::Resized { width, height } = host_event {
            self.components.container().set_client_size(width, height);
        }
        self.components.events().dispatch(&host_event);
    }

    fn pick(&self) {
        match self.raycaster.cast_ray(None) {
            Some(hit) => info!(
                mesh = %hit.mesh.name,
                point = ?hit.point,
                distance = hit.distance,
                face = hit.face_index,
                "Picked mesh"
            ),
            None => info!("Nothing under the pointer"),
        }
    }

    fn redraw(&mut self) -> ViewerAction {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let Err(err) = self.renderer.update(delta) else {
            return ViewerAction::Continue;
        };
        match err.downcast_ref::<wgpu::SurfaceError>() {
            Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!(%err, "Surface lost, reconfiguring");
                self.context.reconfigure();
                self.renderer.resize();
                ViewerAction::Continue
            }
            Some(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                ViewerAction::Continue
            }
            _ => {
                error!(%err, "Render failed");
                self.shutdown();
                ViewerAction::Quit
            }
        }
    }

    fn shutdown(&mut self) {
        self.raycaster.dispose();
        self.renderer.dispose();
    }
}

fn demo_camera(container: &Container) -> Camera {
    let size = container.client_size();
    let mut camera = Camera::new(size.x.max(1) as f32 / size.y.max(1) as f32)
        .with_position(Vec3::new(0.0, 3.0, 8.0));
    camera.look_at(Vec3::new(0.0, 0.0, -0.5));
    camera
}

/// Keep the camera aspect ratio equal to the renderer's.
fn follow_aspect(renderer: &GpuRenderer, camera: Shared<Camera>) {
    let sync = move |renderer: &GpuRenderer| {
        let size = renderer.get_size();
        if size.x > 0 && size.y > 0 {
            camera.borrow_mut().set_aspect(size.x as f32 / size.y as f32);
        }
    };
    sync(renderer);
    renderer.on_resize().add(sync);
}
