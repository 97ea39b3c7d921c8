//! Shared wgpu device, window surface and the frame being composed.

use std::cell::RefCell;
use std::sync::Arc;

use anyhow::{Context, Result};
use scenekit_core::RendererParameters;
use winit::window::Window;

/// GPU context shared by the 3D surface and the label overlay.
///
/// The 3D surface acquires the swapchain frame and leaves it pending; the
/// overlay draws on top of it and presents it.
pub struct GpuContext {
    /// Window surface frames are presented into.
    pub surface: wgpu::Surface<'static>,
    /// Logical GPU device.
    pub device: wgpu::Device,
    /// Command queue.
    pub queue: wgpu::Queue,
    /// Swapchain color format.
    pub format: wgpu::TextureFormat,
    /// Sample count of the 3D pass (4 with antialiasing, else 1).
    pub sample_count: u32,
    config: RefCell<wgpu::SurfaceConfiguration>,
    frame: RefCell<Option<wgpu::SurfaceTexture>>,
}

impl GpuContext {
    /// Create a GPU context presenting into `window`.
    pub async fn new(window: Arc<Window>, parameters: &RendererParameters) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("scenekit device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let alpha_mode = if parameters.alpha {
            surface_caps
                .alpha_modes
                .iter()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::CompositeAlphaMode::PreMultiplied
                            | wgpu::CompositeAlphaMode::PostMultiplied
                    )
                })
                .or_else(|| surface_caps.alpha_modes.first())
                .copied()
        } else {
            surface_caps.alpha_modes.first().copied()
        }
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let sample_count = if parameters.antialias
            && adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(4)
        {
            4
        } else {
            1
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // VSync
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            width = config.width,
            height = config.height,
            format = ?format,
            alpha_mode = ?alpha_mode,
            sample_count,
            "GPU context initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            format,
            sample_count,
            config: RefCell::new(config),
            frame: RefCell::new(None),
        })
    }

    /// Reconfigure the swapchain. Zero-sized requests are ignored.
    pub fn configure(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let mut config = self.config.borrow_mut();
        if config.width == width && config.height == height {
            return;
        }
        // A frame acquired at the old size cannot be presented after this.
        self.frame.borrow_mut().take();
        config.width = width;
        config.height = height;
        self.surface.configure(&self.device, &config);
    }

    /// Configure the swapchain again at its current size, after the surface
    /// was lost or became outdated.
    pub fn reconfigure(&self) {
        self.frame.borrow_mut().take();
        self.surface.configure(&self.device, &self.config.borrow());
    }

    /// Swapchain size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let config = self.config.borrow();
        (config.width, config.height)
    }

    /// Acquire the next swapchain frame, presenting any frame still pending
    /// from the previous draw.
    pub fn begin_frame(&self) -> Result<wgpu::TextureView> {
        if let Some(stale) = self.frame.borrow_mut().take() {
            stale.present();
        }
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        *self.frame.borrow_mut() = Some(frame);
        Ok(view)
    }

    /// Take the pending frame, if a draw left one.
    pub fn take_frame(&self) -> Option<wgpu::SurfaceTexture> {
        self.frame.borrow_mut().take()
    }
}
