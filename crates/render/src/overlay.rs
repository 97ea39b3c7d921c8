//! egui overlay drawing scene labels over the 3D frame.

use std::rc::Rc;

use anyhow::Result;
use egui_wgpu::ScreenDescriptor;
use glam::UVec2;
use scenekit_core::{Camera, Label, Scene};

use crate::context::GpuContext;
use crate::surface::OverlaySurface;

/// A label projected to overlay coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Text content.
    pub text: String,
    /// Center of the text in logical pixels, origin top-left.
    pub position: egui::Pos2,
    /// Font size in points.
    pub font_size: f32,
    /// Text color.
    pub color: egui::Color32,
}

/// Project the visible labels of `scene` onto a `size` overlay. Labels
/// behind the camera are left out.
pub fn place_labels(scene: &Scene, camera: &Camera, size: UVec2) -> Vec<PlacedLabel> {
    let (width, height) = (size.x as f32, size.y as f32);
    scene
        .visible_labels()
        .filter_map(|label| {
            let screen = camera.project_to_screen(label.position, width, height)?;
            Some(PlacedLabel {
                text: label.text.clone(),
                position: egui::pos2(screen.x, screen.y),
                font_size: label.font_size,
                color: label_color(label),
            })
        })
        .collect()
}

fn label_color(label: &Label) -> egui::Color32 {
    let [r, g, b, a] = label.color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Label overlay painted with egui on top of the pending 3D frame.
///
/// The overlay is output only: it never reads input, so pointer events pass
/// through to the surface underneath.
pub struct LabelOverlay {
    context: Rc<GpuContext>,
    egui: egui::Context,
    renderer: egui_wgpu::Renderer,
    size: UVec2,
    pixel_ratio: f32,
    disposed: bool,
}

impl LabelOverlay {
    /// Create an overlay drawing into the frames of `context`.
    pub fn new(context: Rc<GpuContext>) -> Self {
        let renderer = egui_wgpu::Renderer::new(&context.device, context.format, None, 1);
        Self {
            context,
            egui: egui::Context::default(),
            renderer,
            size: UVec2::ZERO,
            pixel_ratio: 1.0,
            disposed: false,
        }
    }

    /// Current size in logical pixels.
    pub fn size(&self) -> UVec2 {
        self.size
    }
}

impl OverlaySurface for LabelOverlay {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        // Nothing to draw on when the 3D pass did not leave a frame.
        let Some(frame) = self.context.take_frame() else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let placed = place_labels(scene, camera, self.size);
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(self.size.x as f32, self.size.y as f32),
            )),
            ..Default::default()
        };
        self.egui.set_pixels_per_point(self.pixel_ratio);
        let full_output = self.egui.run(raw_input, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("scenekit-labels"),
            ));
            for label in &placed {
                painter.text(
                    label.position,
                    egui::Align2::CENTER_CENTER,
                    &label.text,
                    egui::FontId::proportional(label.font_size),
                    label.color,
                );
            }
        });

        let paint_jobs = self
            .egui
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = self.context.physical_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = &self.context.device;
        let queue = &self.context.queue;
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Label Overlay Encoder"),
        });
        let mut command_buffers = self.renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Label Overlay Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        frame.present();
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = UVec2::new(width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        drop(self.context.take_frame());
        tracing::info!("Label overlay disposed");
    }
}
