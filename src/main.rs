//! scenekit - raycasting and rendering components over wgpu
//!
//! Viewer executable showing a small demo scene. Left click picks the mesh
//! under the pointer.

mod demo_scene;
mod viewer;

use anyhow::Result;
use scenekit_core::{config::DEFAULT_RENDERER_CONFIG_PATH, RendererParameters};
use std::{env, path::PathBuf};
use tracing::info;
use viewer::{Viewer, ViewerAction};
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<()> {
    // WARN by default, override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting scenekit v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let parameters = match &cli.config {
        Some(path) => RendererParameters::load_from_path(path),
        None => RendererParameters::load(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(&event_loop, parameters, cli.resolution)?;

    event_loop.run(move |event, elwt| {
        if viewer.handle_event(&event) == ViewerAction::Quit {
            info!("Quitting viewer");
            elwt.exit();
        }
    })?;

    info!("scenekit shutting down");
    Ok(())
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    resolution: (u32, u32),
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: None,
            resolution: (1280, 720),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!(
                            default = DEFAULT_RENDERER_CONFIG_PATH,
                            "--config requires a file path"
                        );
                    }
                }
                "--resolution" => {
                    if let Some(raw) = args.next() {
                        match parse_resolution(&raw) {
                            Some(resolution) => opts.resolution = resolution,
                            None => {
                                tracing::error!(value = %raw, "--resolution must be like 1280x720");
                            }
                        }
                    } else {
                        tracing::error!("--resolution requires a value like 1280x720");
                    }
                }
                other => {
                    tracing::warn!(arg = other, "Ignoring unknown argument");
                }
            }
        }

        opts
    }
}

fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once('x')?;
    match (w.parse::<u32>(), h.parse::<u32>()) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Some((width, height)),
        _ => None,
    }
}
