//! Renderer parameters loaded from TOML.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Default location of the renderer configuration file.
pub const DEFAULT_RENDERER_CONFIG_PATH: &str = "config/renderer.toml";

/// Errors raised while reading or writing renderer parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid parameters.
    #[error("invalid renderer parameters: {0}")]
    Parse(#[from] toml::de::Error),
    /// The parameters could not be encoded.
    #[error("failed to encode renderer parameters: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Construction parameters of the renderer. Fields missing from a file keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererParameters {
    /// Multisample the 3D surface.
    pub antialias: bool,
    /// Clear the 3D surface to transparent instead of the scene background.
    pub alpha: bool,
    /// Upper bound applied to the device pixel ratio.
    pub max_pixel_ratio: f32,
    /// Evaluate clipping planes while drawing.
    pub local_clipping: bool,
}

impl Default for RendererParameters {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: true,
            max_pixel_ratio: 2.0,
            local_clipping: true,
        }
    }
}

impl RendererParameters {
    /// Parse parameters, failing on malformed input.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load parameters from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_RENDERER_CONFIG_PATH))
    }

    /// Load parameters from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(parameters) => parameters,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Renderer config not found at {}. Using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save parameters to an explicit path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, contents).map_err(io_error)
    }

    /// Pixel ratio actually applied to the surfaces.
    pub fn effective_pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.min(self.max_pixel_ratio)
    }
}
