// Booth settings, loaded from a JSON file. Every field has a default so an
// empty `{}` is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::{DEFAULT_CAPTION, DEFAULT_POLAROID_CAPTION};
use crate::error::{BoothError, BoothResult};
use crate::filter::FilterId;
use crate::palette::FrameColor;
use crate::session::Selection;
use crate::shape::ShapeId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    pub camera_index: u32,
    pub camera_width: u32,
    pub camera_height: u32,
    pub camera_fps: u32,
    /// Where saved strips and polaroids go.
    pub output_dir: PathBuf,
    /// Strip caption.
    pub caption: String,
    /// Text after "Photo n/3 - " on each polaroid.
    pub polaroid_caption: String,
    pub default_frame: FrameColor,
    pub default_shape: ShapeId,
    pub default_filter: FilterId,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            camera_width: 1280,
            camera_height: 720,
            camera_fps: 30,
            output_dir: PathBuf::from("."),
            caption: DEFAULT_CAPTION.to_owned(),
            polaroid_caption: DEFAULT_POLAROID_CAPTION.to_owned(),
            default_frame: FrameColor::default(),
            default_shape: ShapeId::default(),
            default_filter: FilterId::default(),
        }
    }
}

impl BoothConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> BoothResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_json(&text)
            .map_err(|e| BoothError::validation(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    }

    pub fn from_json(text: &str) -> BoothResult<Self> {
        let cfg: BoothConfig = serde_json::from_str(text)
            .map_err(|e| BoothError::validation(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> BoothResult<()> {
        if self.camera_width == 0 || self.camera_height == 0 {
            return Err(BoothError::validation("camera resolution must be non-zero"));
        }
        if self.camera_fps == 0 {
            return Err(BoothError::validation("camera_fps must be non-zero"));
        }
        if self.caption.trim().is_empty() || self.polaroid_caption.trim().is_empty() {
            return Err(BoothError::validation("captions must not be empty"));
        }
        Ok(())
    }

    /// Selection the booth starts with.
    pub fn selection(&self) -> Selection {
        Selection {
            frame: self.default_frame,
            shape: self.default_shape,
            filter: self.default_filter,
        }
    }
}
