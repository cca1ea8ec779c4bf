//! Engine configuration: JSON file plus command-line overrides

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capture::DEFAULT_CAPTURE_DIR;
use crate::error::RenderError;
use crate::post::PostProcessSettings;
use crate::surface::MAX_DIMENSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Framebuffer (render) resolution
    pub width: u32,
    pub height: u32,
    /// Window size; 0 means same as the framebuffer
    pub display_width: u32,
    pub display_height: u32,
    pub title: String,
    pub vsync: bool,
    /// Render without opening a window
    pub headless: bool,
    /// Linear filtering when the window is larger than the framebuffer
    pub present_linear: bool,
    pub depth: bool,
    pub postprocess: PostProcessSettings,
    pub capture_path: String,
    pub socket: bool,
    pub mqtt: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_topic: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            display_width: 0,
            display_height: 0,
            title: "softraster".to_string(),
            vsync: true,
            headless: false,
            present_linear: false,
            depth: true,
            postprocess: PostProcessSettings::default(),
            capture_path: DEFAULT_CAPTURE_DIR.to_string(),
            socket: false,
            mqtt: false,
            mqtt_host: "localhost".to_string(),
            mqtt_port: 1883,
            mqtt_topic: "softraster/cmd".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&json)
            .map_err(|e| RenderError::Config(format!("{}: {}", path.display(), e)))?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg.validated())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Window size, falling back to the framebuffer size
    pub fn display_size(&self) -> (u32, u32) {
        if self.display_width == 0 || self.display_height == 0 {
            (self.width, self.height)
        } else {
            (self.display_width, self.display_height)
        }
    }

    /// Framebuffer dimensions are clamped to `1..=MAX_DIMENSION`
    pub fn validated(mut self) -> Self {
        self.width = self.width.clamp(1, MAX_DIMENSION);
        self.height = self.height.clamp(1, MAX_DIMENSION);
        self
    }
}

/// Parse "WxH" into a resolution
pub fn parse_resolution(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once(['x', 'X'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}
