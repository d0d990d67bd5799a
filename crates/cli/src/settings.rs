use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use facecheck_core::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use facecheck_core::overlay::domain::preview_layer::VideoGravity;
use facecheck_core::shared::constants::{APP_DIR_NAME, DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Fill,
    Fit,
    Stretch,
}

impl From<Gravity> for VideoGravity {
    fn from(gravity: Gravity) -> Self {
        match gravity {
            Gravity::Fill => VideoGravity::ResizeAspectFill,
            Gravity::Fit => VideoGravity::ResizeAspect,
            Gravity::Stretch => VideoGravity::Resize,
        }
    }
}

/// Persisted defaults for the command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub confidence: f64,
    pub view_width: f64,
    pub view_height: f64,
    pub gravity: Gravity,
    pub text_model: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            gravity: Gravity::Fill,
            text_model: None,
            snapshot_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Reads settings from `path`. Missing or malformed files give defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed settings at {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
