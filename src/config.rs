// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{ScrollPreset, cache, transition};
use crate::errors::{ScrollError, ScrollResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name under the user config directory
const APP_DIR: &str = "sleepscreen";

/// File name of the persisted configuration
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of candidate images for the tiles
    pub image_dir: PathBuf,
    /// Placeholder image used before the reveal animation
    pub gradient_image: PathBuf,
    /// Image stretched over the whole field, drawn above the tiles
    pub foreground_image: Option<PathBuf>,
    /// Continuous scroll speed in pixels per tick
    pub scroll_speed: f32,
    /// Tick rate hint
    pub fps: u32,
    /// Horizontal coverage margin
    pub margin_x: f32,
    /// Vertical coverage margin
    pub margin_y: f32,
    /// Diagonal tilt in degrees
    pub angle: f32,
    /// Drain speed of the scroll-out animation
    pub stop_speed: f32,
    /// Speed of the reveal animation
    pub start_speed: f32,
    /// Scaled bitmaps kept in memory
    pub cache_capacity: usize,
    /// Rescale source images to this width before use
    pub normalize_width: Option<u32>,
    /// Seed for reproducible image picks
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_preset(ScrollPreset::default())
    }
}

impl Config {
    /// Default configuration tuned for a preset
    pub fn from_preset(preset: ScrollPreset) -> Self {
        Self {
            image_dir: PathBuf::from("assets/sleep_picture"),
            gradient_image: PathBuf::from("assets/gradient/gradient.png"),
            foreground_image: Some(PathBuf::from("assets/gradient/foreground.png")),
            scroll_speed: preset.scroll_speed(),
            fps: preset.fps(),
            margin_x: preset.margin(),
            margin_y: preset.margin(),
            angle: preset.angle(),
            stop_speed: transition::STOP_SPEED,
            start_speed: transition::START_SPEED,
            cache_capacity: cache::DEFAULT_CAPACITY,
            normalize_width: None,
            seed: None,
        }
    }

    /// Apply a preset's motion parameters, keeping paths and other settings
    pub fn apply_preset(&mut self, preset: ScrollPreset) {
        self.scroll_speed = preset.scroll_speed();
        self.fps = preset.fps();
        self.margin_x = preset.margin();
        self.margin_y = preset.margin();
        self.angle = preset.angle();
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the configuration from the default location
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> ScrollResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to(&self, path: &Path) -> ScrollResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject values no layout or animation can work with
    pub fn validate(&self) -> ScrollResult<()> {
        let positive = [
            ("margin_x", self.margin_x),
            ("margin_y", self.margin_y),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScrollError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("scroll_speed", self.scroll_speed),
            ("stop_speed", self.stop_speed),
            ("start_speed", self.start_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ScrollError::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !self.angle.is_finite() {
            return Err(ScrollError::Config("angle must be finite".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(ScrollError::Config(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
