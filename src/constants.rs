// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scroll parameter presets
///
/// The sleep screen uses a slow, tilted field behind the idle overlay. The
/// fullscreen preset is the untilted, denser field used when the scroll view
/// is shown on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ScrollPreset {
    /// Slow diagonal drift behind the sleep screen (default)
    #[default]
    SleepScreen,
    /// Faster upright scroll covering a standalone view
    Fullscreen,
}

impl ScrollPreset {
    /// Get all preset variants for UI iteration
    pub const ALL: [ScrollPreset; 2] = [ScrollPreset::SleepScreen, ScrollPreset::Fullscreen];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            ScrollPreset::SleepScreen => "Sleep screen",
            ScrollPreset::Fullscreen => "Fullscreen",
        }
    }

    /// Scroll speed in pixels per tick
    pub fn scroll_speed(&self) -> f32 {
        match self {
            ScrollPreset::SleepScreen => 0.2,
            ScrollPreset::Fullscreen => 1.0,
        }
    }

    /// Tick rate hint
    pub fn fps(&self) -> u32 {
        match self {
            ScrollPreset::SleepScreen => 20,
            ScrollPreset::Fullscreen => 60,
        }
    }

    /// Coverage margin applied on both axes
    pub fn margin(&self) -> f32 {
        match self {
            ScrollPreset::SleepScreen => 1.05,
            ScrollPreset::Fullscreen => 2.5,
        }
    }

    /// Diagonal tilt in degrees
    pub fn angle(&self) -> f32 {
        match self {
            ScrollPreset::SleepScreen => 15.0,
            ScrollPreset::Fullscreen => 0.0,
        }
    }
}

/// Tile cache limits
pub mod cache {
    /// Number of scaled bitmaps kept before the least recently used is evicted
    pub const DEFAULT_CAPACITY: usize = 256;
}

/// Transition speeds used by the overlay (pixels per tick)
pub mod transition {
    /// Drain speed when the idle screen is dismissed
    pub const STOP_SPEED: f32 = 30.0;

    /// Reveal speed when the idle screen comes back
    pub const START_SPEED: f32 = 30.0;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Tick rate used when the configured fps is zero
    pub const FALLBACK_FPS: u32 = 60;

    /// Convert an fps hint into a tick interval
    pub fn frame_interval(fps: u32) -> Duration {
        let fps = if fps > 0 { fps } else { FALLBACK_FPS };
        Duration::from_millis(u64::from(1000 / fps))
    }
}

/// Source image handling
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

    /// Width source images are normalized to before tiling
    pub const NORMALIZED_WIDTH: u32 = 340;

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
