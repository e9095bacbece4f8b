// SPDX-License-Identifier: MPL-2.0

//! Shared fixtures for integration tests

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use sleepscreen::EngineSettings;
use std::path::PathBuf;
use tempfile::TempDir;

/// Viewport used by the engine and overlay tests
pub const VIEWPORT: (u32, u32) = (200, 150);

/// Temporary image directory plus a gradient placeholder
pub struct Assets {
    pub dir: TempDir,
    pub images: PathBuf,
    pub gradient: PathBuf,
}

/// Write `count` solid `width`x`height` images and a black gradient
pub fn assets(count: usize, width: u32, height: u32) -> Assets {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    for i in 0..count {
        let v = 40 + (i as u8).wrapping_mul(40);
        RgbaImage::from_pixel(width, height, Rgba([v, 255 - v, v / 2, 255]))
            .save_with_format(images.join(format!("photo_{i:02}.png")), ImageFormat::Png)
            .unwrap();
    }
    let gradient = dir.path().join("gradient.png");
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
        .save_with_format(&gradient, ImageFormat::Png)
        .unwrap();
    Assets {
        dir,
        images,
        gradient,
    }
}

/// Untilted settings: a 200x150 viewport with 50x50 tiles gives 4 columns of 4 rows
pub fn settings(assets: &Assets) -> EngineSettings {
    EngineSettings {
        image_dir: assets.images.clone(),
        gradient_image: assets.gradient.clone(),
        foreground_image: None,
        scroll_speed: 5.0,
        margin_x: 1.0,
        margin_y: 1.0,
        angle: 0.0,
        cache_capacity: 32,
        seed: Some(7),
    }
}

/// Tiles in a 4x4 field
pub const FIELD_TILES: usize = 16;
