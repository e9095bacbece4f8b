// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for inspecting and preparing the scroll background
//!
//! This module provides command-line functionality for:
//! - Printing the computed layout for a viewport
//! - Listing candidate images
//! - Normalizing image widths in place

use sleepscreen::scroll::images;
use sleepscreen::scroll::{LayoutGeometry, LayoutParams, TileSize};
use std::path::Path;

/// Print the layout for a viewport as JSON
pub fn print_layout(
    viewport: (u32, u32),
    tile: (u32, u32),
    angle: f32,
    margin_x: f32,
    margin_y: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = LayoutGeometry::compute(&LayoutParams {
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        tile: TileSize::new(tile.0, tile.1),
        margin_x,
        margin_y,
        angle,
    });

    println!("{}", serde_json::to_string_pretty(&geometry)?);
    Ok(())
}

/// List candidate images with their sizes
pub fn list_images(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let paths = images::load_paths(dir)?;

    if paths.is_empty() {
        println!("No images found in {}.", dir.display());
        return Ok(());
    }

    println!("Images in {}:", dir.display());
    println!();
    for (index, path) in paths.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match images::probe_size(path) {
            Ok((w, h)) => println!("  [{}] {} ({}x{})", index, name, w, h),
            Err(e) => println!("  [{}] {} (unreadable: {})", index, name, e),
        }
    }

    if let Ok((w, h)) = images::probe_size(&paths[0]) {
        println!();
        println!("Tile size (from first image): {}x{}", w, h);
    }
    Ok(())
}

/// Rescale every image in `dir` to `width`, keeping aspect ratio
pub fn normalize(dir: &Path, width: u32) -> Result<(), Box<dyn std::error::Error>> {
    let rewritten = images::normalize_width(dir, width)?;
    println!("Rewrote {} image(s) in {} to width {}.", rewritten, dir.display(), width);
    Ok(())
}
