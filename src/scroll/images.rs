// SPDX-License-Identifier: MPL-2.0

//! Source image discovery and the random image pool
//!
//! Candidate images are read once from a directory when a layout is built.
//! Recycled tiles draw their next image uniformly at random from the pool.

use super::tile_cache::Bitmap;
use crate::constants::file_formats;
use crate::errors::{ScrollError, ScrollResult};
use image::imageops::FilterType;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// List candidate images in `dir`, sorted by file name
///
/// Only `.png`, `.jpg`, `.jpeg`, `.bmp` and `.gif` files are returned (case-insensitive).
pub fn load_paths(dir: &Path) -> ScrollResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScrollError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| file_formats::is_image_extension(&ext.to_string_lossy()))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();

    debug!(dir = %dir.display(), count = paths.len(), "Loaded image paths");
    Ok(paths)
}

/// Intrinsic pixel size of an image, read from its header
pub fn probe_size(path: &Path) -> ScrollResult<(u32, u32)> {
    image::image_dimensions(path).map_err(|e| ScrollError::asset(path, e))
}

/// Decode an image at its own size
pub fn load_bitmap(path: &Path) -> ScrollResult<Bitmap> {
    let img = image::open(path).map_err(|e| ScrollError::asset(path, e))?;
    Ok(Arc::new(img.to_rgba8()))
}

/// Rescale every image in `dir` to `width`, keeping its aspect ratio
///
/// Files are overwritten in place. Images already at `width` are left alone and
/// files that fail to decode or save are logged and skipped. Returns the number
/// of files rewritten.
pub fn normalize_width(dir: &Path, width: u32) -> ScrollResult<usize> {
    let mut rewritten = 0;

    for path in load_paths(dir)? {
        match normalize_file(&path, width) {
            Ok(true) => rewritten += 1,
            Ok(false) => {}
            Err(e) => error!(path = %path.display(), error = %e, "Failed to normalize image"),
        }
    }

    info!(dir = %dir.display(), width, rewritten, "Normalized image widths");
    Ok(rewritten)
}

fn normalize_file(path: &Path, width: u32) -> ScrollResult<bool> {
    let img = image::open(path).map_err(|e| ScrollError::asset(path, e))?;
    if img.width() == width || img.width() == 0 {
        return Ok(false);
    }

    let ratio = img.height() as f64 / img.width() as f64;
    let height = ((width as f64 * ratio) as u32).max(1);
    img.resize_exact(width, height, FilterType::Lanczos3)
        .save(path)
        .map_err(|e| ScrollError::asset(path, e))?;
    Ok(true)
}

/// Candidate images plus the placeholder used for gradient-only seeding
#[derive(Debug)]
pub struct ImagePool {
    paths: Vec<PathBuf>,
    gradient: PathBuf,
    rng: SmallRng,
}

impl ImagePool {
    /// Build a pool from an explicit list of images
    ///
    /// A `seed` makes the sequence of picks reproducible.
    pub fn new(
        paths: Vec<PathBuf>,
        gradient: impl Into<PathBuf>,
        seed: Option<u64>,
    ) -> ScrollResult<Self> {
        if paths.is_empty() {
            return Err(ScrollError::EmptyDirectory(PathBuf::new()));
        }
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        };
        Ok(Self {
            paths,
            gradient: gradient.into(),
            rng,
        })
    }

    /// Build a pool from every candidate image in `dir`
    pub fn from_dir(dir: &Path, gradient: impl Into<PathBuf>, seed: Option<u64>) -> ScrollResult<Self> {
        let paths = load_paths(dir)?;
        if paths.is_empty() {
            return Err(ScrollError::EmptyDirectory(dir.to_path_buf()));
        }
        Self::new(paths, gradient, seed)
    }

    /// Pick an image uniformly at random
    pub fn pick(&mut self) -> &Path {
        let index = self.rng.random_range(0..self.paths.len());
        &self.paths[index]
    }

    /// The image whose size defines the tile size
    pub fn first(&self) -> &Path {
        &self.paths[0]
    }

    /// The fixed placeholder image
    pub fn gradient(&self) -> &Path {
        &self.gradient
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
