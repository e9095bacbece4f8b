// SPDX-License-Identifier: MPL-2.0

//! Scaled bitmap cache shared by every column of a layout
//!
//! Bitmaps are keyed by `(path, width, height)` and stretched to exactly that
//! size. Entries are handed out as `Arc`s, so evicting an entry never
//! invalidates a bitmap that is already placed on a surface.

use crate::constants::cache::DEFAULT_CAPACITY;
use crate::errors::{ScrollError, ScrollResult};
use image::RgbaImage;
use image::imageops::FilterType;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// A pre-scaled RGBA bitmap, shared by value
pub type Bitmap = Arc<RgbaImage>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TileKey {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl TileKey {
    fn new(path: &Path, width: u32, height: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            width,
            height,
        }
    }
}

/// Bounded least-recently-used cache of scaled bitmaps
#[derive(Debug)]
pub struct TileCache {
    entries: LruCache<TileKey, Bitmap>,
    hits: u64,
    misses: u64,
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TileCache {
    /// Create a cache holding at most `capacity` bitmaps (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }

    /// Get the bitmap for `path` stretched to `width`x`height`
    ///
    /// The image is decoded and scaled on the first request for a key; later
    /// requests return the cached bitmap. Aspect ratio is ignored.
    pub fn get(&mut self, path: &Path, width: u32, height: u32) -> ScrollResult<Bitmap> {
        let key = TileKey::new(path, width, height);

        if let Some(bitmap) = self.entries.get(&key) {
            self.hits += 1;
            trace!(path = %path.display(), width, height, "Tile cache hit");
            return Ok(Arc::clone(bitmap));
        }

        self.misses += 1;
        let bitmap = Arc::new(load_scaled(path, width, height)?);
        if let Some((evicted, _)) = self.entries.push(key, Arc::clone(&bitmap)) {
            debug!(path = %evicted.path.display(), "Evicted scaled tile");
        }
        Ok(bitmap)
    }

    /// Whether a bitmap for this key is currently cached
    pub fn contains(&self, path: &Path, width: u32, height: u32) -> bool {
        self.entries.contains(&TileKey::new(path, width, height))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn load_scaled(path: &Path, width: u32, height: u32) -> ScrollResult<RgbaImage> {
    let img = image::open(path).map_err(|e| ScrollError::asset(path, e))?;
    let rgba = img.to_rgba8();
    if rgba.width() == width && rgba.height() == height {
        return Ok(rgba);
    }
    Ok(image::imageops::resize(
        &rgba,
        width.max(1),
        height.max(1),
        FilterType::Triangle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    fn write_image(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_stretches_to_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "a.png", 40, 10);
        let mut cache = TileCache::new(4);

        let bitmap = cache.get(&path, 16, 16).unwrap();
        assert_eq!(bitmap.dimensions(), (16, 16));
        assert_eq!(bitmap.get_pixel(8, 8), &Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_second_request_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "a.png", 8, 8);
        let mut cache = TileCache::new(4);

        let first = cache.get(&path, 4, 4).unwrap();
        let second = cache.get(&path, 4, 4).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));

        // Different size is a different key
        cache.get(&path, 2, 2).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_image(dir.path(), "a.png", 4, 4);
        let b = write_image(dir.path(), "b.png", 4, 4);
        let c = write_image(dir.path(), "c.png", 4, 4);
        let mut cache = TileCache::new(2);

        let held = cache.get(&a, 4, 4).unwrap();
        cache.get(&b, 4, 4).unwrap();
        cache.get(&a, 4, 4).unwrap();
        cache.get(&c, 4, 4).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a, 4, 4));
        assert!(!cache.contains(&b, 4, 4));
        assert!(cache.contains(&c, 4, 4));

        cache.clear();
        // Bitmaps handed out earlier survive eviction
        assert_eq!(held.dimensions(), (4, 4));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_image(dir.path(), "a.png", 4, 4);
        let b = write_image(dir.path(), "b.png", 4, 4);
        let mut cache = TileCache::new(0);
        assert_eq!(cache.capacity(), 1);

        cache.get(&a, 4, 4).unwrap();
        cache.get(&b, 4, 4).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&b, 4, 4));
        assert_eq!(cache.stats(), (0, 2));
    }

    #[test]
    fn test_missing_file_is_asset_error() {
        let mut cache = TileCache::default();
        let err = cache.get(Path::new("/no/such/image.png"), 4, 4).unwrap_err();
        assert!(matches!(err, ScrollError::AssetLoad { .. }));
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    }
}
