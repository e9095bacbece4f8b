// SPDX-License-Identifier: GPL-3.0-only

//! Rendering surface the tile field is placed on
//!
//! The engine never draws anything itself. It adds, moves, repaints and removes
//! tiles on a [`Surface`], and asks it for the viewport size. [`SceneSurface`]
//! is the retained in-memory implementation used by the terminal viewer and
//! the tests: it keeps every tile with its bitmap and can sample the rotated
//! field at any viewport pixel, with an optional foreground image stretched
//! over the viewport on top.

use super::tile_cache::Bitmap;
use image::Rgba;
use std::collections::BTreeMap;

/// Handle to a tile placed on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(u64);

/// Operations the engine needs from whatever displays the tiles
pub trait Surface {
    /// Place a new tile with its top-left corner at `(x, y)` in field coordinates
    fn add_tile(&mut self, bitmap: Bitmap, x: f32, y: f32) -> TileId;

    fn remove_tile(&mut self, id: TileId);

    fn set_tile_position(&mut self, id: TileId, x: f32, y: f32);

    fn set_tile_image(&mut self, id: TileId, bitmap: Bitmap);

    /// Current viewport size in pixels
    fn viewport_size(&self) -> (u32, u32);

    /// Remove every tile
    fn clear(&mut self);

    /// Rotate the view by `angle` degrees around `center` (field coordinates)
    ///
    /// Surfaces that cannot rotate may ignore this.
    fn set_view(&mut self, _angle: f32, _center: (f32, f32)) {}

    /// Draw `bitmap` over the whole viewport, above every tile and unrotated
    ///
    /// The bitmap is stretched to the current viewport size. `None` removes it.
    fn set_foreground(&mut self, _bitmap: Option<Bitmap>) {}
}

/// A tile as stored by [`SceneSurface`]
#[derive(Debug, Clone)]
pub struct SceneTile {
    pub bitmap: Bitmap,
    pub x: f32,
    pub y: f32,
}

impl SceneTile {
    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.bitmap.width() as f32
            && y < self.y + self.bitmap.height() as f32
    }
}

/// Retained-mode scene holding every placed tile
#[derive(Debug, Clone)]
pub struct SceneSurface {
    tiles: BTreeMap<TileId, SceneTile>,
    next_id: u64,
    viewport: (u32, u32),
    angle: f32,
    center: (f32, f32),
    foreground: Option<Bitmap>,
}

impl SceneSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tiles: BTreeMap::new(),
            next_id: 0,
            viewport: (width, height),
            angle: 0.0,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            foreground: None,
        }
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn tile(&self, id: TileId) -> Option<&SceneTile> {
        self.tiles.get(&id)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&TileId, &SceneTile)> {
        self.tiles.iter()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn foreground(&self) -> Option<&Bitmap> {
        self.foreground.as_ref()
    }

    /// Current view rotation in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Map a viewport pixel to field coordinates
    ///
    /// The viewport centre shows the view centre; the field is rotated
    /// clockwise by the view angle.
    pub fn field_point(&self, vx: f32, vy: f32) -> (f32, f32) {
        let dx = vx - self.viewport.0 as f32 / 2.0;
        let dy = vy - self.viewport.1 as f32 / 2.0;
        let (sin, cos) = self.angle.to_radians().sin_cos();
        (
            self.center.0 + dx * cos + dy * sin,
            self.center.1 - dx * sin + dy * cos,
        )
    }

    /// Colour at a viewport pixel, or `None` where nothing is drawn
    pub fn sample(&self, vx: f32, vy: f32) -> Option<Rgba<u8>> {
        let tile = self.sample_tiles(vx, vy);
        match self.sample_foreground(vx, vy) {
            Some(top) => blend_over(top, tile.unwrap_or(Rgba([0, 0, 0, 0]))),
            None => tile,
        }
    }

    fn sample_tiles(&self, vx: f32, vy: f32) -> Option<Rgba<u8>> {
        let (fx, fy) = self.field_point(vx, vy);
        // Later tiles are drawn on top
        let tile = self.tiles.values().rev().find(|t| t.contains(fx, fy))?;
        let bw = tile.bitmap.width();
        let bh = tile.bitmap.height();
        let px = ((fx - tile.x) as u32).min(bw.saturating_sub(1));
        let py = ((fy - tile.y) as u32).min(bh.saturating_sub(1));
        Some(*tile.bitmap.get_pixel(px, py))
    }

    fn sample_foreground(&self, vx: f32, vy: f32) -> Option<Rgba<u8>> {
        let bitmap = self.foreground.as_ref()?;
        let (vw, vh) = self.viewport;
        if vx < 0.0 || vy < 0.0 || vx >= vw as f32 || vy >= vh as f32 {
            return None;
        }
        let (bw, bh) = bitmap.dimensions();
        if bw == 0 || bh == 0 {
            return None;
        }
        let px = ((vx * bw as f32 / vw as f32) as u32).min(bw - 1);
        let py = ((vy * bh as f32 / vh as f32) as u32).min(bh - 1);
        Some(*bitmap.get_pixel(px, py))
    }
}

/// Source-over compositing of `top` onto `bottom`
fn blend_over(top: Rgba<u8>, bottom: Rgba<u8>) -> Option<Rgba<u8>> {
    let ta = u32::from(top[3]);
    let ba = u32::from(bottom[3]) * (255 - ta) / 255;
    let alpha = ta + ba;
    if alpha == 0 {
        return None;
    }
    let channel = |i: usize| {
        let c = u32::from(top[i]) * ta + u32::from(bottom[i]) * ba;
        ((c + alpha / 2) / alpha) as u8
    };
    Some(Rgba([channel(0), channel(1), channel(2), alpha as u8]))
}

impl Surface for SceneSurface {
    fn add_tile(&mut self, bitmap: Bitmap, x: f32, y: f32) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, SceneTile { bitmap, x, y });
        id
    }

    fn remove_tile(&mut self, id: TileId) {
        self.tiles.remove(&id);
    }

    fn set_tile_position(&mut self, id: TileId, x: f32, y: f32) {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.x = x;
            tile.y = y;
        }
    }

    fn set_tile_image(&mut self, id: TileId, bitmap: Bitmap) {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.bitmap = bitmap;
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn clear(&mut self) {
        self.tiles.clear();
    }

    fn set_view(&mut self, angle: f32, center: (f32, f32)) {
        self.angle = angle;
        self.center = center;
    }

    fn set_foreground(&mut self, bitmap: Option<Bitmap>) {
        self.foreground = bitmap;
    }
}
