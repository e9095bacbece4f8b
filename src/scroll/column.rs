// SPDX-License-Identifier: GPL-3.0-only

//! A vertical strip of tiles scrolling in one direction
//!
//! Tiles live in a ring buffer ordered by their y position. Scrolling moves
//! every tile by the same offset, so the order never changes; a tile leaving
//! the trailing edge is either relocated to the leading edge with a fresh
//! image (infinite mode) or removed (draining mode). Both ends are O(1).

use super::images::ImagePool;
use super::surface::{Surface, TileId};
use super::tile_cache::TileCache;
use crate::errors::ScrollResult;
use serde::Serialize;
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{trace, warn};

/// Pixel size shared by every tile of a layout
///
/// Taken once from the first candidate image; every other image is stretched
/// to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Scroll direction of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Tiles move towards smaller y
    Up,
    /// Tiles move towards larger y
    Down,
}

impl Direction {
    /// -1 for up, +1 for down
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
        }
    }
}

/// Everything a column touches while seeding or scrolling
pub struct TileContext<'a> {
    pub pool: &'a mut ImagePool,
    pub cache: &'a mut TileCache,
    pub surface: &'a mut dyn Surface,
}

/// One tile owned by a column
#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    pub source: PathBuf,
    pub y: f32,
}

/// What a single scroll call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnTick {
    /// Tiles moved to the leading edge with a new image
    pub recycled: usize,
    /// Tiles dropped while draining
    pub removed: usize,
}

#[derive(Debug)]
pub struct Column {
    x: f32,
    tile: TileSize,
    row_count: usize,
    direction: Direction,
    /// Ordered by ascending y
    tiles: VecDeque<Tile>,
    recycled_since_start: usize,
    has_cycled_once: bool,
}

impl Column {
    pub fn new(x: f32, tile: TileSize, row_count: usize, direction: Direction) -> Self {
        Self {
            x,
            tile,
            row_count,
            direction,
            tiles: VecDeque::with_capacity(row_count),
            recycled_since_start: 0,
            has_cycled_once: false,
        }
    }

    /// Place `row_count` contiguous tiles starting at y = 0
    ///
    /// With `gradient_only` every tile shows the pool's placeholder image,
    /// otherwise each tile gets a random image. Any tiles already present are
    /// removed first and the recycle tracking starts over. On failure the
    /// column is left empty.
    pub fn seed(&mut self, ctx: &mut TileContext<'_>, gradient_only: bool) -> ScrollResult<()> {
        self.clear(ctx.surface);
        self.reset_cycle_tracking();

        for row in 0..self.row_count {
            let source = if gradient_only {
                ctx.pool.gradient().to_path_buf()
            } else {
                ctx.pool.pick().to_path_buf()
            };
            let bitmap = match ctx.cache.get(&source, self.tile.width, self.tile.height) {
                Ok(bitmap) => bitmap,
                Err(e) => {
                    // Leave nothing half-seeded on the surface
                    self.clear(ctx.surface);
                    return Err(e);
                }
            };
            let y = row as f32 * self.tile.height as f32;
            let id = ctx.surface.add_tile(bitmap, self.x, y);
            self.tiles.push_back(Tile { id, source, y });
        }
        Ok(())
    }

    /// Move every tile by `step` in the column's direction
    ///
    /// In infinite mode tiles that fully left the trailing edge are moved to
    /// the leading edge with a new random image, so the tile count never
    /// changes. Otherwise they are removed from the surface and dropped.
    pub fn scroll(&mut self, step: f32, infinite: bool, ctx: &mut TileContext<'_>) -> ColumnTick {
        let mut result = ColumnTick::default();
        if self.tiles.is_empty() {
            return result;
        }

        let delta = step * self.direction.sign();
        for tile in self.tiles.iter_mut() {
            tile.y += delta;
            ctx.surface.set_tile_position(tile.id, self.x, tile.y);
        }

        if infinite {
            result.recycled = self.recycle(ctx);
            self.recycled_since_start += result.recycled;
            if !self.has_cycled_once && self.recycled_since_start >= self.row_count {
                self.has_cycled_once = true;
                trace!(x = self.x, "Column cycled through every seed row");
            }
        } else {
            result.removed = self.drain(ctx.surface);
        }
        result
    }

    fn is_out(&self, tile: &Tile) -> bool {
        match self.direction {
            Direction::Up => tile.y + (self.tile.height as f32) < 0.0,
            Direction::Down => tile.y > self.total_height(),
        }
    }

    fn recycle(&mut self, ctx: &mut TileContext<'_>) -> usize {
        // Count first so a single huge step cannot loop forever
        let out = self.tiles.iter().filter(|t| self.is_out(t)).count();
        let h = self.tile.height as f32;

        for _ in 0..out {
            let relocated = match self.direction {
                Direction::Up => self.tiles.pop_front().map(|mut tile| {
                    tile.y = self.tiles.back().map_or(tile.y, |t| t.y) + h;
                    tile
                }),
                Direction::Down => self.tiles.pop_back().map(|mut tile| {
                    tile.y = self.tiles.front().map_or(tile.y, |t| t.y) - h;
                    tile
                }),
            };
            let Some(mut tile) = relocated else {
                break;
            };

            self.repaint(&mut tile, ctx);
            ctx.surface.set_tile_position(tile.id, self.x, tile.y);

            match self.direction {
                Direction::Up => self.tiles.push_back(tile),
                Direction::Down => self.tiles.push_front(tile),
            }
        }
        out
    }

    fn repaint(&self, tile: &mut Tile, ctx: &mut TileContext<'_>) {
        let source = ctx.pool.pick().to_path_buf();
        match ctx.cache.get(&source, self.tile.width, self.tile.height) {
            Ok(bitmap) => {
                ctx.surface.set_tile_image(tile.id, bitmap);
                tile.source = source;
            }
            Err(e) => {
                // Keep the old image; the tile still moves
                warn!(error = %e, "Failed to load image for recycled tile");
            }
        }
    }

    fn drain(&mut self, surface: &mut dyn Surface) -> usize {
        let mut removed = 0;
        loop {
            let trailing = match self.direction {
                Direction::Up => self.tiles.front(),
                Direction::Down => self.tiles.back(),
            };
            match trailing {
                Some(tile) if self.is_out(tile) => {}
                _ => break,
            }
            let tile = match self.direction {
                Direction::Up => self.tiles.pop_front(),
                Direction::Down => self.tiles.pop_back(),
            };
            if let Some(tile) = tile {
                surface.remove_tile(tile.id);
                removed += 1;
            }
        }
        removed
    }

    /// Remove every tile from the surface
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        for tile in self.tiles.drain(..) {
            surface.remove_tile(tile.id);
        }
    }

    /// Start counting recycles from zero again
    pub fn reset_cycle_tracking(&mut self) {
        self.recycled_since_start = 0;
        self.has_cycled_once = false;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile
    }

    /// Height of the seeded strip
    pub fn total_height(&self) -> f32 {
        self.tile.height as f32 * self.row_count as f32
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn recycled_since_start(&self) -> usize {
        self.recycled_since_start
    }

    /// True once every seed row has been recycled at least once
    pub fn has_cycled_once(&self) -> bool {
        self.has_cycled_once
    }
}
