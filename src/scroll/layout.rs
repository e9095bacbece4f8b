// SPDX-License-Identifier: GPL-3.0-only

//! Column/row calculation for a tilted tile field
//!
//! The field is rotated by the view angle around its centre. To keep the
//! upright viewport fully covered, the field must be at least as large as the
//! viewport divided by `cos(angle)`, times the safety margins. One spare row is
//! added so the recycling seam never shows.

use super::column::{Column, ColumnTick, Direction, TileContext, TileSize};
use super::images::{self, ImagePool};
use super::surface::Surface;
use super::tile_cache::TileCache;
use crate::errors::ScrollResult;
use serde::Serialize;
use tracing::{debug, info};

/// Inputs to the layout calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tile: TileSize,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Requested tilt in degrees
    pub angle: f32,
}

/// Result of the layout calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutGeometry {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tile: TileSize,
    /// Largest tilt that still guarantees coverage, in degrees
    pub max_angle: f64,
    /// Tilt actually used, in degrees
    pub angle: f64,
    pub phi: f64,
    pub effective_width: f64,
    pub effective_height: f64,
    pub num_cols: usize,
    pub num_rows: usize,
}

impl LayoutGeometry {
    /// Compute how many columns and rows cover the viewport once tilted
    ///
    /// The angle is clamped to `[0, atan2(width, height)]` rather than
    /// rejected. Margins below 1 are raised to 1.
    pub fn compute(params: &LayoutParams) -> Self {
        let vw = params.viewport_width as f64;
        let vh = params.viewport_height as f64;
        let iw = params.tile.width.max(1) as f64;
        let ih = params.tile.height.max(1) as f64;
        let margin_x = (params.margin_x as f64).max(1.0);
        let margin_y = (params.margin_y as f64).max(1.0);

        let max_angle = vw.atan2(vh).to_degrees();
        let requested = params.angle as f64;
        let angle = if requested.is_finite() {
            requested.clamp(0.0, max_angle)
        } else {
            0.0
        };

        let mut phi = angle.to_radians().cos();
        if phi == 0.0 {
            phi = 1.0;
        }

        let effective_width = vw / phi;
        let effective_height = vh / phi;

        let num_cols = (((effective_width / iw) * margin_x).ceil() as usize).max(1);
        let num_rows = (((effective_height / ih) * margin_y).ceil() as usize).max(1) + 1;

        Self {
            viewport_width: params.viewport_width,
            viewport_height: params.viewport_height,
            tile: params.tile,
            max_angle,
            angle,
            phi,
            effective_width,
            effective_height,
            num_cols,
            num_rows,
        }
    }

    /// Scroll direction of column `index`: every third column moves up
    pub fn direction_of(index: usize) -> Direction {
        if index % 3 == 0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// Width and height of the untilted field
    pub fn field_size(&self) -> (f32, f32) {
        (
            (self.num_cols as u64 * self.tile.width as u64) as f32,
            (self.num_rows as u64 * self.tile.height as u64) as f32,
        )
    }
}

/// The set of columns built for one viewport geometry
///
/// Built fresh on every engine reset; never reshaped in place.
#[derive(Debug)]
pub struct ScrollLayout {
    geometry: LayoutGeometry,
    pool: ImagePool,
    columns: Vec<Column>,
    gradient_only: bool,
}

impl ScrollLayout {
    /// Build a layout whose tile size comes from the pool's first image
    pub fn new(
        pool: ImagePool,
        viewport: (u32, u32),
        margin_x: f32,
        margin_y: f32,
        angle: f32,
        gradient_only: bool,
    ) -> ScrollResult<Self> {
        let (iw, ih) = images::probe_size(pool.first())?;
        let params = LayoutParams {
            viewport_width: viewport.0,
            viewport_height: viewport.1,
            tile: TileSize::new(iw, ih),
            margin_x,
            margin_y,
            angle,
        };
        Ok(Self::with_params(pool, params, gradient_only))
    }

    /// Build a layout from explicit parameters
    pub fn with_params(pool: ImagePool, params: LayoutParams, gradient_only: bool) -> Self {
        let geometry = LayoutGeometry::compute(&params);
        debug!(
            viewport_width = geometry.viewport_width,
            viewport_height = geometry.viewport_height,
            effective_width = geometry.effective_width,
            effective_height = geometry.effective_height,
            tile_width = geometry.tile.width,
            num_cols = geometry.num_cols,
            num_rows = geometry.num_rows,
            "Computed scroll layout"
        );
        Self {
            geometry,
            pool,
            columns: Vec::new(),
            gradient_only,
        }
    }

    /// Instantiate and seed every column on `surface`
    ///
    /// If any tile fails to load, every column placed so far is removed again.
    pub fn create(&mut self, cache: &mut TileCache, surface: &mut dyn Surface) -> ScrollResult<()> {
        self.clear(surface);

        let tile = self.geometry.tile;
        for i in 0..self.geometry.num_cols {
            let x = (i as u64 * tile.width as u64) as f32;
            let mut column = Column::new(
                x,
                tile,
                self.geometry.num_rows,
                LayoutGeometry::direction_of(i),
            );
            let mut ctx = TileContext {
                pool: &mut self.pool,
                cache: &mut *cache,
                surface: &mut *surface,
            };
            if let Err(e) = column.seed(&mut ctx, self.gradient_only) {
                self.clear(surface);
                return Err(e);
            }
            self.columns.push(column);
        }

        let (w, h) = self.geometry.field_size();
        surface.set_view(self.geometry.angle as f32, (w / 2.0, h / 2.0));

        info!(
            columns = self.columns.len(),
            tiles = self.total_tile_count(),
            gradient_only = self.gradient_only,
            "Created scroll columns"
        );
        Ok(())
    }

    /// Scroll a single column; out-of-range indices are ignored
    pub fn scroll_column(
        &mut self,
        index: usize,
        step: f32,
        infinite: bool,
        cache: &mut TileCache,
        surface: &mut dyn Surface,
    ) -> ColumnTick {
        let Some(column) = self.columns.get_mut(index) else {
            return ColumnTick::default();
        };
        let mut ctx = TileContext {
            pool: &mut self.pool,
            cache,
            surface,
        };
        column.scroll(step, infinite, &mut ctx)
    }

    /// Scroll every column by the same step
    pub fn scroll_all(
        &mut self,
        step: f32,
        infinite: bool,
        cache: &mut TileCache,
        surface: &mut dyn Surface,
    ) {
        for index in 0..self.columns.len() {
            self.scroll_column(index, step, infinite, cache, surface);
        }
    }

    /// Live tiles across all columns
    pub fn total_tile_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// True once at least one column recycled every seed row
    pub fn any_column_cycled_once(&self) -> bool {
        self.columns.iter().any(Column::has_cycled_once)
    }

    /// Restart recycle tracking on every column
    pub fn reset_cycle_tracking(&mut self) {
        for column in &mut self.columns {
            column.reset_cycle_tracking();
        }
    }

    /// Remove every tile and drop the columns
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        for column in &mut self.columns {
            column.clear(surface);
        }
        self.columns.clear();
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn tile_size(&self) -> TileSize {
        self.geometry.tile
    }

    pub fn is_gradient_only(&self) -> bool {
        self.gradient_only
    }
}
