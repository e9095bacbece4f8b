// SPDX-License-Identifier: GPL-3.0-only

//! Infinite diagonal scroll background
//!
//! The idle screen shows columns of photos drifting up and down behind a
//! tilted view. Only a fixed number of tiles per column ever exists: tiles
//! that leave one edge come back at the other with a new image.
//!
//! - [`tile_cache`]: scaled bitmap cache
//! - [`column`]: one strip of recycled tiles
//! - [`layout`]: how many columns and rows cover a tilted viewport
//! - [`engine`]: continuous / stopping / starting state machine
//! - [`overlay`]: show/hide/raise/lower shell driven by the frame ticker

pub mod column;
pub mod engine;
pub mod images;
pub mod layout;
pub mod overlay;
pub mod surface;
pub mod ticker;
pub mod tile_cache;

pub use column::{Column, Direction, TileSize};
pub use engine::{EngineCommand, EngineHandle, EngineSettings, Mode, ScrollEngine};
pub use images::ImagePool;
pub use layout::{LayoutGeometry, LayoutParams, ScrollLayout};
pub use overlay::{OverlayHandle, ScrollOverlay};
pub use surface::{SceneSurface, Surface, TileId};
pub use ticker::{FrameTicker, SubscriptionId, TickSource};
pub use tile_cache::{Bitmap, TileCache};

/// Callback fired once when an operation or transition completes
pub type Completion = Box<dyn FnOnce()>;

/// Run a completion callback, logging instead of unwinding if it panics
pub(crate) fn run_completion(name: &str, callback: Completion) {
    if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)) {
        let err = crate::errors::callback_error(payload);
        tracing::error!(callback = name, error = %err, "Completion callback panicked");
    }
}
