// SPDX-License-Identifier: MPL-2.0

//! Sleepscreen - infinite diagonal photo-scroll background for idle screens
//!
//! This library provides the scroll engine behind a kiosk's sleep screen:
//! columns of photos drift up and down a tilted field, tiles recycle with
//! fresh images as they leave the view, and the whole field can drain away
//! or be revealed again with a short animation.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`scroll`]: Tile cache, columns, layout, engine and overlay
//! - [`config`]: User configuration handling
//! - [`constants`]: Presets and defaults
//! - [`errors`]: Error types
//! - [`terminal`]: Terminal preview of the idle screen
//!
//! # Example
//!
//! ```ignore
//! use sleepscreen::scroll::{EngineSettings, SceneSurface, ScrollEngine};
//!
//! let mut surface = SceneSurface::new(1920, 1080);
//! let mut engine = ScrollEngine::new(EngineSettings::from(&sleepscreen::Config::default()));
//! engine.start(&mut surface, false)?;
//! loop {
//!     engine.tick(&mut surface);
//! }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod scroll;
pub mod terminal;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use constants::ScrollPreset;
pub use errors::{ScrollError, ScrollResult};
pub use scroll::{
    EngineSettings, FrameTicker, Mode, SceneSurface, ScrollEngine, ScrollLayout, ScrollOverlay,
    Surface, TileCache,
};
