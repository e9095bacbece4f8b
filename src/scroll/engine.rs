// SPDX-License-Identifier: GPL-3.0-only

//! Frame-driven scroll state machine
//!
//! ```text
//!            start()                  begin_stop()
//!   Idle ───────────────► Continuous ─────────────► Stopping ──(field empty)──► Idle
//!                           ▲    │
//!                           │    │ begin_start()
//!       (a column cycled)   │    ▼
//!                           └─ Starting
//! ```
//!
//! Every transition callback fires exactly once, after the tick that completed
//! it has finished touching the columns. Callbacks cannot reach the engine
//! directly; they queue commands through an [`EngineHandle`], which the engine
//! applies once the callbacks have returned.

use super::Completion;
use super::images::ImagePool;
use super::layout::ScrollLayout;
use super::surface::Surface;
use super::tile_cache::TileCache;
use crate::config::Config;
use crate::errors::ScrollResult;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error, info, trace, warn};

/// Parameters the engine needs to build layouts
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub image_dir: PathBuf,
    pub gradient_image: PathBuf,
    pub foreground_image: Option<PathBuf>,
    pub scroll_speed: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub angle: f32,
    pub cache_capacity: usize,
    pub seed: Option<u64>,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            image_dir: config.image_dir.clone(),
            gradient_image: config.gradient_image.clone(),
            foreground_image: config.foreground_image.clone(),
            scroll_speed: config.scroll_speed,
            margin_x: config.margin_x,
            margin_y: config.margin_y,
            angle: config.angle,
            cache_capacity: config.cache_capacity,
            seed: config.seed,
        }
    }
}

/// Observable engine mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Idle,
    Continuous,
    /// Draining the field at `speed` pixels per tick
    Stopping { speed: f32 },
    /// Revealing a fresh field at `speed` pixels per tick
    Starting { speed: f32 },
}

enum State {
    Idle,
    Continuous,
    Stopping {
        speed: f32,
        on_finished: Option<Completion>,
    },
    Starting {
        speed: f32,
        on_finished: Option<Completion>,
    },
}

impl State {
    fn mode(&self) -> Mode {
        match self {
            State::Idle => Mode::Idle,
            State::Continuous => Mode::Continuous,
            State::Stopping { speed, .. } => Mode::Stopping { speed: *speed },
            State::Starting { speed, .. } => Mode::Starting { speed: *speed },
        }
    }
}

/// Requests queued from inside callbacks
pub enum EngineCommand {
    Start { gradient_only: bool },
    Stop,
    Clear,
    BeginStop {
        speed: f32,
        on_finished: Option<Completion>,
    },
    BeginStart {
        speed: f32,
        on_finished: Option<Completion>,
    },
    SetSpeed(f32),
}

impl fmt::Debug for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Start { gradient_only } => {
                write!(f, "Start {{ gradient_only: {} }}", gradient_only)
            }
            EngineCommand::Stop => write!(f, "Stop"),
            EngineCommand::Clear => write!(f, "Clear"),
            EngineCommand::BeginStop { speed, .. } => write!(f, "BeginStop {{ speed: {} }}", speed),
            EngineCommand::BeginStart { speed, .. } => {
                write!(f, "BeginStart {{ speed: {} }}", speed)
            }
            EngineCommand::SetSpeed(speed) => write!(f, "SetSpeed({})", speed),
        }
    }
}

/// Cloneable queue of deferred engine commands
#[derive(Clone, Default)]
pub struct EngineHandle {
    queue: Rc<RefCell<VecDeque<EngineCommand>>>,
}

impl EngineHandle {
    pub fn push(&self, command: EngineCommand) {
        self.queue.borrow_mut().push_back(command);
    }

    pub fn start(&self, gradient_only: bool) {
        self.push(EngineCommand::Start { gradient_only });
    }

    pub fn stop(&self) {
        self.push(EngineCommand::Stop);
    }

    pub fn clear(&self) {
        self.push(EngineCommand::Clear);
    }

    pub fn begin_stop(&self, speed: f32, on_finished: Option<Completion>) {
        self.push(EngineCommand::BeginStop { speed, on_finished });
    }

    pub fn begin_start(&self, speed: f32, on_finished: Option<Completion>) {
        self.push(EngineCommand::BeginStart { speed, on_finished });
    }

    pub fn set_speed(&self, speed: f32) {
        self.push(EngineCommand::SetSpeed(speed));
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn pop(&self) -> Option<EngineCommand> {
        self.queue.borrow_mut().pop_front()
    }
}

pub struct ScrollEngine {
    settings: EngineSettings,
    cache: TileCache,
    layout: Option<ScrollLayout>,
    state: State,
    handle: EngineHandle,
}

impl ScrollEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let cache = TileCache::new(settings.cache_capacity);
        Self {
            settings,
            cache,
            layout: None,
            state: State::Idle,
            handle: EngineHandle::default(),
        }
    }

    /// Handle for queueing commands from callbacks
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Drop the current layout and build a fresh one for the surface's viewport
    ///
    /// The image directory is re-read and the tile size re-probed. The mode is
    /// left untouched.
    pub fn reset(&mut self, surface: &mut dyn Surface, gradient_only: bool) -> ScrollResult<()> {
        self.drop_layout(surface);

        let pool = ImagePool::from_dir(
            &self.settings.image_dir,
            self.settings.gradient_image.clone(),
            self.settings.seed,
        )?;
        let mut layout = ScrollLayout::new(
            pool,
            surface.viewport_size(),
            self.settings.margin_x,
            self.settings.margin_y,
            self.settings.angle,
            gradient_only,
        )?;
        if let Err(e) = layout.create(&mut self.cache, surface) {
            layout.clear(surface);
            return Err(e);
        }

        self.layout = Some(layout);
        Ok(())
    }

    /// Enter continuous scrolling, building a layout if none exists
    ///
    /// A transition in flight is abandoned: its layout is rebuilt and its
    /// callback is dropped without being called.
    pub fn start(&mut self, surface: &mut dyn Surface, gradient_only: bool) -> ScrollResult<()> {
        if matches!(self.state, State::Stopping { .. } | State::Starting { .. }) {
            debug!("Start supersedes a pending transition");
            self.drop_layout(surface);
        }
        self.state = State::Idle;

        if self.layout.is_none() {
            self.reset(surface, gradient_only)?;
        }
        self.state = State::Continuous;
        info!(gradient_only, "Scroll started");
        Ok(())
    }

    /// Scroll every column once in draining mode and go idle
    ///
    /// Tiles still in range stay where they are.
    pub fn stop(&mut self, surface: &mut dyn Surface) {
        let speed = self.settings.scroll_speed;
        if let Some(layout) = self.layout.as_mut() {
            layout.scroll_all(speed, false, &mut self.cache, surface);
        }
        self.state = State::Idle;
        debug!("Scroll stopped");
    }

    /// Empty and drop the layout, whatever the current mode
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        self.drop_layout(surface);
        surface.clear();
        self.state = State::Idle;
        debug!("Scroll cleared");
    }

    /// Drain the field at `speed`; `on_finished` fires once it is empty
    ///
    /// The speed is a magnitude: its sign is ignored and a non-finite value
    /// counts as zero, which holds the field in place.
    pub fn begin_stop(&mut self, speed: f32, on_finished: Option<Completion>) {
        let speed = transition_speed(speed);
        info!(speed, has_layout = self.layout.is_some(), "Begin stop animation");
        self.state = State::Stopping { speed, on_finished };
    }

    /// Reveal the field at `speed`; `on_finished` fires once a column has
    /// recycled all of its rows
    ///
    /// The speed is normalised the same way as for [`Self::begin_stop`].
    pub fn begin_start(&mut self, speed: f32, on_finished: Option<Completion>) {
        let speed = transition_speed(speed);
        info!(speed, has_layout = self.layout.is_some(), "Begin start animation");
        if let Some(layout) = self.layout.as_mut() {
            layout.reset_cycle_tracking();
        }
        self.state = State::Starting { speed, on_finished };
    }

    /// Advance one frame
    pub fn tick(&mut self, surface: &mut dyn Surface) {
        let mut finished: Vec<(&'static str, Completion)> = Vec::new();

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::Continuous => {
                if let Some(layout) = self.layout.as_mut() {
                    layout.scroll_all(self.settings.scroll_speed, true, &mut self.cache, surface);
                }
                self.state = State::Continuous;
            }
            State::Stopping { speed, on_finished } => {
                self.state = self.tick_stopping(surface, speed, on_finished, &mut finished);
            }
            State::Starting { speed, on_finished } => {
                self.state = self.tick_starting(surface, speed, on_finished, &mut finished);
            }
        }

        for (name, callback) in finished {
            super::run_completion(name, callback);
        }

        self.apply_pending(surface);
    }

    fn tick_stopping(
        &mut self,
        surface: &mut dyn Surface,
        speed: f32,
        on_finished: Option<Completion>,
        finished: &mut Vec<(&'static str, Completion)>,
    ) -> State {
        let remaining = match self.layout.as_mut() {
            Some(layout) => {
                layout.scroll_all(speed, false, &mut self.cache, surface);
                layout.total_tile_count()
            }
            None => 0,
        };
        trace!(remaining, "Stop frame");

        if remaining > 0 {
            return State::Stopping { speed, on_finished };
        }

        self.layout = None;
        surface.clear();
        info!("Stop animation finished");
        if let Some(callback) = on_finished {
            finished.push(("stop", callback));
        }
        State::Idle
    }

    fn tick_starting(
        &mut self,
        surface: &mut dyn Surface,
        speed: f32,
        mut on_finished: Option<Completion>,
        finished: &mut Vec<(&'static str, Completion)>,
    ) -> State {
        let Some(layout) = self.layout.as_mut() else {
            warn!("Start animation without a layout; finishing immediately");
            if let Some(callback) = on_finished {
                finished.push(("start", callback));
            }
            return State::Idle;
        };

        let mut starting = true;
        for index in 0..layout.columns().len() {
            layout.scroll_column(index, speed, true, &mut self.cache, surface);
            // Columns are checked in index order; the first to cycle wins
            if starting && layout.any_column_cycled_once() {
                starting = false;
                info!(column = index, "Start animation finished");
                if let Some(callback) = on_finished.take() {
                    finished.push(("start", callback));
                }
            }
        }

        if starting {
            State::Starting { speed, on_finished }
        } else {
            State::Continuous
        }
    }

    /// Apply commands queued through the handle
    pub fn apply_pending(&mut self, surface: &mut dyn Surface) {
        while let Some(command) = self.handle.pop() {
            debug!(?command, "Applying queued engine command");
            match command {
                EngineCommand::Start { gradient_only } => {
                    if let Err(e) = self.start(surface, gradient_only) {
                        error!(error = %e, "Queued start failed");
                    }
                }
                EngineCommand::Stop => self.stop(surface),
                EngineCommand::Clear => self.clear(surface),
                EngineCommand::BeginStop { speed, on_finished } => {
                    self.begin_stop(speed, on_finished)
                }
                EngineCommand::BeginStart { speed, on_finished } => {
                    self.begin_start(speed, on_finished)
                }
                EngineCommand::SetSpeed(speed) => self.set_speed(speed),
            }
        }
    }

    fn drop_layout(&mut self, surface: &mut dyn Surface) {
        if let Some(mut layout) = self.layout.take() {
            layout.clear(surface);
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.settings.scroll_speed = speed;
    }

    /// Change the tilt; takes effect on the next reset
    pub fn set_angle(&mut self, angle: f32) {
        self.settings.angle = angle;
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// True in any mode but idle
    pub fn is_running(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    pub fn layout(&self) -> Option<&ScrollLayout> {
        self.layout.as_ref()
    }

    /// Live tiles, zero without a layout
    pub fn total_tile_count(&self) -> usize {
        self.layout.as_ref().map_or(0, ScrollLayout::total_tile_count)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

/// Transition speeds are magnitudes; the mode decides the direction
fn transition_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        warn!(speed, "Non-finite transition speed, using 0");
        return 0.0;
    }
    if speed < 0.0 {
        warn!(speed, "Negative transition speed, using its magnitude");
    }
    speed.abs()
}
