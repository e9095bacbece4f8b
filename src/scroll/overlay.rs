// SPDX-License-Identifier: GPL-3.0-only

//! Idle-screen overlay hosting the scroll engine
//!
//! The overlay owns one engine and its surface, forwards the shared frame
//! tick to it while scrolling, and exposes show/hide/raise/lower to the
//! window around it. Every operation takes an optional callback that runs
//! synchronously once the operation is done.
//!
//! Engine transition callbacks run in the middle of a frame, while the overlay
//! is borrowed. They talk back to the overlay through an [`OverlayHandle`];
//! queued commands run at the end of the frame.

use super::engine::{EngineSettings, Mode, ScrollEngine};
use super::images;
use super::surface::Surface;
use super::ticker::{SubscriptionId, TickSource};
use super::{Completion, run_completion};
use crate::errors::ScrollResult;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, trace, warn};

/// Requests queued for the end of the current frame
enum OverlayCommand {
    Show { restart: bool },
    Hide,
    Raise,
    Lower,
    CleanScroll,
    StartScroll { stop_speed: f32, on_finished: Option<Completion> },
    RestartScroll { start_speed: f32, on_finished: Option<Completion> },
    Detach,
}

/// Cloneable queue of deferred overlay commands
#[derive(Clone, Default)]
pub struct OverlayHandle {
    queue: Rc<RefCell<VecDeque<OverlayCommand>>>,
}

impl OverlayHandle {
    fn push(&self, command: OverlayCommand) {
        self.queue.borrow_mut().push_back(command);
    }

    pub fn show(&self, restart: bool) {
        self.push(OverlayCommand::Show { restart });
    }

    pub fn hide(&self) {
        self.push(OverlayCommand::Hide);
    }

    pub fn raise(&self) {
        self.push(OverlayCommand::Raise);
    }

    pub fn lower(&self) {
        self.push(OverlayCommand::Lower);
    }

    pub fn clean_scroll(&self) {
        self.push(OverlayCommand::CleanScroll);
    }

    pub fn start_scroll_animation(&self, stop_speed: f32, on_finished: Option<Completion>) {
        self.push(OverlayCommand::StartScroll { stop_speed, on_finished });
    }

    pub fn restart_scroll_animation(&self, start_speed: f32, on_finished: Option<Completion>) {
        self.push(OverlayCommand::RestartScroll { start_speed, on_finished });
    }

    /// Stop receiving frame ticks
    pub fn detach(&self) {
        self.push(OverlayCommand::Detach);
    }

    fn pop(&self) -> Option<OverlayCommand> {
        self.queue.borrow_mut().pop_front()
    }
}

pub struct ScrollOverlay<S: Surface> {
    engine: ScrollEngine,
    surface: S,
    ticker: Rc<dyn TickSource>,
    subscription: Option<SubscriptionId>,
    this: Weak<RefCell<ScrollOverlay<S>>>,
    handle: OverlayHandle,
    visible: bool,
    raised: bool,
    running: bool,
}

impl<S: Surface + 'static> ScrollOverlay<S> {
    /// Create a hidden overlay drawing on `surface`
    ///
    /// The configured foreground image is put on the surface right away. A
    /// foreground that fails to load is skipped with a warning.
    pub fn new(
        settings: EngineSettings,
        mut surface: S,
        ticker: Rc<dyn TickSource>,
    ) -> Rc<RefCell<Self>> {
        if let Some(path) = &settings.foreground_image {
            match images::load_bitmap(path) {
                Ok(bitmap) => surface.set_foreground(Some(bitmap)),
                Err(e) => warn!(error = %e, "Foreground image not loaded"),
            }
        }
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                engine: ScrollEngine::new(settings),
                surface,
                ticker,
                subscription: None,
                this: this.clone(),
                handle: OverlayHandle::default(),
                visible: false,
                raised: false,
                running: false,
            })
        })
    }

    /// Handle for queueing overlay commands from callbacks
    pub fn handle(&self) -> OverlayHandle {
        self.handle.clone()
    }

    /// Advance the engine by one frame, then run queued commands
    ///
    /// Ticks stop once the engine has settled in idle with nothing running.
    pub fn update_frame(&mut self) {
        self.engine.tick(&mut self.surface);
        self.apply_pending();
        if !self.running && self.engine.mode() == Mode::Idle {
            self.detach();
        }
    }

    /// Make the overlay visible, starting the scroll if it is not running
    pub fn show(&mut self, on_shown: Option<Completion>) {
        self.show_inner(false);
        finish("shown", on_shown);
    }

    fn show_inner(&mut self, restart: bool) {
        if !self.visible {
            self.visible = true;
            debug!("Overlay shown");
        }
        if !self.running {
            match self.start_engine(restart) {
                Ok(()) => self.running = true,
                Err(e) => error!(error = %e, "Failed to start scroll background"),
            }
        }
    }

    fn start_engine(&mut self, gradient_only: bool) -> ScrollResult<()> {
        self.engine.start(&mut self.surface, gradient_only)?;
        self.attach();
        Ok(())
    }

    pub fn hide(&mut self, on_hidden: Option<Completion>) {
        if self.visible {
            self.visible = false;
            debug!("Overlay hidden");
        }
        finish("hidden", on_hidden);
    }

    /// Bring the overlay above the rest of the window
    pub fn raise(&mut self, on_raised: Option<Completion>) {
        self.raised = true;
        finish("raised", on_raised);
    }

    /// Put the overlay behind the rest of the window
    pub fn lower(&mut self, on_lowered: Option<Completion>) {
        self.raised = false;
        finish("lowered", on_lowered);
    }

    /// Drain the field; `on_finished` runs once it is empty
    ///
    /// The overlay stops receiving ticks after the drain completes.
    pub fn start_scroll_animation(&mut self, stop_speed: f32, on_finished: Option<Completion>) {
        info!(stop_speed, "Starting scroll-out animation");
        let handle = self.handle.clone();
        let on_finished: Completion = Box::new(move || {
            handle.detach();
            if let Some(callback) = on_finished {
                callback();
            }
        });
        self.engine.begin_stop(stop_speed, Some(on_finished));
        self.running = false;
        self.attach();
    }

    /// Lower the overlay, show it again on a gradient field, then reveal
    /// random images at `start_speed`
    ///
    /// If the field cannot be rebuilt, `on_finished` still runs on the next
    /// frame.
    pub fn restart_scroll_animation(&mut self, start_speed: f32, on_finished: Option<Completion>) {
        info!(start_speed, "Restarting scroll animation");
        self.lower(None);
        self.show_inner(true);
        self.engine.begin_start(start_speed, on_finished);
        self.attach();
    }

    /// Empty the field and drop the layout
    pub fn clean_scroll(&mut self, on_cleaned: Option<Completion>) {
        self.engine.clear(&mut self.surface);
        self.running = false;
        finish("cleaned", on_cleaned);
    }

    /// Hide, empty the field and stop receiving ticks
    pub fn clear_overlay(&mut self, on_cleared: Option<Completion>) {
        self.visible = false;
        self.engine.clear(&mut self.surface);
        self.running = false;
        self.detach();
        finish("cleared", on_cleared);
    }

    fn attach(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let this = self.this.clone();
        let id = self.ticker.subscribe(Box::new(move || {
            let Some(overlay) = this.upgrade() else {
                return;
            };
            // Skip the frame if the overlay is busy further up the stack
            match overlay.try_borrow_mut() {
                Ok(mut overlay) => overlay.update_frame(),
                Err(_) => trace!("Overlay busy, frame skipped"),
            };
        }));
        self.subscription = Some(id);
        debug!("Overlay attached to frame ticker");
    }

    fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.ticker.unsubscribe(id);
            debug!("Overlay detached from frame ticker");
        }
    }

    fn apply_pending(&mut self) {
        while let Some(command) = self.handle.pop() {
            match command {
                OverlayCommand::Show { restart } => self.show_inner(restart),
                OverlayCommand::Hide => self.hide(None),
                OverlayCommand::Raise => self.raise(None),
                OverlayCommand::Lower => self.lower(None),
                OverlayCommand::CleanScroll => self.clean_scroll(None),
                OverlayCommand::StartScroll {
                    stop_speed,
                    on_finished,
                } => self.start_scroll_animation(stop_speed, on_finished),
                OverlayCommand::RestartScroll {
                    start_speed,
                    on_finished,
                } => self.restart_scroll_animation(start_speed, on_finished),
                OverlayCommand::Detach => self.detach(),
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_raised(&self) -> bool {
        self.raised
    }

    /// True while the field scrolls continuously or is being revealed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while subscribed to the frame ticker
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn engine(&self) -> &ScrollEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ScrollEngine {
        &mut self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface> Drop for ScrollOverlay<S> {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.ticker.unsubscribe(id);
        }
    }
}

fn finish(name: &'static str, callback: Option<Completion>) {
    if let Some(callback) = callback {
        run_completion(name, callback);
    }
}
