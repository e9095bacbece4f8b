// SPDX-License-Identifier: GPL-3.0-only

//! Shared periodic frame tick
//!
//! One ticker drives every animated component of the screen. Subscribers are
//! called in subscription order on every tick. Subscribing or unsubscribing
//! from inside a tick callback is allowed and takes effect after the current
//! dispatch.

use crate::constants::timing;
use crate::errors::callback_error;
use std::cell::RefCell;
use std::time::Duration;
use tracing::{debug, error};

/// Per-frame callback
pub type TickCallback = Box<dyn FnMut()>;

/// Identifies one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A periodic tick source components can attach to
pub trait TickSource {
    fn subscribe(&self, callback: TickCallback) -> SubscriptionId;

    /// Returns false if `id` was not subscribed
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct Inner {
    subscribers: Vec<(SubscriptionId, TickCallback)>,
    next_id: u64,
    dispatching: bool,
    /// Ids taken out for the current dispatch
    active: Vec<SubscriptionId>,
    added: Vec<(SubscriptionId, TickCallback)>,
    removed: Vec<SubscriptionId>,
}

/// Frame ticker with a fixed interval
///
/// The ticker does not own a timer thread; the event loop calls [`tick`]
/// whenever [`interval`] has elapsed.
///
/// [`tick`]: FrameTicker::tick
/// [`interval`]: FrameTicker::interval
pub struct FrameTicker {
    inner: RefCell<Inner>,
    interval: Duration,
    fps: u32,
}

impl FrameTicker {
    /// Create a ticker for `fps` frames per second (0 falls back to 60)
    pub fn new(fps: u32) -> Self {
        let fps = if fps > 0 { fps } else { timing::FALLBACK_FPS };
        Self {
            inner: RefCell::new(Inner::default()),
            interval: timing::frame_interval(fps),
            fps,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.borrow();
        if inner.dispatching {
            (inner.active.len() + inner.added.len()).saturating_sub(inner.removed.len())
        } else {
            inner.subscribers.len()
        }
    }

    /// Call every subscriber once
    ///
    /// A panicking subscriber is logged and skipped; the others still run.
    pub fn tick(&self) {
        let mut subscribers = {
            let mut inner = self.inner.borrow_mut();
            if inner.dispatching {
                debug!("Nested tick ignored");
                return;
            }
            inner.dispatching = true;
            inner.active = inner.subscribers.iter().map(|(id, _)| *id).collect();
            std::mem::take(&mut inner.subscribers)
        };

        for (id, callback) in subscribers.iter_mut() {
            if self.inner.borrow().removed.contains(id) {
                continue;
            }
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback()));
            if let Err(payload) = result {
                let err = callback_error(payload);
                error!(subscription = ?id, error = %err, "Tick subscriber panicked");
            }
        }

        let mut inner = self.inner.borrow_mut();
        let removed = std::mem::take(&mut inner.removed);
        subscribers.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::take(&mut inner.added);
        subscribers.extend(added.into_iter().filter(|(id, _)| !removed.contains(id)));
        inner.subscribers = subscribers;
        inner.active.clear();
        inner.dispatching = false;
    }
}

impl TickSource for FrameTicker {
    fn subscribe(&self, callback: TickCallback) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        if inner.dispatching {
            inner.added.push((id, callback));
        } else {
            inner.subscribers.push((id, callback));
        }
        debug!(subscription = ?id, "Tick subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.dispatching {
            let known = inner.active.contains(&id) || inner.added.iter().any(|(s, _)| *s == id);
            if !known || inner.removed.contains(&id) {
                return false;
            }
            inner.removed.push(id);
            return true;
        }
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(s, _)| *s != id);
        let removed = inner.subscribers.len() != before;
        if removed {
            debug!(subscription = ?id, "Tick unsubscribed");
        }
        removed
    }
}
