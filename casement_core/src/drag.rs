// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer drag gestures.
//!
//! [`DragController`] turns pointer-down/move/up events into throttled
//! `set({left, top})` calls on a [`PositionStore`]. The host captures the
//! pointer and forwards the events; positions are pointer deltas applied to
//! the offsets read at pointer-down.

use kurbo::{Point, Vec2};

use crate::data::PositionPatch;
use crate::error::PositionError;
use crate::position::PositionStore;
use crate::subscribe::Writable;
use crate::time::{Duration, HostTime};

/// Drag settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragOptions {
    /// Minimum time between two moves written to the store.
    pub throttle: Duration,
    /// Whether pointer-down starts a drag.
    pub enabled: bool,
}

impl DragOptions {
    /// One frame at 60 Hz.
    pub const DEFAULT_THROTTLE: Duration = Duration(16_667);
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            throttle: Self::DEFAULT_THROTTLE,
            enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Gesture {
    pointer: Point,
    origin: Point,
    last_write: Option<HostTime>,
    pending: Option<Point>,
}

impl Gesture {
    fn target(&self, pointer: Point) -> Point {
        self.origin + (pointer - self.pointer)
    }
}

/// Drives a store from pointer events.
#[derive(Debug)]
pub struct DragController {
    store: PositionStore,
    options: DragOptions,
    dragging: Writable<bool>,
    gesture: Option<Gesture>,
}

impl DragController {
    /// Creates a controller for `store`.
    #[must_use]
    pub fn new(store: PositionStore, options: DragOptions) -> Self {
        Self {
            store,
            options,
            dragging: Writable::new(false),
            gesture: None,
        }
    }

    /// The flag store that is `true` while a drag is in progress.
    #[must_use]
    pub fn dragging(&self) -> Writable<bool> {
        self.dragging.clone()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Whether pointer-down starts a drag.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// Enables or disables dragging. Disabling ends a drag in progress
    /// where it is.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
        if !enabled && self.gesture.take().is_some() {
            self.dragging.set(false);
        }
    }

    /// Starts a drag at `pointer`. Returns `false` when dragging is
    /// disabled.
    ///
    /// Running animations of the store are finished first so they do not
    /// fight the pointer.
    pub fn pointer_down(&mut self, pointer: Point, now: HostTime) -> bool {
        if !self.options.enabled {
            return false;
        }
        if self.store.is_animating() {
            self.store.cancel_animations();
        }
        let origin = Point::new(
            self.store.left().unwrap_or(0.0),
            self.store.top().unwrap_or(0.0),
        );
        log::trace!("drag start on {:?} at {:?}", self.store.id(), now);
        self.gesture = Some(Gesture {
            pointer,
            origin,
            last_write: None,
            pending: None,
        });
        self.dragging.set(true);
        true
    }

    /// Moves the drag to `pointer`.
    ///
    /// Returns `Ok(true)` when the move was written to the store and
    /// `Ok(false)` when it was throttled (it is kept and written by a
    /// later move or by [`pointer_up`](Self::pointer_up)) or no drag is in
    /// progress.
    pub fn pointer_move(&mut self, pointer: Point, now: HostTime) -> Result<bool, PositionError> {
        let throttle = self.options.throttle;
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(false);
        };
        let target = gesture.target(pointer);
        let due = gesture
            .last_write
            .is_none_or(|last| now.saturating_duration_since(last) >= throttle);
        if !due {
            gesture.pending = Some(target);
            return Ok(false);
        }
        gesture.last_write = Some(now);
        gesture.pending = None;
        self.write(target)?;
        Ok(true)
    }

    /// Writes a throttled move once the throttle interval has passed.
    ///
    /// Hosts call this from their frame loop so the window catches up with
    /// a pointer that stopped moving.
    pub fn flush(&mut self, now: HostTime) -> Result<bool, PositionError> {
        let throttle = self.options.throttle;
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(false);
        };
        let due = gesture
            .last_write
            .is_none_or(|last| now.saturating_duration_since(last) >= throttle);
        let Some(target) = gesture.pending.filter(|_| due) else {
            return Ok(false);
        };
        gesture.last_write = Some(now);
        gesture.pending = None;
        self.write(target)?;
        Ok(true)
    }

    /// Ends the drag, writing the final position at `pointer`.
    pub fn pointer_up(&mut self, pointer: Point, now: HostTime) -> Result<(), PositionError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(());
        };
        self.dragging.set(false);
        log::trace!("drag end on {:?} at {:?}", self.store.id(), now);
        self.write(gesture.target(pointer))
    }

    /// Total pointer travel of the current drag.
    #[must_use]
    pub fn delta(&self, pointer: Point) -> Option<Vec2> {
        self.gesture.map(|g| pointer - g.pointer)
    }

    fn write(&self, at: Point) -> Result<(), PositionError> {
        self.store
            .set(&PositionPatch::new().left(at.x).top(at.y))
            .map(|_| ())
    }
}
