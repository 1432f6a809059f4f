// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-batched element style writes.
//!
//! The [`UpdateScheduler`] coalesces every sync request made between two
//! frames into one batch. Each element appears in the batch at most once,
//! however many times its store called `set()`, and everyone awaiting the
//! batch receives the same frame timestamp once every callback has run.
//!
//! The scheduler is passive: the [`Runtime`](crate::runtime::Runtime) takes
//! the batch on each tick, invokes the callbacks and resolves the frame
//! signal. Registrations made while a batch is being flushed land in the
//! next frame.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::host::ElementId;
use crate::signal::Signal;
use crate::time::HostTime;

/// A bound per-element style sync, invoked with the frame time.
pub type SyncCallback = Rc<dyn Fn(HostTime)>;

/// One frame's worth of element syncs plus the signal that resolves after
/// them.
pub struct Batch {
    /// Callbacks in first-registration order.
    pub callbacks: Vec<(ElementId, SyncCallback)>,
    /// Resolved by the runtime after every callback has run.
    pub frame: Signal<HostTime>,
}

impl fmt::Debug for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field(
                "elements",
                &self.callbacks.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .field("frame", &self.frame)
            .finish()
    }
}

/// Collects element syncs for the next frame.
#[derive(Default)]
pub struct UpdateScheduler {
    queue: Vec<(ElementId, SyncCallback)>,
    frame: Option<Signal<HostTime>>,
}

impl UpdateScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Vec::new(),
            frame: None,
        }
    }

    /// Registers `callback` for `element` and returns the signal that
    /// resolves once the next frame's writes are applied.
    ///
    /// A second registration for the same element before the frame fires
    /// keeps the first callback and its position in the batch.
    pub fn add(&mut self, element: ElementId, callback: SyncCallback) -> Signal<HostTime> {
        if !self.queue.iter().any(|(id, _)| *id == element) {
            self.queue.push((element, callback));
        }
        self.frame.get_or_insert_with(Signal::new).clone()
    }

    /// Whether a frame is needed to flush registrations.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of distinct elements waiting for a sync.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no element is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether `element` is already registered for the next frame.
    #[must_use]
    pub fn contains(&self, element: ElementId) -> bool {
        self.queue.iter().any(|(id, _)| *id == element)
    }

    /// Takes the pending batch, leaving the scheduler idle.
    pub fn take_batch(&mut self) -> Option<Batch> {
        let frame = self.frame.take()?;
        Some(Batch {
            callbacks: core::mem::take(&mut self.queue),
            frame,
        })
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateScheduler")
            .field("pending", &self.queue.len())
            .field("armed", &self.frame.is_some())
            .finish()
    }
}
