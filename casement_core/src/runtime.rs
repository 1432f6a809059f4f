// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared frame service.
//!
//! A [`Runtime`] owns the one [`UpdateScheduler`] and the one
//! [`AnimationCoordinator`] that every position store of an application
//! shares. The host calls [`Runtime::tick`] once per display frame:
//!
//! 1. pending animations start and active ones advance, writing through
//!    their stores' `set()` and so registering element syncs;
//! 2. every registered element sync runs once, in registration order;
//! 3. the frame signal resolves with the frame time, waking everyone who
//!    awaited [`PositionStore::element_updated`](crate::position::PositionStore::element_updated).
//!
//! The runtime is idle when nothing is pending: it asks the host for a frame
//! through the requester installed with [`Runtime::set_frame_requester`]
//! only on the transition from idle to armed.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::animation::{AnimationCoordinator, AnimationTask};
use crate::host::ElementId;
use crate::scheduler::{SyncCallback, UpdateScheduler};
use crate::signal::Signal;
use crate::time::HostTime;
use crate::trace::{AnimationPhase, FrameBeginEvent, FrameEndEvent, TraceSink, Tracer};

/// Identifies a position store within its runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreId(pub u64);

/// What one [`Runtime::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame, starting at 1.
    pub frame_index: u64,
    /// Element sync callbacks invoked.
    pub element_syncs: usize,
    /// Animation tasks that wrote an intermediate frame.
    pub animations_advanced: usize,
    /// Animation tasks that reached their destination.
    pub animations_finished: usize,
    /// Animation tasks evicted for a disconnected element.
    pub animations_evicted: usize,
}

struct RuntimeShared {
    updates: RefCell<UpdateScheduler>,
    animations: AnimationCoordinator,
    frame_index: Cell<u64>,
    last_frame: Cell<Option<HostTime>>,
    next_store: Cell<u64>,
    requester: RefCell<Option<Rc<dyn Fn()>>>,
    armed: Cell<bool>,
    in_tick: Cell<bool>,
    sink: RefCell<Option<Box<dyn TraceSink>>>,
}

/// Shared frame scheduler and animation coordinator.
///
/// Cloning is cheap and yields another handle to the same service.
#[derive(Clone)]
pub struct Runtime {
    shared: Rc<RuntimeShared>,
}

impl Runtime {
    /// Creates an idle runtime with no frame requester.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RuntimeShared {
                updates: RefCell::new(UpdateScheduler::new()),
                animations: AnimationCoordinator::new(),
                frame_index: Cell::new(0),
                last_frame: Cell::new(None),
                next_store: Cell::new(0),
                requester: RefCell::new(None),
                armed: Cell::new(false),
                in_tick: Cell::new(false),
                sink: RefCell::new(None),
            }),
        }
    }

    /// Installs the callback used to ask the host for a frame.
    ///
    /// If work is already pending the callback is invoked right away.
    pub fn set_frame_requester(&self, request: impl Fn() + 'static) {
        *self.shared.requester.borrow_mut() = Some(Rc::new(request));
        if self.needs_frame() {
            self.shared.armed.set(false);
            self.arm();
        }
    }

    /// Removes the frame requester.
    pub fn clear_frame_requester(&self) {
        self.shared.requester.borrow_mut().take();
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.shared.sink.borrow_mut().replace(sink)
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&self) -> Option<Box<dyn TraceSink>> {
        self.shared.sink.borrow_mut().take()
    }

    /// Whether a tick would do any work.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.shared.updates.borrow().is_pending() || !self.shared.animations.is_empty()
    }

    /// Whether a frame has been requested and not yet delivered.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.shared.armed.get()
    }

    /// Number of frames ticked so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.shared.frame_index.get()
    }

    /// Time of the most recent tick.
    #[must_use]
    pub fn last_frame_time(&self) -> Option<HostTime> {
        self.shared.last_frame.get()
    }

    /// The shared animation coordinator.
    #[must_use]
    pub fn animations(&self) -> &AnimationCoordinator {
        &self.shared.animations
    }

    /// Number of distinct elements waiting for a sync.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.shared.updates.borrow().len()
    }

    /// Runs one frame.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside a frame.
    pub fn tick(&self, now: HostTime) -> FrameStats {
        let shared = &self.shared;
        assert!(!shared.in_tick.get(), "Runtime::tick called re-entrantly");
        shared.in_tick.set(true);
        shared.armed.set(false);

        let frame_index = shared.frame_index.get() + 1;
        shared.frame_index.set(frame_index);
        shared.last_frame.set(Some(now));

        self.trace(|t| {
            t.frame_begin(&FrameBeginEvent {
                frame_index,
                now,
                pending_updates: shared.updates.borrow().len(),
                animations: shared.animations.len(),
            });
        });

        let report = shared
            .animations
            .advance(now, &mut |e| self.trace(|t| t.animation(&e)));

        let mut element_syncs = 0;
        let batch = shared.updates.borrow_mut().take_batch();
        if let Some(batch) = batch {
            for (_, callback) in &batch.callbacks {
                callback(now);
                element_syncs += 1;
            }
            batch.frame.resolve(now);
        }

        self.trace(|t| {
            t.frame_end(&FrameEndEvent {
                frame_index,
                now,
                element_syncs,
                animations: shared.animations.len(),
            });
        });

        shared.in_tick.set(false);
        if self.needs_frame() {
            self.arm();
        }

        FrameStats {
            frame_index,
            element_syncs,
            animations_advanced: report.advanced,
            animations_finished: report.finished,
            animations_evicted: report.evicted,
        }
    }

    /// Cancels every animation (forcing destinations), flushes nothing, and
    /// resolves any outstanding frame signal with the last frame time.
    ///
    /// Used for host teardown and to isolate tests.
    pub fn reset(&self) {
        self.cancel_all_animations();
        let batch = self.shared.updates.borrow_mut().take_batch();
        if let Some(batch) = batch {
            batch
                .frame
                .resolve(self.shared.last_frame.get().unwrap_or_default());
        }
        self.shared.armed.set(false);
    }

    /// Forces every animation to its destination.
    pub fn cancel_all_animations(&self) -> usize {
        self.shared
            .animations
            .cancel_all(&mut |e| self.trace(|t| t.animation(&e)))
    }

    /// Forces every animation owned by `store` to its destination.
    pub fn cancel_animations_for(&self, store: StoreId) -> usize {
        self.shared
            .animations
            .cancel_for(store, &mut |e| self.trace(|t| t.animation(&e)))
    }

    pub(crate) fn next_store_id(&self) -> StoreId {
        let id = self.shared.next_store.get();
        self.shared.next_store.set(id + 1);
        StoreId(id)
    }

    pub(crate) fn register_update(
        &self,
        element: ElementId,
        callback: SyncCallback,
    ) -> Signal<HostTime> {
        let signal = self.shared.updates.borrow_mut().add(element, callback);
        self.arm();
        signal
    }

    pub(crate) fn next_task_id(&self) -> u64 {
        self.shared.animations.next_id()
    }

    pub(crate) fn schedule_animation(&self, task: Rc<AnimationTask>) {
        self.trace(|t| t.animation(&task.event(AnimationPhase::Scheduled, None)));
        self.shared.animations.schedule(task);
        self.arm();
    }

    /// Runs `f` with a tracer bound to the installed sink.
    ///
    /// Without the `trace` feature this compiles to nothing.
    #[inline]
    pub(crate) fn trace(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        #[cfg(feature = "trace")]
        if let Ok(mut slot) = self.shared.sink.try_borrow_mut()
            && let Some(sink) = slot.as_deref_mut()
        {
            f(&mut Tracer::new(sink));
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = f;
        }
    }

    fn arm(&self) {
        let shared = &self.shared;
        if shared.in_tick.get() || shared.armed.get() {
            return;
        }
        let requester = shared.requester.borrow().clone();
        if let Some(request) = requester {
            shared.armed.set(true);
            request();
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = &self.shared;
        f.debug_struct("Runtime")
            .field("frame_index", &shared.frame_index.get())
            .field("last_frame", &shared.last_frame.get())
            .field("updates", &*shared.updates.borrow())
            .field("animations", &shared.animations)
            .field("armed", &shared.armed.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn requests_a_frame_only_when_work_arrives() {
        let runtime = Runtime::new();
        let requests = Rc::new(Cell::new(0));
        let r = Rc::clone(&requests);
        runtime.set_frame_requester(move || r.set(r.get() + 1));
        assert_eq!(requests.get(), 0);

        runtime.register_update(ElementId(1), Rc::new(|_| {}));
        runtime.register_update(ElementId(2), Rc::new(|_| {}));
        assert_eq!(requests.get(), 1);
        assert!(runtime.is_armed());

        let stats = runtime.tick(HostTime(16_000));
        assert_eq!(stats.element_syncs, 2);
        assert_eq!(stats.frame_index, 1);
        assert!(!runtime.is_armed());
        assert!(!runtime.needs_frame());
        assert_eq!(requests.get(), 1);
    }

    #[test]
    fn syncs_registered_during_a_flush_go_to_the_next_frame() {
        let runtime = Runtime::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let rt = runtime.clone();
        let l = Rc::clone(&log);
        runtime.register_update(
            ElementId(1),
            Rc::new(move |now: HostTime| {
                l.borrow_mut().push((1, now));
                let l2 = Rc::clone(&l);
                rt.register_update(
                    ElementId(2),
                    Rc::new(move |now: HostTime| l2.borrow_mut().push((2, now))),
                );
            }),
        );
        runtime.tick(HostTime(1));
        assert_eq!(*log.borrow(), [(1, HostTime(1))]);
        assert!(runtime.needs_frame());
        runtime.tick(HostTime(2));
        assert_eq!(*log.borrow(), [(1, HostTime(1)), (2, HostTime(2))]);
    }

    #[test]
    fn frame_signal_resolves_after_writes() {
        let runtime = Runtime::new();
        let wrote = Rc::new(Cell::new(false));
        let w = Rc::clone(&wrote);
        let signal = runtime.register_update(ElementId(7), Rc::new(move |_| w.set(true)));
        assert!(!signal.is_resolved());
        runtime.tick(HostTime(99));
        assert!(wrote.get());
        assert_eq!(signal.value(), Some(HostTime(99)));
    }

    #[test]
    fn reset_resolves_outstanding_frame() {
        let runtime = Runtime::new();
        runtime.tick(HostTime(10));
        let signal = runtime.register_update(ElementId(1), Rc::new(|_| {}));
        runtime.reset();
        assert_eq!(signal.value(), Some(HostTime(10)));
        assert!(!runtime.needs_frame());
    }

    #[test]
    fn late_requester_is_invoked_for_pending_work() {
        let runtime = Runtime::new();
        runtime.register_update(ElementId(1), Rc::new(|_| {}));
        let requested = Rc::new(Cell::new(false));
        let r = Rc::clone(&requested);
        runtime.set_frame_requester(move || r.set(true));
        assert!(requested.get());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn frame_events_reach_the_sink() {
        struct Sink(Rc<RefCell<Vec<usize>>>);
        impl TraceSink for Sink {
            fn on_frame_end(&mut self, e: &FrameEndEvent) {
                self.0.borrow_mut().push(e.element_syncs);
            }
        }

        let runtime = Runtime::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        runtime.set_trace_sink(Box::new(Sink(Rc::clone(&seen))));
        runtime.register_update(ElementId(1), Rc::new(|_| {}));
        runtime.tick(HostTime(1));
        runtime.tick(HostTime(2));
        assert_eq!(*seen.borrow(), [1, 0]);
    }
}
