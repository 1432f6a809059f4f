// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tweens and the coordinator that advances them.
//!
//! An [`AnimationTask`] moves a set of numeric fields of one position store
//! from their initial to their destination values. Tasks wait in the
//! coordinator's pending list until the next frame, which fixes their start
//! time and promotes them to the active list. Every following frame samples
//! `easing(elapsed / duration)` and writes `interpolate(from, to, eased)`
//! per field through the store's `set()`. Once the full duration has
//! elapsed the exact destination values are written, the fields are
//! released from the store's animating set, and the task's [`Animation`]
//! handle resolves.
//!
//! Cancellation forces the destination values immediately. A task whose
//! element disconnected is evicted without a final write. Either way the
//! handle resolves; animation futures never fail.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::data::{FieldSet, PositionField, PositionPatch};
use crate::error::PositionError;
use crate::runtime::{Runtime, StoreId};
use crate::signal::Signal;
use crate::time::{Duration, HostTime};
use crate::trace::{AnimationEvent, AnimationPhase};

/// Maps linear progress in `[0, 1]` to eased progress.
pub type EasingFn = fn(f64) -> f64;

/// Interpolates between `from` and `to` at eased progress `t`.
pub type InterpolateFn = fn(f64, f64, f64) -> f64;

/// Easing curves.
pub mod easing {
    /// Constant-rate progress.
    #[must_use]
    pub fn linear(t: f64) -> f64 {
        t
    }
}

/// Standard linear interpolation.
#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Timing and curve settings for an animation.
#[derive(Clone, Copy, Debug)]
pub struct AnimationOptions {
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Easing curve.
    pub easing: EasingFn,
    /// Per-field interpolation.
    pub interpolate: InterpolateFn,
}

impl AnimationOptions {
    /// Default duration in milliseconds.
    pub const DEFAULT_DURATION_MS: f64 = 400.0;

    /// Options with the default duration, linear easing and [`lerp`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration_ms: Self::DEFAULT_DURATION_MS,
            easing: easing::linear,
            interpolate: lerp,
        }
    }

    /// Sets the duration in milliseconds.
    #[must_use]
    pub const fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = ms;
        self
    }

    /// Sets the easing curve.
    #[must_use]
    pub const fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Sets the interpolation function.
    #[must_use]
    pub const fn interpolate(mut self, interpolate: InterpolateFn) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Validates the duration and converts it to frame-clock units.
    pub fn check(&self) -> Result<Duration, PositionError> {
        if self.duration_ms.is_finite() && self.duration_ms >= 0.0 {
            Ok(Duration::from_millis_f64(self.duration_ms))
        } else {
            Err(PositionError::InvalidDuration(self.duration_ms))
        }
    }
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The store-side operations an animation task needs.
pub(crate) trait AnimationTarget {
    /// Writes an intermediate or final frame through the store's `set()`.
    fn apply(&self, patch: &PositionPatch);

    /// Removes `keys` from the store's animating set.
    fn release(&self, keys: FieldSet);

    /// Whether the store's element has disconnected.
    fn is_detached(&self) -> bool;
}

/// One animated field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Track {
    pub(crate) field: PositionField,
    pub(crate) from: f64,
    pub(crate) to: f64,
    /// Written on the final frame; `None` restores the unset sentinel.
    pub(crate) destination: Option<f64>,
}

/// A scheduled tween of one store's fields.
pub(crate) struct AnimationTask {
    id: u64,
    owner: StoreId,
    target: Weak<dyn AnimationTarget>,
    tracks: Vec<Track>,
    keys: FieldSet,
    duration: Duration,
    easing: EasingFn,
    interpolate: InterpolateFn,
    start: Cell<Option<HostTime>>,
    elapsed: Cell<Duration>,
    finished: Cell<bool>,
    done: Signal<()>,
}

/// What a frame did to a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Skipped,
    Advanced,
    Finished,
    Evicted,
}

impl AnimationTask {
    pub(crate) fn new(
        id: u64,
        owner: StoreId,
        target: Weak<dyn AnimationTarget>,
        tracks: Vec<Track>,
        duration: Duration,
        options: &AnimationOptions,
    ) -> Self {
        let keys = tracks.iter().map(|t| t.field).collect();
        Self {
            id,
            owner,
            target,
            tracks,
            keys,
            duration,
            easing: options.easing,
            interpolate: options.interpolate,
            start: Cell::new(None),
            elapsed: Cell::new(Duration::ZERO),
            finished: Cell::new(false),
            done: Signal::new(),
        }
    }

    pub(crate) fn keys(&self) -> FieldSet {
        self.keys
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub(crate) fn event(&self, phase: AnimationPhase, now: Option<HostTime>) -> AnimationEvent {
        AnimationEvent {
            task: self.id,
            store: self.owner,
            phase,
            keys: self.keys,
            now,
        }
    }

    fn patch_at(&self, t: f64) -> PositionPatch {
        let eased = (self.easing)(t);
        let mut patch = PositionPatch::new();
        for track in &self.tracks {
            patch.set_numeric(track.field, Some((self.interpolate)(track.from, track.to, eased)));
        }
        patch
    }

    fn destination(&self) -> PositionPatch {
        let mut patch = PositionPatch::new();
        for track in &self.tracks {
            patch.set_numeric(track.field, track.destination);
        }
        patch
    }

    fn advance(&self, now: HostTime) -> Step {
        if self.finished.get() {
            return Step::Skipped;
        }
        let Some(target) = self.target.upgrade() else {
            self.evict(None);
            return Step::Evicted;
        };
        if target.is_detached() {
            self.evict(Some(&*target));
            return Step::Evicted;
        }
        let start = self.start.get().unwrap_or(now);
        let elapsed = now.saturating_duration_since(start);
        self.elapsed.set(elapsed);
        if elapsed >= self.duration {
            self.finish_with(&*target);
            Step::Finished
        } else {
            target.apply(&self.patch_at(elapsed.fraction_of(self.duration)));
            Step::Advanced
        }
    }

    /// Forces the destination values and resolves. Returns `false` if the
    /// task had already finished.
    pub(crate) fn cancel(&self) -> bool {
        if self.finished.get() {
            return false;
        }
        match self.target.upgrade() {
            Some(target) => self.finish_with(&*target),
            None => self.evict(None),
        }
        true
    }

    fn finish_with(&self, target: &dyn AnimationTarget) {
        self.finished.set(true);
        target.apply(&self.destination());
        target.release(self.keys);
        self.done.resolve(());
    }

    fn evict(&self, target: Option<&dyn AnimationTarget>) {
        self.finished.set(true);
        if let Some(target) = target {
            target.release(self.keys);
        }
        log::debug!("evicted animation {} of {:?}", self.id, self.owner);
        self.done.resolve(());
    }
}

impl fmt::Debug for AnimationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationTask")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("tracks", &self.tracks)
            .field("duration", &self.duration)
            .field("start", &self.start.get())
            .field("elapsed", &self.elapsed.get())
            .field("finished", &self.finished.get())
            .finish_non_exhaustive()
    }
}

/// Counts reported by [`AnimationCoordinator::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Tasks promoted from pending this frame.
    pub started: usize,
    /// Tasks that wrote an intermediate frame.
    pub advanced: usize,
    /// Tasks that reached their destination.
    pub finished: usize,
    /// Tasks dropped because their element disconnected.
    pub evicted: usize,
}

/// Registry of in-flight animation tasks.
///
/// Owned by the [`Runtime`]; advanced once per frame before element syncs
/// are flushed, so intermediate writes land in the same frame's batch.
#[derive(Default)]
pub struct AnimationCoordinator {
    pending: RefCell<Vec<Rc<AnimationTask>>>,
    active: RefCell<Vec<Rc<AnimationTask>>>,
    next_id: Cell<u64>,
}

impl AnimationCoordinator {
    /// Creates an empty coordinator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
            active: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    pub(crate) fn schedule(&self, task: Rc<AnimationTask>) {
        self.pending.borrow_mut().push(task);
    }

    /// Number of pending plus active tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len() + self.active.borrow().len()
    }

    /// Whether no task is pending or active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `store` owns any pending or active task.
    #[must_use]
    pub fn is_animating(&self, store: StoreId) -> bool {
        let owned = |tasks: &Vec<Rc<AnimationTask>>| {
            tasks.iter().any(|t| t.owner == store && !t.is_finished())
        };
        owned(&self.pending.borrow()) || owned(&self.active.borrow())
    }

    /// Promotes pending tasks and advances every active task to `now`.
    ///
    /// `emit` receives one event per lifecycle transition.
    pub fn advance(&self, now: HostTime, emit: &mut dyn FnMut(AnimationEvent)) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        let promoted = core::mem::take(&mut *self.pending.borrow_mut());
        for task in &promoted {
            if !task.is_finished() {
                task.start.set(Some(now));
                report.started += 1;
                emit(task.event(AnimationPhase::Started, Some(now)));
            }
        }
        self.active.borrow_mut().extend(promoted);

        // Stores re-enter the coordinator from `set()` subscribers, so walk a
        // snapshot.
        let snapshot: Vec<Rc<AnimationTask>> = self.active.borrow().clone();
        for task in &snapshot {
            match task.advance(now) {
                Step::Skipped => {}
                Step::Advanced => report.advanced += 1,
                Step::Finished => {
                    report.finished += 1;
                    emit(task.event(AnimationPhase::Finished, Some(now)));
                }
                Step::Evicted => {
                    report.evicted += 1;
                    emit(task.event(AnimationPhase::Evicted, Some(now)));
                }
            }
        }

        self.active.borrow_mut().retain(|t| !t.is_finished());
        report
    }

    /// Forces every task owned by `store` to its destination.
    pub fn cancel_for(&self, store: StoreId, emit: &mut dyn FnMut(AnimationEvent)) -> usize {
        self.cancel_where(|t| t.owner == store, emit)
    }

    /// Forces every task to its destination and empties both lists.
    pub fn cancel_all(&self, emit: &mut dyn FnMut(AnimationEvent)) -> usize {
        self.cancel_where(|_| true, emit)
    }

    fn cancel_where(
        &self,
        matches: impl Fn(&AnimationTask) -> bool,
        emit: &mut dyn FnMut(AnimationEvent),
    ) -> usize {
        let mut selected = Vec::new();
        for list in [&self.pending, &self.active] {
            list.borrow_mut().retain(|t| {
                if matches(t) {
                    selected.push(Rc::clone(t));
                    false
                } else {
                    true
                }
            });
        }
        let mut cancelled = 0;
        for task in selected {
            if task.cancel() {
                cancelled += 1;
                emit(task.event(AnimationPhase::Cancelled, None));
            }
        }
        cancelled
    }
}

impl fmt::Debug for AnimationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationCoordinator")
            .field("pending", &self.pending.borrow().len())
            .field("active", &self.active.borrow().len())
            .finish()
    }
}

/// Handle to a scheduled animation.
///
/// Awaiting it completes when the animation reaches its destination, is
/// cancelled, or is evicted. Dropping the handle does not cancel the
/// animation.
#[derive(Clone)]
pub struct Animation {
    task: Option<Rc<AnimationTask>>,
    done: Signal<()>,
    runtime: Option<Runtime>,
}

impl Animation {
    pub(crate) fn new(task: Rc<AnimationTask>, runtime: Runtime) -> Self {
        Self {
            done: task.done.clone(),
            task: Some(task),
            runtime: Some(runtime),
        }
    }

    /// A handle that is already complete; returned when nothing was left
    /// to animate.
    #[must_use]
    pub fn resolved() -> Self {
        Self {
            task: None,
            done: Signal::resolved(()),
            runtime: None,
        }
    }

    /// Forces the destination values now and resolves the handle.
    pub fn cancel(&self) {
        if let Some(task) = &self.task
            && task.cancel()
            && let Some(runtime) = &self.runtime
        {
            runtime.trace(|t| t.animation(&task.event(AnimationPhase::Cancelled, None)));
        }
    }

    /// Whether the animation has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done.is_resolved()
    }

    /// Returns the shared completion signal.
    #[must_use]
    pub fn finished(&self) -> Signal<()> {
        self.done.clone()
    }

    /// The fields this animation drives; empty for a resolved no-op.
    #[must_use]
    pub fn keys(&self) -> FieldSet {
        self.task.as_ref().map_or(FieldSet::EMPTY, |t| t.keys())
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("task", &self.task.as_ref().map(|t| t.id))
            .field("keys", &self.keys())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Future for Animation {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.done).poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::data::PositionData;

    #[derive(Default)]
    struct Probe {
        data: RefCell<PositionData>,
        writes: Cell<usize>,
        released: Cell<FieldSet>,
        detached: Cell<bool>,
    }

    impl AnimationTarget for Probe {
        fn apply(&self, patch: &PositionPatch) {
            patch.apply_to(&mut self.data.borrow_mut());
            self.writes.set(self.writes.get() + 1);
        }

        fn release(&self, keys: FieldSet) {
            let mut released = self.released.get();
            released.insert_all(keys);
            self.released.set(released);
        }

        fn is_detached(&self) -> bool {
            self.detached.get()
        }
    }

    fn task(probe: &Rc<Probe>, ms: u64, from: f64, to: f64) -> Rc<AnimationTask> {
        let weak: Weak<Probe> = Rc::downgrade(probe);
        Rc::new(AnimationTask::new(
            0,
            StoreId(1),
            weak,
            vec![Track {
                field: PositionField::Left,
                from,
                to,
                destination: Some(to),
            }],
            Duration::from_millis(ms),
            &AnimationOptions::new(),
        ))
    }

    fn no_events() -> impl FnMut(AnimationEvent) {
        |_| {}
    }

    #[test]
    fn options_reject_bad_durations() {
        assert!(AnimationOptions::new().duration(-1.0).check().is_err());
        assert!(AnimationOptions::new().duration(f64::NAN).check().is_err());
        assert_eq!(
            AnimationOptions::new().duration(0.0).check(),
            Ok(Duration::ZERO)
        );
    }

    #[test]
    fn runs_to_exact_destination() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        let t = task(&probe, 100, 0.0, 300.0);
        coordinator.schedule(Rc::clone(&t));

        let mut emit = no_events();
        let r = coordinator.advance(HostTime(1_000), &mut emit);
        assert_eq!(r.started, 1);
        assert_eq!(probe.data.borrow().left, Some(0.0));

        coordinator.advance(HostTime(51_000), &mut emit);
        assert_eq!(probe.data.borrow().left, Some(150.0));

        let r = coordinator.advance(HostTime(101_000), &mut emit);
        assert_eq!(r.finished, 1);
        assert_eq!(probe.data.borrow().left, Some(300.0));
        assert!(probe.released.get().contains(PositionField::Left));
        assert!(t.done.is_resolved());
        assert!(coordinator.is_empty());
    }

    #[test]
    fn zero_duration_finishes_on_first_frame() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        coordinator.schedule(task(&probe, 0, 10.0, 20.0));
        let r = coordinator.advance(HostTime(5), &mut no_events());
        assert_eq!(r.finished, 1);
        assert_eq!(r.advanced, 0);
        assert_eq!(probe.writes.get(), 1);
        assert_eq!(probe.data.borrow().left, Some(20.0));
    }

    #[test]
    fn detached_targets_are_evicted_without_writing() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        let t = task(&probe, 100, 0.0, 50.0);
        coordinator.schedule(Rc::clone(&t));
        probe.detached.set(true);
        let r = coordinator.advance(HostTime(0), &mut no_events());
        assert_eq!(r.evicted, 1);
        assert_eq!(probe.writes.get(), 0);
        assert!(t.done.is_resolved());
        assert!(coordinator.is_empty());
    }

    #[test]
    fn cancel_all_forces_destinations() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        coordinator.schedule(task(&probe, 1_000, 0.0, 80.0));
        let mut phases = Vec::new();
        let n = coordinator.cancel_all(&mut |e| phases.push(e.phase));
        assert_eq!(n, 1);
        assert_eq!(phases, [AnimationPhase::Cancelled]);
        assert_eq!(probe.data.borrow().left, Some(80.0));
        assert!(coordinator.is_empty());
    }

    #[test]
    fn cancel_for_only_touches_owner() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        coordinator.schedule(task(&probe, 1_000, 0.0, 80.0));
        assert!(coordinator.is_animating(StoreId(1)));
        assert_eq!(coordinator.cancel_for(StoreId(2), &mut no_events()), 0);
        assert_eq!(coordinator.len(), 1);
        assert_eq!(coordinator.cancel_for(StoreId(1), &mut no_events()), 1);
        assert!(!coordinator.is_animating(StoreId(1)));
    }

    #[test]
    fn dropped_target_is_evicted() {
        let probe = Rc::new(Probe::default());
        let coordinator = AnimationCoordinator::new();
        coordinator.schedule(task(&probe, 100, 0.0, 80.0));
        drop(probe);
        let r = coordinator.advance(HostTime(0), &mut no_events());
        assert_eq!(r.evicted, 1);
    }
}
