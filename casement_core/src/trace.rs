// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Runtime`](crate::runtime::Runtime) and position stores call at each
//! stage of a frame. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use crate::data::FieldSet;
use crate::host::ElementId;
use crate::runtime::StoreId;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle stage of an animation task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationPhase {
    /// Handed to the coordinator; waits for the next frame.
    Scheduled,
    /// Promoted to the active list; its start time is fixed.
    Started,
    /// Reached its destination after the full duration.
    Finished,
    /// Forced to its destination early.
    Cancelled,
    /// Dropped because its element disconnected or its store went away.
    Evicted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of [`Runtime::tick`](crate::runtime::Runtime::tick).
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host time of the frame.
    pub now: HostTime,
    /// Distinct elements waiting for a style sync.
    pub pending_updates: usize,
    /// Pending plus active animation tasks.
    pub animations: usize,
}

/// Emitted at the end of [`Runtime::tick`](crate::runtime::Runtime::tick).
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time of the frame.
    pub now: HostTime,
    /// Number of element sync callbacks invoked.
    pub element_syncs: usize,
    /// Animation tasks still in flight.
    pub animations: usize,
}

/// Emitted when a store writes inline styles to its element.
#[derive(Clone, Copy, Debug)]
pub struct ElementSyncEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which store synced.
    pub store: StoreId,
    /// Which element was written.
    pub element: ElementId,
    /// [`ChangeSet::bits`](crate::changes::ChangeSet::bits) of the written fields.
    pub changes: u16,
}

/// Emitted when a validator vetoes an update.
#[derive(Clone, Copy, Debug)]
pub struct ValidatorVetoEvent {
    /// Which store rejected the update.
    pub store: StoreId,
    /// Position of the vetoing validator in weight order.
    pub index: usize,
    /// Fields the rejected patch touched.
    pub fields: FieldSet,
}

/// Emitted at each animation lifecycle transition.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEvent {
    /// Task identifier, unique within a runtime.
    pub task: u64,
    /// Owning store.
    pub store: StoreId,
    /// What happened.
    pub phase: AnimationPhase,
    /// Fields the task animates.
    pub keys: FieldSet,
    /// Frame time, when the transition happened inside a tick.
    pub now: Option<HostTime>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame begins.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a frame ends.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called after a store writes styles to its element.
    fn on_element_sync(&mut self, e: &ElementSyncEvent) {
        _ = e;
    }

    /// Called when a validator vetoes an update.
    fn on_validator_veto(&mut self, e: &ValidatorVetoEvent) {
        _ = e;
    }

    /// Called at each animation lifecycle transition.
    fn on_animation(&mut self, e: &AnimationEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! tracer_methods {
    ($($(#[$doc:meta])* $name:ident($ty:ty) => $hook:ident;)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$hook(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    tracer_methods! {
        /// Emits a [`FrameBeginEvent`].
        frame_begin(FrameBeginEvent) => on_frame_begin;
        /// Emits a [`FrameEndEvent`].
        frame_end(FrameEndEvent) => on_frame_end;
        /// Emits an [`ElementSyncEvent`].
        element_sync(ElementSyncEvent) => on_element_sync;
        /// Emits a [`ValidatorVetoEvent`].
        validator_veto(ValidatorVetoEvent) => on_validator_veto;
        /// Emits an [`AnimationEvent`].
        animation(AnimationEvent) => on_animation;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
