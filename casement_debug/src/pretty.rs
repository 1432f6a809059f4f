// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds.

use std::io::Write;

use casement_core::data::FieldSet;
use casement_core::time::HostTime;
use casement_core::trace::{
    AnimationEvent, AnimationPhase, ElementSyncEvent, FrameBeginEvent, FrameEndEvent, TraceSink,
    ValidatorVetoEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.as_millis_f64()
}

fn phase_name(phase: AnimationPhase) -> &'static str {
    match phase {
        AnimationPhase::Scheduled => "scheduled",
        AnimationPhase::Started => "started",
        AnimationPhase::Finished => "finished",
        AnimationPhase::Cancelled => "cancelled",
        AnimationPhase::Evicted => "evicted",
    }
}

fn field_list(fields: FieldSet) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} now={:.3}ms updates={} animations={}",
            e.frame_index,
            ms(e.now),
            e.pending_updates,
            e.animations,
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} now={:.3}ms syncs={} animations={}",
            e.frame_index,
            ms(e.now),
            e.element_syncs,
            e.animations,
        );
    }

    fn on_element_sync(&mut self, e: &ElementSyncEvent) {
        let _ = writeln!(
            self.writer,
            "[sync] frame={} store={} element={} changes={:#06x}",
            e.frame_index, e.store.0, e.element.0, e.changes,
        );
    }

    fn on_validator_veto(&mut self, e: &ValidatorVetoEvent) {
        let _ = writeln!(
            self.writer,
            "[veto] store={} validator={} fields={}",
            e.store.0,
            e.index,
            field_list(e.fields),
        );
    }

    fn on_animation(&mut self, e: &AnimationEvent) {
        let at = e.now.map_or_else(String::new, |t| format!(" at {:.3}ms", ms(t)));
        let _ = writeln!(
            self.writer,
            "[anim:{}] task={} store={} keys={}{at}",
            phase_name(e.phase),
            e.task,
            e.store.0,
            field_list(e.keys),
        );
    }
}
