// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Frames become duration slices, element syncs and validator vetoes become
//! instants, and each animation task becomes an async slice from `Started`
//! to its terminal phase. Events without their own timestamp are placed at
//! the time of the frame they were recorded in.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use casement_core::data::FieldSet;
use casement_core::trace::AnimationPhase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are host time in microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut frame_ts = 0_u64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                frame_ts = e.now.0;
                events.push(json!({
                    "ph": "B",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": e.now.0,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "pending_updates": e.pending_updates,
                        "animations": e.animations,
                    }
                }));
            }
            RecordedEvent::FrameEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Frame",
                    "cat": "Frame",
                    "ts": e.now.0,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "element_syncs": e.element_syncs,
                        "animations": e.animations,
                    }
                }));
            }
            RecordedEvent::ElementSync(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ElementSync",
                    "cat": "Sync",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "store": e.store.0,
                        "element": e.element.0,
                        "changes": e.changes,
                    }
                }));
            }
            RecordedEvent::ValidatorVeto(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ValidatorVeto",
                    "cat": "Validation",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "store": e.store.0,
                        "validator": e.index,
                        "fields": field_names(e.fields),
                    }
                }));
            }
            RecordedEvent::Animation(e) => {
                let ph = match e.phase {
                    AnimationPhase::Scheduled => "n",
                    AnimationPhase::Started => "b",
                    AnimationPhase::Finished
                    | AnimationPhase::Cancelled
                    | AnimationPhase::Evicted => "e",
                };
                events.push(json!({
                    "ph": ph,
                    "name": "Animation",
                    "cat": "Animation",
                    "id": e.task,
                    "ts": e.now.map_or(frame_ts, |t| t.0),
                    "pid": 0,
                    "tid": e.store.0,
                    "args": {
                        "phase": format!("{:?}", e.phase),
                        "keys": field_names(e.keys),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn field_names(fields: FieldSet) -> Vec<&'static str> {
    fields.iter().map(|f| f.as_str()).collect()
}
