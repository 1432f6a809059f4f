// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a shared
//! byte buffer as fixed-size little-endian records. Clones share the buffer,
//! so one clone can be installed on a [`Runtime`] while another reads the
//! recording. [`decode`] reads the bytes back as an iterator of
//! [`RecordedEvent`].
//!
//! [`Runtime`]: casement_core::runtime::Runtime

use std::cell::RefCell;
use std::rc::Rc;

use casement_core::data::FieldSet;
use casement_core::host::ElementId;
use casement_core::runtime::StoreId;
use casement_core::time::HostTime;
use casement_core::trace::{
    AnimationEvent, AnimationPhase, ElementSyncEvent, FrameBeginEvent, FrameEndEvent, TraceSink,
    ValidatorVetoEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_FRAME_END: u8 = 2;
const TAG_ELEMENT_SYNC: u8 = 3;
const TAG_VALIDATOR_VETO: u8 = 4;
const TAG_ANIMATION: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Takes the recorded bytes, leaving the buffer empty.
    pub fn take(&self) -> Vec<u8> {
        core::mem::take(&mut *self.buf.borrow_mut())
    }

    /// Number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u16(&self, v: u16) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&self, v: u32) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&self, v: u64) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&self, v: usize) {
        self.write_u32(u32::try_from(v).unwrap_or(u32::MAX));
    }

    fn write_option_u64(&self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_phase(&self, p: AnimationPhase) {
        self.write_u8(match p {
            AnimationPhase::Scheduled => 0,
            AnimationPhase::Started => 1,
            AnimationPhase::Finished => 2,
            AnimationPhase::Cancelled => 3,
            AnimationPhase::Evicted => 4,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.0);
        self.write_count(e.pending_updates);
        self.write_count(e.animations);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.write_u8(TAG_FRAME_END);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.0);
        self.write_count(e.element_syncs);
        self.write_count(e.animations);
    }

    fn on_element_sync(&mut self, e: &ElementSyncEvent) {
        self.write_u8(TAG_ELEMENT_SYNC);
        self.write_u64(e.frame_index);
        self.write_u64(e.store.0);
        self.write_u64(e.element.0);
        self.write_u16(e.changes);
    }

    fn on_validator_veto(&mut self, e: &ValidatorVetoEvent) {
        self.write_u8(TAG_VALIDATOR_VETO);
        self.write_u64(e.store.0);
        self.write_count(e.index);
        self.write_u32(e.fields.bits());
    }

    fn on_animation(&mut self, e: &AnimationEvent) {
        self.write_u8(TAG_ANIMATION);
        self.write_u64(e.task);
        self.write_u64(e.store.0);
        self.write_phase(e.phase);
        self.write_u32(e.keys.bits());
        self.write_option_u64(e.now.map(|t| t.0));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// An [`ElementSyncEvent`].
    ElementSync(ElementSyncEvent),
    /// A [`ValidatorVetoEvent`].
    ValidatorVeto(ValidatorVetoEvent),
    /// An [`AnimationEvent`].
    Animation(AnimationEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32()
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some((present != 0).then_some(val))
    }

    fn read_phase(&mut self) -> Option<AnimationPhase> {
        Some(match self.read_u8()? {
            0 => AnimationPhase::Scheduled,
            1 => AnimationPhase::Started,
            2 => AnimationPhase::Finished,
            3 => AnimationPhase::Cancelled,
            _ => AnimationPhase::Evicted,
        })
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            pending_updates: self.read_count()?,
            animations: self.read_count()?,
        }))
    }

    fn decode_frame_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameEnd(FrameEndEvent {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            element_syncs: self.read_count()?,
            animations: self.read_count()?,
        }))
    }

    fn decode_element_sync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ElementSync(ElementSyncEvent {
            frame_index: self.read_u64()?,
            store: StoreId(self.read_u64()?),
            element: ElementId(self.read_u64()?),
            changes: self.read_u16()?,
        }))
    }

    fn decode_validator_veto(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ValidatorVeto(ValidatorVetoEvent {
            store: StoreId(self.read_u64()?),
            index: self.read_count()?,
            fields: FieldSet::from_bits(self.read_u32()?),
        }))
    }

    fn decode_animation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Animation(AnimationEvent {
            task: self.read_u64()?,
            store: StoreId(self.read_u64()?),
            phase: self.read_phase()?,
            keys: FieldSet::from_bits(self.read_u32()?),
            now: self.read_option_u64()?.map(HostTime),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_FRAME_END => self.decode_frame_end(),
            TAG_ELEMENT_SYNC => self.decode_element_sync(),
            TAG_VALIDATOR_VETO => self.decode_validator_veto(),
            TAG_ANIMATION => self.decode_animation(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
