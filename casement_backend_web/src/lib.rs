// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for casement.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: on-demand `requestAnimationFrame` driver for a [`Runtime`]
//! - [`DomElement`]: [`Element`] over an `HtmlElement`'s inline style
//! - [`DomParent`]: a plain [`Parent`] for a window inside a container
//!
//! [`Runtime`]: casement_core::runtime::Runtime
//! [`Element`]: casement_core::host::Element
//! [`Parent`]: casement_core::host::Parent

#![no_std]

extern crate alloc;

mod dom;
mod raf;

pub use dom::{DomElement, DomParent};
pub use raf::RafLoop;

use casement_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks, on the same clock as
/// the timestamps `requestAnimationFrame` passes to [`RafLoop`].
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}
