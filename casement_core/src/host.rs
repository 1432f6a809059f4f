// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for windowing integrations.
//!
//! Casement keeps window geometry in plain data and leaves every
//! platform-specific operation to the host. A host provides two pieces:
//!
//! - **Element**: implements [`Element`] for whatever node carries the
//!   window's inline styles (a DOM `HTMLElement`, a native view, a test
//!   double). The position engine only reads computed style and size from
//!   it and writes a handful of inline style properties.
//!
//! - **Parent**: implements [`Parent`] for the windowed component that owns
//!   a [`PositionStore`](crate::position::PositionStore). It reports whether
//!   the component may be positioned, hands out its current element, and
//!   exposes the minimize/maximize lifecycle used by
//!   [`PositionStore::reset`](crate::position::PositionStore::reset).
//!
//! # Frame loop
//!
//! The host owns the frame clock and wires it to a
//! [`Runtime`](crate::runtime::Runtime):
//!
//! ```rust,ignore
//! runtime.set_frame_requester(move || raf.request());
//!
//! fn on_frame(timestamp_ms: f64) {
//!     // Advance animations, flush element writes, resolve frame futures.
//!     runtime.tick(HostTime::from_millis_f64(timestamp_ms));
//! }
//! ```

use alloc::rc::Rc;
use core::fmt;

use kurbo::Size;

use crate::style::ComputedStyle;

/// Stable identity of a host element.
///
/// The update scheduler coalesces registrations by this id, and the style
/// cache is invalidated when it changes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// A box axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal (width).
    Horizontal,
    /// Vertical (height).
    Vertical,
}

/// An inline style property written by the element sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// `left`.
    Left,
    /// `top`.
    Top,
    /// `width`.
    Width,
    /// `height`.
    Height,
    /// `z-index`.
    ZIndex,
    /// `transform`.
    Transform,
    /// `transform-origin`.
    TransformOrigin,
}

impl StyleProperty {
    /// Returns the CSS property name.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::ZIndex => "z-index",
            Self::Transform => "transform",
            Self::TransformOrigin => "transform-origin",
        }
    }
}

/// The node a window's styles are written to.
///
/// Methods take `&self`; hosts whose handles need mutation use interior
/// mutability, as DOM handles already do.
pub trait Element {
    /// Returns the element's identity.
    fn id(&self) -> ElementId;

    /// Whether the element is still attached to its document.
    fn is_connected(&self) -> bool;

    /// Reads the element's computed style.
    fn computed_style(&self) -> ComputedStyle;

    /// Returns the element's laid-out border-box size.
    fn offset_size(&self) -> Size;

    /// Whether an inline size is currently set for `axis`.
    fn has_inline_size(&self, axis: Axis) -> bool;

    /// Sets an inline style property.
    fn set_style(&self, property: StyleProperty, value: &str);

    /// Removes an inline style property.
    fn remove_style(&self, property: StyleProperty);
}

/// The windowed component that owns a position store.
pub trait Parent {
    /// Whether the component may be positioned at all. When `false` every
    /// [`PositionStore::set`](crate::position::PositionStore::set) is a no-op.
    fn is_positionable(&self) -> bool {
        true
    }

    /// Returns the element styles are written to, if mounted.
    fn element_target(&self) -> Option<Rc<dyn Element>>;

    /// Whether the component is currently minimized.
    fn is_minimized(&self) -> bool {
        false
    }

    /// Restores a minimized component without animating.
    fn maximize_instant(&self) {}

    /// Returns the size of the area the window is positioned within.
    fn container_size(&self) -> Size;
}
