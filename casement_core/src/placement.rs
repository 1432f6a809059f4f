// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default offsets for windows whose `left`/`top` are still unset.

use core::fmt::Debug;

use kurbo::{Point, Size};

/// Chooses where a window of `size` first appears inside `container`.
pub trait InitialPlacement: Debug {
    /// Returns the default top-left corner.
    fn place(&self, container: Size, size: Size) -> Point;
}

/// Centers the window, never placing it above or left of the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Centered;

impl InitialPlacement for Centered {
    fn place(&self, container: Size, size: Size) -> Point {
        Point::new(
            ((container.width - size.width) / 2.0).max(0.0),
            ((container.height - size.height) / 2.0).max(0.0),
        )
    }
}
