// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in validators that keep a window inside its container.

use kurbo::Size;

use super::{ValidationContext, Validator};
use crate::data::{Dimension, PositionData};

/// Keeps the untransformed box inside the container.
///
/// Pixel sizes are clamped into the resolved min/max range (and, with
/// `constrain`, to the container), then `left`/`top` are clamped so the box
/// plus its margins stays visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicBounds {
    /// Also shrink pixel sizes that exceed the container.
    pub constrain: bool,
}

impl BasicBounds {
    /// A validator that constrains sizes to the container.
    #[must_use]
    pub const fn new() -> Self {
        Self { constrain: true }
    }
}

impl Default for BasicBounds {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_axis(value: f64, extent: f64, container: f64, margin: f64) -> f64 {
    let max = (container - extent - margin).max(0.0);
    value.clamp(0.0, max)
}

impl Validator for BasicBounds {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Option<PositionData> {
        let mut position = ctx.position.clone();
        let container = ctx.container;

        let mut width = ctx.clamped_width();
        let mut height = ctx.clamped_height();
        if self.constrain {
            width = width.min((container.width - ctx.style.margin_x()).max(0.0));
            height = height.min((container.height - ctx.style.margin_y()).max(0.0));
        }
        if let Some(Dimension::Px(_)) = position.width {
            position.width = Some(Dimension::Px(width));
        }
        if let Some(Dimension::Px(_)) = position.height {
            position.height = Some(Dimension::Px(height));
        }

        position.left = position
            .left
            .map(|l| clamp_axis(l, width, container.width, ctx.style.margin_x()));
        position.top = position
            .top
            .map(|t| clamp_axis(t, height, container.height, ctx.style.margin_y()));
        Some(position)
    }
}

/// Keeps the transformed bounding rectangle inside the container.
///
/// Rotation and scale are left alone; only `left`/`top` move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformBounds;

/// Offset that moves the span `[min, max]` into `[0, limit]`, aligning to
/// the start when it does not fit.
fn shift_into(min: f64, max: f64, limit: f64) -> f64 {
    if min < 0.0 || max - min > limit {
        -min
    } else if max > limit {
        limit - max
    } else {
        0.0
    }
}

impl Validator for TransformBounds {
    fn validate(&self, ctx: &ValidationContext<'_>) -> Option<PositionData> {
        let mut position = ctx.position.clone();
        let size = Size::new(ctx.clamped_width(), ctx.clamped_height());
        let bounds = ctx.transforms.compute(&position, size).bounds;

        let dx = shift_into(bounds.x0, bounds.x1, ctx.container.width);
        let dy = shift_into(bounds.y0, bounds.y1, ctx.container.height);
        if let Some(left) = position.left.as_mut() {
            *left += dx;
        }
        if let Some(top) = position.top.as_mut() {
            *top += dy;
        }
        Some(position)
    }
}
