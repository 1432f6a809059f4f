// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for malformed calls into the position engine.
//!
//! Validator vetoes, non-positionable parents and fields that are already
//! animating are policy outcomes, not errors; they never surface here.

use crate::data::PositionField;

/// A malformed argument passed to a [`PositionStore`](crate::position::PositionStore)
/// or [`ValidatorPipeline`](crate::validators::ValidatorPipeline) operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PositionError {
    /// A numeric field was `NaN` or infinite.
    #[error("`{field}` must be finite, got {value}")]
    NonFinite {
        /// The offending field.
        field: PositionField,
        /// The rejected value.
        value: f64,
    },
    /// An animation duration was negative or not finite.
    #[error("animation duration must be a non-negative finite number of milliseconds, got {0}")]
    InvalidDuration(f64),
    /// A validator weight was outside `[0, 1]`.
    #[error("validator weight must lie in [0, 1], got {0}")]
    InvalidWeight(f32),
    /// A snapshot name was empty.
    #[error("snapshot name must not be empty")]
    EmptySnapshotName,
}
