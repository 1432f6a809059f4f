// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-field dirty flags for the most recent update.
//!
//! Every rotation, scale and translation component shares the single
//! `transform` flag because they are written as one composed style.

use core::fmt;

use crate::data::PositionField;

/// Which style-level properties changed since the last element sync.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// `left` changed.
    pub left: bool,
    /// `top` changed.
    pub top: bool,
    /// `width` changed.
    pub width: bool,
    /// `height` changed.
    pub height: bool,
    /// `max_width` changed.
    pub max_width: bool,
    /// `max_height` changed.
    pub max_height: bool,
    /// `min_width` changed.
    pub min_width: bool,
    /// `min_height` changed.
    pub min_height: bool,
    /// `z_index` changed.
    pub z_index: bool,
    /// Any composed transform component changed.
    pub transform: bool,
    /// `transform_origin` changed.
    pub transform_origin: bool,
}

impl ChangeSet {
    /// Creates a set with every flag cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: false,
            top: false,
            width: false,
            height: false,
            max_width: false,
            max_height: false,
            min_width: false,
            min_height: false,
            z_index: false,
            transform: false,
            transform_origin: false,
        }
    }

    /// Flags the style property that `field` maps onto.
    ///
    /// In orthographic mode `left` and `top` are folded into the transform,
    /// so they also flag `transform`.
    pub fn mark(&mut self, field: PositionField, ortho: bool) {
        match field {
            PositionField::Left => {
                self.left = true;
                self.transform |= ortho;
            }
            PositionField::Top => {
                self.top = true;
                self.transform |= ortho;
            }
            PositionField::Width => self.width = true,
            PositionField::Height => self.height = true,
            PositionField::MaxWidth => self.max_width = true,
            PositionField::MaxHeight => self.max_height = true,
            PositionField::MinWidth => self.min_width = true,
            PositionField::MinHeight => self.min_height = true,
            PositionField::ZIndex => self.z_index = true,
            PositionField::TransformOrigin => self.transform_origin = true,
            PositionField::RotateX
            | PositionField::RotateY
            | PositionField::RotateZ
            | PositionField::Scale
            | PositionField::TranslateX
            | PositionField::TranslateY
            | PositionField::TranslateZ => self.transform = true,
        }
    }

    /// Whether any flag is set.
    #[must_use]
    pub const fn has_change(&self) -> bool {
        self.bits() != 0
    }

    /// Whether width or height changed.
    #[must_use]
    pub const fn dimension_changed(&self) -> bool {
        self.width || self.height
    }

    /// Clears every flag.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Packs the flags into a bitmask, `left` in bit 0 through
    /// `transform_origin` in bit 10. Used by trace events.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        (self.left as u16)
            | (self.top as u16) << 1
            | (self.width as u16) << 2
            | (self.height as u16) << 3
            | (self.max_width as u16) << 4
            | (self.max_height as u16) << 5
            | (self.min_width as u16) << 6
            | (self.min_height as u16) << 7
            | (self.z_index as u16) << 8
            | (self.transform as u16) << 9
            | (self.transform_origin as u16) << 10
    }
}

impl fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 11] = [
            "left",
            "top",
            "width",
            "height",
            "maxWidth",
            "maxHeight",
            "minWidth",
            "minHeight",
            "zIndex",
            "transform",
            "transformOrigin",
        ];
        let bits = self.bits();
        f.debug_set()
            .entries(
                NAMES
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| bits & (1 << i) != 0)
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_components_share_one_flag() {
        let mut changes = ChangeSet::new();
        changes.mark(PositionField::RotateZ, false);
        changes.mark(PositionField::Scale, false);
        assert!(changes.transform);
        assert_eq!(changes.bits(), 1 << 9);
    }

    #[test]
    fn ortho_folds_position_into_transform() {
        let mut changes = ChangeSet::new();
        changes.mark(PositionField::Left, false);
        assert!(changes.left);
        assert!(!changes.transform);

        changes.mark(PositionField::Top, true);
        assert!(changes.top);
        assert!(changes.transform);
    }

    #[test]
    fn reset_clears_everything() {
        let mut changes = ChangeSet::new();
        changes.mark(PositionField::ZIndex, false);
        changes.mark(PositionField::Width, false);
        assert!(changes.has_change());
        assert!(changes.dimension_changed());
        changes.reset();
        assert!(!changes.has_change());
        assert_eq!(changes, ChangeSet::default());
    }
}
