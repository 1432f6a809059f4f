// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical position data and partial updates.
//!
//! [`PositionData`] is the single source of truth for a window's geometry and
//! transform. [`PositionPatch`] is a partial update: every field is either
//! absent (leave alone), `Some(None)` (reset to the "unset" sentinel), or
//! `Some(Some(value))`.
//!
//! # Invariants
//!
//! After [`PositionData::normalize`] every numeric field is finite or unset,
//! `left`/`top`/`width`/`height` hold whole pixels, and `scale` lies in
//! [`SCALE_RANGE`].

use core::fmt;
use core::ops::RangeInclusive;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::PositionError;

/// Allowed range for [`PositionData::scale`].
pub const SCALE_RANGE: RangeInclusive<f64> = 0.0..=1000.0;

/// Identifies one field of [`PositionData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PositionField {
    /// Left offset in pixels.
    Left,
    /// Top offset in pixels.
    Top,
    /// Width in pixels or `auto`.
    Width,
    /// Height in pixels or `auto`.
    Height,
    /// Maximum width constraint.
    MaxWidth,
    /// Maximum height constraint.
    MaxHeight,
    /// Minimum width constraint.
    MinWidth,
    /// Minimum height constraint.
    MinHeight,
    /// Rotation around the X axis, in degrees.
    RotateX,
    /// Rotation around the Y axis, in degrees.
    RotateY,
    /// Rotation around the Z axis, in degrees.
    RotateZ,
    /// Uniform scale.
    Scale,
    /// Translation along X, in pixels.
    TranslateX,
    /// Translation along Y, in pixels.
    TranslateY,
    /// Translation along Z, in pixels.
    TranslateZ,
    /// Transform origin keyword.
    TransformOrigin,
    /// Stacking order.
    ZIndex,
}

impl PositionField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Left,
        Self::Top,
        Self::Width,
        Self::Height,
        Self::MaxWidth,
        Self::MaxHeight,
        Self::MinWidth,
        Self::MinHeight,
        Self::RotateX,
        Self::RotateY,
        Self::RotateZ,
        Self::Scale,
        Self::TranslateX,
        Self::TranslateY,
        Self::TranslateZ,
        Self::TransformOrigin,
        Self::ZIndex,
    ];

    /// Returns the camel-case name used by CSS-facing hosts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::MaxWidth => "maxWidth",
            Self::MaxHeight => "maxHeight",
            Self::MinWidth => "minWidth",
            Self::MinHeight => "minHeight",
            Self::RotateX => "rotateX",
            Self::RotateY => "rotateY",
            Self::RotateZ => "rotateZ",
            Self::Scale => "scale",
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::TranslateZ => "translateZ",
            Self::TransformOrigin => "transformOrigin",
            Self::ZIndex => "zIndex",
        }
    }

    /// Whether the field is one of the composed transform components.
    #[must_use]
    pub const fn is_transform(self) -> bool {
        matches!(
            self,
            Self::RotateX
                | Self::RotateY
                | Self::RotateZ
                | Self::Scale
                | Self::TranslateX
                | Self::TranslateY
                | Self::TranslateZ
        )
    }

    /// The value an unset transform component behaves as: `1` for scale,
    /// `0` for rotations and translations, `None` for everything else.
    #[must_use]
    pub const fn neutral(self) -> Option<f64> {
        match self {
            Self::Scale => Some(1.0),
            Self::RotateX
            | Self::RotateY
            | Self::RotateZ
            | Self::TranslateX
            | Self::TranslateY
            | Self::TranslateZ => Some(0.0),
            _ => None,
        }
    }

    /// Whether the field can be tweened by the animation coordinator.
    #[must_use]
    pub const fn is_animatable(self) -> bool {
        !matches!(self, Self::TransformOrigin)
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for PositionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compact set of [`PositionField`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldSet(u32);

impl FieldSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set from a slice of fields.
    #[must_use]
    pub fn from_fields(fields: &[PositionField]) -> Self {
        let mut set = Self::EMPTY;
        for &field in fields {
            set.insert(field);
        }
        set
    }

    /// Returns the raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Creates a set from raw bits, dropping bits that name no field.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & ((1 << PositionField::ALL.len()) - 1))
    }

    /// Adds `field` to the set.
    pub fn insert(&mut self, field: PositionField) {
        self.0 |= field.bit();
    }

    /// Removes `field` from the set.
    pub fn remove(&mut self, field: PositionField) {
        self.0 &= !field.bit();
    }

    /// Removes every field of `other` from the set.
    pub fn remove_all(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Adds every field of `other` to the set.
    pub fn insert_all(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Whether `field` is in the set.
    #[must_use]
    pub const fn contains(self, field: PositionField) -> bool {
        self.0 & field.bit() != 0
    }

    /// Whether the two sets share any field.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of fields in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the fields in declaration order.
    pub fn iter(self) -> impl Iterator<Item = PositionField> {
        PositionField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<PositionField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = PositionField>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for field in iter {
            set.insert(field);
        }
        set
    }
}

/// A width or height value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Dimension {
    /// An explicit size in pixels.
    Px(f64),
    /// Derive the size from the element's natural box.
    Auto,
}

impl Dimension {
    /// Returns the pixel value, if explicit.
    #[must_use]
    pub const fn px(self) -> Option<f64> {
        match self {
            Self::Px(v) => Some(v),
            Self::Auto => None,
        }
    }
}

/// Where rotation and scale are anchored on the element box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformOrigin {
    /// `top left` (the default).
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "top left"))]
    TopLeft,
    /// `top center`.
    #[cfg_attr(feature = "serde", serde(rename = "top center"))]
    TopCenter,
    /// `top right`.
    #[cfg_attr(feature = "serde", serde(rename = "top right"))]
    TopRight,
    /// `center left`.
    #[cfg_attr(feature = "serde", serde(rename = "center left"))]
    CenterLeft,
    /// `center`, the CSS default.
    #[cfg_attr(feature = "serde", serde(rename = "center"))]
    Center,
    /// `center right`.
    #[cfg_attr(feature = "serde", serde(rename = "center right"))]
    CenterRight,
    /// `bottom left`.
    #[cfg_attr(feature = "serde", serde(rename = "bottom left"))]
    BottomLeft,
    /// `bottom center`.
    #[cfg_attr(feature = "serde", serde(rename = "bottom center"))]
    BottomCenter,
    /// `bottom right`.
    #[cfg_attr(feature = "serde", serde(rename = "bottom right"))]
    BottomRight,
}

impl TransformOrigin {
    /// Every origin keyword.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Returns the CSS keyword pair.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::TopLeft => "top left",
            Self::TopCenter => "top center",
            Self::TopRight => "top right",
            Self::CenterLeft => "center left",
            Self::Center => "center",
            Self::CenterRight => "center right",
            Self::BottomLeft => "bottom left",
            Self::BottomCenter => "bottom center",
            Self::BottomRight => "bottom right",
        }
    }

    /// Parses a CSS keyword pair.
    #[must_use]
    pub fn from_css(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|origin| origin.as_css() == value)
    }

    /// Returns the origin as fractions `(x, y)` of the element box.
    #[must_use]
    pub const fn fractions(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }
}

/// Canonical per-window geometry and transform state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PositionData {
    /// Left offset in pixels; `None` until measured or placed.
    pub left: Option<f64>,
    /// Top offset in pixels; `None` until measured or placed.
    pub top: Option<f64>,
    /// Width; `None` leaves the inline style untouched.
    pub width: Option<Dimension>,
    /// Height; `None` leaves the inline style untouched.
    pub height: Option<Dimension>,
    /// Maximum width; `None` derives it from computed style or the container.
    pub max_width: Option<f64>,
    /// Maximum height; `None` derives it from computed style or the container.
    pub max_height: Option<f64>,
    /// Minimum width; `None` derives it from computed style.
    pub min_width: Option<f64>,
    /// Minimum height; `None` derives it from computed style.
    pub min_height: Option<f64>,
    /// Rotation around X in degrees; `None` omits it from the transform.
    pub rotate_x: Option<f64>,
    /// Rotation around Y in degrees; `None` omits it from the transform.
    pub rotate_y: Option<f64>,
    /// Rotation around Z in degrees; `None` omits it from the transform.
    pub rotate_z: Option<f64>,
    /// Uniform scale within [`SCALE_RANGE`].
    pub scale: Option<f64>,
    /// Translation along X in pixels.
    pub translate_x: Option<f64>,
    /// Translation along Y in pixels.
    pub translate_y: Option<f64>,
    /// Translation along Z in pixels.
    pub translate_z: Option<f64>,
    /// Transform origin.
    pub transform_origin: TransformOrigin,
    /// Stacking order.
    pub z_index: Option<i32>,
}

impl PositionData {
    /// Returns the numeric value of `field`, if it has one.
    ///
    /// `auto` sizes and [`PositionField::TransformOrigin`] have no numeric
    /// value.
    #[must_use]
    pub fn numeric(&self, field: PositionField) -> Option<f64> {
        match field {
            PositionField::Left => self.left,
            PositionField::Top => self.top,
            PositionField::Width => self.width.and_then(Dimension::px),
            PositionField::Height => self.height.and_then(Dimension::px),
            PositionField::MaxWidth => self.max_width,
            PositionField::MaxHeight => self.max_height,
            PositionField::MinWidth => self.min_width,
            PositionField::MinHeight => self.min_height,
            PositionField::RotateX => self.rotate_x,
            PositionField::RotateY => self.rotate_y,
            PositionField::RotateZ => self.rotate_z,
            PositionField::Scale => self.scale,
            PositionField::TranslateX => self.translate_x,
            PositionField::TranslateY => self.translate_y,
            PositionField::TranslateZ => self.translate_z,
            PositionField::TransformOrigin => None,
            PositionField::ZIndex => self.z_index.map(f64::from),
        }
    }

    /// Like [`numeric`](Self::numeric), but unset transform components read
    /// as their neutral value so they can be interpolated.
    #[must_use]
    pub fn numeric_or_neutral(&self, field: PositionField) -> Option<f64> {
        self.numeric(field).or(field.neutral())
    }

    /// Rounds and clamps every field into its valid domain.
    ///
    /// Non-finite values are replaced by the corresponding value from
    /// `fallback`, so a misbehaving validator cannot leak `NaN` into
    /// canonical state.
    pub fn normalize(&mut self, fallback: &Self) {
        fn finite_or(value: Option<f64>, fallback: Option<f64>) -> Option<f64> {
            match value {
                Some(v) if !v.is_finite() => fallback,
                other => other,
            }
        }
        fn dimension(value: Option<Dimension>, fallback: Option<Dimension>) -> Option<Dimension> {
            match value {
                Some(Dimension::Px(v)) if v.is_finite() => Some(Dimension::Px(v.round())),
                Some(Dimension::Px(_)) => fallback,
                other => other,
            }
        }

        self.left = finite_or(self.left, fallback.left).map(|v| v.round());
        self.top = finite_or(self.top, fallback.top).map(|v| v.round());
        self.width = dimension(self.width, fallback.width);
        self.height = dimension(self.height, fallback.height);
        self.max_width = finite_or(self.max_width, fallback.max_width);
        self.max_height = finite_or(self.max_height, fallback.max_height);
        self.min_width = finite_or(self.min_width, fallback.min_width);
        self.min_height = finite_or(self.min_height, fallback.min_height);
        self.rotate_x = finite_or(self.rotate_x, fallback.rotate_x);
        self.rotate_y = finite_or(self.rotate_y, fallback.rotate_y);
        self.rotate_z = finite_or(self.rotate_z, fallback.rotate_z);
        self.scale = finite_or(self.scale, fallback.scale)
            .map(|s| s.clamp(*SCALE_RANGE.start(), *SCALE_RANGE.end()));
        self.translate_x = finite_or(self.translate_x, fallback.translate_x);
        self.translate_y = finite_or(self.translate_y, fallback.translate_y);
        self.translate_z = finite_or(self.translate_z, fallback.translate_z);
    }

    /// Returns a patch that writes every field of `self`.
    #[must_use]
    pub fn to_patch(&self) -> PositionPatch {
        self.to_patch_filtered(FieldSet::from_fields(&PositionField::ALL))
    }

    /// Returns a patch that writes only the fields in `fields`.
    #[must_use]
    pub fn to_patch_filtered(&self, fields: FieldSet) -> PositionPatch {
        let mut patch = PositionPatch::new();
        for field in fields.iter() {
            match field {
                PositionField::Width => patch.width = Some(self.width),
                PositionField::Height => patch.height = Some(self.height),
                PositionField::TransformOrigin => {
                    patch.transform_origin = Some(self.transform_origin);
                }
                PositionField::ZIndex => patch.z_index = Some(self.z_index),
                other => patch.set_numeric(other, self.numeric(other)),
            }
        }
        patch
    }
}

/// A partial update to [`PositionData`].
///
/// Build one with the chained setters:
///
/// ```
/// use casement_core::data::PositionPatch;
///
/// let patch = PositionPatch::new().left(150.0).top(40.0).rotate_z(None);
/// assert!(!patch.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionPatch {
    pub(crate) left: Option<Option<f64>>,
    pub(crate) top: Option<Option<f64>>,
    pub(crate) width: Option<Option<Dimension>>,
    pub(crate) height: Option<Option<Dimension>>,
    pub(crate) max_width: Option<Option<f64>>,
    pub(crate) max_height: Option<Option<f64>>,
    pub(crate) min_width: Option<Option<f64>>,
    pub(crate) min_height: Option<Option<f64>>,
    pub(crate) rotate_x: Option<Option<f64>>,
    pub(crate) rotate_y: Option<Option<f64>>,
    pub(crate) rotate_z: Option<Option<f64>>,
    pub(crate) scale: Option<Option<f64>>,
    pub(crate) translate_x: Option<Option<f64>>,
    pub(crate) translate_y: Option<Option<f64>>,
    pub(crate) translate_z: Option<Option<f64>>,
    pub(crate) transform_origin: Option<TransformOrigin>,
    pub(crate) z_index: Option<Option<i32>>,
}

macro_rules! numeric_setters {
    ($($(#[$doc:meta])* $name:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(mut self, value: impl Into<Option<f64>>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl PositionPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    numeric_setters! {
        /// Sets `left`; `None` unsets it.
        left;
        /// Sets `top`; `None` unsets it.
        top;
        /// Sets `max_width`; `None` derives it again.
        max_width;
        /// Sets `max_height`; `None` derives it again.
        max_height;
        /// Sets `min_width`; `None` derives it again.
        min_width;
        /// Sets `min_height`; `None` derives it again.
        min_height;
        /// Sets `rotate_x` in degrees; `None` removes it from the transform.
        rotate_x;
        /// Sets `rotate_y` in degrees; `None` removes it from the transform.
        rotate_y;
        /// Sets `rotate_z` in degrees; `None` removes it from the transform.
        rotate_z;
        /// Sets `scale`; `None` removes it from the transform.
        scale;
        /// Sets `translate_x`; `None` removes it from the transform.
        translate_x;
        /// Sets `translate_y`; `None` removes it from the transform.
        translate_y;
        /// Sets `translate_z`; `None` removes it from the transform.
        translate_z;
    }

    /// Sets an explicit pixel width.
    #[must_use]
    pub fn width(mut self, px: f64) -> Self {
        self.width = Some(Some(Dimension::Px(px)));
        self
    }

    /// Sets an explicit pixel height.
    #[must_use]
    pub fn height(mut self, px: f64) -> Self {
        self.height = Some(Some(Dimension::Px(px)));
        self
    }

    /// Sets the width to any [`Dimension`] or unsets it.
    #[must_use]
    pub fn width_dimension(mut self, value: Option<Dimension>) -> Self {
        self.width = Some(value);
        self
    }

    /// Sets the height to any [`Dimension`] or unsets it.
    #[must_use]
    pub fn height_dimension(mut self, value: Option<Dimension>) -> Self {
        self.height = Some(value);
        self
    }

    /// Sets the transform origin.
    #[must_use]
    pub fn transform_origin(mut self, origin: TransformOrigin) -> Self {
        self.transform_origin = Some(origin);
        self
    }

    /// Sets the z-index; `None` unsets it.
    #[must_use]
    pub fn z_index(mut self, value: impl Into<Option<i32>>) -> Self {
        self.z_index = Some(value.into());
        self
    }

    /// Whether the patch touches no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Returns the set of fields the patch touches.
    #[must_use]
    pub fn fields(&self) -> FieldSet {
        let mut set = FieldSet::EMPTY;
        for field in PositionField::ALL {
            let present = match field {
                PositionField::Width => self.width.is_some(),
                PositionField::Height => self.height.is_some(),
                PositionField::TransformOrigin => self.transform_origin.is_some(),
                PositionField::ZIndex => self.z_index.is_some(),
                other => self.numeric_slot(other).is_some(),
            };
            if present {
                set.insert(field);
            }
        }
        set
    }

    /// Returns the numeric value the patch writes to `field`.
    ///
    /// The outer `Option` is `None` when the patch does not touch the field;
    /// the inner one is `None` when the patch unsets it (or sets `auto`).
    #[must_use]
    pub fn numeric(&self, field: PositionField) -> Option<Option<f64>> {
        match field {
            PositionField::Width => self.width.map(|w| w.and_then(Dimension::px)),
            PositionField::Height => self.height.map(|h| h.and_then(Dimension::px)),
            PositionField::TransformOrigin => None,
            PositionField::ZIndex => self.z_index.map(|z| z.map(f64::from)),
            other => *self.numeric_slot(other),
        }
    }

    /// Writes a numeric value for `field`.
    ///
    /// Widths and heights become [`Dimension::Px`]; z-index values are
    /// rounded. [`PositionField::TransformOrigin`] is ignored.
    pub fn set_numeric(&mut self, field: PositionField, value: Option<f64>) {
        match field {
            PositionField::Width => self.width = Some(value.map(Dimension::Px)),
            PositionField::Height => self.height = Some(value.map(Dimension::Px)),
            PositionField::TransformOrigin => {}
            PositionField::ZIndex => self.z_index = Some(value.map(round_z_index)),
            other => {
                if let Some(slot) = self.numeric_slot_mut(other) {
                    *slot = Some(value);
                }
            }
        }
    }

    /// Fails with [`PositionError::NonFinite`] on the first non-finite value.
    pub fn check(&self) -> Result<(), PositionError> {
        for field in self.fields().iter() {
            if let Some(Some(value)) = self.numeric(field)
                && !value.is_finite()
            {
                return Err(PositionError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Writes every present field into `data`.
    pub fn apply_to(&self, data: &mut PositionData) {
        if let Some(v) = self.width {
            data.width = v;
        }
        if let Some(v) = self.height {
            data.height = v;
        }
        if let Some(v) = self.transform_origin {
            data.transform_origin = v;
        }
        if let Some(v) = self.z_index {
            data.z_index = v;
        }
        let slots = [
            (self.left, &mut data.left),
            (self.top, &mut data.top),
            (self.max_width, &mut data.max_width),
            (self.max_height, &mut data.max_height),
            (self.min_width, &mut data.min_width),
            (self.min_height, &mut data.min_height),
            (self.rotate_x, &mut data.rotate_x),
            (self.rotate_y, &mut data.rotate_y),
            (self.rotate_z, &mut data.rotate_z),
            (self.scale, &mut data.scale),
            (self.translate_x, &mut data.translate_x),
            (self.translate_y, &mut data.translate_y),
            (self.translate_z, &mut data.translate_z),
        ];
        for (value, slot) in slots {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    fn numeric_slot(&self, field: PositionField) -> &Option<Option<f64>> {
        const NONE: &Option<Option<f64>> = &None;
        match field {
            PositionField::Left => &self.left,
            PositionField::Top => &self.top,
            PositionField::MaxWidth => &self.max_width,
            PositionField::MaxHeight => &self.max_height,
            PositionField::MinWidth => &self.min_width,
            PositionField::MinHeight => &self.min_height,
            PositionField::RotateX => &self.rotate_x,
            PositionField::RotateY => &self.rotate_y,
            PositionField::RotateZ => &self.rotate_z,
            PositionField::Scale => &self.scale,
            PositionField::TranslateX => &self.translate_x,
            PositionField::TranslateY => &self.translate_y,
            PositionField::TranslateZ => &self.translate_z,
            PositionField::Width
            | PositionField::Height
            | PositionField::TransformOrigin
            | PositionField::ZIndex => NONE,
        }
    }

    fn numeric_slot_mut(&mut self, field: PositionField) -> Option<&mut Option<Option<f64>>> {
        Some(match field {
            PositionField::Left => &mut self.left,
            PositionField::Top => &mut self.top,
            PositionField::MaxWidth => &mut self.max_width,
            PositionField::MaxHeight => &mut self.max_height,
            PositionField::MinWidth => &mut self.min_width,
            PositionField::MinHeight => &mut self.min_height,
            PositionField::RotateX => &mut self.rotate_x,
            PositionField::RotateY => &mut self.rotate_y,
            PositionField::RotateZ => &mut self.rotate_z,
            PositionField::Scale => &mut self.scale,
            PositionField::TranslateX => &mut self.translate_x,
            PositionField::TranslateY => &mut self.translate_y,
            PositionField::TranslateZ => &mut self.translate_z,
            PositionField::Width
            | PositionField::Height
            | PositionField::TransformOrigin
            | PositionField::ZIndex => return None,
        })
    }
}

impl From<&PositionData> for PositionPatch {
    fn from(data: &PositionData) -> Self {
        data.to_patch()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "z-index values are clamped to the i32 range first"
)]
fn round_z_index(value: f64) -> i32 {
    value
        .round()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_tracks_present_fields() {
        let patch = PositionPatch::new().left(10.0).rotate_z(None).z_index(3);
        let fields = patch.fields();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(PositionField::Left));
        assert!(fields.contains(PositionField::RotateZ));
        assert!(fields.contains(PositionField::ZIndex));
        assert_eq!(patch.numeric(PositionField::Left), Some(Some(10.0)));
        assert_eq!(patch.numeric(PositionField::RotateZ), Some(None));
        assert_eq!(patch.numeric(PositionField::Top), None);
    }

    #[test]
    fn check_rejects_non_finite() {
        let patch = PositionPatch::new().top(f64::NAN);
        assert!(matches!(
            patch.check(),
            Err(PositionError::NonFinite {
                field: PositionField::Top,
                ..
            })
        ));
        assert!(PositionPatch::new().top(1.0).check().is_ok());
    }

    #[test]
    fn normalize_rounds_and_clamps() {
        let mut data = PositionData {
            left: Some(10.6),
            top: Some(-3.4),
            width: Some(Dimension::Px(199.5)),
            height: Some(Dimension::Auto),
            scale: Some(5000.0),
            ..PositionData::default()
        };
        data.normalize(&PositionData::default());
        assert_eq!(data.left, Some(11.0));
        assert_eq!(data.top, Some(-3.0));
        assert_eq!(data.width, Some(Dimension::Px(200.0)));
        assert_eq!(data.height, Some(Dimension::Auto));
        assert_eq!(data.scale, Some(1000.0));
    }

    #[test]
    fn field_set_bits_drop_unknown_fields() {
        let set = FieldSet::from_fields(&[PositionField::Left, PositionField::ZIndex]);
        assert_eq!(FieldSet::from_bits(set.bits()), set);
        assert_eq!(FieldSet::from_bits(set.bits() | (1 << 31)), set);
    }

    #[test]
    fn normalize_replaces_nan_with_fallback() {
        let fallback = PositionData {
            left: Some(5.0),
            ..PositionData::default()
        };
        let mut data = PositionData {
            left: Some(f64::NAN),
            rotate_z: Some(f64::INFINITY),
            ..PositionData::default()
        };
        data.normalize(&fallback);
        assert_eq!(data.left, Some(5.0));
        assert_eq!(data.rotate_z, None);
    }

    #[test]
    fn filtered_patch_only_writes_listed_fields() {
        let data = PositionData {
            left: Some(1.0),
            top: Some(2.0),
            z_index: Some(7),
            ..PositionData::default()
        };
        let patch =
            data.to_patch_filtered(FieldSet::from_fields(&[PositionField::Top, PositionField::ZIndex]));
        let mut target = PositionData::default();
        patch.apply_to(&mut target);
        assert_eq!(target.left, None);
        assert_eq!(target.top, Some(2.0));
        assert_eq!(target.z_index, Some(7));
    }

    #[test]
    fn neutral_values_for_transform_fields() {
        let data = PositionData::default();
        assert_eq!(data.numeric_or_neutral(PositionField::Scale), Some(1.0));
        assert_eq!(data.numeric_or_neutral(PositionField::RotateY), Some(0.0));
        assert_eq!(data.numeric_or_neutral(PositionField::Left), None);
    }

    #[test]
    fn z_index_patch_rounds() {
        let mut patch = PositionPatch::new();
        patch.set_numeric(PositionField::ZIndex, Some(4.6));
        assert_eq!(patch.z_index, Some(Some(5)));
    }

    #[test]
    fn origin_css_round_trip() {
        for origin in TransformOrigin::ALL {
            assert_eq!(TransformOrigin::from_css(origin.as_css()), Some(origin));
        }
        assert_eq!(TransformOrigin::from_css("middle"), None);
    }
}
