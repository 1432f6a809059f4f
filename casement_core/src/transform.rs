// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform composition.
//!
//! [`Transform3d`] is a minimal column-major 4×4 matrix. [`Transforms`]
//! composes the rotation, scale and translation fields of a
//! [`PositionData`] into either a CSS transform list or a matrix, always in
//! the order translate, rotateX, rotateY, rotateZ, scale. Components that are
//! unset or neutral are omitted so the CSS list stays minimal.
//!
//! In orthographic mode `left` and `top` are folded into the transform as a
//! leading `translate(…)` instead of being written as absolute offsets.

use alloc::string::String;
use core::f64::consts::PI;
use core::fmt::Write as _;
use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size, Vec2};

use crate::data::{PositionData, PositionField};

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, the same layout CSS
/// `matrix3d()` expects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians), matching CSS
    /// `rotateX()`.
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians), matching CSS
    /// `rotateY()`.
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians), matching CSS
    /// `rotateZ()`.
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Maps a point in the `z = 0` plane, dropping the resulting depth.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        Point::new(
            c[0][0] * p.x + c[1][0] * p.y + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[3][1],
        )
    }

    /// Formats the matrix as a CSS `matrix3d(…)` function.
    #[must_use]
    pub fn to_css_matrix3d(&self) -> String {
        let mut out = String::from("matrix3d(");
        for (i, v) in self.cols.iter().flatten().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            _ = write!(out, "{v}");
        }
        out.push(')');
        out
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

/// The derived transform projection published to transform subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformData {
    /// The composed matrix as applied to the element (origin included).
    pub matrix: Transform3d,
    /// Transform origin in element-local pixels.
    pub origin: Point,
    /// The element box corners after transformation, in container
    /// coordinates: top-left, top-right, bottom-right, bottom-left.
    pub corners: [Point; 4],
    /// Axis-aligned bounds of [`corners`](Self::corners).
    pub bounds: Rect,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            matrix: Transform3d::IDENTITY,
            origin: Point::ZERO,
            corners: [Point::ZERO; 4],
            bounds: Rect::ZERO,
        }
    }
}

/// Composes the transform fields of a [`PositionData`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transforms {
    ortho: bool,
}

const DEG_TO_RAD: f64 = PI / 180.0;

/// Returns `value` unless it is unset or equal to the neutral value.
fn effective(data: &PositionData, field: PositionField) -> Option<f64> {
    let value = data.numeric(field)?;
    (Some(value) != field.neutral()).then_some(value)
}

impl Transforms {
    /// Creates a composer; `ortho` folds `left`/`top` into the transform.
    #[must_use]
    pub const fn new(ortho: bool) -> Self {
        Self { ortho }
    }

    /// Whether orthographic mode is on.
    #[must_use]
    pub const fn is_ortho(&self) -> bool {
        self.ortho
    }

    /// Whether any rotation, scale or translation component is non-neutral.
    #[must_use]
    pub fn is_active(data: &PositionData) -> bool {
        PositionField::ALL
            .into_iter()
            .filter(|f| f.is_transform())
            .any(|f| effective(data, f).is_some())
    }

    /// Builds the CSS transform list, or `None` when there is nothing to
    /// write and the style should be cleared.
    #[must_use]
    pub fn css(&self, data: &PositionData) -> Option<String> {
        let mut out = String::new();
        let mut push = |args: core::fmt::Arguments<'_>| {
            if !out.is_empty() {
                out.push(' ');
            }
            _ = out.write_fmt(args);
        };

        if self.ortho && (data.left.is_some() || data.top.is_some()) {
            push(format_args!(
                "translate({}px, {}px)",
                data.left.unwrap_or(0.0),
                data.top.unwrap_or(0.0)
            ));
        }
        if let Some(v) = effective(data, PositionField::TranslateX) {
            push(format_args!("translateX({v}px)"));
        }
        if let Some(v) = effective(data, PositionField::TranslateY) {
            push(format_args!("translateY({v}px)"));
        }
        if let Some(v) = effective(data, PositionField::TranslateZ) {
            push(format_args!("translateZ({v}px)"));
        }
        if let Some(v) = effective(data, PositionField::RotateX) {
            push(format_args!("rotateX({v}deg)"));
        }
        if let Some(v) = effective(data, PositionField::RotateY) {
            push(format_args!("rotateY({v}deg)"));
        }
        if let Some(v) = effective(data, PositionField::RotateZ) {
            push(format_args!("rotateZ({v}deg)"));
        }
        if let Some(v) = effective(data, PositionField::Scale) {
            push(format_args!("scale({v})"));
        }

        (!out.is_empty()).then_some(out)
    }

    /// Composes the transform list as a matrix about the element-local
    /// `origin`, the way a browser applies `transform` with
    /// `transform-origin`.
    #[must_use]
    pub fn matrix(&self, data: &PositionData, origin: Point) -> Transform3d {
        let value = |field: PositionField| data.numeric_or_neutral(field).unwrap_or(0.0);

        let mut m = Transform3d::from_translation(origin.x, origin.y, 0.0);
        if self.ortho {
            m = m * Transform3d::from_translation(
                data.left.unwrap_or(0.0),
                data.top.unwrap_or(0.0),
                0.0,
            );
        }
        m = m * Transform3d::from_translation(
            value(PositionField::TranslateX),
            value(PositionField::TranslateY),
            value(PositionField::TranslateZ),
        );
        m = m * Transform3d::from_rotation_x(value(PositionField::RotateX) * DEG_TO_RAD);
        m = m * Transform3d::from_rotation_y(value(PositionField::RotateY) * DEG_TO_RAD);
        m = m * Transform3d::from_rotation_z(value(PositionField::RotateZ) * DEG_TO_RAD);
        let s = value(PositionField::Scale);
        m = m * Transform3d::from_scale(s, s, 1.0);
        m * Transform3d::from_translation(-origin.x, -origin.y, 0.0)
    }

    /// Computes the full transform projection for an element box of `size`.
    ///
    /// Corners and bounds are reported in container coordinates, so the
    /// absolute `left`/`top` offset is applied outside orthographic mode too.
    #[must_use]
    pub fn compute(&self, data: &PositionData, size: Size) -> TransformData {
        let (fx, fy) = data.transform_origin.fractions();
        let origin = Point::new(fx * size.width, fy * size.height);
        let matrix = self.matrix(data, origin);
        let offset = if self.ortho {
            Vec2::ZERO
        } else {
            Vec2::new(data.left.unwrap_or(0.0), data.top.unwrap_or(0.0))
        };
        let local = [
            Point::ZERO,
            Point::new(size.width, 0.0),
            Point::new(size.width, size.height),
            Point::new(0.0, size.height),
        ];
        let corners = local.map(|p| matrix.transform_point(p) + offset);
        let bounds = corners[1..]
            .iter()
            .fold(Rect::from_points(corners[0], corners[0]), |r, p| {
                r.union_pt(*p)
            });
        TransformData {
            matrix,
            origin,
            corners,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransformOrigin;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        assert_eq!((a * b).col(3), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        // CSS rotates clockwise with y pointing down.
        assert!(close(r.transform_point(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn css_is_empty_for_neutral_values() {
        let data = PositionData {
            rotate_z: Some(0.0),
            scale: Some(1.0),
            translate_x: None,
            ..PositionData::default()
        };
        assert!(!Transforms::is_active(&data));
        assert_eq!(Transforms::new(false).css(&data), None);
    }

    #[test]
    fn css_order_is_fixed() {
        let data = PositionData {
            rotate_z: Some(45.0),
            rotate_x: Some(10.0),
            scale: Some(0.5),
            translate_y: Some(-4.0),
            ..PositionData::default()
        };
        assert!(Transforms::is_active(&data));
        assert_eq!(
            Transforms::new(false).css(&data).as_deref(),
            Some("translateY(-4px) rotateX(10deg) rotateZ(45deg) scale(0.5)")
        );
    }

    #[test]
    fn ortho_prefixes_position() {
        let data = PositionData {
            left: Some(100.0),
            top: Some(50.0),
            rotate_z: Some(90.0),
            ..PositionData::default()
        };
        assert_eq!(
            Transforms::new(true).css(&data).as_deref(),
            Some("translate(100px, 50px) rotateZ(90deg)")
        );
        assert_eq!(
            Transforms::new(false).css(&data).as_deref(),
            Some("rotateZ(90deg)")
        );
    }

    #[test]
    fn rotation_about_center_keeps_center_fixed() {
        let data = PositionData {
            left: Some(10.0),
            top: Some(20.0),
            rotate_z: Some(90.0),
            transform_origin: TransformOrigin::Center,
            ..PositionData::default()
        };
        let t = Transforms::new(false).compute(&data, Size::new(200.0, 100.0));
        assert!(close(t.origin, Point::new(100.0, 50.0)));
        assert!(close(t.matrix.transform_point(t.origin), t.origin));
        // 200×100 rotated a quarter turn about its center is 100×200.
        assert!((t.bounds.width() - 100.0).abs() < EPS);
        assert!((t.bounds.height() - 200.0).abs() < EPS);
        assert!((t.bounds.x0 - 60.0).abs() < EPS);
        assert!((t.bounds.y0 + 30.0).abs() < EPS);
    }

    #[test]
    fn ortho_and_absolute_bounds_agree() {
        let data = PositionData {
            left: Some(30.0),
            top: Some(40.0),
            scale: Some(2.0),
            ..PositionData::default()
        };
        let size = Size::new(50.0, 50.0);
        let abs = Transforms::new(false).compute(&data, size);
        let ortho = Transforms::new(true).compute(&data, size);
        assert_eq!(abs.bounds, Rect::new(30.0, 40.0, 130.0, 140.0));
        assert_eq!(abs.bounds, ortho.bounds);
    }

    #[test]
    fn matrix3d_lists_columns() {
        let t = Transform3d::from_translation(5.0, 6.0, 0.0);
        assert_eq!(
            t.to_css_matrix3d(),
            "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 5, 6, 0, 1)"
        );
    }

    #[test]
    fn nan_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
    }
}
