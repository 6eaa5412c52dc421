// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! Render nodes carry an optional *forward* transform (screen → child) and an
//! optional *reverse* transform (child → screen). An absent transform means
//! identity; [`compose_optional`] is the one place where that convention is
//! resolved, so callers never skip a transform by accident.
//!
//! Only the planar part of the matrix is used for hit-testing and placement,
//! but the full 4×4 is kept so that depth scaling (`w` row) can be detected
//! and forwarded to the drawing backend unchanged.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix. Element `cols[c][r]` is the
/// coefficient of input component `c` in output component `r`, so for
/// example `cols[1][0]` is how much output `x` changes per unit of input `y`.
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

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
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

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
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

    /// Maps a planar point (`z = 0`, `w = 1`) through the transform.
    ///
    /// No perspective divide is performed.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        Point::new(
            c[0][0] * p.x + c[1][0] * p.y + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[3][1],
        )
    }

    /// Maps a planar vector (`z = 0`, `w = 0`), ignoring translation.
    #[inline]
    #[must_use]
    pub fn transform_vector(&self, x: f64, y: f64) -> (f64, f64) {
        let c = &self.cols;
        (c[0][0] * x + c[1][0] * y, c[0][1] * x + c[1][1] * y)
    }

    /// Returns `true` if the `w` row scales depth (`wdw != 1`).
    ///
    /// Such a transform cannot be cropped by adjusting offsets; the source
    /// has to be flattened first.
    #[inline]
    #[must_use]
    pub fn has_depth_scale(&self) -> bool {
        self.cols[3][3] != 1.0
    }

    /// Returns `true` if the planar part has no rotation or shear, and no
    /// input leaks into `z`/`w` or out of them.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        let c = &self.cols;
        c[1][0] == 0.0
            && c[0][1] == 0.0
            && c[2][0] == 0.0
            && c[2][1] == 0.0
            && c[0][3] == 0.0
            && c[1][3] == 0.0
            && c[0][2] == 0.0
            && c[1][2] == 0.0
    }

    /// Returns the `(x, y)` scale factors if this is a pure positive axis
    /// scale with no translation.
    #[must_use]
    pub fn axis_scale(&self) -> Option<(f64, f64)> {
        let c = &self.cols;
        let untranslated = c[3][0] == 0.0 && c[3][1] == 0.0;
        if self.is_axis_aligned() && untranslated && c[0][0] > 0.0 && c[1][1] > 0.0 {
            Some((c[0][0], c[1][1]))
        } else {
            None
        }
    }

    /// Returns `true` if the planar part collapses area to zero.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let c = &self.cols;
        let det = c[0][0] * c[1][1] - c[1][0] * c[0][1];
        det.abs() < f64::EPSILON || !det.is_finite()
    }

    /// Returns the inverse transform, or `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        // Row-major view: m[r][c].
        let mut m = [[0.0_f64; 4]; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, v) in col.iter().enumerate() {
                m[r][c] = *v;
            }
        }

        // Gauss-Jordan with partial pivoting.
        let mut inv = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        for col in 0..4 {
            let mut pivot = col;
            for r in (col + 1)..4 {
                if m[r][col].abs() > m[pivot][col].abs() {
                    pivot = r;
                }
            }
            if m[pivot][col].abs() < 1e-12 {
                return None;
            }
            m.swap(col, pivot);
            inv.swap(col, pivot);
            let d = m[col][col];
            for k in 0..4 {
                m[col][k] /= d;
                inv[col][k] /= d;
            }
            for r in 0..4 {
                if r != col {
                    let f = m[r][col];
                    if f != 0.0 {
                        for k in 0..4 {
                            m[r][k] -= f * m[col][k];
                            inv[r][k] -= f * inv[col][k];
                        }
                    }
                }
            }
        }

        let mut cols = [[0.0_f64; 4]; 4];
        for (r, row) in inv.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                cols[c][r] = *v;
            }
        }
        Some(Self { cols })
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

/// Composes two optional transforms, treating `None` as identity.
///
/// Returns `None` only when both inputs are absent, so the "no transform"
/// fast path survives composition.
#[inline]
#[must_use]
pub fn compose_optional(
    outer: Option<Transform3d>,
    inner: Option<Transform3d>,
) -> Option<Transform3d> {
    match (outer, inner) {
        (Some(a), Some(b)) => Some(a * b),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Maps `p` through `t`, treating `None` as identity.
#[inline]
#[must_use]
pub fn apply_optional(t: Option<&Transform3d>, p: Point) -> Point {
    match t {
        Some(t) => t.transform_point(p),
        None => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn scale_then_translate_maps_points() {
        let s = Transform3d::from_scale(2.0, 3.0, 1.0);
        let t = Transform3d::from_translation(5.0, 7.0, 0.0);
        // Scale first, then translate: T * S
        let p = (t * s).transform_point(Point::new(1.0, 1.0));
        assert!(close(p, Point::new(7.0, 10.0)), "got {p:?}");
    }

    #[test]
    fn rotation_is_not_axis_aligned() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_4);
        assert!(!r.is_axis_aligned());
        assert!(r.axis_scale().is_none());
        assert!(!r.is_degenerate());
    }

    #[test]
    fn axis_scale_detection() {
        assert_eq!(
            Transform3d::from_scale(2.0, 0.5, 1.0).axis_scale(),
            Some((2.0, 0.5))
        );
        assert!(
            Transform3d::from_translation(1.0, 0.0, 0.0)
                .axis_scale()
                .is_none()
        );
        assert!(
            Transform3d::from_scale(-1.0, 1.0, 1.0).axis_scale().is_none(),
            "mirroring is not a plain scale"
        );
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform3d::from_translation(3.0, -4.0, 0.0)
            * Transform3d::from_rotation_z(0.3)
            * Transform3d::from_scale(2.0, 5.0, 1.0);
        let inv = t.inverse().expect("invertible");
        let p = Point::new(12.5, -3.0);
        assert!(close(inv.transform_point(t.transform_point(p)), p));
    }

    #[test]
    fn singular_has_no_inverse() {
        let t = Transform3d::from_scale(0.0, 1.0, 1.0);
        assert!(t.inverse().is_none());
        assert!(t.is_degenerate());
    }

    #[test]
    fn depth_scale_detection() {
        let mut t = Transform3d::IDENTITY;
        assert!(!t.has_depth_scale());
        t.cols[3][3] = 2.0;
        assert!(t.has_depth_scale());
    }

    #[test]
    fn compose_optional_treats_none_as_identity() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_scale(2.0, 2.0, 1.0);
        assert_eq!(compose_optional(None, None), None);
        assert_eq!(compose_optional(Some(a), None), Some(a));
        assert_eq!(compose_optional(None, Some(b)), Some(b));
        assert_eq!(compose_optional(Some(a), Some(b)), Some(a * b));
    }

    #[test]
    fn nan_is_not_finite() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(Transform3d::IDENTITY.is_finite());
    }
}
