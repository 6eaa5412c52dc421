// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The displayable capability consumed by the render cache.

use kurbo::{Point, Rect, Size};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::node::{DisplayableId, RenderId};

/// Size limits a displayable declares through its style.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeConstraints {
    /// Upper bound on the width offered to [`Displayable::render`].
    pub x_maximum: Option<f64>,
    /// Upper bound on the height offered to [`Displayable::render`].
    pub y_maximum: Option<f64>,
    /// Replaces the offered size entirely.
    pub offer_size: Option<Size>,
}

impl SizeConstraints {
    /// Applies the constraints to a requested size.
    ///
    /// Maximums clamp first, then `offer_size` overrides, then negative
    /// results are floored to zero.
    #[must_use]
    pub fn clamp(&self, width: f64, height: f64) -> (f64, f64) {
        let mut width = width;
        let mut height = height;
        if let Some(xmax) = self.x_maximum {
            width = width.min(xmax);
        }
        if let Some(ymax) = self.y_maximum {
            height = height.min(ymax);
        }
        if let Some(offer) = self.offer_size {
            width = offer.width;
            height = offer.height;
        }
        (width.max(0.0), height.max(0.0))
    }
}

/// A visual element that produces render nodes on demand.
///
/// The core only knows a displayable through this trait. Implementations
/// build their node through the [`RenderContext`] (rendering their own
/// children with [`RenderContext::render`]) and must return a live node.
pub trait Displayable {
    /// Stable identity used as the cache key.
    fn id(&self) -> DisplayableId;

    /// Produces a render of at most `width` × `height`.
    ///
    /// `st` is the shown time base, `at` the animation time base.
    fn render(
        &self,
        cx: &mut RenderContext,
        width: f64,
        height: f64,
        st: f64,
        at: f64,
    ) -> Result<RenderId, RenderError>;

    /// Declared size limits.
    fn size_constraints(&self) -> SizeConstraints {
        SizeConstraints::default()
    }

    /// Whether renders of this displayable are cropped to their own size.
    fn clipping(&self) -> bool {
        false
    }

    /// Where a render of `size` goes inside `area`.
    fn place(&self, area: Rect, size: Size) -> Point {
        _ = size;
        area.origin()
    }
}
