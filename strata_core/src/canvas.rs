// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Solid fills and CPU-drawn canvases.
//!
//! [`RenderContext::fill`] wraps a backend-provided solid leaf in a node.
//! [`RenderContext::canvas`] allocates a transparent surface that primitives
//! are painted into through [`DrawBackend::draw`](crate::backend::DrawBackend::draw).
//!
//! Painting is the one place the core synchronizes. Every primitive is drawn
//! with the context's [`DrawLock`] held, and a compositor that blits canvas
//! surfaces from another thread takes the same lock (see
//! [`RenderContext::draw_lock`]), so it never observes a half-drawn surface.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::node::{BlitMode, Child, RenderId, SurfaceId};

/// Lock serializing canvas painting against concurrent blits.
pub type DrawLock = Arc<spin::Mutex<()>>;

/// Straight-alpha RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color fully covers what is below it.
    #[must_use]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }
}

/// One canvas drawing primitive, in surface coordinates.
///
/// For closed shapes a `width` of zero fills the shape; otherwise it is the
/// outline's stroke width.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// An axis-aligned rectangle.
    Rect {
        /// Extent.
        rect: Rect,
        /// Paint.
        color: Color,
        /// Stroke width, or zero to fill.
        width: f64,
    },
    /// A single segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Paint.
        color: Color,
        /// Stroke width.
        width: f64,
    },
    /// A connected polyline.
    Lines {
        /// Vertices in order.
        points: Vec<Point>,
        /// Whether the last vertex connects back to the first.
        closed: bool,
        /// Paint.
        color: Color,
        /// Stroke width.
        width: f64,
    },
    /// A polygon.
    Polygon {
        /// Vertices in order.
        points: Vec<Point>,
        /// Paint.
        color: Color,
        /// Stroke width, or zero to fill.
        width: f64,
    },
    /// A circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Paint.
        color: Color,
        /// Stroke width, or zero to fill.
        width: f64,
    },
    /// An ellipse inscribed in a rectangle.
    Ellipse {
        /// Bounding rectangle.
        rect: Rect,
        /// Paint.
        color: Color,
        /// Stroke width, or zero to fill.
        width: f64,
    },
}

/// A surface being painted, and the node that will show it.
///
/// Obtained from [`RenderContext::canvas`]; [`finish`](Self::finish) blits the
/// surface into the node.
pub struct Canvas<'a> {
    cx: &'a mut RenderContext,
    node: RenderId,
    surface: SurfaceId,
    painted: usize,
}

impl fmt::Debug for Canvas<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("node", &self.node)
            .field("surface", &self.surface)
            .field("painted", &self.painted)
            .finish_non_exhaustive()
    }
}

impl Canvas<'_> {
    /// The node that will show the surface.
    #[must_use]
    pub fn node(&self) -> RenderId {
        self.node
    }

    /// The surface being painted.
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Number of primitives painted so far.
    #[must_use]
    pub fn painted(&self) -> usize {
        self.painted
    }

    /// Paints `command` with the draw lock held.
    pub fn paint(&mut self, command: &DrawCommand) -> &mut Self {
        let _guard = self.cx.draw_lock.lock();
        self.cx.backend.draw(self.surface, command);
        self.painted += 1;
        self
    }

    /// Paints a rectangle.
    pub fn rect(&mut self, rect: Rect, color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Rect { rect, color, width })
    }

    /// Paints a segment.
    pub fn line(&mut self, from: Point, to: Point, color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Line {
            from,
            to,
            color,
            width,
        })
    }

    /// Paints a polyline.
    pub fn lines(&mut self, points: &[Point], closed: bool, color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Lines {
            points: points.to_vec(),
            closed,
            color,
            width,
        })
    }

    /// Paints a polygon.
    pub fn polygon(&mut self, points: &[Point], color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Polygon {
            points: points.to_vec(),
            color,
            width,
        })
    }

    /// Paints a circle.
    pub fn circle(&mut self, center: Point, radius: f64, color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Circle {
            center,
            radius,
            color,
            width,
        })
    }

    /// Paints an ellipse inscribed in `rect`.
    pub fn ellipse(&mut self, rect: Rect, color: Color, width: f64) -> &mut Self {
        self.paint(&DrawCommand::Ellipse { rect, color, width })
    }

    /// Hands the painted surface to the backend and blits it into the node.
    pub fn finish(self) -> Result<RenderId, RenderError> {
        let surface = Child::Surface(self.surface);
        self.cx.backend.mutated_surface(surface);
        self.cx
            .blit_with(self.node, surface, Point::ZERO, BlitMode::Pixel, false, true)?;
        Ok(self.node)
    }
}

impl RenderContext {
    /// Returns a `width`×`height` node filled with `color`.
    pub fn fill(&mut self, width: f64, height: f64, color: Color) -> Result<RenderId, RenderError> {
        let leaf = self.backend.solid(Size::new(width, height), color);
        let rv = self.store.create(width, height);
        self.blit_with(rv, leaf, Point::ZERO, BlitMode::Pixel, false, true)?;
        Ok(rv)
    }

    /// Starts painting a transparent `width`×`height` surface.
    pub fn canvas(&mut self, width: f64, height: f64) -> Canvas<'_> {
        let surface = self.backend.canvas_surface(Size::new(width, height));
        let node = self.store.create(width, height);
        Canvas {
            cx: self,
            node,
            surface,
            painted: 0,
        }
    }

    /// The lock held while canvas primitives paint.
    ///
    /// A compositor that reads canvas surfaces on another thread holds it
    /// while blitting.
    #[must_use]
    pub fn draw_lock(&self) -> DrawLock {
        Arc::clone(&self.draw_lock)
    }
}
