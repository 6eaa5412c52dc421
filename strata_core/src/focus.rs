// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus regions and screen-space focus resolution.
//!
//! Focus regions are attached to render nodes in child-local coordinates.
//! Two walks turn them into something input handling can use:
//!
//! - [`take_focuses`] enumerates every focus rectangle in screen space,
//!   clipped by the ancestors' clip rectangles and filtered by modal nodes.
//! - [`RenderContext::resolve_point`] finds the topmost focus under a screen
//!   point, honoring clipping, degenerate transforms, opacity masks and
//!   image-dissolve boundaries.
//!
//! Both walks descend only into render children blitted with `focus = true`.
//! Pass-focus delegates are visited with the delegating node's own transform,
//! since they are logical rather than spatial children.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::context::RenderContext;
use crate::node::{Child, DisplayableId, Modal, Operation, RenderId, RenderStore};
use crate::transform::{Transform3d, apply_optional};

/// What samples a focus mask.
#[derive(Clone)]
pub enum MaskSource {
    /// A render; the region matches where it draws an opaque pixel.
    Render(RenderId),
    /// A predicate over mask-local coordinates.
    Predicate(Rc<dyn Fn(Point) -> bool>),
}

impl fmt::Debug for MaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(id) => f.debug_tuple("Render").field(id).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// An opacity mask restricting where a focus region accepts points.
#[derive(Clone, Debug)]
pub struct FocusMask {
    /// Origin of the mask in the node's child space.
    pub origin: Point,
    /// Mask sampler.
    pub source: MaskSource,
}

/// A focus region as stored on a render node.
#[derive(Clone, Debug)]
pub struct FocusRegion {
    /// Displayable receiving the focus.
    pub target: DisplayableId,
    /// Opaque argument forwarded to the target.
    pub arg: Option<u64>,
    /// Hit rectangle in child-local coordinates; `None` for a global focus
    /// with no position.
    pub rect: Option<Rect>,
    /// Optional opacity mask.
    pub mask: Option<FocusMask>,
}

impl FocusRegion {
    /// Creates a region without a mask.
    #[must_use]
    pub fn new(target: DisplayableId, arg: Option<u64>, rect: Option<Rect>) -> Self {
        Self {
            target,
            arg,
            rect,
            mask: None,
        }
    }

    /// Attaches an opacity mask.
    #[must_use]
    pub fn with_mask(mut self, mask: FocusMask) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// A focus rectangle in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Focus {
    /// Displayable receiving the focus.
    pub target: DisplayableId,
    /// Opaque argument forwarded to the target.
    pub arg: Option<u64>,
    /// Screen rectangle; `None` for a global focus.
    pub rect: Option<Rect>,
}

/// The result of resolving a screen point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusAt {
    /// A focusable region is under the point.
    Target {
        /// Displayable receiving the focus.
        target: DisplayableId,
        /// Opaque argument forwarded to the target.
        arg: Option<u64>,
    },
    /// A modal node consumed the point without offering any focus.
    ///
    /// This is distinct from `None` ("nothing here at all").
    Modal,
}

/// A displayable drawn under a point, as found by
/// [`displayables_at_point`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayableHit {
    /// Nesting depth, 0 for the root's displayables.
    pub depth: usize,
    /// The displayable.
    pub displayable: DisplayableId,
    /// Size of the render that showed it.
    pub size: Size,
}

/// Enumerates the focus rectangles of the tree rooted at `root`, in screen
/// coordinates, in traversal order.
///
/// The root's own size is the initial clip rectangle.
#[must_use]
pub fn take_focuses(store: &RenderStore, root: RenderId) -> Vec<Focus> {
    let mut out = Vec::new();
    let clip = Rect::from_origin_size(Point::ZERO, store.size(root));
    take_focuses_into(store, root, clip, Transform3d::IDENTITY, &mut out);
    out
}

/// `to_screen` maps the node's outer space (where its width and height live)
/// to screen coordinates.
fn take_focuses_into(
    store: &RenderStore,
    id: RenderId,
    clip: Rect,
    to_screen: Transform3d,
    out: &mut Vec<Focus>,
) {
    let node = store.get(id);
    let bounds = screen_bounds(&to_screen, node.size());

    match &node.modal {
        Modal::None => {}
        Modal::Full => out.clear(),
        Modal::Window => out.retain(|f| f.rect.is_none_or(|r| !rect_inside(bounds, r))),
        Modal::Predicate(blocked) => out.retain(|f| f.rect.is_none_or(|r| !blocked(r))),
    }

    let inner = match node.reverse {
        Some(reverse) => to_screen * reverse,
        None => to_screen,
    };

    for region in &node.focuses {
        let Some(rect) = region.rect else {
            out.push(Focus {
                target: region.target,
                arg: region.arg,
                rect: None,
            });
            continue;
        };
        let screen = bounding_rect(
            inner.transform_point(Point::new(rect.x0, rect.y0)),
            inner.transform_point(Point::new(rect.x1, rect.y1)),
        );
        if let Some(clipped) = intersect(screen, clip) {
            out.push(Focus {
                target: region.target,
                arg: region.arg,
                rect: Some(clipped),
            });
        }
    }

    let mut child_clip = clip;
    if node.x_clipping {
        child_clip.x0 = child_clip.x0.max(bounds.x0);
        child_clip.x1 = child_clip.x1.min(bounds.x1);
    }
    if node.y_clipping {
        child_clip.y0 = child_clip.y0.max(bounds.y0);
        child_clip.y1 = child_clip.y1.min(bounds.y1);
    }

    for entry in &node.children {
        let Child::Render(child) = entry.child else {
            continue;
        };
        if !entry.focus {
            continue;
        }
        let placed = inner * Transform3d::from_translation(entry.offset.x, entry.offset.y, 0.0);
        take_focuses_into(store, child, child_clip, placed, out);
    }

    for delegate in &node.pass_focuses {
        take_focuses_into(store, *delegate, child_clip, to_screen, out);
    }
}

/// Lists the displayables whose renders are drawn under `p`, following only
/// `main` render children, outermost first.
#[must_use]
pub fn displayables_at_point(store: &RenderStore, root: RenderId, p: Point) -> Vec<DisplayableHit> {
    let mut out = Vec::new();
    displayables_at_point_into(store, root, p, 0, &mut out);
    out
}

fn displayables_at_point_into(
    store: &RenderStore,
    id: RenderId,
    p: Point,
    depth: usize,
    out: &mut Vec<DisplayableHit>,
) {
    let node = store.get(id);
    if p.x < 0.0 || p.y < 0.0 || p.x >= node.width || p.y >= node.height {
        return;
    }
    let mut depth = depth;
    for d in &node.render_of {
        out.push(DisplayableHit {
            depth,
            displayable: *d,
            size: node.size(),
        });
        depth += 1;
    }
    for entry in &node.children {
        let Child::Render(child) = entry.child else {
            continue;
        };
        if !entry.main {
            continue;
        }
        let local = apply_optional(node.forward.as_ref(), p) - entry.offset.to_vec2();
        displayables_at_point_into(store, child, local, depth, out);
    }
}

impl RenderContext {
    /// Enumerates every focus rectangle of the current screen render.
    ///
    /// Returns an empty list if no screen has been rendered.
    #[must_use]
    pub fn enumerate_focuses(&self) -> Vec<Focus> {
        match self.screen_root() {
            Some(root) => take_focuses(self.store(), root),
            None => Vec::new(),
        }
    }

    /// Resolves a screen point to the topmost focus of the current screen
    /// render.
    pub fn resolve_point(&mut self, x: f64, y: f64) -> Option<FocusAt> {
        let root = self.screen_root()?;
        self.focus_at(root, Point::new(x, y))
    }

    /// Resolves a point in `id`'s outer space to the topmost focus below it.
    pub fn focus_at(&mut self, id: RenderId, p: Point) -> Option<FocusAt> {
        let node = self.store().get(id);
        if node.x_clipping && (p.x < 0.0 || p.x >= node.width) {
            return None;
        }
        if node.y_clipping && (p.y < 0.0 || p.y >= node.height) {
            return None;
        }
        if node.forward.is_some_and(|f| f.is_degenerate()) {
            return None;
        }

        let q = apply_optional(node.forward.as_ref(), p);
        let size = node.size();
        let operation = node.operation;
        let modal = node.modal.clone();
        let first_child = node.children.first().copied();
        let pass_focuses = node.pass_focuses.clone();
        let children: Vec<(RenderId, Vec2)> = node
            .children
            .iter()
            .filter(|e| e.focus)
            .filter_map(|e| e.child.as_render().map(|c| (c, e.offset.to_vec2())))
            .collect();
        let regions = node.focuses.clone();

        let mut rv = None;

        for delegate in pass_focuses.iter().rev() {
            rv = self.focus_at(*delegate, p);
            if rv.is_some() {
                break;
            }
        }

        if rv.is_none() {
            for (child, offset) in children.iter().rev() {
                rv = self.focus_at(*child, q - *offset);
                if rv.is_some() {
                    break;
                }
            }
        }

        if rv.is_none() {
            for region in regions.iter().rev() {
                let Some(rect) = region.rect else {
                    continue;
                };
                let inside = q.x >= rect.x0 && q.x < rect.x1 && q.y >= rect.y0 && q.y < rect.y1;
                if !inside {
                    continue;
                }
                let opaque = match &region.mask {
                    Some(mask) => {
                        let local = q - mask.origin.to_vec2();
                        match &mask.source {
                            MaskSource::Render(m) => self.is_pixel_opaque(*m, local),
                            MaskSource::Predicate(f) => f(local),
                        }
                    }
                    None => true,
                };
                if opaque {
                    rv = Some(FocusAt::Target {
                        target: region.target,
                        arg: region.arg,
                    });
                    break;
                }
            }
        }

        if rv.is_some() && operation == Operation::ImageDissolve {
            if let Some(first) = first_child {
                if !self.child_pixel_opaque(first.child, q - first.offset.to_vec2()) {
                    rv = None;
                }
            }
        }

        if rv.is_none() {
            let consumed = match &modal {
                Modal::None => false,
                Modal::Full => true,
                Modal::Window => p.x >= 0.0 && p.y >= 0.0 && p.x < size.width && p.y < size.height,
                Modal::Predicate(blocked) => blocked(Rect::from_origin_size(p, Size::ZERO)),
            };
            if consumed {
                return Some(FocusAt::Modal);
            }
        }

        rv
    }

    /// Lists the displayables drawn under a point of the current screen.
    #[must_use]
    pub fn displayables_at_point(&self, x: f64, y: f64) -> Vec<DisplayableHit> {
        match self.screen_root() {
            Some(root) => displayables_at_point(self.store(), root, Point::new(x, y)),
            None => Vec::new(),
        }
    }

    fn child_pixel_opaque(&mut self, child: Child, p: Point) -> bool {
        match child {
            Child::Render(id) => self.is_pixel_opaque(id, p),
            leaf => self.is_leaf_pixel_opaque(leaf, p),
        }
    }
}

fn screen_bounds(to_screen: &Transform3d, size: Size) -> Rect {
    bounding_rect(
        to_screen.transform_point(Point::ZERO),
        to_screen.transform_point(Point::new(size.width, size.height)),
    )
}

fn bounding_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let r = Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1));
    (r.x0 < r.x1 && r.y0 < r.y1).then_some(r)
}

fn rect_inside(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}
