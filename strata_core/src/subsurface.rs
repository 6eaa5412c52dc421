// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cropping a render to a rectangle.
//!
//! [`RenderContext::subsurface`] builds a new node showing the part of a
//! source node that falls inside a crop rectangle. Three constructions exist,
//! chosen from the source's reverse transform:
//!
//! - **Flatten**: the reverse transform scales depth (`wdw != 1`). The source
//!   is rendered to a texture by the backend and the texture is cropped.
//! - **Clip fallback**: the reverse transform rotates, shears or translates,
//!   or the source is mesh-backed. The crop cannot be expressed by moving
//!   children, so the whole source is blitted at `(-x, -y)` into a node with
//!   both clip flags set.
//! - **Partition**: no transform or a pure axis scale. Every child is
//!   intersected with the crop along each axis independently (see
//!   [`compute_subline`]); children that do not overlap are dropped, render
//!   children are cropped recursively and leaves are cropped by the backend.
//!   Focus regions and their masks are remapped the same way.
//!
//! A partitioned result depends on its source and carries the source's
//! blend, operation, shader, uniform, property and text-input state.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::focus::{FocusMask, FocusRegion, MaskSource};
use crate::node::{BlitMode, Child, Operation, RenderId};
use crate::trace::{SubsurfaceEvent, SubsurfacePath};
use crate::transform::apply_optional;

/// The overlap of a source span with a crop span along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Subline {
    /// Start of the overlap, relative to the crop span.
    pub offset: f64,
    /// Start of the overlap, relative to the source span.
    pub crop: f64,
    /// Length of the overlap. Zero or negative when the spans are disjoint.
    pub width: f64,
}

/// Intersects source span `[sx0, sx0 + sw)` with crop span `[cx0, cx0 + cw)`.
#[must_use]
pub fn compute_subline(sx0: f64, sw: f64, cx0: f64, cw: f64) -> Subline {
    let start = sx0.max(cx0);
    let end = (sx0 + sw).min(cx0 + cw);
    Subline {
        offset: start - cx0,
        crop: start - sx0,
        width: end - start,
    }
}

/// Pulls an overlap forward when it starts before the bounds span does.
///
/// Only the low side is tightened.
fn tighten(line: Subline, sx0: f64, bx0: f64) -> Subline {
    let start = sx0 + line.crop;
    if start >= bx0 {
        return line;
    }
    let excess = bx0 - start;
    Subline {
        offset: line.offset + excess,
        crop: line.crop + excess,
        width: line.width - excess,
    }
}

fn span_rect(x: Subline, y: Subline) -> (Rect, Point) {
    (
        Rect::new(x.crop, y.crop, x.crop + x.width, y.crop + y.width),
        Point::new(x.offset, y.offset),
    )
}

impl RenderContext {
    /// Crops `node` to `rect`, copying focus regions when `focus` is set.
    pub fn subsurface(
        &mut self,
        node: RenderId,
        rect: Rect,
        focus: bool,
    ) -> Result<RenderId, RenderError> {
        self.subsurface_with(node, rect, focus, false, None)
    }

    /// Crops `node` to `rect`.
    ///
    /// `subpixel` forces children to keep fractional offsets. `bounds` is the
    /// outer clip used to tighten nested crops; it defaults to `rect`.
    pub fn subsurface_with(
        &mut self,
        node: RenderId,
        rect: Rect,
        focus: bool,
        subpixel: bool,
        bounds: Option<Rect>,
    ) -> Result<RenderId, RenderError> {
        let bounds = bounds.unwrap_or(rect);
        let source = self.store.get(node);
        let source_size = source.size();
        let reverse = source.reverse;
        let mesh = source.mesh;

        let (rv, path) = if reverse.is_some_and(|r| r.has_depth_scale()) {
            (self.flatten_and_crop(node, rect)?, SubsurfacePath::Flatten)
        } else if mesh.is_some() || reverse.is_some_and(|r| r.axis_scale().is_none()) {
            log::debug!("subsurface of {node:?} falls back to clipping");
            (self.clip_fallback(node, rect, focus)?, SubsurfacePath::ClipFallback)
        } else {
            (
                self.partition(node, rect, bounds, focus, subpixel)?,
                SubsurfacePath::Partition,
            )
        };

        self.tracer().subsurface(&SubsurfaceEvent {
            source: source_size,
            crop: rect,
            path,
        });
        Ok(rv)
    }

    fn flatten_and_crop(&mut self, node: RenderId, rect: Rect) -> Result<RenderId, RenderError> {
        let texture = self.backend.render_to_texture(&self.store, node, true);
        let cropped = self.backend.crop_leaf(Child::Texture(texture), rect);
        let rv = self.store.create(rect.width(), rect.height());
        self.store.blit(rv, cropped, Point::ZERO, false, true)?;
        self.store.depends_on(rv, node)?;
        Ok(rv)
    }

    fn clip_fallback(
        &mut self,
        node: RenderId,
        rect: Rect,
        focus: bool,
    ) -> Result<RenderId, RenderError> {
        let rv = self.store.create(rect.width(), rect.height());
        self.store.set_clipping(rv, true, true);
        self.store
            .subpixel_blit(rv, node.into(), Point::new(-rect.x0, -rect.y0), focus, true)?;
        Ok(rv)
    }

    fn partition(
        &mut self,
        node: RenderId,
        rect: Rect,
        bounds: Rect,
        focus: bool,
        subpixel: bool,
    ) -> Result<RenderId, RenderError> {
        let source = self.store.get(node);
        let forward = source.forward;
        let reverse = source.reverse;
        let (x_clip, y_clip) = source.clipping();
        let children = source.children.clone();
        let regions: Vec<FocusRegion> = if focus {
            source.focuses.clone()
        } else {
            Vec::new()
        };

        // Children live in the space the reverse transform maps from.
        let (crop, bounds) = match reverse.and_then(|r| r.axis_scale()) {
            Some((sx, sy)) => (scale_rect(rect, sx, sy), scale_rect(bounds, sx, sy)),
            None => (rect, bounds),
        };

        let rv = self.store.create(rect.width(), rect.height());
        self.store.set_transforms(rv, forward, reverse);

        for entry in children {
            let size = match entry.child {
                Child::Render(c) => self.store.size(c),
                leaf => self.backend.leaf_size(leaf),
            };
            let xs = tighten(
                compute_subline(entry.offset.x, size.width, crop.x0, crop.width()),
                entry.offset.x,
                bounds.x0,
            );
            let ys = tighten(
                compute_subline(entry.offset.y, size.height, crop.y0, crop.height()),
                entry.offset.y,
                bounds.y0,
            );
            if xs.width <= 0.0 || ys.width <= 0.0 {
                continue;
            }
            let (child_crop, offset) = span_rect(xs, ys);
            let child_subpixel = subpixel || entry.mode != BlitMode::Pixel;

            let cropped = match entry.child {
                Child::Render(c) => {
                    if xs.crop >= size.width || ys.crop >= size.height {
                        continue;
                    }
                    let child_bounds = bounds - entry.offset.to_vec2();
                    let sub = self
                        .subsurface_with(c, child_crop, focus, child_subpixel, Some(child_bounds))
                        .map_err(|e| wrap_failure(size, child_crop, e))?;
                    let render_of = self.store.get(c).render_of.clone();
                    for d in render_of {
                        self.store.add_render_of(sub, d);
                    }
                    Child::Render(sub)
                }
                leaf => {
                    let cropped = self.backend.crop_leaf(leaf, child_crop);
                    self.backend.mutated_surface(cropped);
                    cropped
                }
            };

            let mode = if child_subpixel && entry.mode == BlitMode::Pixel {
                BlitMode::Subpixel
            } else {
                entry.mode
            };
            self.store
                .push_child(rv, cropped, offset, mode, entry.focus, entry.main)
                .map_err(|e| wrap_failure(size, child_crop, e.into()))?;
        }

        for region in regions {
            if let Some(region) = self.crop_focus(region, crop, subpixel)? {
                self.store.add_focus(rv, region)?;
            }
        }

        self.store.depends_on(rv, node)?;
        self.store.copy_state(node, rv);
        let result = self.store.node_mut(rv);
        result.x_clipping |= x_clip;
        result.y_clipping |= y_clip;
        Ok(rv)
    }

    /// Remaps a focus region into a crop. Returns `None` when the region
    /// falls outside it.
    fn crop_focus(
        &mut self,
        region: FocusRegion,
        crop: Rect,
        subpixel: bool,
    ) -> Result<Option<FocusRegion>, RenderError> {
        let Some(r) = region.rect else {
            return Ok(Some(region));
        };
        let xs = compute_subline(r.x0, r.width(), crop.x0, crop.width());
        let ys = compute_subline(r.y0, r.height(), crop.y0, crop.height());
        if xs.width <= 0.0 || ys.width <= 0.0 {
            return Ok(None);
        }
        let rect = Rect::new(xs.offset, ys.offset, xs.offset + xs.width, ys.offset + ys.width);

        let mask = match region.mask {
            None => None,
            Some(FocusMask {
                origin,
                source: MaskSource::Predicate(f),
            }) => Some(FocusMask {
                origin: origin - crop.origin().to_vec2(),
                source: MaskSource::Predicate(f),
            }),
            Some(FocusMask {
                origin,
                source: MaskSource::Render(m),
            }) => {
                let size = self.store.size(m);
                let mx = compute_subline(origin.x, size.width, crop.x0, crop.width());
                let my = compute_subline(origin.y, size.height, crop.y0, crop.height());
                if mx.width <= 0.0 || my.width <= 0.0 {
                    None
                } else {
                    let (mask_crop, mask_origin) = span_rect(mx, my);
                    let sub = self
                        .subsurface_with(m, mask_crop, false, subpixel, None)
                        .map_err(|e| wrap_failure(size, mask_crop, e))?;
                    Some(FocusMask {
                        origin: mask_origin,
                        source: MaskSource::Render(sub),
                    })
                }
            }
        };

        Ok(Some(FocusRegion {
            target: region.target,
            arg: region.arg,
            rect: Some(rect),
            mask,
        }))
    }

    /// Returns whether `node` draws an opaque pixel at `p`.
    ///
    /// Points outside the node's size are never opaque. Plain nodes are
    /// walked down to their leaves, topmost child first, and the backend
    /// samples the leaf. A node whose compositing the core cannot evaluate
    /// (mesh, shaders, a blend operation or partial alpha) has the pixel
    /// cropped out with a 1×1 subsurface, and the backend draws that.
    pub fn is_pixel_opaque(&mut self, node: RenderId, p: Point) -> bool {
        let source = self.store.get(node);
        let size = source.size();
        if p.x < 0.0 || p.y < 0.0 || p.x >= size.width || p.y >= size.height {
            return false;
        }
        if source.forward.is_some_and(|f| f.is_degenerate()) {
            return false;
        }

        let plain = source.mesh.is_none()
            && source.shaders.is_empty()
            && source.operation == Operation::Draw
            && source.alpha >= 1.0;
        if plain {
            let q = apply_optional(source.forward.as_ref(), p);
            for i in (0..source.children.len()).rev() {
                let entry = self.store.get(node).children[i];
                let local = q - entry.offset.to_vec2();
                let opaque = match entry.child {
                    Child::Render(c) => self.is_pixel_opaque(c, local),
                    leaf => self.is_leaf_pixel_opaque(leaf, local),
                };
                if opaque {
                    return true;
                }
            }
            return false;
        }

        let pixel = Rect::from_origin_size(p, Size::new(1.0, 1.0));
        match self.subsurface_with(node, pixel, false, true, None) {
            Ok(crop) => self.backend.is_pixel_opaque(&self.store, crop),
            Err(e) => {
                log::warn!("opacity query on {node:?} failed: {e}");
                false
            }
        }
    }

    /// Returns whether a surface or texture is opaque at `p`.
    pub(crate) fn is_leaf_pixel_opaque(&mut self, leaf: Child, p: Point) -> bool {
        let size = self.backend.leaf_size(leaf);
        if p.x < 0.0 || p.y < 0.0 || p.x >= size.width || p.y >= size.height {
            return false;
        }
        self.backend.is_leaf_pixel_opaque(leaf, p)
    }
}

fn scale_rect(r: Rect, sx: f64, sy: f64) -> Rect {
    Rect::new(r.x0 / sx, r.y0 / sy, r.x1 / sx, r.y1 / sy)
}

fn wrap_failure(child_size: Size, crop: Rect, source: RenderError) -> RenderError {
    RenderError::SubsurfaceFailure {
        child_size,
        crop,
        source: Box::new(source),
    }
}
