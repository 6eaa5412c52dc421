// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts: drawing backend, clock and external GC roots.
//!
//! The core never rasterizes anything. Everything it needs from the drawing
//! side goes through the narrow [`DrawBackend`] trait:
//!
//! - **Leaves**: sizes and crops of raw surfaces and textures.
//! - **Flattening**: [`render_to_texture`](DrawBackend::render_to_texture)
//!   when a subtree has to become a single texture (depth-scaled crops).
//! - **Opacity**: [`is_leaf_pixel_opaque`](DrawBackend::is_leaf_pixel_opaque)
//!   for focus masks and image-dissolve hit-testing, with
//!   [`is_pixel_opaque`](DrawBackend::is_pixel_opaque) for renders whose
//!   compositing only the backend can evaluate.
//! - **Fills and canvases**: [`solid`](DrawBackend::solid) leaves and
//!   CPU-drawn [`canvas_surface`](DrawBackend::canvas_surface)s painted with
//!   [`draw`](DrawBackend::draw).
//! - **Model mode**: whether raw surfaces are converted to textures as soon
//!   as they are blitted.
//!
//! The [`Clock`] supplies wall-clock time for redraw due-times, and
//! [`RootSource`]s contribute renders held by external caches (decoded
//! images, video frames) as collection roots.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(cx: &mut RenderContext, root: &dyn Displayable, frame_time: f64) {
//!     cx.begin_frame(frame_time);
//!
//!     // Timers that fired since the last frame evict their renders.
//!     cx.drain_due();
//!
//!     // Render: cache hits are reused, misses call Displayable::render.
//!     let screen = cx.render_screen(root, 1280.0, 720.0)?;
//!     backend.draw(cx.store(), screen);
//!
//!     // Reclaim every node the new screen no longer reaches.
//!     cx.run_garbage_collection();
//! }
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::canvas::{Color, DrawCommand};
use crate::node::{Child, RenderId, RenderStore, SurfaceId, TextureId};

/// The drawing backend, as seen by the render core.
///
/// Methods that take a [`Child`] are only ever called with
/// [`Child::Surface`] or [`Child::Texture`]; render children are handled by
/// the core itself.
pub trait DrawBackend {
    /// Whether the backend draws models (textures) rather than raw surfaces.
    ///
    /// When `true`, surfaces blitted through the context are converted with
    /// [`load_texture`](Self::load_texture) first.
    fn is_model_based(&self) -> bool {
        false
    }

    /// Uploads a raw surface as a texture.
    fn load_texture(&mut self, surface: SurfaceId) -> TextureId;

    /// Returns the size of a surface or texture.
    fn leaf_size(&self, leaf: Child) -> Size;

    /// Returns a new leaf showing `rect` of `leaf`.
    fn crop_leaf(&mut self, leaf: Child, rect: Rect) -> Child;

    /// Notifies the backend that a leaf's pixels were produced on the CPU and
    /// any cached upload must be refreshed.
    fn mutated_surface(&mut self, leaf: Child) {
        _ = leaf;
    }

    /// Flattens a render subtree into a single texture.
    fn render_to_texture(&mut self, store: &RenderStore, node: RenderId, alpha: bool) -> TextureId;

    /// Returns whether the (1×1) render `node` draws an opaque pixel at its
    /// origin.
    fn is_pixel_opaque(&mut self, store: &RenderStore, node: RenderId) -> bool;

    /// Returns whether a surface or texture is opaque at `p`, in leaf-local
    /// coordinates. `p` is always inside the leaf.
    fn is_leaf_pixel_opaque(&mut self, leaf: Child, p: Point) -> bool;

    /// Returns a leaf of `size` filled with `color`.
    fn solid(&mut self, size: Size, color: Color) -> Child;

    /// Allocates a transparent surface for CPU drawing.
    fn canvas_surface(&mut self, size: Size) -> SurfaceId;

    /// Paints one primitive into a canvas surface.
    ///
    /// Called with the context's draw lock held.
    fn draw(&mut self, surface: SurfaceId, command: &DrawCommand);
}

/// Wall-clock time source, in seconds.
pub trait Clock {
    /// Current time.
    fn now(&self) -> f64;
}

/// Which external cache a [`RootSource`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// Decoded-image cache; always consulted.
    ImageCache,
    /// Last decoded video frame; consulted on constrained platforms only.
    VideoFrame,
}

/// An external cache that keeps render nodes alive across collections.
pub trait RootSource {
    /// Which cache this is.
    fn kind(&self) -> RootKind {
        RootKind::ImageCache
    }

    /// Appends every render this cache currently holds.
    fn collect_roots(&self, out: &mut Vec<RenderId>);
}
