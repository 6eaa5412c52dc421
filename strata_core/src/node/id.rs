// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render, surface, texture and displayable identity types.

use core::fmt;

/// A handle to a render node in a [`RenderStore`](super::RenderStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is collected and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl RenderId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque reference to a raw pixel surface owned by the drawing backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// An opaque reference to a texture (model) owned by the drawing backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// The identity of a displayable.
///
/// Displayables are owned outside the core; this value is the only thing the
/// cache, the redraw queue and render nodes remember about them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayableId(pub u64);

impl fmt::Debug for DisplayableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayableId({})", self.0)
    }
}
