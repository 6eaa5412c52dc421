// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child entries and per-node compositing state.

use alloc::rc::Rc;
use core::fmt;

use kurbo::{Point, Rect};

use super::id::{RenderId, SurfaceId, TextureId};
use crate::transform::Transform3d;

/// Something that can be composited into a render node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    /// Another render node.
    Render(RenderId),
    /// A raw pixel surface owned by the backend.
    Surface(SurfaceId),
    /// A texture (model) owned by the backend.
    Texture(TextureId),
}

impl Child {
    /// Returns the render handle if this child is a render node.
    #[inline]
    #[must_use]
    pub const fn as_render(self) -> Option<RenderId> {
        match self {
            Self::Render(id) => Some(id),
            _ => None,
        }
    }
}

impl From<RenderId> for Child {
    fn from(id: RenderId) -> Self {
        Self::Render(id)
    }
}

impl From<SurfaceId> for Child {
    fn from(id: SurfaceId) -> Self {
        Self::Surface(id)
    }
}

impl From<TextureId> for Child {
    fn from(id: TextureId) -> Self {
        Self::Texture(id)
    }
}

/// How a child's offset is interpreted by the drawing backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlitMode {
    /// Whole-pixel offsets.
    #[default]
    Pixel,
    /// Fractional offsets, preserved exactly.
    Subpixel,
    /// Absolute-unit offsets, independent of the drawable scale.
    Absolute,
}

/// One entry of a node's ordered child list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildEntry {
    /// What is drawn.
    pub child: Child,
    /// Offset of the child's origin in the parent's (pre-transform) space.
    pub offset: Point,
    /// How `offset` is interpreted.
    pub mode: BlitMode,
    /// Whether focus traversal descends into this child.
    pub focus: bool,
    /// Whether this child is a "main" child for inspection.
    pub main: bool,
}

/// Composite operation applied to a node's children by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Plain drawing.
    #[default]
    Draw,
    /// Cross-fade between the first two children.
    Dissolve,
    /// Dissolve driven by the first child's pixels.
    ImageDissolve,
    /// Pixellation of the first child.
    Pixellate,
    /// Flatten the children into one texture before drawing.
    Flatten,
}

/// Geometry source handed to the backend's shader pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mesh {
    /// A quad textured by the node's flattened children.
    Texture,
    /// A backend-defined mesh payload.
    Payload(u64),
}

/// A shader uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    /// A scalar.
    Float(f64),
    /// A two-component vector.
    Vec2([f64; 2]),
    /// A three-component vector.
    Vec3([f64; 3]),
    /// A four-component vector.
    Vec4([f64; 4]),
    /// A matrix.
    Transform(Transform3d),
    /// A render node sampled as a texture; adds a dependency edge.
    Render(RenderId),
    /// A backend texture.
    Texture(TextureId),
}

/// A backend draw property value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
}

/// How a node consumes focus from the nodes drawn beneath it.
#[derive(Clone, Default)]
pub enum Modal {
    /// Not modal.
    #[default]
    None,
    /// Everything beneath is blocked.
    Full,
    /// Only focus rectangles inside the node's screen rectangle are blocked.
    Window,
    /// The predicate decides, given a screen rectangle, whether it is blocked.
    Predicate(Rc<dyn Fn(Rect) -> bool>),
}

impl Modal {
    /// Returns `true` unless this is [`Modal::None`].
    #[inline]
    #[must_use]
    pub fn is_modal(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Full => f.write_str("Full"),
            Self::Window => f.write_str("Window"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
