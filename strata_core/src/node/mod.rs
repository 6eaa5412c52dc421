// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render node data model.
//!
//! A *render node* describes how to composite its children. Each node has:
//!
//! - An identity ([`RenderId`]), a generational handle that becomes stale
//!   when the collector reclaims the node.
//! - An ordered child list of [`ChildEntry`] values: other renders, raw
//!   surfaces or textures, each with an offset and focus/main flags.
//! - Optional forward/reverse transforms, blend, clip, shader and modal
//!   state, and focus regions.
//! - Dependency edges: `depends_on` (everything the node keeps alive, a
//!   superset of its render children) and its inverse `parents`.
//!
//! The dependency relation across the store is a general directed graph (a
//! child may be blitted into many parents), so nodes are reclaimed by the
//! mark-and-sweep [`Collector`](crate::gc::Collector) rather than by
//! ownership.

mod child;
mod id;
mod store;

pub use child::{
    BlitMode, Child, ChildEntry, Mesh, Modal, Operation, PropertyValue, UniformValue,
};
pub use id::{DisplayableId, RenderId, SurfaceId, TextureId};
pub use store::{RenderNode, RenderStore};
