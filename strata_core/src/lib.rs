// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render tree, render cache and hit-testing for retained-mode 2D scenes.
//!
//! `strata_core` sits between a tree of *displayables* (visual elements that
//! know how to draw themselves) and a drawing backend. Displayables produce
//! *render nodes*: immutable-once-built descriptions of how to composite
//! child renders, raw surfaces and textures. Render nodes are memoized per
//! displayable and request, reused across frames, invalidated on demand and
//! reclaimed by a mark-and-sweep collector. It is `no_std` compatible (with
//! `alloc`) and stores nodes in a slot array addressed by generational
//! handles.
//!
//! # Architecture
//!
//! ```text
//!   Displayable::render ──► RenderStore (nodes) ◄── RenderCache (memo)
//!         ▲                       │                       ▲
//!         │                       ▼                       │
//!   RenderContext::render    subsurface / zoom      invalidate / redraws
//!                                 │
//!                                 ▼
//!   render_screen ──► screen root ──► resolve_point / take_focuses
//!                                 │
//!                                 ▼
//!                     run_garbage_collection
//! ```
//!
//! **[`node`]**: Render nodes, child entries and the generational
//! [`RenderStore`](node::RenderStore).
//!
//! **[`cache`]**: The per-displayable render cache keyed by size and
//! frame-relative time.
//!
//! **[`canvas`]**: Solid fills and canvases painted under the draw lock.
//!
//! **[`context`]**: [`RenderContext`](context::RenderContext), the single
//! owner of store, cache, redraw queue and frame state.
//!
//! **[`redraw`]**: Time-ordered eviction requests.
//!
//! **[`subsurface`]**: Cropping a render to a rectangle.
//!
//! **[`focus`]**: Focus enumeration and point-to-focus resolution.
//!
//! **[`gc`]**: Mark-and-sweep collection of unreachable nodes.
//!
//! **[`dirty`]**: Cache-kill propagation via `understory_dirty`.
//!
//! **[`backend`]**: Collaborator traits: drawing backend, clock and
//! external collection roots.
//!
//! **[`displayable`]**: The capability the cache consumes.
//!
//! **[`transform`]**: 4×4 transforms for node forward/reverse mapping.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Reports the identity
//!   of every node reclaimed by a collection.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod cache;
pub mod canvas;
pub mod config;
pub mod context;
pub mod dirty;
pub mod displayable;
pub mod error;
pub mod focus;
pub mod gc;
pub mod node;
pub mod redraw;
pub mod subsurface;
pub mod trace;
pub mod transform;
