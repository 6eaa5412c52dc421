// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation hooks for the render core.
//!
//! A [`TraceSink`] receives one call per interesting event: cache lookups,
//! cache kills, redraw draining, subsurface construction and collection.
//! All methods have empty default bodies so sinks implement only what they
//! need.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is off, every `Tracer` method compiles to nothing. When on, each method
//! performs a single `Option` branch before dispatching. The render context
//! owns the boxed sink and lends it to a fresh `Tracer` at each emission
//! point.
//!
//! Sinks shared as `Rc<RefCell<T>>` implement [`TraceSink`] too, so a caller
//! can keep a handle to a sink it installed on a context.
//!
//! The `trace-rich` feature additionally reports the identity of every node
//! reclaimed by a collection through
//! [`on_collected_nodes`](TraceSink::on_collected_nodes).

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::{Rect, Size};

use crate::node::DisplayableId;
#[cfg(feature = "trace-rich")]
use crate::node::RenderId;

/// How a render request was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
    /// Found under the requested key.
    Hit,
    /// Found under the clamped key after size clamping.
    ClampedHit,
    /// The displayable's render callback ran.
    Miss,
}

/// A completed render request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderEvent {
    /// The displayable that was rendered.
    pub displayable: DisplayableId,
    /// Size requested by the caller.
    pub requested: Size,
    /// Size after applying the displayable's constraints.
    pub clamped: Size,
    /// How the request was satisfied.
    pub outcome: CacheOutcome,
    /// Whether the request was made in sizing mode, so its result is not cached.
    pub sizing: bool,
}

/// A displayable's renders were evicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheKillEvent {
    /// The displayable whose entries were dropped.
    pub displayable: DisplayableId,
    /// Nodes flagged as cache-killed, including transitive parents.
    pub nodes: u32,
}

/// A pass over the redraw queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RedrawEvent {
    /// Time the queue was drained at.
    pub now: f64,
    /// Displayables evicted by this pass.
    pub evicted: u32,
    /// Requests still pending afterwards.
    pub pending: u32,
}

/// A garbage collection cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectEvent {
    /// Monotonic collection counter.
    pub collection_index: u64,
    /// Roots the mark phase started from.
    pub roots: u32,
    /// Nodes reached by the mark phase.
    pub marked: u32,
    /// Nodes reclaimed by the sweep phase.
    pub killed: u32,
}

/// Which construction a subsurface request took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubsurfacePath {
    /// The source was flattened to a texture, then cropped.
    Flatten,
    /// The source was wrapped whole in a clipping node.
    ClipFallback,
    /// Children were partitioned against the crop rectangle.
    Partition,
}

/// A subsurface was built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubsurfaceEvent {
    /// Size of the source node.
    pub source: Size,
    /// Crop rectangle in source coordinates.
    pub crop: Rect,
    /// Construction taken.
    pub path: SubsurfacePath,
}

/// Receiver for render-core events.
pub trait TraceSink {
    /// A render request completed.
    fn on_render(&mut self, e: &RenderEvent) {
        _ = e;
    }

    /// A displayable's cache entries were killed.
    fn on_cache_kill(&mut self, e: &CacheKillEvent) {
        _ = e;
    }

    /// The redraw queue was drained.
    fn on_redraw(&mut self, e: &RedrawEvent) {
        _ = e;
    }

    /// A subsurface was built.
    fn on_subsurface(&mut self, e: &SubsurfaceEvent) {
        _ = e;
    }

    /// A collection cycle finished.
    fn on_collect(&mut self, e: &CollectEvent) {
        _ = e;
    }

    /// Nodes reclaimed by a collection cycle.
    #[cfg(feature = "trace-rich")]
    fn on_collected_nodes(&mut self, collection_index: u64, nodes: &[RenderId]) {
        _ = (collection_index, nodes);
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_render(&mut self, e: &RenderEvent) {
        self.borrow_mut().on_render(e);
    }

    fn on_cache_kill(&mut self, e: &CacheKillEvent) {
        self.borrow_mut().on_cache_kill(e);
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        self.borrow_mut().on_redraw(e);
    }

    fn on_subsurface(&mut self, e: &SubsurfaceEvent) {
        self.borrow_mut().on_subsurface(e);
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        self.borrow_mut().on_collect(e);
    }

    #[cfg(feature = "trace-rich")]
    fn on_collected_nodes(&mut self, collection_index: u64, nodes: &[RenderId]) {
        self.borrow_mut().on_collected_nodes(collection_index, nodes);
    }
}

/// A sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RenderEvent`].
    #[inline]
    pub fn render(&mut self, e: &RenderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CacheKillEvent`].
    #[inline]
    pub fn cache_kill(&mut self, e: &CacheKillEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cache_kill(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RedrawEvent`].
    #[inline]
    pub fn redraw(&mut self, e: &RedrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_redraw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubsurfaceEvent`].
    #[inline]
    pub fn subsurface(&mut self, e: &SubsurfaceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_subsurface(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CollectEvent`].
    #[inline]
    pub fn collect(&mut self, e: &CollectEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_collect(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the nodes reclaimed by a collection (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn collected_nodes(&mut self, collection_index: u64, nodes: &[RenderId]) {
        if let Some(s) = &mut self.sink {
            s.on_collected_nodes(collection_index, nodes);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
