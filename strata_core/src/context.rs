// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render context: one explicit owner for every piece of render state.
//!
//! A [`RenderContext`] holds the node store, the render cache, the redraw
//! queue, the collector's live set, the current screen render and the frame
//! time. There are no process-wide statics; independent contexts do not
//! interact.
//!
//! # Rendering
//!
//! [`render`](RenderContext::render) is the memoizing entry point:
//!
//! 1. Look up `(displayable, width, height, frame_time - st, frame_time - at)`.
//! 2. On a miss, clamp the size with the displayable's
//!    [`SizeConstraints`](crate::displayable::SizeConstraints) and look up
//!    again under the clamped key.
//! 3. On a second miss, call [`Displayable::render`], record the displayable
//!    in the node's `render_of`, crop to the node's own size if the
//!    displayable clips, and store the result under both keys.
//!
//! While [`render_for_size`](RenderContext::render_for_size) is active,
//! step 3 stores nothing.
//!
//! # Invalidation
//!
//! Outside of rendering, [`invalidate`](RenderContext::invalidate) becomes a
//! redraw due immediately, so repeated invalidations within a frame
//! coalesce. Inside rendering, or in per-frame mode, it evicts at once.
//! Eviction cascades to every node that transitively depends on an evicted
//! one, but nothing is destroyed until the next collection.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::backend::{Clock, DrawBackend, RootKind, RootSource};
use crate::cache::{CacheKey, RenderCache};
use crate::canvas::DrawLock;
use crate::config::RenderConfig;
use crate::displayable::Displayable;
use crate::error::{RenderError, Violation};
use crate::gc::{CollectSummary, Collector, saturating_u32};
use crate::node::{BlitMode, Child, DisplayableId, RenderId, RenderStore};
use crate::redraw::RedrawQueue;
use crate::trace::{CacheKillEvent, CacheOutcome, RedrawEvent, RenderEvent, TraceSink, Tracer};
use crate::transform::Transform3d;

/// All render state of one renderer instance.
pub struct RenderContext {
    pub(crate) store: RenderStore,
    pub(crate) cache: RenderCache,
    pub(crate) backend: Box<dyn DrawBackend>,
    redraws: RedrawQueue,
    collector: Collector,
    clock: Box<dyn Clock>,
    root_sources: Vec<Box<dyn RootSource>>,
    config: RenderConfig,
    trace_sink: Option<Box<dyn TraceSink>>,
    pub(crate) draw_lock: DrawLock,

    // -- Per-frame state --
    frame_time: Option<f64>,
    screen: Option<RenderId>,
    rendering: u32,
    per_frame: bool,
    sizing: bool,
    ready: bool,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("store", &self.store)
            .field("cache", &self.cache)
            .field("redraws", &self.redraws)
            .field("collector", &self.collector)
            .field("config", &self.config)
            .field("frame_time", &self.frame_time)
            .field("screen", &self.screen)
            .field("rendering", &self.rendering)
            .field("per_frame", &self.per_frame)
            .field("sizing", &self.sizing)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    /// Creates a context drawing through `backend` and reading time from
    /// `clock`.
    #[must_use]
    pub fn new(backend: Box<dyn DrawBackend>, clock: Box<dyn Clock>, config: RenderConfig) -> Self {
        Self {
            store: RenderStore::new(),
            cache: RenderCache::new(),
            backend,
            redraws: RedrawQueue::new(),
            collector: Collector::new(),
            clock,
            root_sources: Vec::new(),
            config,
            trace_sink: None,
            draw_lock: DrawLock::new(spin::Mutex::new(())),
            frame_time: None,
            screen: None,
            rendering: 0,
            per_frame: false,
            sizing: false,
            ready: false,
        }
    }

    // -- Accessors --

    /// The node store.
    #[must_use]
    pub fn store(&self) -> &RenderStore {
        &self.store
    }

    /// The node store, for building nodes inside a render callback.
    pub fn store_mut(&mut self) -> &mut RenderStore {
        &mut self.store
    }

    /// The render cache.
    #[must_use]
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// The drawing backend.
    #[must_use]
    pub fn backend(&self) -> &dyn DrawBackend {
        self.backend.as_ref()
    }

    /// The drawing backend, mutably.
    pub fn backend_mut(&mut self) -> &mut dyn DrawBackend {
        self.backend.as_mut()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The render recorded by the last [`render_screen`](Self::render_screen).
    #[must_use]
    pub fn screen_root(&self) -> Option<RenderId> {
        self.screen
    }

    /// Number of allocated, not yet collected nodes.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.store.live_count()
    }

    /// Pending redraw requests.
    #[must_use]
    pub fn redraws(&self) -> &RedrawQueue {
        &self.redraws
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(
        &mut self,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Option<Box<dyn TraceSink>> {
        core::mem::replace(&mut self.trace_sink, sink)
    }

    /// Registers an external cache whose renders are collection roots.
    pub fn add_root_source(&mut self, source: Box<dyn RootSource>) {
        self.root_sources.push(source);
    }

    pub(crate) fn tracer(&mut self) -> Tracer<'_> {
        tracer_for(&mut self.trace_sink)
    }

    // -- Frame state --

    /// Starts a frame at `frame_time`. Redraws can only be scheduled once a
    /// frame has begun.
    pub fn begin_frame(&mut self, frame_time: f64) {
        self.frame_time = Some(frame_time);
    }

    /// Time of the current frame, if one has begun.
    #[must_use]
    pub fn frame_time(&self) -> Option<f64> {
        self.frame_time
    }

    /// Signals that the renderer is ready. In developer mode, rendering
    /// before this is a precondition violation.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Enables per-frame mode, in which invalidation and redraws evict
    /// immediately instead of being queued.
    pub fn set_per_frame(&mut self, per_frame: bool) {
        self.per_frame = per_frame;
    }

    /// Whether a render callback is currently running.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.rendering > 0
    }

    /// Whether results are currently kept out of the cache.
    #[must_use]
    pub fn is_sizing(&self) -> bool {
        self.sizing
    }

    // -- Rendering --

    /// Returns the render of `d` at the requested size and time bases,
    /// calling [`Displayable::render`] only on a cache miss.
    pub fn render(
        &mut self,
        d: &dyn Displayable,
        width: f64,
        height: f64,
        st: f64,
        at: f64,
    ) -> Result<RenderId, RenderError> {
        if self.config.enforces_ready() && !self.ready {
            return Err(RenderError::PreconditionViolation(
                "render requested before the renderer is ready",
            ));
        }

        let id = d.id();
        let frame_time = self.frame_time.unwrap_or(0.0);
        let (rst, rat) = (frame_time - st, frame_time - at);
        let requested = Size::new(width, height);

        let orig_key = CacheKey::new(width, height, rst, rat);
        if let Some(hit) = self.cache.get(id, &orig_key) {
            self.trace_render(id, requested, requested, CacheOutcome::Hit);
            return Ok(hit);
        }

        let (width, height) = d.size_constraints().clamp(width, height);
        let clamped = Size::new(width, height);
        let key = CacheKey::new(width, height, rst, rat);
        if key != orig_key {
            if let Some(hit) = self.cache.get(id, &key) {
                self.trace_render(id, requested, clamped, CacheOutcome::ClampedHit);
                return Ok(hit);
            }
        }

        self.rendering += 1;
        let result = d.render(self, width, height, st, at);
        self.rendering -= 1;
        let mut rv = result?;

        if !self.store.is_alive(rv) {
            return Err(Violation::NotARender(id).into());
        }
        self.store.add_render_of(rv, id);

        if d.clipping() {
            let size = self.store.size(rv);
            rv = self.subsurface(rv, Rect::from_origin_size(Point::ZERO, size), true)?;
            self.store.add_render_of(rv, id);
        }

        if !self.sizing {
            self.cache.insert(id, key, rv);
            if key != orig_key {
                self.cache.insert(id, orig_key, rv);
            }
        }

        self.trace_render(id, requested, clamped, CacheOutcome::Miss);
        Ok(rv)
    }

    /// Like [`render`](Self::render), but nothing rendered during the call
    /// (including nested renders) is stored in the cache. Existing entries
    /// are still used.
    pub fn render_for_size(
        &mut self,
        d: &dyn Displayable,
        width: f64,
        height: f64,
        st: f64,
        at: f64,
    ) -> Result<RenderId, RenderError> {
        let old = core::mem::replace(&mut self.sizing, true);
        let result = self.render(d, width, height, st, at);
        self.sizing = old;
        result
    }

    /// Renders the root displayable of a frame and records it as the screen
    /// render for collection and hit-testing.
    pub fn render_screen(
        &mut self,
        root: &dyn Displayable,
        width: f64,
        height: f64,
    ) -> Result<RenderId, RenderError> {
        let rv = self.render(root, width, height, 0.0, 0.0)?;
        self.screen = Some(rv);
        Ok(rv)
    }

    fn trace_render(
        &mut self,
        displayable: DisplayableId,
        requested: Size,
        clamped: Size,
        outcome: CacheOutcome,
    ) {
        let sizing = self.sizing;
        self.tracer().render(&RenderEvent {
            displayable,
            requested,
            clamped,
            outcome,
            sizing,
        });
    }

    // -- Node helpers --

    /// Blits `child` into `parent` at whole-pixel `offset`.
    ///
    /// On model-based backends, raw surfaces are uploaded as textures first.
    pub fn blit(
        &mut self,
        parent: RenderId,
        child: impl Into<Child>,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), RenderError> {
        self.blit_with(parent, child.into(), offset, BlitMode::Pixel, focus, main)
    }

    /// Like [`blit`](Self::blit), keeping fractional offsets.
    pub fn subpixel_blit(
        &mut self,
        parent: RenderId,
        child: impl Into<Child>,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), RenderError> {
        self.blit_with(parent, child.into(), offset, BlitMode::Subpixel, focus, main)
    }

    /// Like [`blit`](Self::blit), with the offset in absolute units.
    pub fn absolute_blit(
        &mut self,
        parent: RenderId,
        child: impl Into<Child>,
        offset: Point,
        focus: bool,
        main: bool,
    ) -> Result<(), RenderError> {
        self.blit_with(parent, child.into(), offset, BlitMode::Absolute, focus, main)
    }

    pub(crate) fn blit_with(
        &mut self,
        parent: RenderId,
        child: Child,
        offset: Point,
        mode: BlitMode,
        focus: bool,
        main: bool,
    ) -> Result<(), RenderError> {
        let child = match child {
            Child::Surface(surface) if self.backend.is_model_based() => {
                Child::Texture(self.backend.load_texture(surface))
            }
            other => other,
        };
        self.store
            .push_child(parent, child, offset, mode, focus, main)?;
        Ok(())
    }

    /// Returns a node showing `node` scaled by `(xzoom, yzoom)`.
    ///
    /// A zero factor yields an empty node of zero extent on that axis.
    pub fn zoom(
        &mut self,
        node: RenderId,
        xzoom: f64,
        yzoom: f64,
    ) -> Result<RenderId, RenderError> {
        let size = self.store.size(node);
        let rv = self.store.create(size.width * xzoom, size.height * yzoom);
        if xzoom == 0.0 || yzoom == 0.0 {
            return Ok(rv);
        }
        self.store.set_transforms(
            rv,
            Some(Transform3d::from_scale(1.0 / xzoom, 1.0 / yzoom, 1.0)),
            Some(Transform3d::from_scale(xzoom, yzoom, 1.0)),
        );
        self.store.blit(rv, node.into(), Point::ZERO, true, true)?;
        Ok(rv)
    }

    /// Renders `d` at the size of `area` and blits it into `dest` where the
    /// displayable places it. Returns the chosen position.
    pub fn place(
        &mut self,
        dest: RenderId,
        d: &dyn Displayable,
        area: Rect,
        st: f64,
        at: f64,
        main: bool,
    ) -> Result<Point, RenderError> {
        let rv = self.render(d, area.width(), area.height(), st, at)?;
        let pos = d.place(area, self.store.size(rv));
        self.absolute_blit(dest, rv, pos, true, main)?;
        Ok(pos)
    }

    // -- Invalidation --

    /// Requests that the cached renders of `d` be discarded.
    ///
    /// Outside of rendering and per-frame mode this schedules a redraw due
    /// now; otherwise the renders are evicted immediately.
    pub fn invalidate(&mut self, d: DisplayableId) {
        if self.rendering == 0 && !self.per_frame {
            self.schedule_redraw(d, 0.0);
            return;
        }
        self.kill_cache_of(d);
    }

    /// Schedules the cached renders of `d` to be evicted `delay` seconds
    /// after the current frame time.
    ///
    /// Does nothing before the first frame. In per-frame mode the renders
    /// are evicted immediately.
    pub fn schedule_redraw(&mut self, d: DisplayableId, delay: f64) {
        let Some(frame_time) = self.frame_time else {
            return;
        };
        if self.per_frame {
            self.kill_cache_of(d);
            return;
        }
        self.redraws.push(frame_time + delay, d);
    }

    /// Whether any due redraw names a displayable that is still cached.
    pub fn check_due(&mut self) -> bool {
        let now = self.clock.now();
        let cache = &self.cache;
        self.redraws.check_due(now, |d| cache.contains(d))
    }

    /// Evicts every displayable whose redraw is due. Returns whether anything
    /// was evicted.
    pub fn drain_due(&mut self) -> bool {
        let now = self.clock.now();
        let cache = &self.cache;
        let due = self.redraws.take_due(now, |d| cache.contains(d));
        for d in &due {
            self.kill_cache_of(*d);
        }

        log::trace!(
            "drained {} redraws at {now}, {} pending",
            due.len(),
            self.redraws.len()
        );
        let pending = saturating_u32(self.redraws.len());
        self.tracer().redraw(&RedrawEvent {
            now,
            evicted: saturating_u32(due.len()),
            pending,
        });
        !due.is_empty()
    }

    /// Due time of the earliest pending redraw.
    pub fn next_due_time(&mut self) -> Option<f64> {
        self.redraws.next_due_time()
    }

    /// Rewrites cache keys whose time components equal `old_time` to
    /// `new_time`.
    pub fn rebase_times(&mut self, old_time: f64, new_time: f64) {
        self.cache.rebase_times(old_time, new_time);
    }

    /// Evicts every cached render of `d`, cascading to dependents. Returns
    /// the number of nodes flagged.
    fn kill_cache_of(&mut self, d: DisplayableId) -> usize {
        let mut flagged = 0;
        for node in self.cache.evict(d) {
            if !self.store.is_alive(node) {
                continue;
            }
            for killed in self.store.propagate_cache_kill(node) {
                let render_of = self.store.get(killed).render_of.clone();
                self.cache.forget_node(killed, &render_of);
                flagged += 1;
            }
        }
        log::trace!("cache kill of {d:?} flagged {flagged} nodes");
        self.tracer().cache_kill(&CacheKillEvent {
            displayable: d,
            nodes: saturating_u32(flagged),
        });
        flagged
    }

    // -- Collection --

    /// Reclaims every node unreachable from the screen render and the
    /// registered root sources.
    pub fn run_garbage_collection(&mut self) -> CollectSummary {
        let mut roots = Vec::new();
        if let Some(screen) = self.screen {
            roots.push(screen);
        }
        for source in &self.root_sources {
            if source.kind() == RootKind::VideoFrame && !self.config.constrained_platform {
                continue;
            }
            source.collect_roots(&mut roots);
        }
        let mut tracer = tracer_for(&mut self.trace_sink);
        self.collector
            .collect(&mut self.store, &mut self.cache, &roots, &mut tracer)
    }

    /// Drops the cache, the pending redraws and the screen render, then
    /// collects with no roots, reclaiming every node.
    ///
    /// Must not be called while a render is in progress.
    pub fn reset_all(&mut self) -> CollectSummary {
        self.cache.clear();
        self.redraws.clear();
        self.screen = None;
        let mut tracer = tracer_for(&mut self.trace_sink);
        self.collector
            .collect(&mut self.store, &mut self.cache, &[], &mut tracer)
    }

    /// In developer mode, resets everything and fails if any node survives.
    pub fn check_for_leaks(&mut self) -> Result<(), RenderError> {
        if !self.config.developer {
            return Ok(());
        }
        self.reset_all();
        let live = self.store.live_count();
        if live > 0 {
            log::error!("{live} renders are alive at shutdown");
            return Err(RenderError::LeakDetected { live });
        }
        Ok(())
    }
}

fn tracer_for(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => {
            let sink: &mut dyn TraceSink = sink.as_mut();
            Tracer::new(sink)
        }
        None => Tracer::none(),
    }
}
