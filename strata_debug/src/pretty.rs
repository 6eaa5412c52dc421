// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output and render tree dumps.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).
//! [`dump_tree`] renders a node and everything it depends on as an indented
//! outline.

use std::fmt::Write as _;
use std::io::Write;

use strata_core::node::{Child, RenderId, RenderStore};
use strata_core::trace::{
    CacheKillEvent, CacheOutcome, CollectEvent, RedrawEvent, RenderEvent, SubsurfaceEvent,
    SubsurfacePath, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn outcome_name(outcome: CacheOutcome) -> &'static str {
    match outcome {
        CacheOutcome::Hit => "hit",
        CacheOutcome::ClampedHit => "clamped-hit",
        CacheOutcome::Miss => "miss",
    }
}

fn path_name(path: SubsurfacePath) -> &'static str {
    match path {
        SubsurfacePath::Flatten => "flatten",
        SubsurfacePath::ClipFallback => "clip",
        SubsurfacePath::Partition => "partition",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_render(&mut self, e: &RenderEvent) {
        let sizing = if e.sizing { " sizing" } else { "" };
        let _ = writeln!(
            self.writer,
            "[render] d={} {}x{} -> {}x{} {}{sizing}",
            e.displayable.0,
            e.requested.width,
            e.requested.height,
            e.clamped.width,
            e.clamped.height,
            outcome_name(e.outcome),
        );
    }

    fn on_cache_kill(&mut self, e: &CacheKillEvent) {
        let _ = writeln!(
            self.writer,
            "[kill] d={} nodes={}",
            e.displayable.0, e.nodes,
        );
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        let _ = writeln!(
            self.writer,
            "[redraw] now={:.3}s evicted={} pending={}",
            e.now, e.evicted, e.pending,
        );
    }

    fn on_subsurface(&mut self, e: &SubsurfaceEvent) {
        let _ = writeln!(
            self.writer,
            "[subsurface] {}x{} crop=({}, {}, {}, {}) {}",
            e.source.width,
            e.source.height,
            e.crop.x0,
            e.crop.y0,
            e.crop.width(),
            e.crop.height(),
            path_name(e.path),
        );
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        let _ = writeln!(
            self.writer,
            "[gc] #{} roots={} marked={} killed={}",
            e.collection_index, e.roots, e.marked, e.killed,
        );
    }

    fn on_collected_nodes(&mut self, collection_index: u64, nodes: &[RenderId]) {
        let _ = writeln!(
            self.writer,
            "[gc:nodes] #{collection_index} {nodes:?}",
        );
    }
}

// ---------------------------------------------------------------------------
// Tree dump
// ---------------------------------------------------------------------------

/// Renders `root` and its children as an indented outline.
///
/// Each render node prints its size, the displayables it renders and any
/// non-default state; leaves print their backend handle. A node reached
/// through more than one parent is printed in full each time.
///
/// # Panics
///
/// Panics if `root` is stale.
#[must_use]
pub fn dump_tree(store: &RenderStore, root: RenderId) -> String {
    let mut out = String::new();
    dump_node(store, root, None, 0, &mut out);
    out
}

fn dump_node(
    store: &RenderStore,
    id: RenderId,
    offset: Option<(f64, f64)>,
    depth: usize,
    out: &mut String,
) {
    let node = store.get(id);
    let indent = depth * 2;
    let _ = write!(
        out,
        "{:indent$}render {} {}x{}",
        "",
        id.index(),
        node.width(),
        node.height(),
    );
    if let Some((x, y)) = offset {
        let _ = write!(out, " at ({x}, {y})");
    }
    if !node.render_of().is_empty() {
        let ids: Vec<u64> = node.render_of().iter().map(|d| d.0).collect();
        let _ = write!(out, " of {ids:?}");
    }
    if node.alpha() != 1.0 {
        let _ = write!(out, " alpha={}", node.alpha());
    }
    match node.clipping() {
        (true, true) => out.push_str(" clip"),
        (true, false) => out.push_str(" xclip"),
        (false, true) => out.push_str(" yclip"),
        (false, false) => {}
    }
    if node.reverse().is_some() {
        out.push_str(" transformed");
    }
    if node.modal().is_modal() {
        out.push_str(" modal");
    }
    if !node.focuses().is_empty() {
        let _ = write!(out, " focuses={}", node.focuses().len());
    }
    if node.is_cache_killed() {
        out.push_str(" killed");
    }
    out.push('\n');

    for entry in node.children() {
        let at = Some((entry.offset.x, entry.offset.y));
        match entry.child {
            Child::Render(child) => dump_node(store, child, at, depth + 1, out),
            Child::Surface(s) => {
                let _ = writeln!(
                    out,
                    "{:w$}surface {} at ({}, {})",
                    "",
                    s.0,
                    entry.offset.x,
                    entry.offset.y,
                    w = indent + 2,
                );
            }
            Child::Texture(t) => {
                let _ = writeln!(
                    out,
                    "{:w$}texture {} at ({}, {})",
                    "",
                    t.0,
                    entry.offset.x,
                    entry.offset.y,
                    w = indent + 2,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect, Size};
    use strata_core::node::{DisplayableId, SurfaceId};

    #[test]
    fn pretty_print_render() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_render(&RenderEvent {
            displayable: DisplayableId(4),
            requested: Size::new(200.0, 50.0),
            clamped: Size::new(100.0, 50.0),
            outcome: CacheOutcome::Miss,
            sizing: false,
        });
        sink.on_subsurface(&SubsurfaceEvent {
            source: Size::new(100.0, 50.0),
            crop: Rect::new(0.0, 0.0, 10.0, 10.0),
            path: SubsurfacePath::Partition,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[render] d=4 200x50 -> 100x50 miss"), "got: {output}");
        assert!(output.contains("partition"), "got: {output}");
    }

    #[test]
    fn dump_outlines_children() {
        let mut store = RenderStore::new();
        let root = store.create(100.0, 100.0);
        let child = store.create(20.0, 20.0);
        store
            .blit(child, SurfaceId(3).into(), Point::ZERO, false, true)
            .unwrap();
        store
            .blit(root, child.into(), Point::new(10.0, 5.0), true, true)
            .unwrap();
        store.set_clipping(root, true, true);

        let dump = dump_tree(&store, root);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3, "got: {dump}");
        assert!(lines[0].starts_with("render 0 100x100 clip"), "got: {dump}");
        assert_eq!(lines[1], "  render 1 20x20 at (10, 5)");
        assert_eq!(lines[2], "    surface 3 at (0, 0)");
    }
}
