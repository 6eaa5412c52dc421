// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! The rich [`on_collected_nodes`](TraceSink::on_collected_nodes) event
//! stores only the count.

use kurbo::{Rect, Size};
use strata_core::node::{DisplayableId, RenderId};
use strata_core::trace::{
    CacheKillEvent, CacheOutcome, CollectEvent, RedrawEvent, RenderEvent, SubsurfaceEvent,
    SubsurfacePath, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RENDER: u8 = 1;
const TAG_CACHE_KILL: u8 = 2;
const TAG_REDRAW: u8 = 3;
const TAG_SUBSURFACE: u8 = 4;
const TAG_COLLECT: u8 = 5;
const TAG_COLLECTED_NODES_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_size(&mut self, s: Size) {
        self.write_f64(s.width);
        self.write_f64(s.height);
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_outcome(&mut self, o: CacheOutcome) {
        self.write_u8(match o {
            CacheOutcome::Hit => 0,
            CacheOutcome::ClampedHit => 1,
            CacheOutcome::Miss => 2,
        });
    }

    fn write_path(&mut self, p: SubsurfacePath) {
        self.write_u8(match p {
            SubsurfacePath::Flatten => 0,
            SubsurfacePath::ClipFallback => 1,
            SubsurfacePath::Partition => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_render(&mut self, e: &RenderEvent) {
        self.write_u8(TAG_RENDER);
        self.write_u64(e.displayable.0);
        self.write_size(e.requested);
        self.write_size(e.clamped);
        self.write_outcome(e.outcome);
        self.write_u8(u8::from(e.sizing));
    }

    fn on_cache_kill(&mut self, e: &CacheKillEvent) {
        self.write_u8(TAG_CACHE_KILL);
        self.write_u64(e.displayable.0);
        self.write_u32(e.nodes);
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        self.write_u8(TAG_REDRAW);
        self.write_f64(e.now);
        self.write_u32(e.evicted);
        self.write_u32(e.pending);
    }

    fn on_subsurface(&mut self, e: &SubsurfaceEvent) {
        self.write_u8(TAG_SUBSURFACE);
        self.write_size(e.source);
        self.write_rect(e.crop);
        self.write_path(e.path);
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        self.write_u8(TAG_COLLECT);
        self.write_u64(e.collection_index);
        self.write_u32(e.roots);
        self.write_u32(e.marked);
        self.write_u32(e.killed);
    }

    fn on_collected_nodes(&mut self, collection_index: u64, nodes: &[RenderId]) {
        self.write_u8(TAG_COLLECTED_NODES_COUNT);
        self.write_u64(collection_index);
        self.write_u32(u32::try_from(nodes.len()).unwrap_or(u32::MAX));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`RenderEvent`].
    Render(RenderEvent),
    /// A [`CacheKillEvent`].
    CacheKill(CacheKillEvent),
    /// A [`RedrawEvent`].
    Redraw(RedrawEvent),
    /// A [`SubsurfaceEvent`].
    Subsurface(SubsurfaceEvent),
    /// A [`CollectEvent`].
    Collect(CollectEvent),
    /// Number of nodes reclaimed by a collection.
    CollectedNodesCount {
        /// Collection counter.
        collection_index: u64,
        /// Number of reclaimed nodes.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        if self.remaining() < N {
            return None;
        }
        let v = self.data[self.pos..self.pos + N].try_into().ok()?;
        self.pos += N;
        Some(v)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    fn read_size(&mut self) -> Option<Size> {
        Some(Size::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_outcome(&mut self) -> Option<CacheOutcome> {
        Some(match self.read_u8()? {
            0 => CacheOutcome::Hit,
            1 => CacheOutcome::ClampedHit,
            _ => CacheOutcome::Miss,
        })
    }

    fn read_path(&mut self) -> Option<SubsurfacePath> {
        Some(match self.read_u8()? {
            0 => SubsurfacePath::Flatten,
            1 => SubsurfacePath::ClipFallback,
            _ => SubsurfacePath::Partition,
        })
    }

    fn decode_render(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Render(RenderEvent {
            displayable: DisplayableId(self.read_u64()?),
            requested: self.read_size()?,
            clamped: self.read_size()?,
            outcome: self.read_outcome()?,
            sizing: self.read_u8()? != 0,
        }))
    }

    fn decode_cache_kill(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CacheKill(CacheKillEvent {
            displayable: DisplayableId(self.read_u64()?),
            nodes: self.read_u32()?,
        }))
    }

    fn decode_redraw(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Redraw(RedrawEvent {
            now: self.read_f64()?,
            evicted: self.read_u32()?,
            pending: self.read_u32()?,
        }))
    }

    fn decode_subsurface(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Subsurface(SubsurfaceEvent {
            source: self.read_size()?,
            crop: self.read_rect()?,
            path: self.read_path()?,
        }))
    }

    fn decode_collect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Collect(CollectEvent {
            collection_index: self.read_u64()?,
            roots: self.read_u32()?,
            marked: self.read_u32()?,
            killed: self.read_u32()?,
        }))
    }

    fn decode_collected_nodes_count(&mut self) -> Option<RecordedEvent> {
        let collection_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::CollectedNodesCount {
            collection_index,
            count,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_RENDER => self.decode_render(),
            TAG_CACHE_KILL => self.decode_cache_kill(),
            TAG_REDRAW => self.decode_redraw(),
            TAG_SUBSURFACE => self.decode_subsurface(),
            TAG_COLLECT => self.decode_collect(),
            TAG_COLLECTED_NODES_COUNT => self.decode_collected_nodes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_render() -> RenderEvent {
        RenderEvent {
            displayable: DisplayableId(7),
            requested: Size::new(200.0, 40.0),
            clamped: Size::new(100.0, 40.0),
            outcome: CacheOutcome::ClampedHit,
            sizing: true,
        }
    }

    #[test]
    fn mixed_recording_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let render = sample_render();
        let subsurface = SubsurfaceEvent {
            source: Size::new(100.0, 100.0),
            crop: Rect::new(5.0, 5.0, 20.0, 20.0),
            path: SubsurfacePath::ClipFallback,
        };
        let collect = CollectEvent {
            collection_index: 3,
            roots: 1,
            marked: 12,
            killed: 4,
        };
        rec.on_render(&render);
        rec.on_subsurface(&subsurface);
        rec.on_redraw(&RedrawEvent {
            now: 1.5,
            evicted: 2,
            pending: 1,
        });
        rec.on_collect(&collect);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::Render(render),
                RecordedEvent::Subsurface(subsurface),
                RecordedEvent::Redraw(RedrawEvent {
                    now: 1.5,
                    evicted: 2,
                    pending: 1,
                }),
                RecordedEvent::Collect(collect),
            ]
        );
    }

    #[test]
    fn collected_nodes_store_only_the_count() {
        let mut rec = RecorderSink::new();
        rec.on_collected_nodes(9, &[]);
        rec.on_cache_kill(&CacheKillEvent {
            displayable: DisplayableId(1),
            nodes: 3,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::CollectedNodesCount {
                collection_index,
                count,
            } => {
                assert_eq!(*collection_index, 9);
                assert_eq!(*count, 0);
            }
            other => panic!("expected CollectedNodesCount, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_render(&sample_render());
        rec.on_render(&sample_render());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
