// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Only redraw passes carry a time. Every other event is stamped with the
//! time of the most recent redraw pass before it, so a frame's renders,
//! kills and collections line up behind the pass that started it.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Redraw times are converted from seconds to microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Redraw(e) => {
                ts = seconds_to_us(e.now);
                events.push(json!({
                    "ph": "i",
                    "name": "Redraw",
                    "cat": "Redraw",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "evicted": e.evicted,
                        "pending": e.pending,
                    }
                }));
            }
            RecordedEvent::Render(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.outcome),
                    "cat": "Render",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "displayable": e.displayable.0,
                        "requested": [e.requested.width, e.requested.height],
                        "clamped": [e.clamped.width, e.clamped.height],
                        "sizing": e.sizing,
                    }
                }));
            }
            RecordedEvent::CacheKill(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CacheKill",
                    "cat": "Cache",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "displayable": e.displayable.0,
                        "nodes": e.nodes,
                    }
                }));
            }
            RecordedEvent::Subsurface(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.path),
                    "cat": "Subsurface",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "source": [e.source.width, e.source.height],
                        "crop": [e.crop.x0, e.crop.y0, e.crop.x1, e.crop.y1],
                    }
                }));
            }
            RecordedEvent::Collect(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Collect",
                    "cat": "Gc",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "collection_index": e.collection_index,
                        "roots": e.roots,
                        "marked": e.marked,
                        "killed": e.killed,
                    }
                }));
            }
            RecordedEvent::CollectedNodesCount {
                collection_index,
                count,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "CollectedNodes",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "collection_index": collection_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn seconds_to_us(seconds: f64) -> f64 {
    seconds * 1_000_000.0
}
