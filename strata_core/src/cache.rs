// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized renders keyed by displayable, size and frame-relative time.
//!
//! The cache is two-level: displayable → ([`CacheKey`] → node). A displayable
//! may own several entries (different sizes or time bases), and two keys of
//! the same displayable may point at the same node when size clamping
//! collapsed them.
//!
//! The cache never destroys nodes. Evicting an entry only forgets the
//! mapping; the node stays allocated until the collector proves it
//! unreachable.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::node::{DisplayableId, RenderId};

/// The size and time part of a cache key.
///
/// Times are frame-relative (`frame_time - raw_time`), so repeated requests
/// within one logical frame collapse onto the same key. Components are
/// compared bitwise with `-0.0` folded into `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    width: u64,
    height: u64,
    st: u64,
    at: u64,
}

impl CacheKey {
    /// Builds a key from a size and two frame-relative times.
    #[must_use]
    pub fn new(width: f64, height: f64, st: f64, at: f64) -> Self {
        Self {
            width: bits(width),
            height: bits(height),
            st: bits(st),
            at: bits(at),
        }
    }

    /// Requested width.
    #[must_use]
    pub fn width(&self) -> f64 {
        f64::from_bits(self.width)
    }

    /// Requested height.
    #[must_use]
    pub fn height(&self) -> f64 {
        f64::from_bits(self.height)
    }

    /// Frame-relative shown time.
    #[must_use]
    pub fn st(&self) -> f64 {
        f64::from_bits(self.st)
    }

    /// Frame-relative animation time.
    #[must_use]
    pub fn at(&self) -> f64 {
        f64::from_bits(self.at)
    }

    /// Returns the key with every time component equal to `old` replaced by
    /// `new`.
    #[must_use]
    fn rebased(self, old: u64, new: u64) -> Self {
        Self {
            st: if self.st == old { new } else { self.st },
            at: if self.at == old { new } else { self.at },
            ..self
        }
    }
}

fn bits(v: f64) -> u64 {
    // Fold negative zero.
    (v + 0.0).to_bits()
}

/// Displayable → key → node map.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<DisplayableId, HashMap<CacheKey, RenderId>>,
}

impl RenderCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a memoized render.
    #[must_use]
    pub fn get(&self, d: DisplayableId, key: &CacheKey) -> Option<RenderId> {
        self.entries.get(&d)?.get(key).copied()
    }

    /// Stores a render under `key`, replacing any previous mapping.
    pub fn insert(&mut self, d: DisplayableId, key: CacheKey, node: RenderId) {
        self.entries.entry(d).or_default().insert(key, node);
    }

    /// Whether `d` has at least one entry.
    #[must_use]
    pub fn contains(&self, d: DisplayableId) -> bool {
        self.entries.contains_key(&d)
    }

    /// Removes every entry of `d`, returning the distinct nodes they named.
    pub fn evict(&mut self, d: DisplayableId) -> Vec<RenderId> {
        let mut nodes: Vec<RenderId> = Vec::new();
        if let Some(keys) = self.entries.remove(&d) {
            for node in keys.into_values() {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        nodes
    }

    /// Removes the entries of each displayable in `render_of` that point at
    /// `node`. Displayables left without entries are dropped.
    pub fn forget_node(&mut self, node: RenderId, render_of: &[DisplayableId]) {
        for d in render_of {
            let Some(keys) = self.entries.get_mut(d) else {
                continue;
            };
            keys.retain(|_, v| *v != node);
            if keys.is_empty() {
                self.entries.remove(d);
            }
        }
    }

    /// Returns the `(key, node)` entries of `d`, in unspecified order.
    #[must_use]
    pub fn entries_for(&self, d: DisplayableId) -> Vec<(CacheKey, RenderId)> {
        self.entries
            .get(&d)
            .map(|keys| keys.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default()
    }

    /// Rewrites every key whose shown or animation time equals `old_time` to
    /// use `new_time` instead, keeping the entries reachable after the frame
    /// time origin shifts.
    ///
    /// If a rewritten key collides with an existing one, the existing entry
    /// wins.
    pub fn rebase_times(&mut self, old_time: f64, new_time: f64) {
        let old = bits(old_time);
        let new = bits(new_time);
        if old == new {
            return;
        }
        for keys in self.entries.values_mut() {
            let moved: Vec<(CacheKey, RenderId)> = keys
                .iter()
                .filter(|(k, _)| k.st == old || k.at == old)
                .map(|(k, v)| (*k, *v))
                .collect();
            for (key, _) in &moved {
                keys.remove(key);
            }
            for (key, node) in moved {
                keys.entry(key.rebased(old, new)).or_insert(node);
            }
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of displayables with entries.
    #[must_use]
    pub fn displayable_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every displayable with entries.
    pub fn displayables(&self) -> impl Iterator<Item = DisplayableId> + '_ {
        self.entries.keys().copied()
    }
}
