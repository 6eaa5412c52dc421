// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark-and-sweep collection of render nodes.
//!
//! Render nodes form a general directed graph (a child may be shared by many
//! parents, masks and uniforms add further edges), so they are reclaimed by
//! reachability rather than ownership:
//!
//! 1. **Mark**: breadth-first over `depends_on` from the roots, with an
//!    explicit worklist. Each node is marked once.
//! 2. **Sweep**: every candidate that was not marked is killed. Killing
//!    clears the node's edges and lists and frees its slot; any cache entry
//!    still naming it is dropped first.
//! 3. The marked set becomes the next cycle's candidate set, together with
//!    every node created in between.
//!
//! Collecting with no roots reclaims everything.

use alloc::vec::Vec;

use crate::cache::RenderCache;
use crate::node::{RenderId, RenderStore};
use crate::trace::{CollectEvent, Tracer};

/// Result of one collection cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Live roots the mark phase started from.
    pub roots: usize,
    /// Nodes reached by the mark phase, roots included.
    pub marked: usize,
    /// Nodes killed by the sweep phase.
    pub killed: usize,
}

/// Mark-and-sweep collector state.
#[derive(Debug, Default)]
pub struct Collector {
    live: Vec<RenderId>,
    collections: u64,
}

impl Collector {
    /// Creates a collector with an empty live set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes that survived the last collection.
    #[must_use]
    pub fn live(&self) -> &[RenderId] {
        &self.live
    }

    /// Number of collections run so far.
    #[must_use]
    pub fn collections(&self) -> u64 {
        self.collections
    }

    /// Runs one collection cycle.
    ///
    /// Roots that are no longer alive are ignored.
    pub fn collect(
        &mut self,
        store: &mut RenderStore,
        cache: &mut RenderCache,
        roots: &[RenderId],
        tracer: &mut Tracer<'_>,
    ) -> CollectSummary {
        let mut summary = CollectSummary::default();

        // -- Mark --
        let mut worklist: Vec<RenderId> = Vec::new();
        for &root in roots {
            if !store.is_alive(root) {
                log::warn!("ignoring stale collection root {root:?}");
                continue;
            }
            summary.roots += 1;
            let node = store.node_mut(root);
            if !node.mark {
                node.mark = true;
                worklist.push(root);
            }
        }

        let mut i = 0;
        while i < worklist.len() {
            let id = worklist[i];
            i += 1;
            let deps = store.get(id).depends_on.clone();
            for dep in deps {
                let node = store.node_mut(dep);
                if !node.mark {
                    node.mark = true;
                    worklist.push(dep);
                }
            }
        }
        summary.marked = worklist.len();

        // -- Sweep --
        let mut candidates = core::mem::take(&mut self.live);
        candidates.extend(store.take_added());

        #[cfg(feature = "trace-rich")]
        let mut killed_ids: Vec<RenderId> = Vec::new();

        for id in candidates {
            if !store.is_alive(id) || store.get(id).mark {
                continue;
            }
            cache.forget_node(id, &store.get(id).render_of);
            store.kill(id);
            summary.killed += 1;
            #[cfg(feature = "trace-rich")]
            killed_ids.push(id);
        }

        for &id in &worklist {
            store.node_mut(id).mark = false;
        }
        self.live = worklist;

        log::debug!(
            "collection {}: {} roots, {} marked, {} killed",
            self.collections,
            summary.roots,
            summary.marked,
            summary.killed
        );
        tracer.collect(&CollectEvent {
            collection_index: self.collections,
            roots: saturating_u32(summary.roots),
            marked: saturating_u32(summary.marked),
            killed: saturating_u32(summary.killed),
        });
        #[cfg(feature = "trace-rich")]
        tracer.collected_nodes(self.collections, &killed_ids);

        self.collections += 1;
        summary
    }

    /// Forgets the live set without touching the store.
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

pub(crate) fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::cache::CacheKey;
    use crate::node::DisplayableId;

    fn collect(
        gc: &mut Collector,
        store: &mut RenderStore,
        cache: &mut RenderCache,
        roots: &[RenderId],
    ) -> CollectSummary {
        gc.collect(store, cache, roots, &mut Tracer::none())
    }

    #[test]
    fn reachable_nodes_survive() {
        let mut store = RenderStore::new();
        let mut cache = RenderCache::new();
        let mut gc = Collector::new();

        let root = store.create(10.0, 10.0);
        let child = store.create(5.0, 5.0);
        let grandchild = store.create(1.0, 1.0);
        let orphan = store.create(1.0, 1.0);
        store.blit(root, child.into(), Point::ZERO, true, true).unwrap();
        store.blit(child, grandchild.into(), Point::ZERO, true, true).unwrap();
        store.blit(orphan, grandchild.into(), Point::ZERO, true, true).unwrap();

        let summary = collect(&mut gc, &mut store, &mut cache, &[root]);
        assert_eq!(summary.roots, 1);
        assert_eq!(summary.marked, 3);
        assert_eq!(summary.killed, 1);
        assert!(store.is_alive(root));
        assert!(store.is_alive(child));
        assert!(store.is_alive(grandchild));
        assert!(!store.is_alive(orphan));
        // The orphan's edge into the shared grandchild is gone.
        assert_eq!(store.get(grandchild).parents(), &[child]);
        // Marks are reset for the next cycle.
        assert!(!store.get(root).mark);
    }

    #[test]
    fn nodes_dropped_from_the_screen_die_next_cycle() {
        let mut store = RenderStore::new();
        let mut cache = RenderCache::new();
        let mut gc = Collector::new();

        let first = store.create(10.0, 10.0);
        collect(&mut gc, &mut store, &mut cache, &[first]);
        assert_eq!(gc.live(), &[first]);

        let second = store.create(10.0, 10.0);
        let summary = collect(&mut gc, &mut store, &mut cache, &[second]);
        assert_eq!(summary.killed, 1);
        assert!(!store.is_alive(first));
        assert!(store.is_alive(second));
    }

    #[test]
    fn zero_roots_kills_everything() {
        let mut store = RenderStore::new();
        let mut cache = RenderCache::new();
        let mut gc = Collector::new();

        let a = store.create(1.0, 1.0);
        let b = store.create(1.0, 1.0);
        store.blit(a, b.into(), Point::ZERO, true, true).unwrap();
        cache.insert(DisplayableId(1), CacheKey::new(1.0, 1.0, 0.0, 0.0), a);
        store.add_render_of(a, DisplayableId(1));

        let summary = collect(&mut gc, &mut store, &mut cache, &[]);
        assert_eq!(summary.killed, 2);
        assert_eq!(store.live_count(), 0);
        assert!(cache.is_empty());
        assert!(gc.live().is_empty());
    }

    #[test]
    fn stale_roots_are_ignored() {
        let mut store = RenderStore::new();
        let mut cache = RenderCache::new();
        let mut gc = Collector::new();

        let a = store.create(1.0, 1.0);
        collect(&mut gc, &mut store, &mut cache, &[]);
        let summary = collect(&mut gc, &mut store, &mut cache, &[a]);
        assert_eq!(summary.roots, 0);
        assert_eq!(gc.collections(), 2);
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut store = RenderStore::new();
        let mut cache = RenderCache::new();
        let mut gc = Collector::new();

        let root = store.create(1.0, 1.0);
        let mut parent = root;
        for _ in 0..10_000 {
            let child = store.create(1.0, 1.0);
            store.depends_on(parent, child).unwrap();
            parent = child;
        }
        let summary = collect(&mut gc, &mut store, &mut cache, &[root]);
        assert_eq!(summary.marked, 10_001);
        assert_eq!(summary.killed, 0);
    }
}
