// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Every dependency edge between render nodes ("`a` keeps `b` alive") is
//! mirrored into an [`understory_dirty`] graph as "`a` depends on `b`". When a
//! node is evicted from the render cache it is marked on [`CACHE_KILL`] with
//! [`EagerPolicy`](understory_dirty::EagerPolicy), which reaches every
//! composite that transitively includes it. Draining the channel yields the
//! full set of nodes to evict so a stale composite is never served.
//!
//! The graph is built with cycle detection enabled; a blit that would close a
//! dependency cycle is rejected at the call site.

use understory_dirty::Channel;

/// Cache eviction: propagates from a node to everything that depends on it.
pub const CACHE_KILL: Channel = Channel::new(0);
