// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed redraw requests.
//!
//! A redraw request asks for a displayable's cached renders to be evicted at
//! a due time. Requests are kept in a plain list that is stable-sorted by
//! due time before every scan; for equal due times the earlier request
//! sorts first. When drained, only the first request per displayable
//! counts.
//!
//! The queue knows nothing about the cache itself. [`RedrawQueue::check_due`]
//! and [`RedrawQueue::take_due`] take a membership predicate so that requests
//! naming a displayable that has already left the cache are discarded
//! silently.

use alloc::vec::Vec;

use crate::node::DisplayableId;

/// A pending, timed invalidation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RedrawRequest {
    /// Absolute time at which the displayable must be evicted.
    pub due: f64,
    /// The displayable to evict.
    pub displayable: DisplayableId,
}

/// Pending redraw requests.
#[derive(Clone, Debug, Default)]
pub struct RedrawQueue {
    requests: Vec<RedrawRequest>,
}

impl RedrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub fn push(&mut self, due: f64, displayable: DisplayableId) {
        self.requests.push(RedrawRequest { due, displayable });
    }

    /// Number of pending requests, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no request is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Pending requests, in the order of the last sort.
    #[must_use]
    pub fn requests(&self) -> &[RedrawRequest] {
        &self.requests
    }

    fn sort(&mut self) {
        self.requests.sort_by(|a, b| a.due.total_cmp(&b.due));
    }

    /// Returns whether any request due at `now` names a displayable for which
    /// `cached` holds.
    pub fn check_due(&mut self, now: f64, cached: impl Fn(DisplayableId) -> bool) -> bool {
        self.sort();
        self.requests
            .iter()
            .take_while(|r| r.due <= now)
            .any(|r| cached(r.displayable))
    }

    /// Removes and returns the displayables that must be evicted at `now`.
    ///
    /// Requests are deduplicated by displayable, keeping the earliest. A
    /// request whose displayable is no longer `cached` is dropped. A request
    /// that is not yet due is retained.
    pub fn take_due(
        &mut self,
        now: f64,
        cached: impl Fn(DisplayableId) -> bool,
    ) -> Vec<DisplayableId> {
        self.sort();

        let mut seen: Vec<DisplayableId> = Vec::new();
        let mut due = Vec::new();
        let mut kept = Vec::new();

        for request in self.requests.drain(..) {
            if seen.contains(&request.displayable) {
                continue;
            }
            seen.push(request.displayable);

            if !cached(request.displayable) {
                continue;
            }
            if request.due <= now {
                due.push(request.displayable);
            } else {
                kept.push(request);
            }
        }

        self.requests = kept;
        due
    }

    /// Due time of the earliest pending request.
    pub fn next_due_time(&mut self) -> Option<f64> {
        self.sort();
        self.requests.first().map(|r| r.due)
    }

    /// Drops every pending request.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    const A: DisplayableId = DisplayableId(1);
    const B: DisplayableId = DisplayableId(2);
    const C: DisplayableId = DisplayableId(3);

    #[test]
    fn next_due_time_is_the_minimum() {
        let mut q = RedrawQueue::new();
        assert_eq!(q.next_due_time(), None);
        q.push(5.0, A);
        q.push(2.0, B);
        q.push(9.0, C);
        assert_eq!(q.next_due_time(), Some(2.0));
    }

    #[test]
    fn check_due_ignores_evicted_displayables() {
        let mut q = RedrawQueue::new();
        q.push(1.0, A);
        q.push(3.0, B);
        assert!(!q.check_due(2.0, |d| d == B));
        assert!(q.check_due(2.0, |d| d == A));
        assert!(q.check_due(3.0, |d| d == B));
        // Checking never consumes.
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn take_due_splits_due_and_pending() {
        let mut q = RedrawQueue::new();
        q.push(1.0, A);
        q.push(10.0, B);
        let due = q.take_due(5.0, |_| true);
        assert_eq!(due, vec![A]);
        assert_eq!(q.requests(), &[RedrawRequest { due: 10.0, displayable: B }]);
    }

    #[test]
    fn take_due_keeps_first_request_per_displayable() {
        let mut q = RedrawQueue::new();
        q.push(8.0, A);
        q.push(1.0, A);
        q.push(2.0, A);
        let due = q.take_due(5.0, |_| true);
        assert_eq!(due, vec![A]);
        // The later duplicate is discarded rather than retained.
        assert!(q.is_empty());

        q.push(6.0, B);
        q.push(9.0, B);
        assert!(q.take_due(5.0, |_| true).is_empty());
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due_time(), Some(6.0));
    }

    #[test]
    fn take_due_drops_uncached_requests() {
        let mut q = RedrawQueue::new();
        q.push(1.0, A);
        q.push(9.0, B);
        let due = q.take_due(5.0, |_| false);
        assert!(due.is_empty());
        assert!(q.is_empty());
    }
}
