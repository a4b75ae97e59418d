// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Caller-side helpers for recomputing summaries when the store changes.
//!
//! The store only reports [`Change`]s. Whoever displays a summary decides how
//! long to wait for a burst of writes to settle ([`Debouncer`]) and which of
//! several in-flight results to keep ([`LatestOnly`]).

use crate::store::Change;
use std::time::{Duration, Instant};

pub const DEFAULT_QUIET: Duration = Duration::from_millis(200);

/// Coalesces change notifications into a single "recompute now" signal once no
/// new change has arrived for `quiet`.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    last_change: Option<Instant>,
    pending: usize,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            last_change: None,
            pending: 0,
        }
    }

    pub fn record(&mut self, change: &Change, now: Instant) {
        tracing::trace!(?change, "change queued for recompute");
        self.last_change = Some(now);
        self.pending += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Returns the number of coalesced changes when the quiet period has
    /// elapsed, resetting the debouncer; `None` while still settling.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let last = self.last_change?;
        if now.saturating_duration_since(last) < self.quiet {
            return None;
        }
        let n = self.pending;
        self.pending = 0;
        self.last_change = None;
        Some(n)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

/// Ticket issued when a computation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Keeps only the result of the most recently started computation.
#[derive(Debug)]
pub struct LatestOnly<T> {
    issued: u64,
    applied: Option<(Ticket, T)>,
}

impl<T> LatestOnly<T> {
    pub fn new() -> Self {
        LatestOnly {
            issued: 0,
            applied: None,
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Applies `value` only if `ticket` is the newest issued. Stale results are
    /// dropped and `false` is returned.
    pub fn finish(&mut self, ticket: Ticket, value: T) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(stale = ticket.0, latest = self.issued, "discarded stale result");
            return false;
        }
        self.applied = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<&T> {
        self.applied.as_ref().map(|(_, v)| v)
    }
}

impl<T> Default for LatestOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}
