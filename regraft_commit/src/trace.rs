// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability helpers for commit decisions.
//!
//! The commit hook intentionally stores nothing about past commits. For many
//! embedders it is useful to answer questions like: "Why did this commit
//! skip the merge?" or "How many pending updates turned out redundant?".
//!
//! This module provides a minimal, additive hook:
//! [`CommitHook::will_commit_with_trace`](crate::CommitHook::will_commit_with_trace),
//! plus a small recorder, [`CommitLog`], which keeps the observed events in
//! order.

use regraft_tree::SurfaceId;

/// A callback sink for commit-hook tracing.
///
/// All methods have empty default bodies, so implementations only override
/// what they care about.
pub trait CommitTrace {
    /// Called when the mounting delegate is attached to a newly observed
    /// surface.
    fn delegate_attached(&mut self, surface: SurfaceId) {
        let _ = surface;
    }

    /// Called when a snapshot produced by the animation engine is passed
    /// through without merging.
    fn engine_commit_passed_through(&mut self, surface: SurfaceId) {
        let _ = surface;
    }

    /// Called after an externally produced snapshot was merged.
    ///
    /// `override_count` is the number of families drained from the registry;
    /// `no_op_count` of those produced no property change and were pruned.
    fn merged(&mut self, surface: SurfaceId, override_count: usize, no_op_count: usize) {
        let _ = (surface, override_count, no_op_count);
    }
}

/// A [`CommitTrace`] that records nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTrace;

impl CommitTrace for NoTrace {}

/// One recorded commit-hook event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommitEvent {
    /// The mounting delegate was attached to a surface.
    DelegateAttached(SurfaceId),
    /// An engine-produced snapshot was passed through unmerged.
    EnginePassThrough(SurfaceId),
    /// An external snapshot was merged.
    Merged {
        /// The surface that committed.
        surface: SurfaceId,
        /// Families drained from the registry for this merge.
        overrides: usize,
        /// Drained families classified as no-ops and pruned.
        no_ops: usize,
    },
}

/// Records commit events in observation order.
#[derive(Clone, Debug, Default)]
pub struct CommitLog {
    events: Vec<CommitEvent>,
}

impl CommitLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CommitEvent] {
        &self.events
    }

    /// Clears all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl CommitTrace for CommitLog {
    fn delegate_attached(&mut self, surface: SurfaceId) {
        self.events.push(CommitEvent::DelegateAttached(surface));
    }

    fn engine_commit_passed_through(&mut self, surface: SurfaceId) {
        self.events.push(CommitEvent::EnginePassThrough(surface));
    }

    fn merged(&mut self, surface: SurfaceId, override_count: usize, no_op_count: usize) {
        self.events.push(CommitEvent::Merged {
            surface,
            overrides: override_count,
            no_ops: no_op_count,
        });
    }
}
