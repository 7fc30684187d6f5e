// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pending-update registry seam and a concrete implementation.
//!
//! The animation engine accumulates per-frame property updates in a
//! registry; the commit hook drains it exactly once per externally produced
//! commit. [`UpdatesRegistry`] is the contract the hook needs; the hook
//! holds its own lock around the whole merge sequence, so implementations
//! do not need interior synchronization.
//!
//! [`PendingUpdates`] is a ready-made registry for hosts that do not bring
//! their own, including the pause / deferred-commit handshake the engine
//! uses to re-base its commits on top of external ones.

use regraft_tree::{FamilyId, Patch, PropsMap};

/// The registry operations the commit hook consumes.
///
/// All methods are called with the hook's registry lock held; a call
/// sequence `collect` → `cancel_commit_after_pause` → (`force_remove`)* →
/// `pause_commits` is presented to the implementation as one atomic merge.
pub trait UpdatesRegistry {
    /// Drains every pending patch into an override queue, leaving the
    /// registry empty.
    fn collect(&mut self) -> PropsMap;

    /// Cancels a deferred "commit after pause" request: the commit being
    /// merged right now resolves whatever that request was waiting for.
    fn cancel_commit_after_pause(&mut self);

    /// Force-removes a family whose pending patch turned out to be
    /// redundant, so it neither accumulates nor gets reapplied.
    fn force_remove(&mut self, family: FamilyId);

    /// Pauses animation-engine-initiated commits until the engine can
    /// re-base on top of the commit being merged.
    fn pause_commits(&mut self);
}

/// A concrete pending-update registry.
///
/// Patches enqueue per family in arrival order; [`UpdatesRegistry::collect`]
/// preserves that order exactly, which the cloner's last-wins fold relies
/// on.
///
/// # Pause handshake
///
/// After the hook merges an external commit it pauses the engine
/// ([`UpdatesRegistry::pause_commits`]). An engine that wants to commit
/// while paused calls [`PendingUpdates::request_commit`], which records a
/// deferred request instead of granting one. When the engine has re-based,
/// [`PendingUpdates::resume_commits`] lifts the pause and reports whether a
/// deferred commit should run now.
///
/// # Example
///
/// ```
/// use regraft_commit::{PendingUpdates, UpdatesRegistry};
/// use regraft_tree::{FamilyId, Patch, PropValue};
///
/// let mut registry = PendingUpdates::new();
/// let mut patch = Patch::new();
/// patch.push("opacity", PropValue::Float(0.5));
/// registry.enqueue(FamilyId::new(1), patch);
///
/// let drained = registry.collect();
/// assert_eq!(drained.len(), 1);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct PendingUpdates {
    pending: PropsMap,
    paused: bool,
    commit_after_pause: bool,
}

impl PendingUpdates {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a patch to a family's queue, preserving arrival order.
    pub fn enqueue(&mut self, family: FamilyId, patch: Patch) {
        self.pending.entry(family).or_default().push(patch);
    }

    /// Returns the number of families with pending patches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no patches are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` if engine-initiated commits are currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Asks whether the engine may commit now.
    ///
    /// Returns `true` when not paused. When paused, records a deferred
    /// request and returns `false`; the caller must wait for
    /// [`Self::resume_commits`].
    pub fn request_commit(&mut self) -> bool {
        if self.paused {
            self.commit_after_pause = true;
            false
        } else {
            true
        }
    }

    /// Lifts the pause. Returns `true` if a commit was requested while
    /// paused (the request flag is consumed).
    pub fn resume_commits(&mut self) -> bool {
        self.paused = false;
        core::mem::take(&mut self.commit_after_pause)
    }
}

impl UpdatesRegistry for PendingUpdates {
    fn collect(&mut self) -> PropsMap {
        core::mem::take(&mut self.pending)
    }

    fn cancel_commit_after_pause(&mut self) {
        self.commit_after_pause = false;
    }

    fn force_remove(&mut self, family: FamilyId) {
        self.pending.remove(&family);
    }

    fn pause_commits(&mut self) {
        self.paused = true;
    }
}
