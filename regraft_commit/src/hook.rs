// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pre-commit hook: merge arbitration between renderer and engine.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use regraft_tree::{clone_with_props, Snapshot, SurfaceId, TagState};

use crate::registry::UpdatesRegistry;
use crate::surface::{MountDelegate, SurfaceRegistry};
use crate::trace::{CommitTrace, NoTrace};

/// Monotonic surface high-water mark.
///
/// Structurally prevents double-attaching the mounting delegate: a surface
/// is attached only while its id exceeds the mark, and the mark never
/// decreases.
#[derive(Debug, Default)]
struct Watermark {
    max: Option<SurfaceId>,
}

impl Watermark {
    fn covers(&self, surface: SurfaceId) -> bool {
        self.max.is_some_and(|max| surface <= max)
    }

    fn raise(&mut self, surface: SurfaceId) {
        self.max = Some(self.max.map_or(surface, |max| max.max(surface)));
    }
}

/// The transaction-scoped commit callback for every managed surface.
///
/// The renderer invokes [`CommitHook::will_commit`] synchronously, once per
/// commit, with the previous and the proposed snapshot; the hook returns the
/// snapshot that is actually committed. It decides whether the proposed
/// snapshot already embeds the animation engine's pending changes
/// (engine-produced, passed through) or needs them merged in (externally
/// produced, re-cloned via the path-copy cloner).
///
/// One hook instance serves the whole process; the two pieces of shared
/// state it owns (the surface high-water mark and the pending-update
/// registry) each sit behind their own lock. The registry is shared with
/// the animation engine via `Arc<Mutex<_>>` so the engine can enqueue while
/// the hook drains.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use regraft_commit::{
///     CommitHook, MountDelegate, PendingUpdates, SurfaceHandle, SurfaceRegistry,
/// };
/// use regraft_tree::{FamilyId, MapProps, Node, Snapshot, SurfaceId, TagState};
///
/// #[derive(Debug)]
/// struct Delegate;
/// impl MountDelegate for Delegate {}
///
/// struct NoSurfaces;
/// impl SurfaceRegistry for NoSurfaces {
///     fn enumerate(&self, _visit: &mut dyn FnMut(&dyn SurfaceHandle)) {}
/// }
///
/// let registry = Arc::new(Mutex::new(PendingUpdates::new()));
/// let hook = CommitHook::new(Arc::clone(&registry), Arc::new(Delegate));
///
/// let root = Arc::new(Node::new(FamilyId::new(0), Arc::new(MapProps::new()), Vec::new()));
/// let previous = Snapshot::new(SurfaceId::new(1), Arc::clone(&root));
/// let proposed = Snapshot::engine_produced(SurfaceId::new(1), root);
///
/// // No surfaces registered yet; engine-produced snapshots pass through.
/// let committed = hook.will_commit(&NoSurfaces, &previous, proposed);
/// assert_eq!(committed.tag().state(), TagState::EngineMountPending);
/// ```
pub struct CommitHook<R> {
    watermark: Mutex<Watermark>,
    registry: Arc<Mutex<R>>,
    delegate: Arc<dyn MountDelegate>,
}

impl<R: UpdatesRegistry> CommitHook<R> {
    /// Creates a hook over a shared registry and the engine's mounting
    /// delegate.
    #[must_use]
    pub fn new(registry: Arc<Mutex<R>>, delegate: Arc<dyn MountDelegate>) -> Self {
        Self {
            watermark: Mutex::new(Watermark::default()),
            registry,
            delegate,
        }
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Mutex<R>> {
        &self.registry
    }

    /// The pre-commit callback. See [`CommitHook`].
    #[must_use]
    pub fn will_commit(
        &self,
        surfaces: &dyn SurfaceRegistry,
        previous: &Snapshot,
        proposed: Snapshot,
    ) -> Snapshot {
        self.will_commit_with_trace(surfaces, previous, proposed, &mut NoTrace)
    }

    /// [`CommitHook::will_commit`] with a trace sink for commit decisions.
    #[must_use]
    pub fn will_commit_with_trace(
        &self,
        surfaces: &dyn SurfaceRegistry,
        previous: &Snapshot,
        proposed: Snapshot,
        trace: &mut dyn CommitTrace,
    ) -> Snapshot {
        // The renderer serializes commits per surface.
        debug_assert_eq!(
            previous.surface(),
            proposed.surface(),
            "previous and proposed snapshots must belong to the same surface"
        );

        self.attach_new_surfaces(surfaces, proposed.surface(), trace);

        if proposed.tag().state() == TagState::EngineProduced {
            // Committed by the engine itself: its latest values are already
            // embedded, so there is nothing to merge. Hand the snapshot to
            // the engine's mount pass instead.
            proposed.tag().mark_mount_pending();
            trace.engine_commit_passed_through(proposed.surface());
            return proposed;
        }

        proposed.tag().clear();

        // The registry lock spans drain → cancel-pause → clone → prune →
        // pause: no other thread may enqueue or toggle the pause flag
        // mid-merge.
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let overrides = registry.collect();
        registry.cancel_commit_after_pause();

        let result = clone_with_props(proposed.root(), &overrides);
        for family in &result.no_op_families {
            registry.force_remove(*family);
        }

        // This external commit may not reflect changes the engine wants to
        // layer on top; engine commits wait until they can re-base on it.
        // Without the pause, external commits could be starved behind
        // animation frames.
        registry.pause_commits();
        drop(registry);

        trace.merged(
            proposed.surface(),
            overrides.len(),
            result.no_op_families.len(),
        );

        proposed.with_root(result.new_root)
    }

    /// Attaches the mounting delegate to every surface above the high-water
    /// mark, then raises the mark.
    ///
    /// Runs under the watermark lock so two concurrent commits cannot both
    /// observe the same surface as new.
    fn attach_new_surfaces(
        &self,
        surfaces: &dyn SurfaceRegistry,
        incoming: SurfaceId,
        trace: &mut dyn CommitTrace,
    ) {
        let mut watermark = self
            .watermark
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if watermark.covers(incoming) {
            return;
        }

        let previous_max = watermark.max;
        surfaces.enumerate(&mut |handle| {
            let id = handle.surface_id();
            if previous_max.is_some_and(|max| id <= max) {
                return;
            }
            handle.attach_mount_delegate(&self.delegate);
            trace.delegate_attached(id);
            // Raise past every attached surface, not just the incoming one,
            // so an out-of-order registration cannot be attached twice.
            watermark.raise(id);
        });
        watermark.raise(incoming);
    }
}

impl<R> fmt::Debug for CommitHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitHook")
            .field("watermark", &self.watermark)
            .finish_non_exhaustive()
    }
}
