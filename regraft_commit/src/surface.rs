// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host renderer seams: surface enumeration and delegate attachment.
//!
//! The renderer owns a per-surface tree registry; the commit hook only
//! needs to enumerate it synchronously and attach the animation engine's
//! mounting delegate to each newly observed surface exactly once. These
//! traits keep that coupling narrow and object-safe.

use std::sync::Arc;

use regraft_tree::SurfaceId;

/// The animation engine's mounting-override delegate.
///
/// Opaque to this crate: it is attached to surfaces and never invoked here.
pub trait MountDelegate: Send + Sync {}

/// One registered surface, as exposed by the renderer's tree registry.
pub trait SurfaceHandle {
    /// The surface's identifier.
    fn surface_id(&self) -> SurfaceId;

    /// Attaches the mounting delegate to this surface.
    ///
    /// The renderer accumulates delegates in a list, so attaching twice for
    /// the same surface is a contract violation. The commit hook prevents
    /// that structurally with a monotonic surface high-water mark; an
    /// implementation does not need its own guard.
    fn attach_mount_delegate(&self, delegate: &Arc<dyn MountDelegate>);
}

/// Synchronous enumeration over the renderer's registered surfaces.
///
/// `visit` runs synchronously inside the registry walk and must not itself
/// commit or recurse into the registry.
pub trait SurfaceRegistry {
    /// Calls `visit` once per registered surface.
    fn enumerate(&self, visit: &mut dyn FnMut(&dyn SurfaceHandle));
}

impl<F> SurfaceRegistry for F
where
    F: Fn(&mut dyn FnMut(&dyn SurfaceHandle)),
{
    fn enumerate(&self, visit: &mut dyn FnMut(&dyn SurfaceHandle)) {
        self(visit);
    }
}
