// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity types: node families and surfaces.

use core::fmt;

/// Stable identity of a logical node across a tree's history.
///
/// Two nodes in different snapshots that describe the same logical UI element
/// share a `FamilyId` while being distinct node values. All maps in this
/// crate key nodes by family, never by address.
///
/// Families are allocated by the host's object graph; this crate only ever
/// compares them.
///
/// # Example
///
/// ```
/// use regraft_tree::FamilyId;
///
/// const ROOT: FamilyId = FamilyId::new(0);
/// const LABEL: FamilyId = FamilyId::new(1);
///
/// assert_ne!(ROOT, LABEL);
/// assert_eq!(LABEL.get(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(u64);

impl FamilyId {
    /// Creates a family identity from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this family identity.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FamilyId").field(&self.0).finish()
    }
}

/// Identifier of a UI surface (one rooted tree per surface).
///
/// Surface ids are totally ordered; the commit hook relies on the order being
/// monotonic in registration time to attach its mounting delegate to each
/// surface exactly once (see the commit crate's high-water mark).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    /// Creates a surface identifier from a raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this surface identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SurfaceId").field(&self.0).finish()
    }
}
