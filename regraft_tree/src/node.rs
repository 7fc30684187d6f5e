// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable tree nodes, rooted snapshots, and the commit tag.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::props::Props;
use crate::types::{FamilyId, SurfaceId};

/// An immutable, versioned element of a tree.
///
/// A node's identity for mapping purposes is its [`FamilyId`], not its
/// address: two nodes describing the same logical UI element across two
/// snapshots share a family but are distinct values. Children are held by
/// shared reference, so multiple snapshots may reference the same subtree
/// (copy-on-write).
///
/// Nodes are never mutated after construction. The only way to "change" a
/// node is [`Node::clone_with`], which produces a new node sharing whatever
/// the caller passes through unchanged.
pub struct Node {
    family: FamilyId,
    props: Arc<dyn Props>,
    children: Vec<Arc<Node>>,
    state: Option<Arc<dyn Any + Send + Sync>>,
}

impl Node {
    /// Creates a node with no opaque state.
    #[must_use]
    pub fn new(family: FamilyId, props: Arc<dyn Props>, children: Vec<Arc<Self>>) -> Self {
        Self {
            family,
            props,
            children,
            state: None,
        }
    }

    /// Creates a node carrying host-opaque state.
    ///
    /// The state is never inspected by this crate; clones carry it through
    /// untouched.
    #[must_use]
    pub fn with_state(
        family: FamilyId,
        props: Arc<dyn Props>,
        children: Vec<Arc<Self>>,
        state: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            family,
            props,
            children,
            state: Some(state),
        }
    }

    /// Returns this node's family identity.
    #[must_use]
    #[inline]
    pub fn family(&self) -> FamilyId {
        self.family
    }

    /// Returns this node's property object.
    #[must_use]
    #[inline]
    pub fn props(&self) -> &Arc<dyn Props> {
        &self.props
    }

    /// Returns this node's ordered children.
    #[must_use]
    #[inline]
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Returns this node's opaque state, if any.
    #[must_use]
    pub fn state(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.state.as_ref()
    }

    /// The clone primitive: a new node with the given properties and
    /// children, the same family, and the same opaque state.
    #[must_use]
    pub fn clone_with(&self, props: Arc<dyn Props>, children: Vec<Arc<Self>>) -> Self {
        Self {
            family: self.family,
            props,
            children,
            state: self.state.clone(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("family", &self.family)
            .field("props", &self.props)
            .field("children", &self.children.len())
            .field("has_state", &self.state.is_some())
            .finish()
    }
}

const TAG_CLEAR: u8 = 0;
const TAG_ENGINE_PRODUCED: u8 = 1;
const TAG_MOUNT_PENDING: u8 = 2;

/// Observed state of a [`CommitTag`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagState {
    /// No tag is set.
    Clear,
    /// The snapshot was produced by the animation engine's own commit.
    EngineProduced,
    /// The snapshot is to be mounted by the animation engine.
    EngineMountPending,
}

/// The two-state commit trait carried on a snapshot.
///
/// The two tags are mutually exclusive, so they share a single atomic slot.
/// The animation engine sets `EngineProduced` when it builds a snapshot; the
/// commit hook reads and retags it exactly once on the next commit it
/// observes for that surface. The tag is the only mutable part of a
/// snapshot, which is why it is atomic: the hook retags snapshots it does
/// not exclusively own.
#[derive(Default)]
pub struct CommitTag(AtomicU8);

impl CommitTag {
    /// Creates a cleared tag.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(TAG_CLEAR))
    }

    /// Returns the current tag state.
    #[must_use]
    pub fn state(&self) -> TagState {
        match self.0.load(Ordering::Acquire) {
            TAG_ENGINE_PRODUCED => TagState::EngineProduced,
            TAG_MOUNT_PENDING => TagState::EngineMountPending,
            _ => TagState::Clear,
        }
    }

    /// Tags the snapshot as produced by the animation engine.
    pub fn mark_engine_produced(&self) {
        self.0.store(TAG_ENGINE_PRODUCED, Ordering::Release);
    }

    /// Tags the snapshot as to-be-mounted by the animation engine,
    /// replacing any previous tag.
    pub fn mark_mount_pending(&self) {
        self.0.store(TAG_MOUNT_PENDING, Ordering::Release);
    }

    /// Clears any tag.
    pub fn clear(&self) {
        self.0.store(TAG_CLEAR, Ordering::Release);
    }
}

impl fmt::Debug for CommitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommitTag").field(&self.state()).finish()
    }
}

/// An immutable rooted tree representing one committed state of a surface.
///
/// Snapshots share subtrees copy-on-write: the cloner replaces only nodes on
/// affected paths and reuses everything else by reference. Once published a
/// snapshot is never mutated in place (the [`CommitTag`] is metadata about
/// the commit, not tree content).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use regraft_tree::{FamilyId, MapProps, Node, Snapshot, SurfaceId, TagState};
///
/// let root = Arc::new(Node::new(
///     FamilyId::new(0),
///     Arc::new(MapProps::new()),
///     Vec::new(),
/// ));
/// let snapshot = Snapshot::new(SurfaceId::new(1), root);
/// assert_eq!(snapshot.tag().state(), TagState::Clear);
/// ```
pub struct Snapshot {
    surface: SurfaceId,
    root: Arc<Node>,
    tag: CommitTag,
}

impl Snapshot {
    /// Creates an untagged snapshot, as the renderer produces them.
    #[must_use]
    pub fn new(surface: SurfaceId, root: Arc<Node>) -> Self {
        Self {
            surface,
            root,
            tag: CommitTag::new(),
        }
    }

    /// Creates a snapshot tagged as produced by the animation engine.
    ///
    /// The engine uses this for the snapshots it builds itself, so the
    /// commit hook can pass them through without re-merging.
    #[must_use]
    pub fn engine_produced(surface: SurfaceId, root: Arc<Node>) -> Self {
        let snapshot = Self::new(surface, root);
        snapshot.tag.mark_engine_produced();
        snapshot
    }

    /// Returns the surface this snapshot belongs to.
    #[must_use]
    #[inline]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Returns the root node.
    #[must_use]
    #[inline]
    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Returns the commit tag.
    #[must_use]
    #[inline]
    pub fn tag(&self) -> &CommitTag {
        &self.tag
    }

    /// Replaces the root, keeping the surface and the current tag state.
    #[must_use]
    pub fn with_root(self, root: Arc<Node>) -> Self {
        Self {
            surface: self.surface,
            root,
            tag: self.tag,
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("surface", &self.surface)
            .field("tag", &self.tag)
            .field("root_family", &self.root.family())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::MapProps;
    use alloc::vec;

    fn leaf(family: u64) -> Arc<Node> {
        Arc::new(Node::new(
            FamilyId::new(family),
            Arc::new(MapProps::new()),
            Vec::new(),
        ))
    }

    #[test]
    fn clone_with_keeps_family_and_state() {
        let state: Arc<dyn Any + Send + Sync> = Arc::new(7_u32);
        let node = Node::with_state(
            FamilyId::new(1),
            Arc::new(MapProps::new()),
            vec![leaf(2)],
            Arc::clone(&state),
        );

        let cloned = node.clone_with(Arc::clone(node.props()), Vec::new());
        assert_eq!(cloned.family(), FamilyId::new(1));
        assert!(cloned.children().is_empty());
        let kept = cloned.state().expect("state carried through clone");
        assert!(Arc::ptr_eq(kept, &state));
    }

    #[test]
    fn tag_states_are_mutually_exclusive() {
        let tag = CommitTag::new();
        assert_eq!(tag.state(), TagState::Clear);

        tag.mark_engine_produced();
        assert_eq!(tag.state(), TagState::EngineProduced);

        tag.mark_mount_pending();
        assert_eq!(tag.state(), TagState::EngineMountPending);

        tag.clear();
        assert_eq!(tag.state(), TagState::Clear);
    }

    #[test]
    fn engine_produced_snapshot_is_tagged() {
        let snapshot = Snapshot::engine_produced(SurfaceId::new(1), leaf(0));
        assert_eq!(snapshot.tag().state(), TagState::EngineProduced);
    }

    #[test]
    fn with_root_keeps_surface_and_tag() {
        let snapshot = Snapshot::new(SurfaceId::new(4), leaf(0));
        snapshot.tag().mark_mount_pending();

        let replaced = snapshot.with_root(leaf(1));
        assert_eq!(replaced.surface(), SurfaceId::new(4));
        assert_eq!(replaced.tag().state(), TagState::EngineMountPending);
        assert_eq!(replaced.root().family(), FamilyId::new(1));
    }
}
