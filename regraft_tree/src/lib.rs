// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regraft Tree: immutable UI tree snapshots with path-copy cloning.
//!
//! This crate is the tree half of Regraft, the commit-time integration point
//! between an animation engine and a retained-mode renderer. It provides:
//!
//! - An immutable, copy-on-write tree model: [`Node`], [`Snapshot`], with
//!   stable cross-snapshot identity via [`FamilyId`].
//! - The host property seam: [`Props`] (per-node-kind equality and layered
//!   cloning), raw [`Patch`] values as the animation engine produces them,
//!   and [`MapProps`] for hosts with plain dynamic property maps.
//! - Ancestor-path resolution: [`ancestor_path`].
//! - The pure path-copy cloner: [`clone_with_props`], which applies a sparse
//!   [`PropsMap`] of per-family overrides while sharing every unaffected
//!   subtree by reference, and classifies no-op families for registry
//!   pruning.
//!
//! The commit-hook state machine that drives the cloner lives in the
//! `regraft_commit` crate; this crate is deliberately side-effect free.
//!
//! ## Sharing model
//!
//! Nodes own their children by shared reference, so several snapshots may
//! reference the same subtree. The cloner always produces new nodes along a
//! modified path (parent identity must change when a child reference does)
//! and never touches anything else. The only mutable element is the
//! [`CommitTag`] on a snapshot, which is commit metadata, not tree content.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cloner;
mod node;
mod path;
mod props;
mod types;

pub use cloner::{clone_with_props, CloneResult, PropsMap};
pub use node::{CommitTag, Node, Snapshot, TagState};
pub use path::{ancestor_path, AncestorPath};
pub use props::{MapProps, Patch, PropKey, Props, PropValue};
pub use types::{FamilyId, SurfaceId};
