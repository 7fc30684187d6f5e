// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regraft Commit: the commit-hook state machine.
//!
//! This crate is the stateful half of Regraft. On every renderer commit it
//! arbitrates between "the renderer produced this snapshot" and "the
//! animation engine already produced this snapshot", and on the external
//! path drains the pending-update registry and delegates tree mutation to
//! the path-copy cloner in `regraft_tree`.
//!
//! - [`CommitHook`]: the pre-commit callback; owns the surface high-water
//!   mark and the registry lock.
//! - [`UpdatesRegistry`]: the registry contract the hook drains, with
//!   [`PendingUpdates`] as a ready-made implementation including the
//!   pause / deferred-commit handshake.
//! - [`SurfaceRegistry`], [`SurfaceHandle`], [`MountDelegate`]: the narrow
//!   renderer seams needed for one-shot delegate attachment.
//! - [`CommitTrace`], [`CommitLog`]: additive observability for commit
//!   decisions.
//!
//! ## Threading
//!
//! The hook runs synchronously on whatever thread drives commits; all work
//! is CPU-bound tree traversal. Commits for different surfaces may run
//! concurrently, which is why the watermark and the registry each sit
//! behind their own lock. The registry lock is held across the entire merge
//! sequence so the engine never observes a half-drained registry.

mod hook;
mod registry;
mod surface;
mod trace;

pub use hook::CommitHook;
pub use registry::{PendingUpdates, UpdatesRegistry};
pub use surface::{MountDelegate, SurfaceHandle, SurfaceRegistry};
pub use trace::{CommitEvent, CommitLog, CommitTrace, NoTrace};
