// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal path-copy tree cloning.
//!
//! [`clone_with_props`] takes an immutable tree and a sparse map of
//! per-family property overrides and produces a new tree that shares every
//! unaffected subtree with the old one by reference, replacing only the
//! nodes on the paths from each overridden family up to the root. It also
//! reports which overridden families turned out to be no-ops, so the caller
//! can prune their pending patches instead of reapplying them forever.
//!
//! The function is pure: no observable side effects, safe to call
//! concurrently for independent trees.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::node::Node;
use crate::path::ancestor_path;
use crate::props::{Patch, Props};
use crate::types::FamilyId;

/// Per-commit override queue: family → ordered pending patches.
///
/// Built once per commit by draining the pending-update registry; consumed
/// and discarded within that commit. Queue order is exactly enqueue order.
pub type PropsMap = HashMap<FamilyId, SmallVec<[Patch; 1]>>;

/// Ancestor family → indices of children with an affected descendant.
///
/// Derived from the override queue's ancestor paths; an ancestor appears
/// here iff at least one of its direct or transitive descendants is a key
/// in the override queue. Used only within one clone operation.
type ChildrenMap = HashMap<FamilyId, HashSet<usize>>;

/// The outcome of one clone operation.
#[derive(Debug)]
pub struct CloneResult {
    /// The rebuilt root. Reference-identical to the old root when nothing
    /// in the override queue was reachable.
    pub new_root: Arc<Node>,
    /// Families whose queued patches produced no actual property change.
    pub no_op_families: Vec<FamilyId>,
}

/// Applies a sparse override queue to an immutable tree.
///
/// Every subtree without an affected descendant is reused by reference;
/// every node on a path from an overridden family to the root is re-wrapped
/// (parent identity must change when a child reference changes). Each
/// overridden family's properties are merged exactly once, no matter how
/// many affected ancestors sit above it.
///
/// Families in `overrides` that do not occur under `old_root` are silently
/// dropped: their ancestor-path lookup yields nothing, so they never enter
/// the affected-children map and cannot be classified as no-ops either.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use regraft_tree::{
///     clone_with_props, FamilyId, MapProps, Node, Patch, PropsMap, PropValue,
/// };
///
/// let leaf = Arc::new(Node::new(
///     FamilyId::new(1),
///     Arc::new(MapProps::new().with("opacity", PropValue::Float(1.0))),
///     Vec::new(),
/// ));
/// let root = Arc::new(Node::new(
///     FamilyId::new(0),
///     Arc::new(MapProps::new()),
///     vec![Arc::clone(&leaf)],
/// ));
///
/// let mut patch = Patch::new();
/// patch.push("opacity", PropValue::Float(0.5));
/// let mut overrides = PropsMap::default();
/// overrides.entry(FamilyId::new(1)).or_default().push(patch);
///
/// let result = clone_with_props(&root, &overrides);
/// assert!(!Arc::ptr_eq(&result.new_root, &root));
/// assert!(result.no_op_families.is_empty());
/// ```
#[must_use]
pub fn clone_with_props(old_root: &Arc<Node>, overrides: &PropsMap) -> CloneResult {
    let mut children_map = ChildrenMap::default();
    for family in overrides.keys() {
        let Some(path) = ancestor_path(old_root, *family) else {
            // Already unmounted (or never mounted): drop silently.
            continue;
        };
        // Walk target→root so shared ancestors accumulate the indices of
        // all their affected descendants, each recorded once.
        for (ancestor, index) in path.iter().rev() {
            let affected = children_map.entry(ancestor.family()).or_default();
            if affected.contains(index) {
                continue;
            }
            affected.insert(*index);
        }
    }

    if children_map.is_empty() && !overrides.contains_key(&old_root.family()) {
        // Nothing reachable: the old tree is the new tree.
        return CloneResult {
            new_root: Arc::clone(old_root),
            no_op_families: Vec::new(),
        };
    }

    let mut no_op_families = Vec::new();
    let new_root = rebuild(old_root, &children_map, overrides, &mut no_op_families);
    CloneResult {
        new_root,
        no_op_families,
    }
}

fn rebuild(
    node: &Arc<Node>,
    children_map: &ChildrenMap,
    overrides: &PropsMap,
    no_op_families: &mut Vec<FamilyId>,
) -> Arc<Node> {
    let mut children = node.children().to_vec();
    if let Some(affected) = children_map.get(&node.family()) {
        for &index in affected {
            let rebuilt = rebuild(&children[index], children_map, overrides, no_op_families);
            children[index] = rebuilt;
        }
    }

    let (props, is_no_op) = merge_props(node, overrides);
    if is_no_op {
        no_op_families.push(node.family());
    }

    Arc::new(node.clone_with(props, children))
}

/// Merges a node's queued patches into its properties.
///
/// Returns the (possibly reused) property object and whether the merge was
/// a no-op. A queue of several patches is folded last-wins into one before
/// the equality check; comparing patches one at a time against a moving
/// target would misclassify.
fn merge_props(node: &Node, overrides: &PropsMap) -> (Arc<dyn Props>, bool) {
    let Some(queue) = overrides.get(&node.family()) else {
        // Pass-through: on an affected path but not itself overridden.
        return (Arc::clone(node.props()), false);
    };

    let folded;
    let patch = match queue.as_slice() {
        [single] => single,
        many => {
            folded = Patch::fold(many);
            &folded
        }
    };

    if node.props().satisfies(patch) {
        (Arc::clone(node.props()), true)
    } else {
        (node.props().with_patch(patch), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{MapProps, PropValue};
    use alloc::vec;

    fn props(entries: &[(&'static str, f64)]) -> Arc<MapProps> {
        let mut map = MapProps::new();
        for (key, value) in entries {
            map.set(*key, PropValue::Float(*value));
        }
        Arc::new(map)
    }

    fn node(family: u64, props: Arc<MapProps>, children: Vec<Arc<Node>>) -> Arc<Node> {
        Arc::new(Node::new(FamilyId::new(family), props, children))
    }

    fn patch(entries: &[(&'static str, f64)]) -> Patch {
        let mut patch = Patch::new();
        for (key, value) in entries {
            patch.push(*key, PropValue::Float(*value));
        }
        patch
    }

    fn overrides_for(family: u64, patches: Vec<Patch>) -> PropsMap {
        let mut map = PropsMap::default();
        map.insert(FamilyId::new(family), patches.into_iter().collect());
        map
    }

    /// Root(0)(A(1)(B(2), C(3)))
    fn sample_tree() -> Arc<Node> {
        let b = node(2, props(&[("opacity", 1.0)]), Vec::new());
        let c = node(3, props(&[]), Vec::new());
        let a = node(1, props(&[]), vec![b, c]);
        node(0, props(&[]), vec![a])
    }

    fn child<'a>(node: &'a Arc<Node>, index: usize) -> &'a Arc<Node> {
        &node.children()[index]
    }

    #[test]
    fn rebuilds_path_and_shares_siblings() {
        let root = sample_tree();
        let old_a = Arc::clone(child(&root, 0));
        let old_c = Arc::clone(child(&old_a, 1));

        let overrides = overrides_for(2, vec![patch(&[("opacity", 0.5)])]);
        let result = clone_with_props(&root, &overrides);

        assert!(result.no_op_families.is_empty());
        assert!(!Arc::ptr_eq(&result.new_root, &root));

        let new_a = child(&result.new_root, 0);
        let new_b = child(new_a, 0);
        let new_c = child(new_a, 1);

        // Every node on the affected path is re-wrapped.
        assert!(!Arc::ptr_eq(new_a, &old_a));
        assert!(!Arc::ptr_eq(new_b, child(&old_a, 0)));
        // The untouched sibling is the exact same reference.
        assert!(Arc::ptr_eq(new_c, &old_c));

        let merged = new_b.props();
        let mut expect = Patch::new();
        expect.push("opacity", PropValue::Float(0.5));
        assert!(merged.satisfies(&expect));
    }

    #[test]
    fn matching_patch_is_a_no_op_with_shared_props() {
        let root = sample_tree();
        let old_b = Arc::clone(child(child(&root, 0), 0));

        let overrides = overrides_for(2, vec![patch(&[("opacity", 1.0)])]);
        let result = clone_with_props(&root, &overrides);

        assert_eq!(result.no_op_families, vec![FamilyId::new(2)]);

        // B is still re-wrapped (the tree is immutable and its ancestors
        // changed), but its property object is reference-identical.
        let new_b = child(child(&result.new_root, 0), 0);
        assert!(!Arc::ptr_eq(new_b, &old_b));
        assert!(Arc::ptr_eq(new_b.props(), old_b.props()));
    }

    #[test]
    fn unreachable_family_returns_identical_tree() {
        let root = sample_tree();
        let overrides = overrides_for(99, vec![patch(&[("opacity", 0.0)])]);

        let result = clone_with_props(&root, &overrides);
        assert!(Arc::ptr_eq(&result.new_root, &root));
        assert!(result.no_op_families.is_empty());
    }

    #[test]
    fn empty_overrides_return_identical_tree() {
        let root = sample_tree();
        let result = clone_with_props(&root, &PropsMap::default());
        assert!(Arc::ptr_eq(&result.new_root, &root));
        assert!(result.no_op_families.is_empty());
    }

    #[test]
    fn override_on_root_rebuilds_root_only() {
        let root = sample_tree();
        let old_a = Arc::clone(child(&root, 0));

        let overrides = overrides_for(0, vec![patch(&[("opacity", 0.25)])]);
        let result = clone_with_props(&root, &overrides);

        assert!(!Arc::ptr_eq(&result.new_root, &root));
        assert!(Arc::ptr_eq(child(&result.new_root, 0), &old_a));

        let mut expect = Patch::new();
        expect.push("opacity", PropValue::Float(0.25));
        assert!(result.new_root.props().satisfies(&expect));
    }

    #[test]
    fn overrides_on_two_siblings_rebuild_shared_ancestors_once() {
        // Root(0)(A(1)(B(2), C(3))): override both B and C. A and Root are
        // on both paths; they must be rebuilt once each and B's and C's
        // props merged exactly once.
        let root = sample_tree();

        let mut overrides = overrides_for(2, vec![patch(&[("opacity", 0.5)])]);
        overrides
            .entry(FamilyId::new(3))
            .or_default()
            .push(patch(&[("scale", 2.0)]));

        let result = clone_with_props(&root, &overrides);
        assert!(result.no_op_families.is_empty());

        let new_a = child(&result.new_root, 0);
        let b_props = child(new_a, 0).props();
        let c_props = child(new_a, 1).props();

        let mut expect_b = Patch::new();
        expect_b.push("opacity", PropValue::Float(0.5));
        assert!(b_props.satisfies(&expect_b));

        let mut expect_c = Patch::new();
        expect_c.push("scale", PropValue::Float(2.0));
        assert!(c_props.satisfies(&expect_c));
    }

    #[test]
    fn multi_patch_queue_folds_before_comparison() {
        // B already has opacity 1.0. Two patches: 0.5 then back to 1.0.
        // Folded last-wins the queue is a no-op; applying one at a time
        // against a moving target would produce a spurious rebuild.
        let root = sample_tree();
        let old_b = Arc::clone(child(child(&root, 0), 0));

        let overrides = overrides_for(
            2,
            vec![patch(&[("opacity", 0.5)]), patch(&[("opacity", 1.0)])],
        );
        let result = clone_with_props(&root, &overrides);

        assert_eq!(result.no_op_families, vec![FamilyId::new(2)]);
        let new_b = child(child(&result.new_root, 0), 0);
        assert!(Arc::ptr_eq(new_b.props(), old_b.props()));
    }

    #[test]
    fn multi_patch_queue_applies_in_enqueue_order() {
        let root = sample_tree();
        let overrides = overrides_for(
            2,
            vec![patch(&[("opacity", 0.25)]), patch(&[("opacity", 0.75)])],
        );

        let result = clone_with_props(&root, &overrides);
        assert!(result.no_op_families.is_empty());

        let new_b = child(child(&result.new_root, 0), 0);
        let mut expect = Patch::new();
        expect.push("opacity", PropValue::Float(0.75));
        assert!(new_b.props().satisfies(&expect));
    }

    #[test]
    fn empty_queue_for_reachable_family_is_a_no_op() {
        let root = sample_tree();
        let overrides = overrides_for(2, Vec::new());

        let result = clone_with_props(&root, &overrides);
        assert_eq!(result.no_op_families, vec![FamilyId::new(2)]);
    }

    #[test]
    fn deep_chain_merges_target_exactly_once() {
        use core::sync::atomic::{AtomicUsize, Ordering};

        /// Counts how many times a patch is layered over it.
        #[derive(Debug)]
        struct CountingProps {
            inner: MapProps,
            applications: Arc<AtomicUsize>,
        }

        impl Props for CountingProps {
            fn satisfies(&self, patch: &Patch) -> bool {
                self.inner.satisfies(patch)
            }

            fn with_patch(&self, patch: &Patch) -> Arc<dyn Props> {
                self.applications.fetch_add(1, Ordering::Relaxed);
                let mut inner = self.inner.clone();
                for (key, value) in patch.entries() {
                    inner.set(key.clone(), value.clone());
                }
                Arc::new(Self {
                    inner,
                    applications: Arc::clone(&self.applications),
                })
            }
        }

        // 0 -> 1 -> 2 -> 3, override the leaf. Each ancestor is affected;
        // the leaf's patch must be layered once, not once per ancestor.
        let applications = Arc::new(AtomicUsize::new(0));
        let leaf = Arc::new(Node::new(
            FamilyId::new(3),
            Arc::new(CountingProps {
                inner: MapProps::new().with("x", PropValue::Float(0.0)),
                applications: Arc::clone(&applications),
            }),
            Vec::new(),
        ));
        let mid = node(2, props(&[]), vec![leaf]);
        let upper = node(1, props(&[]), vec![mid]);
        let root = node(0, props(&[]), vec![upper]);

        let overrides = overrides_for(3, vec![patch(&[("x", 1.0)])]);
        let result = clone_with_props(&root, &overrides);

        let new_leaf = child(child(child(&result.new_root, 0), 0), 0);
        let mut expect = Patch::new();
        expect.push("x", PropValue::Float(1.0));
        assert!(new_leaf.props().satisfies(&expect));
        assert!(result.no_op_families.is_empty());
        assert_eq!(applications.load(Ordering::Relaxed), 1);
    }
}
