// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ancestor-path resolution for a family within a snapshot.

use alloc::vec::Vec;

use crate::node::Node;
use crate::types::FamilyId;

/// The ordered root→parent-of-target sequence of (ancestor, child index)
/// pairs for one family's current occurrence.
///
/// The last pair's node is the target's direct parent; following the child
/// indices from the root reaches the target node itself. For a target that
/// *is* the root, the path is empty.
pub type AncestorPath<'a> = Vec<(&'a Node, usize)>;

/// Resolves the ancestor path of `family` under `root`.
///
/// Returns `None` when the family does not occur anywhere under `root`
/// (for example, it was already unmounted). Callers treat a miss as a
/// silent drop, never an error.
///
/// Families occur at most once per snapshot; when a malformed tree violates
/// that, the first occurrence in depth-first order wins.
#[must_use]
pub fn ancestor_path(root: &Node, family: FamilyId) -> Option<AncestorPath<'_>> {
    if root.family() == family {
        return Some(Vec::new());
    }
    let mut path = Vec::new();
    if descend(root, family, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn descend<'a>(node: &'a Node, family: FamilyId, path: &mut AncestorPath<'a>) -> bool {
    for (index, child) in node.children().iter().enumerate() {
        path.push((node, index));
        if child.family() == family || descend(child, family, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::MapProps;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    fn node(family: u64, children: Vec<Arc<Node>>) -> Arc<Node> {
        Arc::new(Node::new(
            FamilyId::new(family),
            Arc::new(MapProps::new()),
            children,
        ))
    }

    /// Root(0) -> A(1)(B(2), C(3)), D(4)
    fn sample_tree() -> Arc<Node> {
        let b = node(2, Vec::new());
        let c = node(3, Vec::new());
        let a = node(1, vec![b, c]);
        let d = node(4, Vec::new());
        node(0, vec![a, d])
    }

    #[test]
    fn resolves_nested_target() {
        let root = sample_tree();
        let path = ancestor_path(&root, FamilyId::new(3)).unwrap();

        let families: Vec<_> = path.iter().map(|(n, i)| (n.family().get(), *i)).collect();
        assert_eq!(families, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn resolves_direct_child() {
        let root = sample_tree();
        let path = ancestor_path(&root, FamilyId::new(4)).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].0.family(), FamilyId::new(0));
        assert_eq!(path[0].1, 1);
    }

    #[test]
    fn root_target_yields_empty_path() {
        let root = sample_tree();
        let path = ancestor_path(&root, FamilyId::new(0)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn missing_family_yields_none() {
        let root = sample_tree();
        assert!(ancestor_path(&root, FamilyId::new(99)).is_none());
    }
}
