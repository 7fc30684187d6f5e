// Copyright 2026 the Regraft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw property patches and the host property capability seam.
//!
//! The animation engine produces *raw patches*: ordered lists of key/value
//! entries pending application to a node's properties. The host's property
//! objects stay opaque to this crate behind the [`Props`] trait, which
//! provides exactly the two primitives the cloner needs: an equality check
//! against a patch and a layered clone. Hosts implement `Props` once per
//! node kind; [`MapProps`] is a ready-made implementation for hosts whose
//! properties are plain dynamic maps (and for tests).

use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// A property key. Borrowed for the common static-name case.
pub type PropKey = Cow<'static, str>;

/// A raw animated property value.
///
/// This is deliberately small: animated updates are scalar style values, not
/// arbitrary structured data.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// An explicit null, resetting a property to its unset appearance.
    ///
    /// Layering a `Null` entry keeps the key, stored with a `Null` value,
    /// rather than removing it; [`Props::satisfies`] compares it like any
    /// other value. Host `Props` implementations must match that.
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    Str(Cow<'static, str>),
}

/// An ordered list of raw property entries pending application to one node.
///
/// Entry order is significant: when the same key appears more than once
/// (within one patch or across a folded queue of patches), the **last**
/// occurrence wins. [`Patch::get`] and [`Patch::fold`] both honor that
/// tie-break.
///
/// # Example
///
/// ```
/// use regraft_tree::{Patch, PropValue};
///
/// let mut patch = Patch::new();
/// patch.push("opacity", PropValue::Float(0.5));
/// patch.push("opacity", PropValue::Float(1.0));
///
/// // Last occurrence wins.
/// assert_eq!(patch.get("opacity"), Some(&PropValue::Float(1.0)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    entries: SmallVec<[(PropKey, PropValue); 4]>,
}

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Duplicate keys are kept; the later one wins on read.
    pub fn push(&mut self, key: impl Into<PropKey>, value: PropValue) {
        self.entries.push((key.into(), value));
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(PropKey, PropValue)] {
        &self.entries
    }

    /// Returns the effective value for `key` (the last occurrence).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the number of entries, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the patch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visits each entry whose value is effective (the last occurrence of
    /// its key). Visit order is unspecified.
    pub(crate) fn for_each_effective(&self, mut f: impl FnMut(&str, &PropValue)) {
        let mut seen: HashSet<&str> = HashSet::new();
        for (key, value) in self.entries.iter().rev() {
            if seen.insert(key.as_ref()) {
                f(key, value);
            }
        }
    }

    /// Folds a queue of patches into one, preserving enqueue order.
    ///
    /// Entries are applied first-to-last, so a later patch overrides an
    /// earlier one for the same key. The result contains each key once.
    /// Folding before comparing against a node's current properties is what
    /// makes multi-patch no-op detection sound: comparing patches one at a
    /// time against a moving target is not.
    #[must_use]
    pub fn fold<'a>(patches: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut folded = Self::new();
        for patch in patches {
            for (key, value) in &patch.entries {
                folded.put(key.clone(), value.clone());
            }
        }
        folded
    }

    /// Inserts or overwrites the entry for `key`.
    fn put(&mut self, key: PropKey, value: PropValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }
}

/// Host capability for property equality and layered cloning.
///
/// Implemented by the host once per node kind; the cloner only ever calls
/// through this trait and never inspects property contents itself.
///
/// Both methods must agree: if [`Props::satisfies`] returns `true` for a
/// patch, then [`Props::with_patch`] with that patch would produce an object
/// equal to `self`.
pub trait Props: fmt::Debug + Send + Sync {
    /// Returns `true` iff every effective entry of `patch` is already
    /// present on this object with an equal value.
    ///
    /// This is full-equality over the patch: a single differing or missing
    /// key means `false`. An empty patch is vacuously satisfied.
    fn satisfies(&self, patch: &Patch) -> bool;

    /// Returns a new property object with `patch` layered over this one.
    ///
    /// `self` is not modified; the cloner applies this exactly once per
    /// overridden family per commit.
    fn with_patch(&self, patch: &Patch) -> Arc<dyn Props>;
}

/// A map-backed [`Props`] implementation.
///
/// Suitable for hosts whose property model is a flat dynamic map, and as the
/// property object in tests.
///
/// # Example
///
/// ```
/// use regraft_tree::{MapProps, Patch, Props, PropValue};
///
/// let props = MapProps::new().with("opacity", PropValue::Float(1.0));
///
/// let mut patch = Patch::new();
/// patch.push("opacity", PropValue::Float(1.0));
/// assert!(props.satisfies(&patch));
///
/// let mut patch = Patch::new();
/// patch.push("opacity", PropValue::Float(0.5));
/// assert!(!props.satisfies(&patch));
///
/// let updated = props.with_patch(&patch);
/// let mut again = Patch::new();
/// again.push("opacity", PropValue::Float(0.5));
/// assert!(updated.satisfies(&again));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapProps {
    values: HashMap<PropKey, PropValue>,
}

impl MapProps {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<PropKey>, value: PropValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Sets a property value.
    pub fn set(&mut self, key: impl Into<PropKey>, value: PropValue) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    /// Returns the number of set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Props for MapProps {
    fn satisfies(&self, patch: &Patch) -> bool {
        let mut equal = true;
        patch.for_each_effective(|key, value| {
            if self.values.get(key) != Some(value) {
                equal = false;
            }
        });
        equal
    }

    fn with_patch(&self, patch: &Patch) -> Arc<dyn Props> {
        let mut next = self.clone();
        for (key, value) in patch.entries() {
            next.values.insert(key.clone(), value.clone());
        }
        Arc::new(next)
    }
}
