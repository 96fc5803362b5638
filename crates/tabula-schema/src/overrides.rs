//! # Field overrides
//!
//! Callers may replace or drop individual generated fields. Overrides are
//! keyed by field name, dotted for nested relationships (`items.price`
//! targets the `price` field inside the `items` child schema). Every
//! supplied key must be consumed by exactly one produced field; leftovers
//! after a full build mean the caller referenced a field that was never
//! generated, which fails the whole generation.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// One caller-supplied override for a generated field.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// Replace the generated field schema wholesale.
    Replace(Value),
    /// Drop the field from the generated schema.
    Remove,
}

/// Per-field overrides with consumption tracking.
///
/// A fresh set is created per generation call and per recursion level;
/// child sets are scoped views whose consumption is folded back into the
/// parent with [`absorb`](Self::absorb).
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    entries: BTreeMap<String, Override>,
    unused: BTreeSet<String>,
}

impl OverrideSet {
    pub fn new(entries: BTreeMap<String, Override>) -> Self {
        let unused = entries.keys().cloned().collect();
        Self { entries, unused }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Applies the override registered under `key` to a just-built field.
    ///
    /// Without a matching entry the built value passes through unchanged.
    /// A replacement returns the override value instead; a removal returns
    /// `None`, meaning the field must not be emitted. Either way the key is
    /// marked consumed.
    pub fn apply(&mut self, key: &str, built: Value) -> Option<Value> {
        match self.entries.get(key) {
            None => Some(built),
            Some(Override::Replace(replacement)) => {
                let replacement = replacement.clone();
                self.unused.remove(key);
                Some(replacement)
            }
            Some(Override::Remove) => {
                self.unused.remove(key);
                None
            }
        }
    }

    /// The overrides scoped to the dotted namespace under `name`.
    ///
    /// `items.price` becomes `price` in the set returned for `items`; keys
    /// without the prefix are left behind.
    pub fn child(&self, name: &str, splitter: &str) -> OverrideSet {
        let prefix = format!("{name}{splitter}");
        let entries: BTreeMap<String, Override> = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();
        Self::new(entries)
    }

    /// Folds a child set's consumption back into this set.
    ///
    /// Every key the child consumed marks the corresponding dotted key here
    /// as consumed too, so nested override keys survive the final leftover
    /// check.
    pub fn absorb(&mut self, name: &str, splitter: &str, child: &OverrideSet) {
        for key in child.consumed() {
            self.unused.remove(&format!("{name}{splitter}{key}"));
        }
    }

    fn consumed(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(|key| !self.unused.contains(*key))
            .map(String::as_str)
    }

    /// Keys that never matched a produced field.
    pub fn unused(&self) -> Vec<String> {
        self.unused.iter().cloned().collect()
    }

    pub fn fully_consumed(&self) -> bool {
        self.unused.is_empty()
    }
}
