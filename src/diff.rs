//! Key-level comparison of two documents.
//!
//! A diff looks at top-level keys only: values are compared whole, so a
//! nested object that changed in one field counts as a single changed key.
//! Absence is folded into `null` on purpose, which keeps the report shape
//! uniform at the cost of not distinguishing a removed key from one set to
//! `null`.

use crate::store::Document;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One changed key: the value it had before and the value it has after.
///
/// A key absent on one side is reported as `null` on that side, so an added
/// key shows up as `null -> value` and a removed key as `value -> null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    /// Value before the change (`null` if the key was absent).
    pub before: Value,
    /// Value after the change (`null` if the key was absent).
    pub after: Value,
}

/// The set of keys whose values differ between two documents.
///
/// Holds at most the cap it was built with, in sorted key order; changed keys
/// beyond the cap are dropped and only counted, so a huge rewrite cannot
/// flood a log line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    entries: BTreeMap<String, Change>,
    omitted: usize,
}

impl Diff {
    /// Compares two documents key by key, keeping at most `max_entries`
    /// changed keys and counting the rest.
    ///
    /// ```
    /// use json_ledger::{Diff, Document};
    /// use serde_json::json;
    ///
    /// let mut before = Document::new();
    /// before.insert("a".into(), json!(1));
    /// before.insert("b".into(), json!(2));
    /// let mut after = before.clone();
    /// after.insert("b".into(), json!(3));
    /// after.insert("c".into(), json!(4));
    ///
    /// let diff = Diff::between(&before, &after, 5);
    /// assert_eq!(diff.len(), 2);
    /// assert_eq!(diff.get("b").unwrap().before, json!(2));
    /// assert_eq!(diff.get("c").unwrap().before, json!(null));
    /// ```
    #[must_use]
    pub fn between(before: &Document, after: &Document, max_entries: usize) -> Self {
        let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
        let mut entries = BTreeMap::new();
        for key in keys {
            let old = before.get(key).cloned().unwrap_or(Value::Null);
            let new = after.get(key).cloned().unwrap_or(Value::Null);
            if old != new {
                entries.insert(
                    key.clone(),
                    Change {
                        before: old,
                        after: new,
                    },
                );
            }
        }
        let omitted = entries.len().saturating_sub(max_entries);
        if omitted > 0 {
            if let Some(cut) = entries.keys().nth(max_entries).cloned() {
                entries.split_off(&cut);
            }
        }
        Diff { entries, omitted }
    }

    /// `true` if the two documents were identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.omitted == 0
    }

    /// Number of changed keys retained (at most the cap this was built with).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of changed keys beyond the cap that were dropped.
    #[must_use]
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// The change recorded for `key`, if it made the cap.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.entries.get(key)
    }

    /// Iterates the retained changes in sorted key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Change)> {
        self.entries.iter().map(|(key, change)| (key.as_str(), change))
    }

    /// Renders the diff as a JSON object with one entry per changed key.
    ///
    /// When the cap dropped changes, a synthetic `"__truncated__"` entry
    /// carries the count, e.g. `"2 more changes"`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, change) in &self.entries {
            map.insert(
                key.clone(),
                serde_json::json!({ "before": change.before, "after": change.after }),
            );
        }
        if self.omitted > 0 {
            map.insert(
                "__truncated__".to_owned(),
                Value::String(format!("{} more changes", self.omitted)),
            );
        }
        Value::Object(map)
    }
}

impl std::fmt::Display for Diff {
    /// Compact single-line JSON, the form used in log lines.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
