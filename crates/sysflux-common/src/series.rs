//! Canonical series identity.
//!
//! A series key is the metric family name plus the tag set rendered in a
//! deterministic order: `name#key1:value1|key2:value2|`. Tag entries are
//! sorted lexicographically by key so that insertion order never changes
//! the identity.

use std::collections::HashMap;

/// Build the canonical series key for a metric name and tag set.
pub fn series_key(name: &str, tags: &HashMap<String, String>) -> String {
    let mut keys: Vec<&str> = tags.keys().map(String::as_str).collect();
    keys.sort_unstable();

    let mut key = String::with_capacity(name.len() + 1 + tags.len() * 16);
    key.push_str(name);
    key.push('#');
    for k in keys {
        key.push_str(k);
        key.push(':');
        key.push_str(&tags[k]);
        key.push('|');
    }
    key
}
