//! Item-code keyed lookup tolerant of whitespace and casing drift.
//!
//! Sources disagree on how item codes are written (`"ABC-1"`, `" ABC-1 "`,
//! `"abc-1"`). [`KeyedLookup::get`] tries, in order: the exact key, the
//! trimmed key, and the trimmed lowercase key. [`KeyedLookup::get_trimmed`]
//! stops before case folding. Insertion is first-wins at every level.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct KeyedLookup<V> {
    entries: HashMap<String, V>,
    /// trimmed key -> stored key
    trimmed: HashMap<String, String>,
    /// trimmed lowercase key -> stored key
    folded: HashMap<String, String>,
}

impl<V> Default for KeyedLookup<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            trimmed: HashMap::new(),
            folded: HashMap::new(),
        }
    }
}

impl<V> KeyedLookup<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless the exact key is already present.
    /// Returns `false` when the key was a duplicate.
    pub fn insert_first(&mut self, key: &str, value: V) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        let trimmed = key.trim();
        self.trimmed
            .entry(trimmed.to_string())
            .or_insert_with(|| key.to_string());
        self.folded
            .entry(trimmed.to_lowercase())
            .or_insert_with(|| key.to_string());
        self.entries.insert(key.to_string(), value);
        true
    }

    /// Mutable access to the value under the exact `key`, inserting a default.
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        if !self.entries.contains_key(key) {
            self.insert_first(key, V::default());
        }
        // Present after the insert above.
        self.entries.entry(key.to_string()).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        if let Some(v) = self.get_trimmed(key) {
            return Some(v);
        }
        self.folded
            .get(&key.trim().to_lowercase())
            .and_then(|k| self.entries.get(k))
    }

    /// Exact key, then trimmed key. Codes differing only in case stay apart.
    pub fn get_trimmed(&self, key: &str) -> Option<&V> {
        if let Some(v) = self.entries.get(key) {
            return Some(v);
        }
        self.trimmed
            .get(key.trim())
            .and_then(|k| self.entries.get(k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }
}
