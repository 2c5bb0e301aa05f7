//! Autocomplete suggestions ranked by how often an item name was used
//!
//! Keys are normalized names (trimmed, lower-cased). Each entry keeps the
//! most recently recorded item so a suggestion can pre-fill unit, brand and
//! price.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::history::ItemHistory;
use super::item::{normalize_name, Item};
use super::list::ShoppingList;

/// Maximum number of suggestions returned for a query
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone)]
struct Entry {
    item: Item,
    count: u32,
    last_used: DateTime<Utc>,
}

/// Frequency table of previously used item names
#[derive(Debug, Clone, Default)]
pub struct SuggestionIndex {
    entries: HashMap<String, Entry>,
}

impl SuggestionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Usage count for a name, matched case-insensitively
    pub fn usage_count(&self, name: &str) -> Option<u32> {
        self.entries.get(&normalize_name(name)).map(|e| e.count)
    }

    /// Records one use of an item
    pub fn record_usage(&mut self, item: &Item) {
        let key = item.normalized_name();
        if key.is_empty() {
            return;
        }
        let now = Utc::now();

        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                entry.item = item.clone();
                entry.last_used = now;
            }
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        item: item.clone(),
                        count: 1,
                        last_used: now,
                    },
                );
            }
        }
    }

    /// Up to [`MAX_SUGGESTIONS`] items whose name contains `query`, most used
    /// first. Equal counts are ordered by name.
    pub fn suggestions(&self, query: &str) -> Vec<Item> {
        let needle = normalize_name(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(&String, &Entry)> = self
            .entries
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .collect();
        matches.sort_by(|(ka, a), (kb, b)| b.count.cmp(&a.count).then_with(|| ka.cmp(kb)));

        matches
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, e)| e.item.clone())
            .collect()
    }

    /// Recounts usage across `lists` and merges, keeping the larger count
    pub fn rebuild(&mut self, lists: &[ShoppingList]) {
        let mut counted: HashMap<String, (u32, &Item)> = HashMap::new();
        for item in lists.iter().flat_map(|l| l.items.iter()) {
            let key = item.normalized_name();
            if key.is_empty() {
                continue;
            }
            counted
                .entry(key)
                .and_modify(|(count, latest)| {
                    *count = count.saturating_add(1);
                    if item.date_added >= latest.date_added {
                        *latest = item;
                    }
                })
                .or_insert((1, item));
        }

        for (key, (count, item)) in counted {
            self.merge(key, count, item, item.date_added);
        }
    }

    /// Seeds the index from persisted history, keeping the larger count
    pub fn seed(&mut self, history: impl IntoIterator<Item = ItemHistory>) {
        for record in history {
            if let Some(item) = record.to_item() {
                self.merge(
                    record.name_lower.clone(),
                    record.usage_count,
                    &item,
                    record.last_used_date,
                );
            }
        }
    }

    fn merge(&mut self, key: String, count: u32, item: &Item, last_used: DateTime<Utc>) {
        match self.entries.get_mut(&key) {
            Some(entry) => entry.count = entry.count.max(count),
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        item: item.clone(),
                        count,
                        last_used,
                    },
                );
            }
        }
    }

    /// Snapshot of the index as history records, sorted by name
    pub fn history(&self) -> Vec<ItemHistory> {
        let mut records: Vec<_> = self
            .entries
            .values()
            .map(|e| ItemHistory::from_item(&e.item, e.count, e.last_used))
            .collect();
        records.sort_by(|a, b| a.name_lower.cmp(&b.name_lower));
        records
    }
}
