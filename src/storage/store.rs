//! Object store boundary
//!
//! The repository talks to persistence only through [`ObjectStore`]: stage
//! inserts and deletes, then `save()` them in one go. A list is stored as an
//! aggregate together with its items.

use thiserror::Error;
use tracing::debug;

use crate::domain::{ListId, ShoppingList};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Failed to save changes: {0}")]
    Save(String),

    #[error("Failed to load data: {0}")]
    Load(String),
}

/// A staged change awaiting `save()`
#[derive(Debug, Clone)]
pub(crate) enum Change {
    Upsert(ShoppingList),
    Delete(ListId),
}

/// Applies staged changes to a set of lists, preserving order
pub(crate) fn apply_changes(lists: &mut Vec<ShoppingList>, changes: Vec<Change>) {
    for change in changes {
        match change {
            Change::Upsert(list) => match lists.iter_mut().find(|l| l.id == list.id) {
                Some(slot) => *slot = list,
                None => lists.push(list),
            },
            Change::Delete(id) => lists.retain(|l| l.id != id),
        }
    }
}

/// Persistent storage for shopping lists
pub trait ObjectStore {
    /// Stages a list for writing, replacing any stored list with the same id
    fn insert(&mut self, list: &ShoppingList);

    /// Stages removal of a list (and therefore all of its items)
    fn delete(&mut self, id: &ListId);

    /// Writes staged changes. Staged changes are dropped whether or not the
    /// write succeeds; nothing is retried.
    fn save(&mut self) -> Result<(), StoreError>;

    /// Returns every saved list
    fn fetch_all(&self) -> Result<Vec<ShoppingList>, StoreError>;
}

/// In-memory store, with optional failure injection for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Vec<ShoppingList>,
    pending: Vec<Change>,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `lists`
    pub fn with_lists(lists: Vec<ShoppingList>) -> Self {
        Self {
            saved: lists,
            ..Self::default()
        }
    }

    /// Makes every subsequent `save()` fail (or succeed again)
    pub fn set_failing(&mut self, failing: bool) {
        self.fail_saves = failing;
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ObjectStore for MemoryStore {
    fn insert(&mut self, list: &ShoppingList) {
        self.pending.push(Change::Upsert(list.clone()));
    }

    fn delete(&mut self, id: &ListId) {
        self.pending.push(Change::Delete(id.clone()));
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let changes = std::mem::take(&mut self.pending);
        if self.fail_saves {
            return Err(StoreError::Save("memory store is set to fail".to_string()));
        }
        debug!(changes = changes.len(), "memory store save");
        apply_changes(&mut self.saved, changes);
        self.saves += 1;
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<ShoppingList>, StoreError> {
        Ok(self.saved.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListCategory;

    fn list(name: &str) -> ShoppingList {
        ShoppingList::new(name, ListCategory::Groceries).unwrap()
    }

    #[test]
    fn insert_is_invisible_until_saved() {
        let mut store = MemoryStore::new();
        store.insert(&list("Weekly"));

        assert!(store.fetch_all().unwrap().is_empty());
        store.save().unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut store = MemoryStore::new();
        let mut weekly = list("Weekly");
        store.insert(&weekly);
        store.save().unwrap();

        weekly.rename("Weekend").unwrap();
        store.insert(&weekly);
        store.save().unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Weekend");
    }

    #[test]
    fn failed_save_discards_pending() {
        let mut store = MemoryStore::new();
        store.set_failing(true);
        store.insert(&list("Lost"));

        assert!(matches!(store.save(), Err(StoreError::Save(_))));

        store.set_failing(false);
        store.save().unwrap();
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn delete_removes() {
        let a = list("A");
        let b = list("B");
        let mut store = MemoryStore::with_lists(vec![a.clone(), b.clone()]);

        store.delete(&a.id);
        store.save().unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all, vec![b]);
    }
}
