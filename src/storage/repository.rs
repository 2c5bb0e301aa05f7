//! List/item repository
//!
//! CRUD façade over an [`ObjectStore`] with an in-memory cache of every list.
//! Each mutation is applied to a copy of the cached list, saved, and only
//! then swapped into the cache, so a failed save leaves the cache matching
//! what is on disk. Operations naming an unknown list or item are silent
//! no-ops.

use thiserror::Error;
use tracing::{debug, warn};

use super::store::{ObjectStore, StoreError};
use crate::domain::{Item, ItemId, ListId, ShoppingList, SuggestionIndex, ValidationError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub struct Repository<S> {
    store: S,
    lists: Vec<ShoppingList>,
    suggestions: SuggestionIndex,
}

impl<S: ObjectStore> Repository<S> {
    /// Creates a repository with an empty cache; call [`Self::load`] to fill it
    pub fn new(store: S, suggestions: SuggestionIndex) -> Self {
        Self {
            store,
            lists: Vec::new(),
            suggestions,
        }
    }

    /// Fills the cache from the store and folds every item into the
    /// suggestion index
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.lists = self.store.fetch_all()?;
        self.suggestions.rebuild(&self.lists);
        debug!(lists = self.lists.len(), "repository loaded");
        Ok(())
    }

    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn list(&self, id: &ListId) -> Option<&ShoppingList> {
        self.lists.iter().find(|l| &l.id == id)
    }

    /// Finds a list by exact id or, failing that, by case-insensitive name
    pub fn find_list(&self, needle: &str) -> Option<&ShoppingList> {
        if let Ok(id) = needle.parse::<ListId>() {
            if let Some(list) = self.list(&id) {
                return Some(list);
            }
        }
        let wanted = needle.trim().to_lowercase();
        self.lists.iter().find(|l| l.name.to_lowercase() == wanted)
    }

    pub fn templates(&self) -> impl Iterator<Item = &ShoppingList> {
        self.lists.iter().filter(|l| l.is_template)
    }

    pub fn suggestions(&self) -> &SuggestionIndex {
        &self.suggestions
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn index_of(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| &l.id == id)
    }

    /// Inserts a new list
    pub fn add_list(&mut self, list: ShoppingList) -> Result<(), StoreError> {
        self.store.insert(&list);
        self.store.save()?;

        debug!(list = %list.id, name = %list.name, "added list");
        for item in &list.items {
            self.suggestions.record_usage(item);
        }
        self.lists.push(list);
        Ok(())
    }

    /// Persists a modified list, matched by id
    pub fn update_list(&mut self, list: ShoppingList) -> Result<(), StoreError> {
        let Some(index) = self.index_of(&list.id) else {
            warn!(list = %list.id, "update_list: unknown list, ignoring");
            return Ok(());
        };
        self.commit(index, list)
    }

    /// Deletes a list together with every item it owns
    pub fn delete_list(&mut self, id: &ListId) -> Result<(), StoreError> {
        let Some(index) = self.index_of(id) else {
            warn!(list = %id, "delete_list: unknown list, ignoring");
            return Ok(());
        };

        let mut doomed = self.lists[index].clone();
        let items = doomed.take_items();
        self.store.delete(id);
        self.store.save()?;

        debug!(list = %id, items = items.len(), "deleted list and its items");
        drop(items);
        self.lists.remove(index);
        Ok(())
    }

    /// Appends an item to a list and records it for suggestions
    pub fn add_item(&mut self, list_id: &ListId, item: Item) -> Result<(), StoreError> {
        let recorded = item.clone();
        let changed = self.mutate(list_id, "add_item", move |list| {
            list.add_item(item);
            true
        })?;
        if changed {
            self.suggestions.record_usage(&recorded);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, list_id: &ListId, item_id: &ItemId) -> Result<(), StoreError> {
        self.mutate(list_id, "remove_item", |list| {
            list.remove_item(item_id).is_some()
        })
        .map(|_| ())
    }

    pub fn toggle_completion(
        &mut self,
        list_id: &ListId,
        item_id: &ItemId,
    ) -> Result<(), StoreError> {
        self.mutate(list_id, "toggle_completion", |list| {
            list.toggle_completion(item_id).is_some()
        })
        .map(|_| ())
    }

    /// Replaces the item with the same id; unknown ids are ignored
    pub fn update_item(&mut self, list_id: &ListId, item: Item) -> Result<(), StoreError> {
        self.mutate(list_id, "update_item", |list| list.update_item(item))
            .map(|_| ())
    }

    /// Moves an item; see [`ShoppingList::reorder_items`] for the offset rules
    pub fn reorder_items(
        &mut self,
        list_id: &ListId,
        from: usize,
        to: usize,
    ) -> Result<(), StoreError> {
        self.mutate(list_id, "reorder_items", |list| list.reorder_items(from, to))
            .map(|_| ())
    }

    /// Removes completed items, returning how many went
    pub fn clear_completed(&mut self, list_id: &ListId) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.mutate(list_id, "clear_completed", |list| {
            removed = list.clear_completed();
            removed > 0
        })?;
        Ok(removed)
    }

    /// Creates a new list from a template's items. Returns the new list's id,
    /// or `None` if the template does not exist.
    pub fn instantiate_template(
        &mut self,
        template_id: &ListId,
        name: &str,
    ) -> Result<Option<ListId>, RepositoryError> {
        let Some(template) = self.list(template_id) else {
            warn!(list = %template_id, "instantiate_template: unknown template, ignoring");
            return Ok(None);
        };

        let list = template.instantiate(name)?;
        let id = list.id.clone();
        self.add_list(list)?;
        Ok(Some(id))
    }

    /// Runs `op` on a copy of the list and commits it if `op` reports a change
    fn mutate<F>(&mut self, list_id: &ListId, op: &str, f: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut ShoppingList) -> bool,
    {
        let Some(index) = self.index_of(list_id) else {
            warn!(list = %list_id, op, "unknown list, ignoring");
            return Ok(false);
        };

        let mut updated = self.lists[index].clone();
        if !f(&mut updated) {
            debug!(list = %list_id, op, "nothing to change");
            return Ok(false);
        }

        self.commit(index, updated)?;
        debug!(list = %list_id, op, "list updated");
        Ok(true)
    }

    fn commit(&mut self, index: usize, list: ShoppingList) -> Result<(), StoreError> {
        self.store.insert(&list);
        self.store.save()?;
        self.lists[index] = list;
        Ok(())
    }
}
