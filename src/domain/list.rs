//! Shopping list domain model
//!
//! A list exclusively owns its items. Item order is meaningful (the user
//! arranges it) and is persisted as-is. Every mutation bumps
//! `last_modified`, which never precedes `date_created`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::ListCategory;
use super::id::{ItemId, ListId};
use super::item::{clean_name, Item, ValidationError};

/// Default geofence radius for location reminders
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

/// A place associated with a list (e.g., the store it is for)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default = "default_radius")]
    pub radius_meters: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_METERS
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::InvalidLocation(format!(
                "latitude {} out of range",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::InvalidLocation(format!(
                "longitude {} out of range",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            radius_meters: DEFAULT_RADIUS_METERS,
            label: None,
        })
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Result<Self, ValidationError> {
        if !(radius_meters > 0.0) {
            return Err(ValidationError::InvalidLocation(format!(
                "radius {} must be positive",
                radius_meters
            )));
        }
        self.radius_meters = radius_meters;
        Ok(self)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A shopping list and the items on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    /// Unique identifier
    pub id: ListId,

    pub name: String,

    /// Items in user-defined order
    #[serde(default)]
    pub items: Vec<Item>,

    pub date_created: DateTime<Utc>,

    pub last_modified: DateTime<Utc>,

    pub category: ListCategory,

    #[serde(default)]
    pub is_shared: bool,

    /// Identifiers of the people this list is shared with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,

    #[serde(default)]
    pub is_template: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ShoppingList {
    /// Creates an empty list
    pub fn new(name: &str, category: ListCategory) -> Result<Self, ValidationError> {
        let name = clean_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: ListId::new(&name, now),
            name,
            items: Vec::new(),
            date_created: now,
            last_modified: now,
            category,
            is_shared: false,
            shared_with: Vec::new(),
            is_template: false,
            budget: None,
            location: None,
        })
    }

    /// Marks the list as modified now
    pub fn touch(&mut self) {
        self.last_modified = Utc::now().max(self.date_created);
    }

    /// Returns the item with the given id
    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Position of an item in the list
    pub fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == item_id)
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
        self.touch();
    }

    /// Removes an item, returning it if it was present
    pub fn remove_item(&mut self, item_id: &ItemId) -> Option<Item> {
        let index = self.position(item_id)?;
        let item = self.items.remove(index);
        self.touch();
        Some(item)
    }

    /// Flips an item's completion; returns the new state if the item exists
    pub fn toggle_completion(&mut self, item_id: &ItemId) -> Option<bool> {
        let now = Utc::now();
        let item = self.items.iter_mut().find(|i| &i.id == item_id)?;
        let completed = item.toggle_completion(now);
        self.touch();
        Some(completed)
    }

    /// Replaces the item with the same id in place; false if absent
    pub fn update_item(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Moves the item at `from` to destination offset `to`.
    ///
    /// `to` is measured against the sequence *before* the move: the item
    /// lands in front of whatever was at `to`, so `[A, B, C]` with
    /// `from = 0, to = 2` becomes `[B, A, C]`. A `to` past the end moves the
    /// item to the end. Returns false (and changes nothing) if `from` is out
    /// of range or the move would not change the order.
    pub fn reorder_items(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len {
            return false;
        }
        let to = to.min(len);
        let dest = if to > from { to - 1 } else { to };
        if dest == from {
            return false;
        }

        let item = self.items.remove(from);
        self.items.insert(dest, item);
        self.touch();
        true
    }

    /// Detaches every item from the list (used when deleting the list)
    pub fn take_items(&mut self) -> Vec<Item> {
        let items = std::mem::take(&mut self.items);
        if !items.is_empty() {
            self.touch();
        }
        items
    }

    /// Removes completed items, returning how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.is_completed);
        let removed = before - self.items.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = clean_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn set_category(&mut self, category: ListCategory) {
        self.category = category;
        self.touch();
    }

    pub fn set_budget(&mut self, budget: Option<Decimal>) -> Result<(), ValidationError> {
        if let Some(b) = budget {
            if b < Decimal::ZERO {
                return Err(ValidationError::NegativeBudget(b));
            }
        }
        self.budget = budget;
        self.touch();
        Ok(())
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
        self.touch();
    }

    /// Shares the list with a target (idempotent per target)
    pub fn share_with(&mut self, target: impl Into<String>) {
        let target = target.into();
        if !self.shared_with.contains(&target) {
            self.shared_with.push(target);
        }
        self.is_shared = true;
        self.touch();
    }

    pub fn unshare(&mut self) {
        self.shared_with.clear();
        self.is_shared = false;
        self.touch();
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed).count()
    }

    /// Sum of priced items (unpriced items count as zero). `None` if the
    /// total does not fit in a `Decimal`.
    pub fn estimated_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .filter_map(|i| i.price_per_unit.map(|p| (p, i.quantity)))
            .try_fold(Decimal::ZERO, |total, (price, quantity)| {
                total.checked_add(price.checked_mul(quantity)?)
            })
    }

    /// Budget minus estimated total; negative when over budget. `None`
    /// without a budget or when the total overflows.
    pub fn remaining_budget(&self) -> Option<Decimal> {
        self.budget?.checked_sub(self.estimated_total()?)
    }

    /// An overflowing total is necessarily over any budget
    pub fn is_over_budget(&self) -> bool {
        match (self.budget, self.estimated_total()) {
            (Some(budget), Some(total)) => total > budget,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Builds a new, non-template list from this one's items
    pub fn instantiate(&self, name: &str) -> Result<ShoppingList, ValidationError> {
        let mut list = ShoppingList::new(name, self.category)?;
        list.items = self.items.iter().map(Item::fresh_copy).collect();
        list.budget = self.budget;
        list.location = self.location.clone();
        Ok(list)
    }
}
