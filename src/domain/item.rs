//! Item domain model
//!
//! Items are the lines of a shopping list. They have no lifecycle of their
//! own: an item is created, mutated and dropped through its parent list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::{ItemCategory, Priority, Unit};
use super::id::ItemId;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Budget must not be negative, got {0}")]
    NegativeBudget(Decimal),

    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}

/// Trims a user-supplied name, rejecting blank input
pub(crate) fn clean_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Lower-cased, trimmed form used for case-insensitive matching
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A line on a shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// How many units to buy
    pub quantity: Decimal,

    pub category: ItemCategory,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub date_added: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Unit::is_none")]
    pub unit: Unit,

    /// Price recorded the last time this item was checked off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchased_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchased_date: Option<DateTime<Utc>>,

    /// Raw image bytes, base64 in JSON
    #[serde(default, skip_serializing_if = "Option::is_none", with = "image_payload")]
    pub image: Option<Vec<u8>>,

    #[serde(default)]
    pub priority: Priority,
}

impl Item {
    /// Creates an item with quantity 1 and no optional details
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = clean_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: ItemId::new(&name, now),
            name,
            quantity: Decimal::ONE,
            category: ItemCategory::default(),
            is_completed: false,
            notes: None,
            date_added: now,
            price_per_unit: None,
            brand: None,
            unit: Unit::None,
            last_purchased_price: None,
            last_purchased_date: None,
            image: None,
            priority: Priority::default(),
        })
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Result<Self, ValidationError> {
        self.set_quantity(quantity)?;
        Ok(self)
    }

    pub fn with_price(mut self, price: Decimal) -> Result<Self, ValidationError> {
        self.set_price(Some(price))?;
        Ok(self)
    }

    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.set_notes(Some(notes.into()));
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        let brand = brand.into();
        self.brand = Some(brand.trim().to_string()).filter(|b| !b.is_empty());
        self
    }

    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    /// Renames the item
    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = clean_name(name)?;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> Result<(), ValidationError> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_price(&mut self, price: Option<Decimal>) -> Result<(), ValidationError> {
        if let Some(p) = price {
            if p < Decimal::ZERO {
                return Err(ValidationError::NegativePrice(p));
            }
        }
        self.price_per_unit = price;
        Ok(())
    }

    /// Sets notes; blank notes are stored as absent
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }

    /// Name used as the suggestion key
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Price per unit times quantity. `None` if unpriced or the product
    /// does not fit in a `Decimal`.
    pub fn total_price(&self) -> Option<Decimal> {
        self.price_per_unit
            .and_then(|p| p.checked_mul(self.quantity))
    }

    /// Flips completion. Checking an item off records its purchase price.
    pub fn toggle_completion(&mut self, now: DateTime<Utc>) -> bool {
        self.is_completed = !self.is_completed;
        if self.is_completed {
            if let Some(price) = self.price_per_unit {
                self.last_purchased_price = Some(price);
                self.last_purchased_date = Some(now);
            }
        }
        self.is_completed
    }

    /// Copy of this item for a fresh list: new id, not completed
    pub fn fresh_copy(&self) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::new(&self.name, now),
            is_completed: false,
            date_added: now,
            ..self.clone()
        }
    }
}

mod image_payload {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_defaults() {
        let item = Item::new("Milk").unwrap();

        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.unit, Unit::None);
        assert_eq!(item.priority, Priority::Normal);
        assert!(!item.is_completed);
        assert!(item.price_per_unit.is_none());
    }

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(Item::new("  Eggs ").unwrap().name, "Eggs");
        assert_eq!(Item::new("   ").unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn quantity_must_be_positive() {
        let item = Item::new("Apples").unwrap();
        assert!(item.clone().with_quantity(Decimal::ZERO).is_err());
        assert!(item.with_quantity(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn price_must_not_be_negative() {
        let mut item = Item::new("Bread").unwrap();
        assert_eq!(
            item.set_price(Some(Decimal::new(-50, 2))),
            Err(ValidationError::NegativePrice(Decimal::new(-50, 2)))
        );
        assert!(item.set_price(Some(Decimal::ZERO)).is_ok());
    }

    #[test]
    fn total_price_multiplies_quantity() {
        let item = Item::new("Apples")
            .unwrap()
            .with_quantity(Decimal::new(3, 0))
            .unwrap()
            .with_price(Decimal::new(125, 2))
            .unwrap();

        assert_eq!(item.total_price(), Some(Decimal::new(375, 2)));
    }

    #[test]
    fn total_price_overflow_is_none() {
        let item = Item::new("Yacht")
            .unwrap()
            .with_quantity(Decimal::from(100_000_000_000_000u64))
            .unwrap()
            .with_price(Decimal::from(100_000_000_000_000_000u64))
            .unwrap();

        assert_eq!(item.total_price(), None);
    }

    #[test]
    fn completing_records_purchase_price() {
        let mut item = Item::new("Coffee")
            .unwrap()
            .with_price(Decimal::new(899, 2))
            .unwrap();
        let now = Utc::now();

        assert!(item.toggle_completion(now));
        assert_eq!(item.last_purchased_price, Some(Decimal::new(899, 2)));
        assert_eq!(item.last_purchased_date, Some(now));

        assert!(!item.toggle_completion(now));
        assert_eq!(item.last_purchased_price, Some(Decimal::new(899, 2)));
    }

    #[test]
    fn blank_notes_are_dropped() {
        let item = Item::new("Tea").unwrap().with_notes("   ");
        assert!(item.notes.is_none());
    }

    #[test]
    fn fresh_copy_resets_completion_and_id() {
        let mut item = Item::new("Soap").unwrap();
        item.toggle_completion(Utc::now());

        let copy = item.fresh_copy();
        assert_ne!(copy.id, item.id);
        assert!(!copy.is_completed);
        assert_eq!(copy.name, item.name);
    }

    #[test]
    fn image_is_base64_in_json() {
        let item = Item::new("Cake").unwrap().with_image(vec![1, 2, 3]);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["image"], "AQID");

        let parsed: Item = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.image, Some(vec![1, 2, 3]));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let item = Item::new("Salt").unwrap();
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("notes").is_none());
        assert!(json.get("unit").is_none());
        assert!(json.get("image").is_none());
    }
}
