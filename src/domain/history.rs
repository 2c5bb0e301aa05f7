//! Item history records
//!
//! A history record summarizes every time an item name has been used. It is
//! the persisted form of a suggestion index entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{ItemCategory, Unit};
use super::id::ItemId;
use super::item::{normalize_name, Item};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemHistory {
    pub id: ItemId,

    pub name: String,

    /// Lower-cased name used for lookups
    pub name_lower: String,

    pub category: ItemCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Unit::is_none")]
    pub unit: Unit,

    pub last_used_date: DateTime<Utc>,

    /// Always at least 1
    pub usage_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<Decimal>,
}

impl ItemHistory {
    /// Summarizes `item` as used `usage_count` times, last at `last_used`
    pub fn from_item(item: &Item, usage_count: u32, last_used: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(&item.name, last_used),
            name: item.name.clone(),
            name_lower: normalize_name(&item.name),
            category: item.category,
            brand: item.brand.clone(),
            unit: item.unit,
            last_used_date: last_used,
            usage_count: usage_count.max(1),
            price_per_unit: item.price_per_unit,
        }
    }

    /// Rebuilds a template item carrying the remembered details
    pub fn to_item(&self) -> Option<Item> {
        let mut item = Item::new(&self.name).ok()?;
        item.category = self.category;
        item.brand = self.brand.clone();
        item.unit = self.unit;
        item.price_per_unit = self.price_per_unit;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_item_derives_lowercase_name() {
        let item = Item::new("Greek Yogurt")
            .unwrap()
            .with_category(ItemCategory::Dairy)
            .with_brand("Fage");
        let history = ItemHistory::from_item(&item, 0, Utc::now());

        assert_eq!(history.name_lower, "greek yogurt");
        assert_eq!(history.usage_count, 1);
        assert_eq!(history.brand.as_deref(), Some("Fage"));
    }

    #[test]
    fn to_item_restores_details() {
        let item = Item::new("Olive Oil")
            .unwrap()
            .with_unit(Unit::Bottle)
            .with_price(Decimal::new(799, 2))
            .unwrap();
        let history = ItemHistory::from_item(&item, 4, Utc::now());
        let restored = history.to_item().unwrap();

        assert_eq!(restored.name, "Olive Oil");
        assert_eq!(restored.unit, Unit::Bottle);
        assert_eq!(restored.price_per_unit, Some(Decimal::new(799, 2)));
        assert!(!restored.is_completed);
    }
}
