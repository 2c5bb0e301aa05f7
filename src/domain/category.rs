//! Enumerated tokens: list categories, item categories, units, priorities
//!
//! Every enum serializes as a snake_case token. Parsing is lenient about case
//! and separators so `personalCare`, `personal_care` and `personal-care` all
//! resolve to the same value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseTokenError {
    kind: &'static str,
    value: String,
}

fn normalize_token(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_token<T: Copy>(
    s: &str,
    all: &[T],
    as_str: fn(&T) -> &'static str,
    kind: &'static str,
) -> Result<T, ParseTokenError> {
    let wanted = normalize_token(s);
    all.iter()
        .copied()
        .find(|v| normalize_token(as_str(v)) == wanted)
        .ok_or_else(|| ParseTokenError {
            kind,
            value: s.to_string(),
        })
}

/// Category of a whole shopping list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    #[default]
    Groceries,
    Household,
    Personal,
    Work,
    Party,
    Travel,
    Health,
    Electronics,
    Clothing,
    Other,
}

impl ListCategory {
    pub const ALL: [ListCategory; 10] = [
        ListCategory::Groceries,
        ListCategory::Household,
        ListCategory::Personal,
        ListCategory::Work,
        ListCategory::Party,
        ListCategory::Travel,
        ListCategory::Health,
        ListCategory::Electronics,
        ListCategory::Clothing,
        ListCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListCategory::Groceries => "groceries",
            ListCategory::Household => "household",
            ListCategory::Personal => "personal",
            ListCategory::Work => "work",
            ListCategory::Party => "party",
            ListCategory::Travel => "travel",
            ListCategory::Health => "health",
            ListCategory::Electronics => "electronics",
            ListCategory::Clothing => "clothing",
            ListCategory::Other => "other",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            ListCategory::Groceries => "Groceries",
            ListCategory::Household => "Household",
            ListCategory::Personal => "Personal",
            ListCategory::Work => "Work",
            ListCategory::Party => "Party",
            ListCategory::Travel => "Travel",
            ListCategory::Health => "Health",
            ListCategory::Electronics => "Electronics",
            ListCategory::Clothing => "Clothing",
            ListCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListCategory {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, &Self::ALL, Self::as_str, "list category")
    }
}

/// Category of a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Groceries,
    Dairy,
    Produce,
    Meat,
    Bakery,
    Frozen,
    Beverages,
    Snacks,
    Household,
    PersonalCare,
    Pharmacy,
    Electronics,
    #[default]
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 13] = [
        ItemCategory::Groceries,
        ItemCategory::Dairy,
        ItemCategory::Produce,
        ItemCategory::Meat,
        ItemCategory::Bakery,
        ItemCategory::Frozen,
        ItemCategory::Beverages,
        ItemCategory::Snacks,
        ItemCategory::Household,
        ItemCategory::PersonalCare,
        ItemCategory::Pharmacy,
        ItemCategory::Electronics,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Groceries => "groceries",
            ItemCategory::Dairy => "dairy",
            ItemCategory::Produce => "produce",
            ItemCategory::Meat => "meat",
            ItemCategory::Bakery => "bakery",
            ItemCategory::Frozen => "frozen",
            ItemCategory::Beverages => "beverages",
            ItemCategory::Snacks => "snacks",
            ItemCategory::Household => "household",
            ItemCategory::PersonalCare => "personal_care",
            ItemCategory::Pharmacy => "pharmacy",
            ItemCategory::Electronics => "electronics",
            ItemCategory::Other => "other",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            ItemCategory::Groceries => "Groceries",
            ItemCategory::Dairy => "Dairy",
            ItemCategory::Produce => "Produce",
            ItemCategory::Meat => "Meat & Seafood",
            ItemCategory::Bakery => "Bakery",
            ItemCategory::Frozen => "Frozen",
            ItemCategory::Beverages => "Beverages",
            ItemCategory::Snacks => "Snacks",
            ItemCategory::Household => "Household",
            ItemCategory::PersonalCare => "Personal Care",
            ItemCategory::Pharmacy => "Pharmacy",
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, &Self::ALL, Self::as_str, "item category")
    }
}

/// Unit of measure for an item's quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// No unit; the quantity is a plain count
    #[default]
    None,
    Piece,
    Kilogram,
    Gram,
    Pound,
    Ounce,
    Liter,
    Milliliter,
    Gallon,
    Pack,
    Bottle,
    Can,
    Box,
    Dozen,
}

impl Unit {
    pub const ALL: [Unit; 14] = [
        Unit::None,
        Unit::Piece,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Pound,
        Unit::Ounce,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Gallon,
        Unit::Pack,
        Unit::Bottle,
        Unit::Can,
        Unit::Box,
        Unit::Dozen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::None => "none",
            Unit::Piece => "piece",
            Unit::Kilogram => "kilogram",
            Unit::Gram => "gram",
            Unit::Pound => "pound",
            Unit::Ounce => "ounce",
            Unit::Liter => "liter",
            Unit::Milliliter => "milliliter",
            Unit::Gallon => "gallon",
            Unit::Pack => "pack",
            Unit::Bottle => "bottle",
            Unit::Can => "can",
            Unit::Box => "box",
            Unit::Dozen => "dozen",
        }
    }

    /// Short form used in exports; empty for [`Unit::None`]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Piece => "pcs",
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Pound => "lb",
            Unit::Ounce => "oz",
            Unit::Liter => "L",
            Unit::Milliliter => "mL",
            Unit::Gallon => "gal",
            Unit::Pack => "pack",
            Unit::Bottle => "bottle",
            Unit::Can => "can",
            Unit::Box => "box",
            Unit::Dozen => "dozen",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Unit::None)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept abbreviations too ("kg", "mL")
        let abbrev = Self::ALL
            .iter()
            .copied()
            .find(|u| !u.is_none() && u.abbreviation().eq_ignore_ascii_case(s.trim()));
        match abbrev {
            Some(unit) => Ok(unit),
            None => parse_token(s, &Self::ALL, Self::as_str, "unit"),
        }
    }
}

/// Item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s, &Self::ALL, Self::as_str, "priority")
    }
}
