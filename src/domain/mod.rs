//! Domain models for Basket
//!
//! Contains the core business logic without any I/O concerns.

mod id;
mod category;
mod currency;
mod item;
mod list;
mod history;
mod suggestion;
pub mod policy;
pub mod export;

pub use id::{IdError, ItemId, ListId};
pub use category::{ItemCategory, ListCategory, ParseTokenError, Priority, Unit};
pub use currency::Currency;
pub use item::{normalize_name, Item, ValidationError};
pub use list::{Location, ShoppingList, DEFAULT_RADIUS_METERS};
pub use history::ItemHistory;
pub use suggestion::{SuggestionIndex, MAX_SUGGESTIONS};
pub use policy::{Feature, Quota, Tier};
