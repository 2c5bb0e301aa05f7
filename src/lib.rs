//! Basket CLI - A local-first shopping list manager
//!
//! Basket keeps shopping lists and their items in git-friendly files, ranks
//! item suggestions from past usage, exports lists for sharing, and gates
//! premium features behind a subscription tier.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Item, ItemId, ListId, ShoppingList, SuggestionIndex, Tier};
