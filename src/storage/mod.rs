//! # Storage Layer
//!
//! Persistence and services for Basket with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Lists (with items) | JSONL (one list per line) | `.basket/lists.jsonl` |
//! | Item history | JSONL | `.basket/history.jsonl` |
//! | Entitlement state | TOML key-value table | `.basket/state.toml` |
//! | Config | TOML | `.basket/config.toml` |
//! | Share exports | CSV | `.basket/exports/{list}.csv` |
//!
//! ## Concurrency Safety
//!
//! - [`ListStore`] and [`HistoryStore`] use file locking (`fs2`)
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a Basket project
//! - [`Repository`] - List/item CRUD over an [`ObjectStore`]
//! - [`EntitlementStore`] - Subscription tier and quotas over a [`KeyValueStore`]
//! - [`Config`] - Project and global configuration

mod store;
mod jsonl;
mod kv;
mod entitlements;
mod repository;
mod share;
mod config;
mod project;

pub use store::{MemoryStore, ObjectStore, StoreError};
pub use jsonl::{HistoryStore, ListStore};
pub use kv::{KeyValueStore, MemoryKv, StateFile};
pub use entitlements::{
    EntitlementStore, KEY_IS_PREMIUM, KEY_LISTS_CREATED, KEY_NOTIFICATIONS_SENT,
    KEY_NOTIFICATION_PERIOD, KEY_TIER,
};
pub use repository::{Repository, RepositoryError};
pub use share::{shareable_items, ShareBundle, ShareError};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};
