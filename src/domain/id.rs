//! Identifiers for lists and items
//!
//! ID Format:
//! - List IDs: `l-{7-char-hash}` (e.g., `l-7f2b4c1`)
//! - Item IDs: `i-{10-char-hash}` (e.g., `i-9d3e5f2a01`)
//!
//! Hash is derived from the name, the creation timestamp and a process-local
//! sequence number, so two items named "Milk" added in the same instant still
//! get distinct IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid list ID format: expected 'l-{{7-char-hash}}', got '{0}'")]
    InvalidListId(String),

    #[error("Invalid item ID format: expected 'i-{{10-char-hash}}', got '{0}'")]
    InvalidItemId(String),
}

const LIST_HASH_LEN: usize = 7;
const ITEM_HASH_LEN: usize = 10;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a hex hash of `len` chars from name, timestamp and sequence
fn generate_hash(name: &str, timestamp: DateTime<Utc>, len: usize) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        name,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        seq
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..len].to_string()
}

fn parse_hash(s: &str, prefix: &str, len: usize) -> Option<String> {
    let hash = s.trim().strip_prefix(prefix)?;
    if hash.len() != len || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(hash.to_ascii_lowercase())
}

/// Shopping list ID in the format `l-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListId {
    hash: String,
}

impl ListId {
    /// Creates a new list ID from name and timestamp
    pub fn new(name: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(name, timestamp, LIST_HASH_LEN),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l-{}", self.hash)
    }
}

impl FromStr for ListId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hash(s, "l-", LIST_HASH_LEN)
            .map(|hash| Self { hash })
            .ok_or_else(|| IdError::InvalidListId(s.to_string()))
    }
}

impl TryFrom<String> for ListId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ListId> for String {
    fn from(id: ListId) -> Self {
        id.to_string()
    }
}

/// Item ID in the format `i-{10-char-hash}`
///
/// Items never outlive their list, but the ID is globally unique so an item
/// can be addressed without naming its list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    hash: String,
}

impl ItemId {
    /// Creates a new item ID from name and timestamp
    pub fn new(name: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(name, timestamp, ITEM_HASH_LEN),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i-{}", self.hash)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hash(s, "i-", ITEM_HASH_LEN)
            .map(|hash| Self { hash })
            .ok_or_else(|| IdError::InvalidItemId(s.to_string()))
    }
}

impl TryFrom<String> for ItemId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}
