//! Key-value persistence for small pieces of app state
//!
//! Entitlement state (tier, usage counters) is kept as string pairs in
//! `.basket/state.toml`. Every `set`/`remove` is written through immediately.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::store::StoreError;

/// String key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory key-value store
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Key-value store backed by a TOML file
#[derive(Debug)]
pub struct StateFile {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl StateFile {
    /// Opens the state file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Opens the default state file for a project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        Self::open(project_root.join(".basket").join("state.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(&self.values).context("Failed to serialize state")?;
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write state file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))
    }

    fn write_through(&mut self, previous: Option<String>, key: &str) -> Result<(), StoreError> {
        self.persist().map_err(|e| {
            // Keep memory in step with disk
            match previous {
                Some(value) => self.values.insert(key.to_string(), value),
                None => self.values.remove(key),
            };
            StoreError::Save(format!("{:#}", e))
        })
    }
}

impl KeyValueStore for StateFile {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        self.write_through(previous, key)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self.values.remove(key) {
            Some(previous) => self.write_through(Some(previous), key),
            None => Ok(()),
        }
    }
}
