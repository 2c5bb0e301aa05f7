//! JSONL storage for lists and item history
//!
//! Lists are stored in `.basket/lists.jsonl` with one JSON object per line
//! (items nested inside their list). Item history lives in
//! `.basket/history.jsonl`. Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::store::{apply_changes, Change, ObjectStore, StoreError};
use crate::domain::{ItemHistory, ListId, ShoppingList};

/// Reads every record from a JSONL file under a shared lock
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open store: {}", path.display()))?;

    // Acquire shared lock for reading
    file.lock_shared()
        .context("Failed to acquire read lock on store")?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

        if line.trim().is_empty() {
            continue;
        }

        let record: T = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;

        records.push(record);
    }

    // Lock is released when file is dropped
    Ok(records)
}

/// Rewrites a JSONL file atomically (temp file + rename) under an exclusive lock
fn write_records<'a, T: Serialize + 'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a T>,
) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Write to temp file first
    let temp_path = path.with_extension("jsonl.tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire write lock on store")?;

        let mut writer = BufWriter::new(&file);

        for record in records {
            let line = serde_json::to_string(record).context("Failed to serialize record")?;
            writeln!(writer, "{}", line).context("Failed to write record")?;
        }

        writer.flush().context("Failed to flush store")?;
    }

    // Atomic rename
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Store for shopping lists in JSONL format
pub struct ListStore {
    path: PathBuf,
    pending: Vec<Change>,
}

impl ListStore {
    /// Creates a new list store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Vec::new(),
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".basket").join("lists.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all lists, oldest first
    pub fn read_all(&self) -> Result<Vec<ShoppingList>> {
        let mut lists: Vec<ShoppingList> = read_records(&self.path)?;

        // Later lines win if an id appears twice
        let mut deduped: Vec<ShoppingList> = Vec::with_capacity(lists.len());
        for list in lists.drain(..) {
            match deduped.iter_mut().find(|l| l.id == list.id) {
                Some(slot) => *slot = list,
                None => deduped.push(list),
            }
        }

        deduped.sort_by(|a, b| {
            a.date_created
                .cmp(&b.date_created)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(deduped)
    }

    /// Writes all lists to the store (full rewrite)
    pub fn write_all(&self, lists: &[ShoppingList]) -> Result<()> {
        // Sort for consistent output
        let mut sorted: Vec<_> = lists.iter().collect();
        sorted.sort_by(|a, b| {
            a.date_created
                .cmp(&b.date_created)
                .then_with(|| a.id.cmp(&b.id))
        });
        write_records(&self.path, sorted)
    }

    fn flush_pending(&mut self) -> Result<()> {
        let changes = std::mem::take(&mut self.pending);
        if changes.is_empty() {
            return Ok(());
        }
        let count = changes.len();

        let mut lists = self.read_all()?;
        apply_changes(&mut lists, changes);
        self.write_all(&lists)?;

        debug!(changes = count, lists = lists.len(), path = %self.path.display(), "saved list store");
        Ok(())
    }
}

impl ObjectStore for ListStore {
    fn insert(&mut self, list: &ShoppingList) {
        self.pending.push(Change::Upsert(list.clone()));
    }

    fn delete(&mut self, id: &ListId) {
        self.pending.push(Change::Delete(id.clone()));
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.flush_pending()
            .map_err(|e| StoreError::Save(format!("{:#}", e)))
    }

    fn fetch_all(&self) -> Result<Vec<ShoppingList>, StoreError> {
        self.read_all()
            .map_err(|e| StoreError::Load(format!("{:#}", e)))
    }
}

/// Store for item history records in JSONL format
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".basket").join("history.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> Result<Vec<ItemHistory>> {
        read_records(&self.path)
    }

    pub fn write_all(&self, records: &[ItemHistory]) -> Result<()> {
        write_records(&self.path, records)
    }
}
