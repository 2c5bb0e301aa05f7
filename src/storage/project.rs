//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use super::{
    Config, EntitlementStore, HistoryStore, ListStore, ObjectStore, Repository, StateFile,
};
use crate::domain::{Currency, SuggestionIndex};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a basket project. Run 'basket init' first.")]
    NotInProject,
}

/// A Basket project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let basket_dir = root.join(".basket");

        if !basket_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let basket_dir = root.join(".basket");

        // Create directory structure
        fs::create_dir_all(&basket_dir).with_context(|| {
            format!("Failed to create .basket directory: {}", basket_dir.display())
        })?;

        let exports_dir = basket_dir.join("exports");
        fs::create_dir_all(&exports_dir).with_context(|| {
            format!(
                "Failed to create exports directory: {}",
                exports_dir.display()
            )
        })?;

        // Create default config
        let config_path = basket_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Basket configuration

# Currency for prices in shared lists (ISO 4217 code)
currency = "USD"

# Category for new lists when none is given
default_list_category = "groceries"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for .basket
        let gitignore_path = basket_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Share exports are regenerated on demand
exports/

# Subscription state is per-user
state.toml
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .basket directory path
    pub fn basket_dir(&self) -> PathBuf {
        self.root.join(".basket")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Currency for exports
    pub fn currency(&self) -> &Currency {
        &self.config.project.currency
    }

    /// Returns the export directory
    pub fn exports_dir(&self) -> Result<PathBuf> {
        self.config.export_dir()
    }

    /// Returns the list store
    pub fn list_store(&self) -> ListStore {
        ListStore::for_project(&self.root)
    }

    /// Returns the item history store
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::for_project(&self.root)
    }

    /// Opens the entitlement store
    pub fn entitlements(&self) -> Result<EntitlementStore<StateFile>> {
        let state = StateFile::for_project(&self.root)?;
        Ok(EntitlementStore::load(state))
    }

    /// Opens the repository with its cache loaded and suggestions seeded
    /// from saved history
    pub fn repository(&self) -> Result<Repository<ListStore>> {
        let mut suggestions = SuggestionIndex::new();
        suggestions.seed(self.history_store().read_all()?);

        let mut repo = Repository::new(self.list_store(), suggestions);
        repo.load()?;
        debug!(root = %self.root.display(), lists = repo.lists().len(), "opened repository");
        Ok(repo)
    }

    /// Persists the repository's suggestion index as item history
    pub fn save_history<S: ObjectStore>(&self, repo: &Repository<S>) -> Result<()> {
        self.history_store()
            .write_all(&repo.suggestions().history())
            .context("Failed to save item history")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ListCategory, ShoppingList};
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.basket_dir().is_dir());
        assert!(project.basket_dir().join("exports").is_dir());
        assert!(project.basket_dir().join("config.toml").is_file());
        assert!(project.basket_dir().join(".gitignore").is_file());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap(); // Should not fail

        assert!(dir.path().join(".basket").is_dir());
    }

    #[test]
    fn default_config_parses() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.currency().code(), "USD");
        assert_eq!(
            project.exports_dir().unwrap(),
            dir.path().join(".basket").join("exports")
        );
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn repository_roundtrip_with_history() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        {
            let mut repo = project.repository().unwrap();
            let list = ShoppingList::new("Weekly", ListCategory::Groceries).unwrap();
            let id = list.id.clone();
            repo.add_list(list).unwrap();
            repo.add_item(&id, Item::new("Milk").unwrap()).unwrap();
            let milk = repo.list(&id).unwrap().items[0].id.clone();
            repo.remove_item(&id, &milk).unwrap();
            repo.add_item(&id, Item::new("Milk").unwrap()).unwrap();
            project.save_history(&repo).unwrap();
        }

        let repo = project.repository().unwrap();
        assert_eq!(repo.lists().len(), 1);
        // Two recorded uses survive even though only one Milk remains
        assert_eq!(repo.suggestions().usage_count("milk"), Some(2));
    }

    #[test]
    fn entitlements_persist_in_state_file() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        project.entitlements().unwrap().purchase_premium().unwrap();

        assert!(project.entitlements().unwrap().is_premium());
        assert!(project.basket_dir().join("state.toml").is_file());
    }
}
