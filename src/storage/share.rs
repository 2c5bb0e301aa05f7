//! Share bundles: text for messaging plus a CSV file attachment

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::export::{export_file_name, share_csv, share_text};
use crate::domain::{Currency, ShoppingList};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Failed to write export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What gets handed to a share sheet: the text first, then the CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct ShareBundle {
    pub text: String,
    pub csv_path: PathBuf,
}

/// Renders a list and writes its CSV into `export_dir`
pub fn shareable_items(
    list: &ShoppingList,
    currency: &Currency,
    export_dir: &Path,
) -> Result<ShareBundle, ShareError> {
    let csv_path = export_dir.join(export_file_name(&list.name));

    fs::create_dir_all(export_dir).map_err(|source| ShareError::Write {
        path: export_dir.to_path_buf(),
        source,
    })?;
    fs::write(&csv_path, share_csv(list, currency)).map_err(|source| ShareError::Write {
        path: csv_path.clone(),
        source,
    })?;

    debug!(list = %list.id, path = %csv_path.display(), "wrote csv export");

    Ok(ShareBundle {
        text: share_text(list, currency),
        csv_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, ListCategory};
    use tempfile::TempDir;

    #[test]
    fn writes_csv_named_after_list() {
        let dir = TempDir::new().unwrap();
        let mut list = ShoppingList::new("Test List", ListCategory::Groceries).unwrap();
        list.add_item(Item::new("Milk").unwrap());

        let bundle = shareable_items(&list, &Currency::usd(), dir.path()).unwrap();

        assert_eq!(bundle.csv_path, dir.path().join("Test_List.csv"));
        let csv = fs::read_to_string(&bundle.csv_path).unwrap();
        assert_eq!(csv.lines().nth(1), Some("1,Milk,1,,,,No"));
        assert!(bundle.text.starts_with("🛒 Test List"));
    }

    #[test]
    fn creates_export_directory() {
        let dir = TempDir::new().unwrap();
        let export_dir = dir.path().join("exports").join("today");
        let list = ShoppingList::new("Empty", ListCategory::Groceries).unwrap();

        let bundle = shareable_items(&list, &Currency::usd(), &export_dir).unwrap();
        assert!(bundle.csv_path.exists());
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let list = ShoppingList::new("Nope", ListCategory::Groceries).unwrap();

        let err = shareable_items(&list, &Currency::usd(), &blocker).unwrap_err();
        assert!(err.to_string().contains("Failed to write export"));
    }
}
