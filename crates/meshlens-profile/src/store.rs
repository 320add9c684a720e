//! Profile book persistence
//!
//! The book lives in one JSON file inside a data directory. Loading never
//! fails: a missing file gives a fresh book, and an unreadable one is
//! logged and replaced by a fresh book on the next save.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::book::ProfileBook;
use crate::error::{ProfileError, ProfileResult};
use crate::profile::NetworkProfile;

/// Filename for the profile book
const BOOK_FILENAME: &str = "profiles.json";

#[derive(Deserialize)]
struct StoredBook {
    #[serde(default)]
    profiles: Vec<NetworkProfile>,
    #[serde(default)]
    active_id: Option<String>,
}

/// Reads and writes the profile book
#[derive(Debug, Clone)]
pub struct ProfileStore {
    /// Data directory holding the book
    path: PathBuf,
}

impl ProfileStore {
    /// Create a store for the given data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.to_path_buf(),
        }
    }

    /// Path to the book file
    pub fn book_path(&self) -> PathBuf {
        self.path.join(BOOK_FILENAME)
    }

    /// Load the saved book, or a default one
    pub fn load(&self) -> ProfileBook {
        let path = self.book_path();
        if !path.exists() {
            info!(path = %path.display(), "No saved profiles, starting with a default profile");
            return ProfileBook::default();
        }

        match self.read(&path) {
            Ok(book) => {
                debug!(path = %path.display(), profiles = book.len(), "Loaded profiles");
                book
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load profiles, using defaults");
                ProfileBook::default()
            }
        }
    }

    /// Write the book, creating the data directory if needed
    pub fn save(&self, book: &ProfileBook) -> ProfileResult<()> {
        std::fs::create_dir_all(&self.path).map_err(|source| ProfileError::Io {
            path: self.path.clone(),
            source,
        })?;

        let path = self.book_path();
        let json = serde_json::to_string_pretty(book)?;
        std::fs::write(&path, json).map_err(|source| ProfileError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), profiles = book.len(), "Saved profiles");
        Ok(())
    }

    fn read(&self, path: &Path) -> ProfileResult<ProfileBook> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stored: StoredBook = serde_json::from_str(&text)?;
        Ok(ProfileBook::from_parts(
            stored.profiles,
            stored.active_id.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_default_book() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::new(temp_dir.path());

        let book = store.load();
        assert_eq!(book.len(), 1);
        assert!(!store.book_path().exists());
    }

    #[test]
    fn test_corrupt_file_gives_default_book() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::new(temp_dir.path());
        std::fs::write(store.book_path(), b"not json").unwrap();

        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_empty_profile_list_gives_default_book() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::new(temp_dir.path());
        std::fs::write(store.book_path(), br#"{"profiles":[],"active_id":"x"}"#).unwrap();

        let book = store.load();
        assert_eq!(book.len(), 1);
        assert_eq!(book.active().id, book.active_id());
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::new(&temp_dir.path().join("nested").join("dir"));

        store.save(&ProfileBook::default()).unwrap();
        assert!(store.book_path().exists());
    }
}
