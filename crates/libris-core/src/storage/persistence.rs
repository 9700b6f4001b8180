//! Library file persistence
//!
//! Saves and loads the whole book collection as a JSON array of records.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/libris/library.json` (configurable via `Config`)

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use super::error::{PersistenceError, PersistenceResult};
use crate::config::Config;
use crate::models::Book;

/// Persistence layer for the library file
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    /// Create a persistence handler for a specific file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a persistence handler for the configured library file
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.library_path())
    }

    /// Path of the library file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the library file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the collection from disk
    ///
    /// A missing file is an empty collection. A file that cannot be parsed,
    /// or whose records break the id/title/author invariants, is an error.
    pub fn load(&self) -> PersistenceResult<Vec<Book>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No library file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(PersistenceError::from_read(e, self.path.clone())),
        };

        let books: Vec<Book> =
            serde_json::from_str(&content).map_err(|e| self.invalid(e.to_string()))?;

        let mut seen = HashSet::with_capacity(books.len());
        for (index, book) in books.iter().enumerate() {
            book.check()
                .map_err(|e| self.invalid(format!("record {} ({}): {}", index, book.id, e)))?;
            if !seen.insert(book.id) {
                return Err(self.invalid(format!("duplicate id {}", book.id)));
            }
        }

        debug!("Loaded {} book(s) from {:?}", books.len(), self.path);
        Ok(books)
    }

    /// Save the full collection, replacing the previous file atomically
    pub fn save(&self, books: &[Book]) -> PersistenceResult<()> {
        let json = serde_json::to_string_pretty(books).map_err(|e| {
            PersistenceError::InvalidFormat {
                path: self.path.clone(),
                details: format!("failed to serialize library: {}", e),
            }
        })?;

        atomic_write(&self.path, json.as_bytes())?;
        debug!("Saved {} book(s) to {:?}", books.len(), self.path);
        Ok(())
    }

    /// Move an unreadable library file out of the way
    ///
    /// Returns the backup path. The original path is free afterwards, so a
    /// fresh library can be saved without destroying the old data.
    pub fn backup_corrupt(&self) -> PersistenceResult<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "library.json".to_string());
        let backup_path = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name,
            Utc::now().format("%Y%m%dT%H%M%S")
        ));

        fs::rename(&self.path, &backup_path).map_err(|source| {
            PersistenceError::AtomicWriteFailed {
                from: self.path.clone(),
                to: backup_path.clone(),
                source,
            }
        })?;

        warn!("Moved unreadable library file to {:?}", backup_path);
        Ok(backup_path)
    }

    fn invalid(&self, details: String) -> PersistenceError {
        PersistenceError::InvalidFormat {
            path: self.path.clone(),
            details,
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> PersistenceResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory as the target so the rename stays on one filesystem.
    // Appended to the full name so it can never equal the target.
    let temp_path = temp_path_for(path);

    let write = || -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistenceError::from_io(e, temp_path));
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistenceError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "library.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookDraft;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn book(title: &str, author: &str, genre: &str) -> Book {
        Book::from_draft(Uuid::new_v4(), BookDraft::new(title, author).genre(genre)).unwrap()
    }

    fn persistence(temp_dir: &TempDir) -> JsonPersistence {
        JsonPersistence::new(temp_dir.path().join("library.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);

        assert!(!persistence.exists());
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);

        let mut books = vec![
            book("Dune", "Frank Herbert", "Sci-Fi"),
            book("SPQR", "Mary Beard", "History"),
            book("Neuromancer", "William Gibson", "Sci-Fi"),
        ];
        books[1].year = Some(2015);
        books[2].read = true;

        persistence.save(&books).unwrap();
        assert!(persistence.exists());

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded, books);
    }

    #[test]
    fn test_empty_collection_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);

        persistence.save(&[]).unwrap();
        assert!(persistence.exists());
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);

        persistence
            .save(&[book("Dune", "Frank Herbert", "Sci-Fi"), book("Emma", "Jane Austen", "Classic")])
            .unwrap();
        let only = book("SPQR", "Mary Beard", "History");
        persistence.save(std::slice::from_ref(&only)).unwrap();

        assert_eq!(persistence.load().unwrap(), vec![only]);
    }

    #[test]
    fn test_file_is_human_readable_array() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);

        persistence.save(&[book("Dune", "Frank Herbert", "Sci-Fi")]).unwrap();

        let content = fs::read_to_string(persistence.path()).unwrap();
        assert!(content.trim_start().starts_with('['));
        assert!(content.contains("\"title\": \"Dune\""));
        assert!(!temp_dir.path().join("library.json.tmp").exists());
    }

    #[test]
    fn test_malformed_json_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);
        fs::write(persistence.path(), "{ not json").unwrap();

        let err = persistence.load().unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat { .. }));
    }

    #[test]
    fn test_blank_title_on_disk_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);
        let json = r#"[{"id": "7f1d3c2e-8a4b-4c5d-9e6f-0a1b2c3d4e5f", "title": " ", "author": "A"}]"#;
        fs::write(persistence.path(), json).unwrap();

        let err = persistence.load().unwrap_err();
        assert!(err.to_string().contains("Title must not be empty"));
    }

    #[test]
    fn test_duplicate_ids_are_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);
        let first = book("Dune", "Frank Herbert", "Sci-Fi");
        let mut second = book("Emma", "Jane Austen", "Classic");
        second.id = first.id;
        fs::write(
            persistence.path(),
            serde_json::to_string(&vec![first, second]).unwrap(),
        )
        .unwrap();

        let err = persistence.load().unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn test_backup_corrupt_frees_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);
        fs::write(persistence.path(), "garbage").unwrap();

        let backup = persistence.backup_corrupt().unwrap();

        assert!(!persistence.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "garbage");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("library.json.corrupt-"));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("library.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir);
        let original = vec![book("Dune", "Frank Herbert", "Sci-Fi")];
        persistence.save(&original).unwrap();

        // A directory where the temp file should go makes the write fail
        fs::create_dir(temp_dir.path().join("library.json.tmp")).unwrap();
        assert!(persistence.save(&[]).is_err());

        assert_eq!(persistence.load().unwrap(), original);
    }

    #[test]
    fn test_temp_path_never_equals_target() {
        let target = Path::new("/data/books.tmp");
        assert_eq!(temp_path_for(target), Path::new("/data/books.tmp.tmp"));
        assert_eq!(
            temp_path_for(Path::new("/data/library.json")),
            Path::new("/data/library.json.tmp")
        );
    }

    #[test]
    fn test_failed_write_keeps_previous_tmp_named_library() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(temp_dir.path().join("books.tmp"));
        let original = vec![
            book("Dune", "Frank Herbert", "Sci-Fi"),
            book("SPQR", "Mary Beard", "History"),
        ];
        persistence.save(&original).unwrap();

        fs::create_dir(temp_dir.path().join("books.tmp.tmp")).unwrap();
        assert!(persistence.save(&[]).is_err());

        assert!(persistence.exists());
        assert_eq!(persistence.load().unwrap(), original);
    }
}
