//! Book collection store
//!
//! The `Store` owns the in-memory collection and is the only way to change
//! it. Every successful change rewrites the library file.
//!
//! ## Unsaved changes
//!
//! A failed save does not undo the change. The caller gets the error in
//! `Change::unsaved`, the store stays dirty, and the next save (the next
//! change, or `flush`) writes the full collection including it.
//!
//! ## Usage
//!
//! ```ignore
//! let (mut store, warning) = Store::open()?;
//!
//! let change = store.add(BookDraft::new("Dune", "Frank Herbert").genre("Sci-Fi"))?;
//! if let Some(err) = change.unsaved {
//!     eprintln!("not saved: {}", err);
//! }
//!
//! let unread = store.search(&BookQuery::new().read_status(ReadFilter::Unread));
//! let stats = store.summarize();
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Book, BookDraft, BookPatch, ValidationError};
use crate::query::{self, BookQuery};
use crate::stats::{self, LibraryStats};
use crate::storage::{JsonPersistence, PersistenceError, PersistenceResult};

/// Result of a mutation that was applied in memory
#[derive(Debug)]
#[must_use = "a change may not have been saved"]
pub struct Change<T> {
    /// What the operation returned
    pub value: T,
    /// Set when the change could not be written to disk
    pub unsaved: Option<PersistenceError>,
}

impl<T> Change<T> {
    fn saved(value: T) -> Self {
        Self {
            value,
            unsaved: None,
        }
    }

    /// Whether the change reached the library file
    pub fn is_saved(&self) -> bool {
        self.unsaved.is_none()
    }

    pub fn into_parts(self) -> (T, Option<PersistenceError>) {
        (self.value, self.unsaved)
    }
}

/// Errors resolving a short id
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("No book found matching: {0}")]
    NotFound(String),

    #[error("Ambiguous id '{prefix}' matches {count} books. Please provide more characters.", count = .matches.len())]
    Ambiguous { prefix: String, matches: Vec<Uuid> },
}

/// The book collection and its persistence
pub struct Store {
    books: Vec<Book>,
    persistence: JsonPersistence,
    /// Ids removed this session; never handed out again
    retired: HashSet<Uuid>,
    /// In-memory state is ahead of the file
    dirty: bool,
}

impl Store {
    /// Open the store from the default configuration
    ///
    /// Never fails on a bad library file: see `open_or_recover`.
    pub fn open() -> Result<(Self, Option<PersistenceError>)> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_or_recover(&config))
    }

    /// Open the store, failing if the library file cannot be loaded
    pub fn open_with_config(config: &Config) -> PersistenceResult<Self> {
        Self::with_persistence(JsonPersistence::from_config(config))
    }

    /// Open the store, falling back to an empty collection on load failure
    ///
    /// The unreadable file is moved aside first, so later saves cannot
    /// overwrite it. The load error is returned for the caller to show.
    pub fn open_or_recover(config: &Config) -> (Self, Option<PersistenceError>) {
        Self::recover(JsonPersistence::from_config(config))
    }

    /// Load the collection through a specific persistence handler
    pub fn with_persistence(persistence: JsonPersistence) -> PersistenceResult<Self> {
        let books = persistence.load()?;
        Ok(Self::from_parts(books, persistence))
    }

    /// Like `with_persistence`, but starts empty when loading fails
    pub fn recover(persistence: JsonPersistence) -> (Self, Option<PersistenceError>) {
        match persistence.load() {
            Ok(books) => (Self::from_parts(books, persistence), None),
            Err(err) => {
                warn!("Could not load library, starting empty: {}", err);
                if persistence.exists() {
                    if let Err(backup_err) = persistence.backup_corrupt() {
                        warn!("Could not move unreadable library aside: {}", backup_err);
                    }
                }
                (Self::from_parts(Vec::new(), persistence), Some(err))
            }
        }
    }

    fn from_parts(books: Vec<Book>, persistence: JsonPersistence) -> Self {
        Self {
            books,
            persistence,
            retired: HashSet::new(),
            dirty: false,
        }
    }

    /// Path of the library file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// Whether changes are waiting to be written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ==================== Mutations ====================

    /// Add a new book and return its id
    pub fn add(&mut self, draft: BookDraft) -> Result<Change<Uuid>, ValidationError> {
        let id = self.fresh_id();
        let book = Book::from_draft(id, draft)?;
        info!("Adding book {} ({} by {})", id, book.title, book.author);
        self.books.push(book);
        Ok(self.commit(id))
    }

    /// Remove a book
    ///
    /// Returns `false` without touching the file if the id is unknown.
    pub fn remove(&mut self, id: Uuid) -> Change<bool> {
        let Some(index) = self.position(id) else {
            return Change::saved(false);
        };
        let book = self.books.remove(index);
        self.retired.insert(id);
        info!("Removed book {} ({})", id, book.title);
        self.commit(true)
    }

    /// Apply partial changes to a book
    ///
    /// Returns `false` if the id is unknown. An invalid patch changes nothing.
    pub fn update(&mut self, id: Uuid, patch: &BookPatch) -> Result<Change<bool>, ValidationError> {
        let Some(index) = self.position(id) else {
            return Ok(Change::saved(false));
        };
        self.books[index].apply(patch)?;
        info!("Updated book {}", id);
        Ok(self.commit(true))
    }

    /// Mark a book as read or unread
    pub fn set_read(&mut self, id: Uuid, read: bool) -> Change<bool> {
        let Some(index) = self.position(id) else {
            return Change::saved(false);
        };
        self.books[index].read = read;
        info!("Marked book {} as {}", id, if read { "read" } else { "unread" });
        self.commit(true)
    }

    /// Write pending changes, if any
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.persistence.save(&self.books)?;
        self.dirty = false;
        Ok(())
    }

    fn commit<T>(&mut self, value: T) -> Change<T> {
        self.dirty = true;
        match self.flush() {
            Ok(()) => Change::saved(value),
            Err(err) => {
                warn!("Change kept in memory but not saved: {}", err);
                Change {
                    value,
                    unsaved: Some(err),
                }
            }
        }
    }

    fn fresh_id(&self) -> Uuid {
        self.fresh_id_from(Uuid::new_v4)
    }

    /// First drawn id that is neither live nor retired
    fn fresh_id_from(&self, mut draw: impl FnMut() -> Uuid) -> Uuid {
        loop {
            let id = draw();
            if !self.retired.contains(&id) && self.position(id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    // ==================== Queries ====================

    /// All books, in insertion order
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    /// Get a book by id
    pub fn get(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Book, LookupError> {
        let prefix = prefix.trim();
        if let Ok(id) = Uuid::parse_str(prefix) {
            return self
                .get(id)
                .ok_or_else(|| LookupError::NotFound(prefix.to_string()));
        }

        let needle = prefix.to_lowercase();
        let matches: Vec<&Book> = if needle.is_empty() {
            Vec::new()
        } else {
            self.books
                .iter()
                .filter(|b| b.id.to_string().starts_with(&needle))
                .collect()
        };

        match matches.as_slice() {
            [] => Err(LookupError::NotFound(prefix.to_string())),
            [book] => Ok(book),
            _ => Err(LookupError::Ambiguous {
                prefix: prefix.to_string(),
                matches: matches.iter().map(|b| b.id).collect(),
            }),
        }
    }

    /// Books matching a query, in insertion order
    pub fn search(&self, query: &BookQuery) -> Vec<&Book> {
        query::search(&self.books, query)
    }

    /// Statistics over the current collection
    pub fn summarize(&self) -> LibraryStats {
        stats::summarize(&self.books)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
