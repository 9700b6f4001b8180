//! Data models for Libris
//!
//! Defines the book record and the field sets used to create and edit it.
//! Records are validated on construction; the store assigns ids.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Earliest publication year accepted for a book
pub const MIN_YEAR: i32 = 1000;

/// Errors raised when book fields are invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    BlankTitle,

    #[error("Author must not be empty")]
    BlankAuthor,

    #[error("Year {year} is not plausible (expected {min}..={max})")]
    ImplausibleYear { year: i32, min: i32, max: i32 },
}

/// A cataloged book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Book {
    /// Unique identifier, assigned by the store
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Free-form category
    #[serde(default)]
    pub genre: String,
    /// Publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Whether the book has been read
    #[serde(default)]
    pub read: bool,
    /// When this book was added to the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Build a record from validated draft fields
    pub fn from_draft(id: Uuid, draft: BookDraft) -> Result<Self, ValidationError> {
        let draft = draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            author: draft.author,
            genre: draft.genre,
            year: draft.year,
            read: draft.read,
            added_at: Some(Utc::now()),
        })
    }

    /// Apply a partial update
    ///
    /// Every present field is validated before anything is written, so a
    /// rejected patch leaves the record untouched.
    pub fn apply(&mut self, patch: &BookPatch) -> Result<(), ValidationError> {
        let title = patch.title.as_deref().map(required_title).transpose()?;
        let author = patch.author.as_deref().map(required_author).transpose()?;
        if let Some(Some(year)) = patch.year {
            check_year(year)?;
        }

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(author) = author {
            self.author = author;
        }
        if let Some(ref genre) = patch.genre {
            self.genre = genre.trim().to_string();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(read) = patch.read {
            self.read = read;
        }
        Ok(())
    }

    /// Check the invariants of a record read from storage
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::BlankAuthor);
        }
        if let Some(year) = self.year {
            check_year(year)?;
        }
        Ok(())
    }

    /// The decade this book was published in, if the year is known
    pub fn decade(&self) -> Option<i32> {
        self.year.map(|y| y - y.rem_euclid(10))
    }
}

/// Fields supplied when adding a book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: Option<i32>,
    pub read: bool,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Trim text fields and check them
    pub fn validate(self) -> Result<Self, ValidationError> {
        let title = required_title(&self.title)?;
        let author = required_author(&self.author)?;
        if let Some(year) = self.year {
            check_year(year)?;
        }
        Ok(Self {
            title,
            author,
            genre: self.genre.trim().to_string(),
            year: self.year,
            read: self.read,
        })
    }
}

/// Partial changes to an existing book
///
/// `None` leaves a field unchanged. For `year`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<Option<i32>>,
    pub read: Option<bool>,
}

impl BookPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = Some(year);
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = Some(read);
        self
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.read.is_none()
    }
}

fn required_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    Ok(title.to_string())
}

fn required_author(author: &str) -> Result<String, ValidationError> {
    let author = author.trim();
    if author.is_empty() {
        return Err(ValidationError::BlankAuthor);
    }
    Ok(author.to_string())
}

/// Calendar year on the user's clock
fn current_year() -> i32 {
    Local::now().year()
}

fn check_year(year: i32) -> Result<(), ValidationError> {
    let max = current_year();
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(ValidationError::ImplausibleYear {
            year,
            min: MIN_YEAR,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        let draft = BookDraft::new("Dune", "Frank Herbert")
            .genre("Sci-Fi")
            .year(1965);
        Book::from_draft(Uuid::new_v4(), draft).unwrap()
    }

    #[test]
    fn test_from_draft_trims_fields() {
        let draft = BookDraft::new("  Dune ", " Frank Herbert\n").genre(" Sci-Fi ");
        let book = Book::from_draft(Uuid::new_v4(), draft).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.genre, "Sci-Fi");
        assert!(!book.read);
        assert!(book.added_at.is_some());
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = Book::from_draft(Uuid::new_v4(), BookDraft::new("   ", "Someone")).unwrap_err();
        assert_eq!(err, ValidationError::BlankTitle);
    }

    #[test]
    fn test_blank_author_rejected() {
        let err = Book::from_draft(Uuid::new_v4(), BookDraft::new("Title", "")).unwrap_err();
        assert_eq!(err, ValidationError::BlankAuthor);
    }

    #[test]
    fn test_year_bounds() {
        assert!(BookDraft::new("A", "B").year(1000).validate().is_ok());
        assert!(BookDraft::new("A", "B").year(1999).validate().is_ok());
        assert!(matches!(
            BookDraft::new("A", "B").year(999).validate(),
            Err(ValidationError::ImplausibleYear { year: 999, .. })
        ));
        assert!(BookDraft::new("A", "B").year(10_000).validate().is_err());
        assert!(BookDraft::new("A", "B").year(-1965).validate().is_err());
    }

    #[test]
    fn test_year_upper_bound_is_local_year() {
        let this_year = Local::now().year();
        assert!(BookDraft::new("A", "B").year(this_year).validate().is_ok());
        assert!(matches!(
            BookDraft::new("A", "B").year(this_year + 1).validate(),
            Err(ValidationError::ImplausibleYear { max, .. }) if max == this_year
        ));
    }

    #[test]
    fn test_apply_read_only_changes_read() {
        let mut book = dune();
        let before = book.clone();

        book.apply(&BookPatch::new().read(true)).unwrap();

        assert!(book.read);
        assert_eq!(book.id, before.id);
        assert_eq!(book.title, before.title);
        assert_eq!(book.author, before.author);
        assert_eq!(book.genre, before.genre);
        assert_eq!(book.year, before.year);
    }

    #[test]
    fn test_apply_invalid_patch_leaves_book_untouched() {
        let mut book = dune();
        let before = book.clone();

        let patch = BookPatch::new().genre("Classic").title(" ");
        assert_eq!(book.apply(&patch), Err(ValidationError::BlankTitle));
        assert_eq!(book, before);

        let patch = BookPatch::new().author("Someone").year(Some(42));
        assert!(book.apply(&patch).is_err());
        assert_eq!(book, before);
    }

    #[test]
    fn test_apply_clears_year() {
        let mut book = dune();
        book.apply(&BookPatch::new().year(None)).unwrap();
        assert_eq!(book.year, None);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(BookPatch::new().is_empty());
        assert!(!BookPatch::new().read(false).is_empty());
    }

    #[test]
    fn test_decade() {
        let book = dune();
        assert_eq!(book.decade(), Some(1960));

        let mut undated = dune();
        undated.year = None;
        assert_eq!(undated.decade(), None);
    }

    #[test]
    fn test_book_serialization() {
        let book = dune();
        let json = serde_json::to_string(&book).unwrap();
        let deserialized: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(book, deserialized);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{
            "id": "7f1d3c2e-8a4b-4c5d-9e6f-0a1b2c3d4e5f",
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Sci-Fi",
            "read": false,
            "rating": 5
        }"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "id": "7f1d3c2e-8a4b-4c5d-9e6f-0a1b2c3d4e5f",
            "title": "Dune",
            "author": "Frank Herbert"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.genre, "");
        assert_eq!(book.year, None);
        assert!(!book.read);
        assert!(book.added_at.is_none());
    }
}
