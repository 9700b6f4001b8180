//! Book search
//!
//! A `BookQuery` lists optional filters; a book matches when it passes all
//! of them. Searching never mutates the collection and keeps its order.

use std::fmt;
use std::str::FromStr;

use crate::models::Book;

/// Filter on the read flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    /// No filtering
    #[default]
    Any,
    Read,
    Unread,
}

impl ReadFilter {
    fn matches(self, read: bool) -> bool {
        match self {
            ReadFilter::Any => true,
            ReadFilter::Read => read,
            ReadFilter::Unread => !read,
        }
    }
}

impl FromStr for ReadFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" => Ok(ReadFilter::Any),
            "read" => Ok(ReadFilter::Read),
            "unread" => Ok(ReadFilter::Unread),
            other => Err(format!(
                "unknown read status '{}', expected any, read or unread",
                other
            )),
        }
    }
}

impl fmt::Display for ReadFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadFilter::Any => "any",
            ReadFilter::Read => "read",
            ReadFilter::Unread => "unread",
        };
        write!(f, "{}", s)
    }
}

/// Search filters, combined with logical AND
///
/// An empty query matches every book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Case-insensitive substring of the author
    pub author_contains: Option<String>,
    /// Case-insensitive exact genre
    pub genre_equals: Option<String>,
    pub read_status: ReadFilter,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    pub fn author_contains(mut self, needle: impl Into<String>) -> Self {
        self.author_contains = Some(needle.into());
        self
    }

    pub fn genre_equals(mut self, genre: impl Into<String>) -> Self {
        self.genre_equals = Some(genre.into());
        self
    }

    pub fn read_status(mut self, filter: ReadFilter) -> Self {
        self.read_status = filter;
        self
    }

    /// Check whether a single book passes every filter
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(ref needle) = self.title_contains {
            if !contains_ignore_case(&book.title, needle) {
                return false;
            }
        }
        if let Some(ref needle) = self.author_contains {
            if !contains_ignore_case(&book.author, needle) {
                return false;
            }
        }
        if let Some(ref genre) = self.genre_equals {
            if book.genre.trim().to_lowercase() != genre.trim().to_lowercase() {
                return false;
            }
        }
        self.read_status.matches(book.read)
    }
}

/// Return the books matching `query`, in collection order
pub fn search<'a>(books: &'a [Book], query: &BookQuery) -> Vec<&'a Book> {
    books.iter().filter(|book| query.matches(book)).collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(needle.trim().to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookDraft;
    use uuid::Uuid;

    fn catalog() -> Vec<Book> {
        let drafts = [
            BookDraft::new("Dune", "Frank Herbert").genre("Fiction").read(true),
            BookDraft::new("SPQR", "Mary Beard").genre("History"),
            BookDraft::new("Dune Messiah", "Frank Herbert").genre("fiction"),
            BookDraft::new("The Histories", "Herodotus").genre("History").read(true),
            BookDraft::new("Emma", "Jane Austen").genre("  FICTION "),
        ];
        drafts
            .into_iter()
            .map(|d| Book::from_draft(Uuid::new_v4(), d).unwrap())
            .collect()
    }

    fn titles(books: &[&Book]) -> Vec<String> {
        books.iter().map(|b| b.title.clone()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let books = catalog();
        assert_eq!(search(&books, &BookQuery::new()).len(), books.len());
    }

    #[test]
    fn test_genre_equals_is_case_insensitive_subset_in_order() {
        let books = catalog();
        let results = search(&books, &BookQuery::new().genre_equals("Fiction"));

        let expected: Vec<&Book> = books
            .iter()
            .filter(|b| b.genre.to_lowercase() == "fiction")
            .collect();
        assert_eq!(results, expected);
        assert_eq!(titles(&results), vec!["Dune", "Dune Messiah", "Emma"]);
    }

    #[test]
    fn test_genre_equals_is_exact_not_substring() {
        let books = catalog();
        let results = search(&books, &BookQuery::new().genre_equals("Fict"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_title_contains() {
        let books = catalog();
        let results = search(&books, &BookQuery::new().title_contains("dUNE"));
        assert_eq!(titles(&results), vec!["Dune", "Dune Messiah"]);
    }

    #[test]
    fn test_author_contains() {
        let books = catalog();
        let results = search(&books, &BookQuery::new().author_contains("her"));
        assert_eq!(
            titles(&results),
            vec!["Dune", "Dune Messiah", "The Histories"]
        );
    }

    #[test]
    fn test_filters_combine_with_and() {
        let books = catalog();
        let query = BookQuery::new()
            .author_contains("herbert")
            .read_status(ReadFilter::Unread);
        assert_eq!(titles(&search(&books, &query)), vec!["Dune Messiah"]);

        let query = BookQuery::new()
            .genre_equals("history")
            .read_status(ReadFilter::Read);
        assert_eq!(titles(&search(&books, &query)), vec!["The Histories"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let books = catalog();
        let query = BookQuery::new().title_contains("Ulysses");
        assert!(search(&books, &query).is_empty());
        assert!(search(&[], &BookQuery::new()).is_empty());
    }

    #[test]
    fn test_read_filter_parse() {
        assert_eq!("read".parse::<ReadFilter>().unwrap(), ReadFilter::Read);
        assert_eq!("Unread".parse::<ReadFilter>().unwrap(), ReadFilter::Unread);
        assert_eq!("any".parse::<ReadFilter>().unwrap(), ReadFilter::Any);
        assert!("finished".parse::<ReadFilter>().is_err());
        assert_eq!(ReadFilter::Unread.to_string(), "unread");
    }
}
