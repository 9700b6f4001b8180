//! Library statistics
//!
//! Summaries derived from the current collection. Nothing is cached;
//! `summarize` walks the books each time it is called.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Aggregate summary of a collection
///
/// Mappings are ordered by key: genres and authors alphabetically,
/// years and decades ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    /// Books per genre, keyed by the stored genre text
    pub genres: BTreeMap<String, usize>,
    /// Books per author
    pub authors: BTreeMap<String, usize>,
    /// Books per publication year; only books with a year are counted
    pub years: BTreeMap<i32, usize>,
    /// Books per publication decade (1960, 1970, ...)
    pub decades: BTreeMap<i32, usize>,
}

impl LibraryStats {
    /// Share of books marked read, as a percentage
    pub fn percent_read(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.read as f64 / self.total as f64 * 100.0
    }

    /// Genres ordered by count (descending), ties by name
    pub fn genres_by_count(&self) -> Vec<(&str, usize)> {
        ranked(&self.genres)
    }

    /// The `n` most cataloged authors, ties by name
    pub fn top_authors(&self, n: usize) -> Vec<(&str, usize)> {
        let mut authors = ranked(&self.authors);
        authors.truncate(n);
        authors
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Compute statistics for a collection
pub fn summarize(books: &[Book]) -> LibraryStats {
    let mut stats = LibraryStats {
        total: books.len(),
        ..Default::default()
    };

    for book in books {
        if book.read {
            stats.read += 1;
        }
        *stats.genres.entry(book.genre.clone()).or_default() += 1;
        *stats.authors.entry(book.author.clone()).or_default() += 1;
        if let Some(year) = book.year {
            *stats.years.entry(year).or_default() += 1;
        }
        if let Some(decade) = book.decade() {
            *stats.decades.entry(decade).or_default() += 1;
        }
    }
    stats.unread = stats.total - stats.read;

    stats
}

fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // Stable sort keeps the alphabetical order of the map for equal counts
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}
