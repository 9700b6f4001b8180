//! Libris Core Library
//!
//! This crate provides the core functionality for Libris, a personal book
//! catalog kept in a single local JSON file.
//!
//! # Architecture
//!
//! - **Store**: owns the in-memory collection, the only place it changes
//! - **JSON file**: rewritten atomically after every change
//!
//! Searches and statistics are computed from the in-memory collection.
//!
//! # Quick Start
//!
//! ```text
//! let (mut store, warning) = Store::open()?;
//!
//! // Add a book
//! let id = store.add(BookDraft::new("Dune", "Frank Herbert").genre("Sci-Fi"))?.value;
//! store.set_read(id, true);
//!
//! // Query books
//! let sci_fi = store.search(&BookQuery::new().genre_equals("sci-fi"));
//! let stats = store.summarize();
//! ```
//!
//! # Modules
//!
//! - `store`: Collection store (main entry point)
//! - `models`: Book record and its validation
//! - `query`: Search filters
//! - `stats`: Aggregate statistics
//! - `storage`: JSON file persistence
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod query;
pub mod stats;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{Book, BookDraft, BookPatch, ValidationError};
pub use query::{BookQuery, ReadFilter};
pub use stats::LibraryStats;
pub use storage::{JsonPersistence, PersistenceError};
pub use store::{Change, LookupError, Store};
