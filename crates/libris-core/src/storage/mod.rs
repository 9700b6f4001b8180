//! Storage layer
//!
//! The library lives in a single JSON file holding every book record in
//! display order. The file is rewritten in full after each change.

pub mod error;
pub mod persistence;

pub use error::{PersistenceError, PersistenceResult};
pub use persistence::JsonPersistence;
