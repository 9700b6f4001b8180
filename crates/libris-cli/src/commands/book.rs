//! Book command handlers

use anyhow::{bail, Result};
use uuid::Uuid;

use libris_core::{BookDraft, BookPatch, BookQuery, Change, LookupError, ReadFilter, Store};

use crate::output::{short_id, Output};
use crate::prompt::confirm;

/// Add a new book
pub fn add(store: &mut Store, draft: BookDraft, output: &Output) -> Result<()> {
    let change = store.add(draft)?;
    let id = saved_or_warn(change, output);

    if let Some(book) = store.get(id) {
        output.success(&format!("Added book: {}", id));
        output.print_book(book);
    }
    Ok(())
}

/// List all books, optionally filtered by read status
pub fn list(store: &Store, status: ReadFilter, output: &Output) -> Result<()> {
    let books = store.search(&BookQuery::new().read_status(status));
    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id)?;
    if let Some(book) = store.get(uuid) {
        output.print_book(book);
    }
    Ok(())
}

/// Edit fields of a book
pub fn edit(store: &mut Store, id: String, patch: BookPatch, output: &Output) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one of --title, --author, --genre, --year or --clear-year.");
    }

    let uuid = resolve_id(store, &id)?;
    let change = store.update(uuid, &patch)?;
    if !saved_or_warn(change, output) {
        bail!("Book not found: {}", id);
    }

    output.success("Book updated");
    if let Some(book) = store.get(uuid) {
        output.print_book(book);
    }
    Ok(())
}

/// Mark a book as read or unread
pub fn set_read(store: &mut Store, id: String, read: bool, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id)?;
    let change = store.set_read(uuid, read);
    if !saved_or_warn(change, output) {
        bail!("Book not found: {}", id);
    }

    let title = store.get(uuid).map(|b| b.title.as_str()).unwrap_or_default();
    let status = if read { "read" } else { "to read" };
    output.success(&format!("Marked '{}' as {}", title, status));
    Ok(())
}

/// Remove a book
pub fn remove(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let uuid = resolve_id(store, &id)?;

    if !yes && output.should_prompt() {
        if let Some(book) = store.get(uuid) {
            println!("Remove book: {} - {} by {}", short_id(book), book.title, book.author);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !saved_or_warn(store.remove(uuid), output) {
        output.message(&format!("No book with id {} (nothing removed)", uuid));
        return Ok(());
    }

    output.success(&format!("Removed book: {}", uuid));
    Ok(())
}

/// Search books
pub fn search(store: &Store, query: BookQuery, output: &Output) -> Result<()> {
    let books = store.search(&query);
    output.print_books(&books);
    Ok(())
}

/// Unwrap a change, warning if it was not written to disk
fn saved_or_warn<T>(change: Change<T>, output: &Output) -> T {
    let (value, unsaved) = change.into_parts();
    if let Some(err) = unsaved {
        output.warn_persistence("Change applied but NOT saved to disk", &err);
    }
    value
}

/// Resolve a book ID (supports full UUID or prefix)
fn resolve_id(store: &Store, id: &str) -> Result<Uuid> {
    match store.find_by_prefix(id) {
        Ok(book) => Ok(book.id),
        Err(LookupError::Ambiguous { prefix, matches }) => {
            eprintln!("Multiple books match '{}':", prefix);
            for id in &matches {
                if let Some(book) = store.get(*id) {
                    eprintln!("  {} - {}", book.id, book.title);
                }
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use libris_core::JsonPersistence;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> Store {
        Store::with_persistence(JsonPersistence::new(temp_dir.path().join("library.json"))).unwrap()
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_add_and_resolve_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store(&temp_dir);

        add(&mut store, BookDraft::new("Dune", "Frank Herbert"), &quiet()).unwrap();
        let id = store.list()[0].id;

        assert_eq!(resolve_id(&store, &id.to_string()[..6]).unwrap(), id);
        assert!(resolve_id(&store, "not-an-id").is_err());
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store(&temp_dir);

        let err = add(&mut store, BookDraft::new(" ", "Someone"), &quiet()).unwrap_err();
        assert!(err.to_string().contains("Title must not be empty"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_edit_requires_changes() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store(&temp_dir);
        add(&mut store, BookDraft::new("Dune", "Frank Herbert"), &quiet()).unwrap();
        let id = store.list()[0].id.to_string();

        assert!(edit(&mut store, id.clone(), BookPatch::new(), &quiet()).is_err());

        edit(&mut store, id, BookPatch::new().genre("Sci-Fi").year(Some(1965)), &quiet()).unwrap();
        assert_eq!(store.list()[0].genre, "Sci-Fi");
        assert_eq!(store.list()[0].year, Some(1965));
    }

    #[test]
    fn test_set_read_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = store(&temp_dir);
        add(&mut store, BookDraft::new("Dune", "Frank Herbert"), &quiet()).unwrap();
        let id = store.list()[0].id.to_string();

        set_read(&mut store, id.clone(), true, &quiet()).unwrap();
        assert!(store.list()[0].read);

        // Quiet mode never prompts
        remove(&mut store, id.clone(), false, &quiet()).unwrap();
        assert!(store.is_empty());
        assert!(remove(&mut store, id, true, &quiet()).is_err());
    }
}
