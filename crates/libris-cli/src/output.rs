//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use libris_core::{Book, LibraryStats, PersistenceError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", book.id);
                println!("Title:   {}", book.title);
                println!("Author:  {}", book.author);
                if !book.genre.is_empty() {
                    println!("Genre:   {}", book.genre);
                }
                if let Some(year) = book.year {
                    println!("Year:    {}", year);
                }
                println!("Status:  {}", status_label(book.read));
                if let Some(added_at) = book.added_at {
                    println!("Added:   {}", added_at.format("%Y-%m-%d %H:%M"));
                }
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[&Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    let year = book.year.map(|y| y.to_string()).unwrap_or_default();
                    println!(
                        "{} | {} {:<30} | {:<22} | {:<14} | {:>4}",
                        short_id(book),
                        if book.read { "✓" } else { " " },
                        truncate(&book.title, 30),
                        truncate(&book.author, 22),
                        truncate(&book.genre, 14),
                        year
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print library statistics
    pub fn print_stats(&self, stats: &LibraryStats, top: usize) {
        match self.format {
            OutputFormat::Human => {
                if stats.is_empty() {
                    println!("Your library is empty. Start adding some books!");
                    return;
                }
                println!("Total books: {}", stats.total);
                println!("Read:        {}", stats.read);
                println!("Unread:      {}", stats.unread);
                println!("Completion:  {:.1}%", stats.percent_read());

                println!();
                println!("── Genres ──");
                for (genre, count) in stats.genres_by_count() {
                    let name = if genre.is_empty() { "(none)" } else { genre };
                    println!("{:<20} {:>4} {}", truncate(name, 20), count, bar(count));
                }

                if !stats.decades.is_empty() {
                    println!();
                    println!("── Decades ──");
                    for (decade, count) in &stats.decades {
                        println!("{}s {:>4} {}", decade, count, bar(*count));
                    }
                }

                let authors = stats.top_authors(top);
                if !authors.is_empty() {
                    println!();
                    println!("── Favorite authors ──");
                    for (author, count) in authors {
                        println!(
                            "{}: {} title{}",
                            author,
                            count,
                            if count == 1 { "" } else { "s" }
                        );
                    }
                }
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!("{} {} {}", stats.total, stats.read, stats.unread);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Report a persistence problem without aborting
    ///
    /// Always goes to stderr, even in quiet mode.
    pub fn warn_persistence(&self, context: &str, err: &PersistenceError) {
        eprintln!("⚠ {}: {}", context, err);
        if let Some(suggestion) = err.recovery_suggestion() {
            eprintln!("  {}", suggestion);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// First 8 characters of a book id
pub fn short_id(book: &Book) -> String {
    book.id.to_string()[..8].to_string()
}

fn status_label(read: bool) -> &'static str {
    if read {
        "read"
    } else {
        "to read"
    }
}

/// Horizontal bar for distribution output
fn bar(count: usize) -> String {
    "█".repeat(count.min(40))
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
