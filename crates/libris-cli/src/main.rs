//! Libris CLI
//!
//! Command-line interface for Libris - personal book catalog.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use libris_core::{BookDraft, BookPatch, BookQuery, Config, ReadFilter, Store};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "libris")]
#[command(about = "Libris - Personal book catalog")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the catalog
    Add {
        /// Book title
        title: String,
        /// Author name
        author: String,
        /// Genre or category
        #[arg(short, long, default_value = "")]
        genre: String,
        /// Publication year
        #[arg(short, long, allow_negative_numbers = true)]
        year: Option<i32>,
        /// Mark as already read
        #[arg(short, long)]
        read: bool,
    },
    /// List all books
    #[command(alias = "ls")]
    List {
        /// Filter by read status (any, read, unread)
        #[arg(short, long, default_value_t = ReadFilter::Any)]
        status: ReadFilter,
    },
    /// Show book details
    Show {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Edit a book
    Edit {
        /// Book ID (full UUID or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New author
        #[arg(short, long)]
        author: Option<String>,
        /// New genre
        #[arg(short, long)]
        genre: Option<String>,
        /// New publication year
        #[arg(short, long, conflicts_with = "clear_year", allow_negative_numbers = true)]
        year: Option<i32>,
        /// Remove the publication year
        #[arg(long)]
        clear_year: bool,
    },
    /// Mark a book as read
    Read {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Mark a book as not yet read
    Unread {
        /// Book ID (full UUID or prefix)
        id: String,
    },
    /// Remove a book
    #[command(alias = "rm")]
    Remove {
        /// Book ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search books (filters combine with AND)
    Search {
        /// Title contains (case-insensitive)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Author contains (case-insensitive)
        #[arg(short, long)]
        author: Option<String>,
        /// Genre equals (case-insensitive)
        #[arg(short, long)]
        genre: Option<String>,
        /// Read status (any, read, unread)
        #[arg(short, long, default_value_t = ReadFilter::Any)]
        status: ReadFilter,
    },
    /// Show reading statistics
    Stats {
        /// Number of favorite authors to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Show library location and contents
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, library_file, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    init_logging(&config);

    let (mut store, warning) = Store::open_or_recover(&config);
    if let Some(err) = warning {
        output.warn_persistence("Could not load library, starting with an empty one", &err);
    }

    match cli.command {
        Commands::Add {
            title,
            author,
            genre,
            year,
            read,
        } => {
            let draft = BookDraft {
                title,
                author,
                genre,
                year,
                read,
            };
            commands::book::add(&mut store, draft, &output)
        }
        Commands::List { status } => commands::book::list(&store, status, &output),
        Commands::Show { id } => commands::book::show(&store, id, &output),
        Commands::Edit {
            id,
            title,
            author,
            genre,
            year,
            clear_year,
        } => {
            let patch = BookPatch {
                title,
                author,
                genre,
                year: if clear_year { Some(None) } else { year.map(Some) },
                read: None,
            };
            commands::book::edit(&mut store, id, patch, &output)
        }
        Commands::Read { id } => commands::book::set_read(&mut store, id, true, &output),
        Commands::Unread { id } => commands::book::set_read(&mut store, id, false, &output),
        Commands::Remove { id, yes } => commands::book::remove(&mut store, id, yes, &output),
        Commands::Search {
            title,
            author,
            genre,
            status,
        } => {
            let query = BookQuery {
                title_contains: title,
                author_contains: author,
                genre_equals: genre,
                read_status: status,
            };
            commands::book::search(&store, query, &output)
        }
        Commands::Stats { top } => commands::stats::show(&store, top, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Only initializes if LIBRIS_LOG environment variable is set.
/// Logs to config.log_file if set, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LIBRIS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "libris_core={},libris_cli={}",
        log_level, log_level
    ));

    // Ignore errors if a subscriber is already installed
    match config.log_file {
        Some(ref log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();
            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
