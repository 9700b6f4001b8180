//! Status command handler

use anyhow::Result;

use libris_core::{Config, Store};

use crate::output::{Output, OutputFormat};

/// Show library location and contents
pub fn show(store: &Store, config: &Config, output: &Output) -> Result<()> {
    let path = store.path();
    let size = std::fs::metadata(path).map(|m| m.len()).ok();
    let stats = store.summarize();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "library_file": path,
                    "exists": size.is_some(),
                    "size_bytes": size,
                    "data_dir": config.data_dir,
                    "books": stats.total,
                    "read": stats.read,
                    "unread": stats.unread,
                    "unsaved_changes": store.is_dirty()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", path.display());
        }
        OutputFormat::Human => {
            println!("Libris Status");
            println!("=============");
            println!();
            println!("Storage:");
            println!("  Library:  {}", path.display());
            match size {
                Some(bytes) => println!("  Size:     {}", human_size(bytes)),
                None => println!("  Size:     (not created yet)"),
            }
            println!();
            println!("Contents:");
            println!("  Books:  {}", stats.total);
            println!("  Read:   {}", stats.read);
            println!("  Unread: {}", stats.unread);
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
