//! Stats command handler

use anyhow::Result;

use libris_core::Store;

use crate::output::Output;

/// Show reading statistics
pub fn show(store: &Store, top: usize, output: &Output) -> Result<()> {
    let stats = store.summarize();
    output.print_stats(&stats, top);
    Ok(())
}
