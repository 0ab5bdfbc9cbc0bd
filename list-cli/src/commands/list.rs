//! Load and print records.

use anyhow::{bail, Result};
use list_client::{FetchOutcome, ResourceManager};

use super::print_record;

/// Run the list command.
pub async fn run(manager: &ResourceManager, all: bool) -> Result<()> {
    if let FetchOutcome::Failed { message } = manager.start().await {
        bail!("Failed to load records: {}", message);
    }

    while all && manager.state().has_next_page {
        match manager.queries().fetch_next_page().await {
            FetchOutcome::Failed { message } => bail!("Failed to load next page: {}", message),
            FetchOutcome::Skipped | FetchOutcome::Loaded { records: 0, .. } => break,
            _ => {}
        }
    }

    let state = manager.state();
    for record in &state.records {
        print_record(record);
    }

    let total_pages = state
        .total_pages
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    let total_results = state
        .total_results
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    println!(
        "page {} of {}, {} of {} records shown",
        state.page,
        total_pages,
        state.records.len(),
        total_results
    );
    if state.has_next_page {
        println!("more pages available (use --all)");
    }
    Ok(())
}
