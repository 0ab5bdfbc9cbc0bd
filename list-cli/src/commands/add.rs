//! Insert a record.

use anyhow::{Context, Result};
use list_client::ResourceManager;
use serde_json::Value;

use super::print_record;

/// Run the add command.
pub async fn run(manager: &ResourceManager, data: Value, result_key: Option<&str>) -> Result<()> {
    let stored = manager
        .crud()
        .add_item(data, result_key)
        .await
        .context("Failed to add record")?;

    match stored {
        Some(record) => print_record(&record),
        None => println!("add skipped"),
    }
    Ok(())
}
