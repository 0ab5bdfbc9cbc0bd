//! Update a record.

use anyhow::{Context, Result};
use list_client::ResourceManager;
use list_types::RecordId;
use serde_json::Value;

use super::print_record;

/// Run the update command.
pub async fn run(manager: &ResourceManager, id: &RecordId, data: Value) -> Result<()> {
    let updated = manager
        .crud()
        .update_item(id, data, None)
        .await
        .with_context(|| format!("Failed to update record {}", id))?;

    match updated {
        Some(record) => print_record(&record),
        None => println!("nothing to update"),
    }
    Ok(())
}
