//! Delete a record.

use anyhow::{Context, Result};
use list_client::ResourceManager;
use list_types::RecordId;

/// Run the delete command.
pub async fn run(manager: &ResourceManager, id: &RecordId) -> Result<()> {
    let deleted = manager
        .crud()
        .delete_item(id)
        .await
        .with_context(|| format!("Failed to delete record {}", id))?;

    if deleted {
        println!("deleted {}", id);
    } else {
        println!("delete skipped");
    }
    Ok(())
}
