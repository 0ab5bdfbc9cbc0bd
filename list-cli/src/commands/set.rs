//! Patch one field of a loaded record in memory.
//!
//! Exercises the local mutators only: the fixture file is not written.

use anyhow::{bail, Result};
use list_client::{FetchOutcome, ResourceManager};
use list_types::RecordId;
use serde_json::Value;

use super::print_record;

/// Run the set command.
pub async fn run(
    manager: &ResourceManager,
    id: &RecordId,
    key: &str,
    value: Value,
    match_key: Option<&str>,
) -> Result<()> {
    if let FetchOutcome::Failed { message } = manager.start().await {
        bail!("Failed to load records: {}", message);
    }

    let touched = manager
        .queries()
        .update_existing_data_with_key(id, key, value, match_key);
    if touched == 0 {
        bail!("No loaded record matches {}", id);
    }

    let match_key = match_key.unwrap_or(&manager.options().id_key);
    for record in manager
        .state()
        .records
        .iter()
        .filter(|r| r.get(match_key).is_some_and(|v| id.matches(v)))
    {
        print_record(record);
    }
    Ok(())
}
