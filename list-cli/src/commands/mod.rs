//! CLI command implementations.

pub mod add;
pub mod delete;
pub mod list;
pub mod set;
pub mod update;

use list_client::{RemoteOps, ResourceManager};
use serde_json::Value;
use std::sync::Arc;

use crate::config::CliConfig;
use crate::store::FixtureStore;

/// Build a manager whose service and remote writes both go to the fixture.
pub fn manager(config: &CliConfig) -> ResourceManager {
    let store = Arc::new(FixtureStore::new(
        config.fixture.path.clone(),
        config.fixture.page_size,
        config.resource.data_key.clone(),
        config.resource.id_key.clone(),
    ));
    tracing::debug!(fixture = %store.path().display(), "using fixture");

    ResourceManager::builder(store.clone())
        .options(config.resource.clone())
        .remote(RemoteOps::from_crud(store))
        .on_error(|message| tracing::error!("failed to load records: {}", message))
        .build()
}

/// Print one record as a single line of JSON.
pub fn print_record(record: &Value) {
    println!("{}", record);
}
