//! # list-client
//!
//! Async data-access layer for list-oriented UIs backed by a paginated
//! remote service.
//!
//! ## Features
//!
//! - **Paginated fetch**: initial load, refresh and next-page loads with
//!   loading flags that are always released
//! - **Mutations**: add/update/delete that patch the local collection after
//!   the remote write succeeds, without a refetch
//! - **Pluggable collaborators**: page service, extractor and remote writes
//!   are traits; absence of a write capability is a typed state
//! - **Observer**: every state transition publishes a [`ResourceSnapshot`]
//!
//! ## Example
//!
//! ```ignore
//! use list_client::{FetchOptions, RemoteOps, ResourceManager};
//!
//! let manager = ResourceManager::builder(api.clone())
//!     .data_key("users")
//!     .remote(RemoteOps::from_crud(api))
//!     .on_error(|msg| eprintln!("load failed: {msg}"))
//!     .build();
//!
//! manager.start().await;
//! manager.crud().add_item(json!({"name": "x"}), None).await?;
//! let view = manager.state();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod fetch;
pub mod manager;
pub mod mutation;
pub mod remote;
pub mod snapshot;

pub use config::{ConfigError, ResourceOptions};
pub use fetch::{FetchOptions, FetchOutcome, Fetcher};
pub use manager::{ResourceManager, ResourceManagerBuilder};
pub use mutation::{MutationCoordinator, MutationError};
pub use remote::{
    delete_fn, insert_fn, service_fn, update_fn, DeleteOne, ErrorCallback, InsertOne, LocalOps,
    MockCall, MockRemote, MockService, PageService, RemoteOps, UpdateOne,
};
pub use snapshot::{Notifier, ResourceSnapshot};

pub use list_core::{FetchExclusion, FetchMode, FetchStatus, InsertPosition, MutationKind};
pub use list_types::{
    ExtractionResult, Extractor, GetDataParams, KeyExtractor, Record, RecordId, RemoteError,
};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a state mutex, recovering the data if a previous holder panicked.
///
/// State transitions are applied in full or not at all under the lock, so a
/// poisoned mutex still holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
