//! Remote writes paired with local collection patches.
//!
//! Each operation is a single attempt: call the remote capability, then
//! apply the persisted entity locally. The per-kind busy flag is held by a
//! guard for the duration and released on every exit path.
//!
//! Missing capabilities are handled asymmetrically. `add_item` and
//! `delete_item` skip with a warning, leaving the view merely stale.
//! `update_item` returns [`MutationError::MissingCapability`], because a
//! dropped update would leave the view showing data the remote never stored.

use list_core::{MutationFlags, MutationKind};
use list_types::{Record, RecordId, RemoteError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::lock;
use crate::remote::{LocalOps, RemoteOps};
use crate::snapshot::Notifier;

/// Errors returned by [`MutationCoordinator`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The remote write or the local mutator for this operation is not configured.
    #[error("{operation} requires both a remote function and a local mutator")]
    MissingCapability {
        /// Operation name.
        operation: &'static str,
    },

    /// The remote response has no field named by the result key.
    #[error("response has no field {key:?}")]
    MissingResultField {
        /// The requested result key.
        key: String,
    },

    /// The remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Holds one busy flag for the lifetime of an operation.
struct BusyGuard {
    flags: Arc<Mutex<MutationFlags>>,
    notifier: Notifier,
    kind: MutationKind,
}

impl BusyGuard {
    fn acquire(flags: &Arc<Mutex<MutationFlags>>, notifier: &Notifier, kind: MutationKind) -> Self {
        {
            let mut current = lock(flags);
            current.begin(kind);
            notifier.publish_mutations(&current);
        }
        tracing::debug!(kind = kind.as_str(), "mutation started");
        Self {
            flags: flags.clone(),
            notifier: notifier.clone(),
            kind,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut current = lock(&self.flags);
        current.end(self.kind);
        self.notifier.publish_mutations(&current);
        tracing::debug!(kind = self.kind.as_str(), "mutation settled");
    }
}

/// Pick the entity to apply locally out of a remote response.
fn persisted(response: Value, result_key: Option<&str>) -> Result<Record, MutationError> {
    match result_key {
        None => Ok(response),
        Some(key) => match response {
            Value::Object(mut fields) => {
                fields
                    .remove(key)
                    .ok_or_else(|| MutationError::MissingResultField {
                        key: key.to_string(),
                    })
            }
            _ => Err(MutationError::MissingResultField {
                key: key.to_string(),
            }),
        },
    }
}

/// Null, false, zero and the empty string carry no update.
fn is_blank(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Coordinates remote writes with local collection patches.
///
/// Cloning shares the busy flags.
#[derive(Clone, Debug)]
pub struct MutationCoordinator {
    local: LocalOps,
    remote: RemoteOps,
    flags: Arc<Mutex<MutationFlags>>,
    notifier: Notifier,
}

impl MutationCoordinator {
    /// Create a coordinator over the given local and remote capabilities.
    pub fn new(local: LocalOps, remote: RemoteOps) -> Self {
        Self {
            local,
            remote,
            flags: Arc::new(Mutex::new(MutationFlags::new())),
            notifier: Notifier::new(),
        }
    }

    /// Publish flag changes through `notifier`.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Copy of the busy flags.
    pub fn flags(&self) -> MutationFlags {
        *lock(&self.flags)
    }

    /// Check if an add is in flight.
    pub fn is_adding(&self) -> bool {
        self.flags().is_adding()
    }

    /// Check if an update is in flight.
    pub fn is_updating(&self) -> bool {
        self.flags().is_updating()
    }

    /// Check if a delete is in flight.
    pub fn is_deleting(&self) -> bool {
        self.flags().is_deleting()
    }

    /// Insert `data` remotely, then add the persisted entity locally.
    ///
    /// With `result_key`, the entity is read from that field of the response.
    /// Returns `Ok(None)` without calling anything when the insert function
    /// or the local add mutator is missing.
    pub async fn add_item(
        &self,
        data: Value,
        result_key: Option<&str>,
    ) -> Result<Option<Record>, MutationError> {
        self.add_item_then(data, result_key, |_| {}).await
    }

    /// Like [`add_item`](Self::add_item), calling `on_success` with the
    /// entity after it has been added locally.
    pub async fn add_item_then<F>(
        &self,
        data: Value,
        result_key: Option<&str>,
        on_success: F,
    ) -> Result<Option<Record>, MutationError>
    where
        F: FnOnce(&Record) + Send,
    {
        let (Some(insert), Some(add)) = (self.remote.insert.clone(), self.local.add.clone()) else {
            tracing::warn!("insert function or local add mutator not provided, skipping add_item");
            return Ok(None);
        };

        let entity = {
            let _busy = BusyGuard::acquire(&self.flags, &self.notifier, MutationKind::Add);
            let response = insert.insert_one(data).await?;
            let entity = persisted(response, result_key)?;
            add(entity.clone());
            entity
        };

        on_success(&entity);
        Ok(Some(entity))
    }

    /// Update `id` remotely, then patch the local record with the persisted entity.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::MissingCapability`] when the update function
    /// or the local update mutator is missing. Remote failures are returned
    /// after the busy flag is released.
    ///
    /// An empty `id` or blank `data` is skipped with `Ok(None)`.
    pub async fn update_item(
        &self,
        id: &RecordId,
        data: Value,
        result_key: Option<&str>,
    ) -> Result<Option<Record>, MutationError> {
        let (Some(remote), Some(update)) = (self.remote.update.clone(), self.local.update.clone())
        else {
            tracing::warn!("update function or local update mutator not provided");
            return Err(MutationError::MissingCapability {
                operation: MutationKind::Update.as_str(),
            });
        };
        if id.is_empty() || is_blank(&data) {
            tracing::warn!(%id, "id and data are required for update_item, skipping");
            return Ok(None);
        }

        let _busy = BusyGuard::acquire(&self.flags, &self.notifier, MutationKind::Update);
        let response = remote.update_one(id, data).await?;
        let entity = persisted(response, result_key)?;
        update(id, entity.clone());
        Ok(Some(entity))
    }

    /// Delete `id` remotely, then remove it locally.
    ///
    /// Returns `Ok(false)` without calling anything when the delete function
    /// or the local delete mutator is missing, or `id` is empty.
    pub async fn delete_item(&self, id: &RecordId) -> Result<bool, MutationError> {
        let (Some(remote), Some(delete)) = (self.remote.delete.clone(), self.local.delete.clone())
        else {
            tracing::warn!("delete function or local delete mutator not provided, skipping delete_item");
            return Ok(false);
        };
        if id.is_empty() {
            tracing::warn!("id is required for delete_item, skipping");
            return Ok(false);
        }

        let _busy = BusyGuard::acquire(&self.flags, &self.notifier, MutationKind::Delete);
        remote.delete_one(id).await?;
        delete(id);
        Ok(true)
    }
}
