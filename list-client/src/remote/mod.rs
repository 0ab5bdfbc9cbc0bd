//! Collaborator abstraction for reslist.
//!
//! The data-access layer never talks to a network itself. Everything it
//! needs from the outside world is supplied as a small capability set:
//!
//! - [`PageService`] - the paginated read call
//! - [`InsertOne`], [`UpdateOne`], [`DeleteOne`] - optional remote writes
//! - [`LocalOps`] - optional local mutators patched after a remote write
//!
//! Write capabilities are grouped in [`RemoteOps`], where each one is an
//! `Option`. Absence is checked by the mutation coordinator, never assumed.
//!
//! # Example
//!
//! ```ignore
//! let remote = RemoteOps::new()
//!     .with_insert(insert_fn(|data| async move { api.create(data).await }))
//!     .with_delete(delete_fn(|id| async move { api.remove(id).await }));
//! ```

mod mock;

pub use mock::{MockCall, MockRemote, MockService};

use async_trait::async_trait;
use list_types::{GetDataParams, Record, RecordId, RemoteError};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The paginated read call.
#[async_trait]
pub trait PageService: Send + Sync {
    /// Fetch one page of the collection as a raw response.
    async fn fetch_page(&self, params: GetDataParams) -> Result<Value, RemoteError>;
}

#[async_trait]
impl<T: PageService + ?Sized> PageService for Arc<T> {
    async fn fetch_page(&self, params: GetDataParams) -> Result<Value, RemoteError> {
        (**self).fetch_page(params).await
    }
}

/// Remote insert of one record.
#[async_trait]
pub trait InsertOne: Send + Sync {
    /// Persist `data` and return the stored entity (or a wrapper around it).
    async fn insert_one(&self, data: Value) -> Result<Value, RemoteError>;
}

/// Remote update of one record.
#[async_trait]
pub trait UpdateOne: Send + Sync {
    /// Persist `data` for `id` and return the stored entity (or a wrapper).
    async fn update_one(&self, id: &RecordId, data: Value) -> Result<Value, RemoteError>;
}

/// Remote delete of one record.
#[async_trait]
pub trait DeleteOne: Send + Sync {
    /// Delete the record identified by `id`.
    async fn delete_one(&self, id: &RecordId) -> Result<(), RemoteError>;
}

/// Side channel notified with the message of every failed fetch.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional remote write capabilities.
#[derive(Clone, Default)]
pub struct RemoteOps {
    pub(crate) insert: Option<Arc<dyn InsertOne>>,
    pub(crate) update: Option<Arc<dyn UpdateOne>>,
    pub(crate) delete: Option<Arc<dyn DeleteOne>>,
}

impl RemoteOps {
    /// No write capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// All three capabilities backed by one collaborator.
    pub fn from_crud<T>(crud: Arc<T>) -> Self
    where
        T: InsertOne + UpdateOne + DeleteOne + 'static,
    {
        Self {
            insert: Some(crud.clone()),
            update: Some(crud.clone()),
            delete: Some(crud),
        }
    }

    /// Set the insert capability.
    pub fn with_insert(mut self, insert: impl InsertOne + 'static) -> Self {
        self.insert = Some(Arc::new(insert));
        self
    }

    /// Set the update capability.
    pub fn with_update(mut self, update: impl UpdateOne + 'static) -> Self {
        self.update = Some(Arc::new(update));
        self
    }

    /// Set the delete capability.
    pub fn with_delete(mut self, delete: impl DeleteOne + 'static) -> Self {
        self.delete = Some(Arc::new(delete));
        self
    }

    /// Check if an insert capability is configured.
    pub fn can_insert(&self) -> bool {
        self.insert.is_some()
    }

    /// Check if an update capability is configured.
    pub fn can_update(&self) -> bool {
        self.update.is_some()
    }

    /// Check if a delete capability is configured.
    pub fn can_delete(&self) -> bool {
        self.delete.is_some()
    }
}

impl fmt::Debug for RemoteOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteOps")
            .field("insert", &self.can_insert())
            .field("update", &self.can_update())
            .field("delete", &self.can_delete())
            .finish()
    }
}

/// Local mutator inserting one record.
pub type LocalAddFn = Arc<dyn Fn(Record) + Send + Sync>;
/// Local mutator updating the record with an id.
pub type LocalUpdateFn = Arc<dyn Fn(&RecordId, Record) + Send + Sync>;
/// Local mutator removing the record with an id.
pub type LocalDeleteFn = Arc<dyn Fn(&RecordId) + Send + Sync>;

/// Optional local mutators, applied after a successful remote write.
#[derive(Clone, Default)]
pub struct LocalOps {
    pub(crate) add: Option<LocalAddFn>,
    pub(crate) update: Option<LocalUpdateFn>,
    pub(crate) delete: Option<LocalDeleteFn>,
}

impl LocalOps {
    /// No local mutators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the add mutator.
    pub fn with_add(mut self, add: impl Fn(Record) + Send + Sync + 'static) -> Self {
        self.add = Some(Arc::new(add));
        self
    }

    /// Set the update mutator.
    pub fn with_update(mut self, update: impl Fn(&RecordId, Record) + Send + Sync + 'static) -> Self {
        self.update = Some(Arc::new(update));
        self
    }

    /// Set the delete mutator.
    pub fn with_delete(mut self, delete: impl Fn(&RecordId) + Send + Sync + 'static) -> Self {
        self.delete = Some(Arc::new(delete));
        self
    }
}

impl fmt::Debug for LocalOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalOps")
            .field("add", &self.add.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

// --- Closure adapters ---

/// Adapter turning an async closure into a [`PageService`].
pub struct ServiceFn<F>(F);

/// Wrap `f` as a [`PageService`].
pub fn service_fn<F, Fut>(f: F) -> ServiceFn<F>
where
    F: Fn(GetDataParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    ServiceFn(f)
}

#[async_trait]
impl<F, Fut> PageService for ServiceFn<F>
where
    F: Fn(GetDataParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    async fn fetch_page(&self, params: GetDataParams) -> Result<Value, RemoteError> {
        (self.0)(params).await
    }
}

/// Adapter turning an async closure into an [`InsertOne`].
pub struct InsertFn<F>(F);

/// Wrap `f` as an [`InsertOne`].
pub fn insert_fn<F, Fut>(f: F) -> InsertFn<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    InsertFn(f)
}

#[async_trait]
impl<F, Fut> InsertOne for InsertFn<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    async fn insert_one(&self, data: Value) -> Result<Value, RemoteError> {
        (self.0)(data).await
    }
}

/// Adapter turning an async closure into an [`UpdateOne`].
pub struct UpdateFn<F>(F);

/// Wrap `f` as an [`UpdateOne`].
pub fn update_fn<F, Fut>(f: F) -> UpdateFn<F>
where
    F: Fn(RecordId, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    UpdateFn(f)
}

#[async_trait]
impl<F, Fut> UpdateOne for UpdateFn<F>
where
    F: Fn(RecordId, Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
{
    async fn update_one(&self, id: &RecordId, data: Value) -> Result<Value, RemoteError> {
        (self.0)(id.clone(), data).await
    }
}

/// Adapter turning an async closure into a [`DeleteOne`].
pub struct DeleteFn<F>(F);

/// Wrap `f` as a [`DeleteOne`].
pub fn delete_fn<F, Fut>(f: F) -> DeleteFn<F>
where
    F: Fn(RecordId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
{
    DeleteFn(f)
}

#[async_trait]
impl<F, Fut> DeleteOne for DeleteFn<F>
where
    F: Fn(RecordId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), RemoteError>> + Send + 'static,
{
    async fn delete_one(&self, id: &RecordId) -> Result<(), RemoteError> {
        (self.0)(id.clone()).await
    }
}
