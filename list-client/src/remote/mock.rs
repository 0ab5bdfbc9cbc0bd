//! Mock collaborators for testing.
//!
//! Allows serving canned pages, forcing failures, recording calls and
//! holding calls pending so concurrent behavior can be observed.

use super::{DeleteOne, InsertOne, PageService, UpdateOne};
use async_trait::async_trait;
use list_types::{GetDataParams, RecordId, RemoteError};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::lock;

/// A call recorded by [`MockRemote`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// `insert_one(data)`.
    Insert(Value),
    /// `update_one(id, data)`.
    Update(RecordId, Value),
    /// `delete_one(id)`.
    Delete(RecordId),
}

/// Holds calls pending until released.
#[derive(Debug, Default)]
struct Gate {
    semaphore: Option<Arc<Semaphore>>,
}

impl Gate {
    fn pause(&mut self) {
        self.semaphore = Some(Arc::new(Semaphore::new(0)));
    }

    fn release(&self, calls: usize) {
        if let Some(semaphore) = &self.semaphore {
            semaphore.add_permits(calls);
        }
    }

    fn resume(&mut self) {
        if let Some(semaphore) = self.semaphore.take() {
            // Closing wakes every waiter with an error, which lets it through.
            semaphore.close();
        }
    }
}

async fn pass(semaphore: Option<Arc<Semaphore>>) {
    if let Some(semaphore) = semaphore {
        if let Ok(permit) = semaphore.acquire().await {
            permit.forget();
        }
    }
}

async fn wait_until(mut ready: impl FnMut() -> bool) {
    while !ready() {
        tokio::task::yield_now().await;
    }
}

/// Mock page service.
///
/// Serves responses registered per page number. Unregistered pages answer
/// with an empty `{"data": []}` response.
#[derive(Debug, Default, Clone)]
pub struct MockService {
    inner: Arc<Mutex<MockServiceInner>>,
}

#[derive(Debug, Default)]
struct MockServiceInner {
    pages: HashMap<u32, Value>,
    calls: Vec<GetDataParams>,
    fail_next: VecDeque<RemoteError>,
    gate: Gate,
}

impl MockService {
    /// Create a new mock service with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `records` into pages shaped for the default extractor,
    /// including `pagination.{total, currentPage, totalPages}`.
    pub fn paged(records: Vec<Value>, page_size: usize) -> Self {
        let service = Self::new();
        let page_size = page_size.max(1);
        let total = records.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let chunks: Vec<Vec<Value>> = records.chunks(page_size).map(<[Value]>::to_vec).collect();
        for page in 1..=total_pages {
            let data = chunks.get(page - 1).cloned().unwrap_or_default();
            service.set_page(
                page as u32,
                json!({
                    "data": data,
                    "pagination": {
                        "total": total,
                        "currentPage": page,
                        "totalPages": total_pages,
                    }
                }),
            );
        }
        service
    }

    /// Register the raw response for `page`.
    pub fn set_page(&self, page: u32, response: Value) {
        lock(&self.inner).pages.insert(page, response);
    }

    /// Cause the next fetch to fail with the given error.
    pub fn fail_next(&self, error: RemoteError) {
        lock(&self.inner).fail_next.push_back(error);
    }

    /// All fetch calls received so far.
    pub fn calls(&self) -> Vec<GetDataParams> {
        lock(&self.inner).calls.clone()
    }

    /// Number of fetch calls received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.inner).calls.len()
    }

    /// Hold every subsequent fetch pending until released.
    pub fn pause(&self) {
        lock(&self.inner).gate.pause();
    }

    /// Let `calls` pending fetches complete.
    pub fn release(&self, calls: usize) {
        lock(&self.inner).gate.release(calls);
    }

    /// Stop holding fetches; pending ones complete.
    pub fn resume(&self) {
        lock(&self.inner).gate.resume();
    }

    /// Yield until at least `count` fetches have been received.
    pub async fn wait_for_calls(&self, count: usize) {
        wait_until(|| self.call_count() >= count).await;
    }
}

#[async_trait]
impl PageService for MockService {
    async fn fetch_page(&self, params: GetDataParams) -> Result<Value, RemoteError> {
        let semaphore = {
            let mut inner = lock(&self.inner);
            inner.calls.push(params);
            inner.gate.semaphore.clone()
        };

        pass(semaphore).await;

        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next.pop_front() {
            return Err(error);
        }
        Ok(inner
            .pages
            .get(&params.page)
            .cloned()
            .unwrap_or_else(|| json!({ "data": [] })))
    }
}

/// Mock remote write collaborator.
///
/// By default inserts echo the payload with a fresh numeric `id`, updates
/// echo the payload with the given `id`, and deletes succeed. Queued
/// responses and failures take precedence.
#[derive(Debug, Default, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    next_id: i64,
    calls: Vec<MockCall>,
    insert_responses: VecDeque<Value>,
    update_responses: VecDeque<Value>,
    fail_next_insert: Option<RemoteError>,
    fail_next_update: Option<RemoteError>,
    fail_next_delete: Option<RemoteError>,
    gate: Gate,
}

impl MockRemote {
    /// Create a new mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` from the next insert.
    pub fn respond_to_insert(&self, response: Value) {
        lock(&self.inner).insert_responses.push_back(response);
    }

    /// Return `response` from the next update.
    pub fn respond_to_update(&self, response: Value) {
        lock(&self.inner).update_responses.push_back(response);
    }

    /// Cause the next insert to fail with the given error.
    pub fn fail_next_insert(&self, error: RemoteError) {
        lock(&self.inner).fail_next_insert = Some(error);
    }

    /// Cause the next update to fail with the given error.
    pub fn fail_next_update(&self, error: RemoteError) {
        lock(&self.inner).fail_next_update = Some(error);
    }

    /// Cause the next delete to fail with the given error.
    pub fn fail_next_delete(&self, error: RemoteError) {
        lock(&self.inner).fail_next_delete = Some(error);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.inner).calls.clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.inner).calls.len()
    }

    /// Hold every subsequent call pending until released.
    pub fn pause(&self) {
        lock(&self.inner).gate.pause();
    }

    /// Let `calls` pending calls complete.
    pub fn release(&self, calls: usize) {
        lock(&self.inner).gate.release(calls);
    }

    /// Stop holding calls; pending ones complete.
    pub fn resume(&self) {
        lock(&self.inner).gate.resume();
    }

    /// Yield until at least `count` calls have been received.
    pub async fn wait_for_calls(&self, count: usize) {
        wait_until(|| self.call_count() >= count).await;
    }

    fn record(&self, call: MockCall) -> Option<Arc<Semaphore>> {
        let mut inner = lock(&self.inner);
        inner.calls.push(call);
        inner.gate.semaphore.clone()
    }
}

fn with_id(data: Value, id: Value) -> Value {
    match data {
        Value::Object(mut fields) => {
            fields.insert("id".to_string(), id);
            Value::Object(fields)
        }
        other => json!({ "id": id, "value": other }),
    }
}

#[async_trait]
impl InsertOne for MockRemote {
    async fn insert_one(&self, data: Value) -> Result<Value, RemoteError> {
        let semaphore = self.record(MockCall::Insert(data.clone()));
        pass(semaphore).await;

        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_insert.take() {
            return Err(error);
        }
        if let Some(response) = inner.insert_responses.pop_front() {
            return Ok(response);
        }
        inner.next_id += 1;
        Ok(with_id(data, json!(inner.next_id)))
    }
}

#[async_trait]
impl UpdateOne for MockRemote {
    async fn update_one(&self, id: &RecordId, data: Value) -> Result<Value, RemoteError> {
        let semaphore = self.record(MockCall::Update(id.clone(), data.clone()));
        pass(semaphore).await;

        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_update.take() {
            return Err(error);
        }
        if let Some(response) = inner.update_responses.pop_front() {
            return Ok(response);
        }
        Ok(with_id(data, id.to_value()))
    }
}

#[async_trait]
impl DeleteOne for MockRemote {
    async fn delete_one(&self, id: &RecordId) -> Result<(), RemoteError> {
        let semaphore = self.record(MockCall::Delete(id.clone()));
        pass(semaphore).await;

        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_delete.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // MockService Tests
    // ===========================================

    #[tokio::test]
    async fn paged_service_splits_records() {
        let records: Vec<Value> = (1..=5).map(|id| json!({ "id": id })).collect();
        let service = MockService::paged(records, 2);

        let first = service.fetch_page(GetDataParams { page: 1 }).await.unwrap();
        let last = service.fetch_page(GetDataParams { page: 3 }).await.unwrap();

        assert_eq!(first["data"].as_array().unwrap().len(), 2);
        assert_eq!(first["pagination"]["totalPages"], 3);
        assert_eq!(last["data"], json!([{ "id": 5 }]));
        assert_eq!(service.calls(), vec![GetDataParams { page: 1 }, GetDataParams { page: 3 }]);
    }

    #[tokio::test]
    async fn unknown_page_is_empty() {
        let service = MockService::new();
        let raw = service.fetch_page(GetDataParams { page: 9 }).await.unwrap();
        assert_eq!(raw, json!({ "data": [] }));
    }

    #[tokio::test]
    async fn forced_fetch_failure_is_one_shot() {
        let service = MockService::new();
        service.fail_next(RemoteError::Transport("offline".into()));

        let result = service.fetch_page(GetDataParams { page: 1 }).await;
        assert!(matches!(result, Err(RemoteError::Transport(_))));
        assert!(service.fetch_page(GetDataParams { page: 1 }).await.is_ok());
    }

    #[tokio::test]
    async fn paused_service_holds_until_released() {
        let service = MockService::new();
        service.pause();

        let pending = tokio::spawn({
            let service = service.clone();
            async move { service.fetch_page(GetDataParams { page: 1 }).await }
        });
        service.wait_for_calls(1).await;
        assert!(!pending.is_finished());

        service.release(1);
        assert!(pending.await.unwrap().is_ok());
    }

    // ===========================================
    // MockRemote Tests
    // ===========================================

    #[tokio::test]
    async fn insert_assigns_ids() {
        let remote = MockRemote::new();
        let a = remote.insert_one(json!({ "name": "a" })).await.unwrap();
        let b = remote.insert_one(json!({ "name": "b" })).await.unwrap();
        assert_eq!(a, json!({ "id": 1, "name": "a" }));
        assert_eq!(b["id"], 2);
    }

    #[tokio::test]
    async fn queued_responses_take_precedence() {
        let remote = MockRemote::new();
        remote.respond_to_insert(json!({ "item": { "id": 7 } }));
        remote.respond_to_update(json!({ "id": 7, "name": "z" }));

        assert_eq!(
            remote.insert_one(json!({})).await.unwrap(),
            json!({ "item": { "id": 7 } })
        );
        assert_eq!(
            remote.update_one(&RecordId::Int(7), json!({})).await.unwrap()["name"],
            "z"
        );
    }

    #[tokio::test]
    async fn forced_write_failures() {
        let remote = MockRemote::new();
        remote.fail_next_insert(RemoteError::other("no insert"));
        remote.fail_next_update(RemoteError::other("no update"));
        remote.fail_next_delete(RemoteError::other("no delete"));

        assert!(remote.insert_one(json!({})).await.is_err());
        assert!(remote.update_one(&RecordId::Int(1), json!({})).await.is_err());
        assert!(remote.delete_one(&RecordId::Int(1)).await.is_err());
        assert!(remote.delete_one(&RecordId::Int(1)).await.is_ok());
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let remote = MockRemote::new();
        remote.insert_one(json!({ "n": 1 })).await.unwrap();
        remote.delete_one(&RecordId::from("x")).await.unwrap();

        assert_eq!(
            remote.calls(),
            vec![
                MockCall::Insert(json!({ "n": 1 })),
                MockCall::Delete(RecordId::from("x")),
            ]
        );
    }

    #[tokio::test]
    async fn resume_lets_all_pending_through() {
        let remote = MockRemote::new();
        remote.pause();

        let a = tokio::spawn({
            let remote = remote.clone();
            async move { remote.delete_one(&RecordId::Int(1)).await }
        });
        let b = tokio::spawn({
            let remote = remote.clone();
            async move { remote.delete_one(&RecordId::Int(2)).await }
        });
        remote.wait_for_calls(2).await;

        remote.resume();
        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
    }

    #[test]
    fn clone_shares_state() {
        let remote = MockRemote::new();
        let other = remote.clone();
        other.fail_next_delete(RemoteError::other("x"));
        assert!(lock(&remote.inner).fail_next_delete.is_some());
    }
}
