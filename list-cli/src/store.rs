//! JSON fixture file acting as the remote service.
//!
//! The file holds a single JSON array of records. Reads serve it in pages
//! shaped like a typical paginated API; writes rewrite the whole file.

use async_trait::async_trait;
use list_client::{DeleteOne, InsertOne, PageService, UpdateOne};
use list_types::{GetDataParams, RecordId, RemoteError};
use serde_json::{json, Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A paginated, writable record store backed by one JSON file.
#[derive(Debug)]
pub struct FixtureStore {
    path: PathBuf,
    page_size: usize,
    data_key: String,
    id_key: String,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FixtureStore {
    /// Create a store over `path`. A missing file reads as empty.
    pub fn new(
        path: impl Into<PathBuf>,
        page_size: usize,
        data_key: impl Into<String>,
        id_key: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            page_size: page_size.max(1),
            data_key: data_key.into(),
            id_key: id_key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the fixture file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Value>, RemoteError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RemoteError::Transport(e.to_string())),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Array(records) => Ok(records),
            _ => Err(RemoteError::Decode(format!(
                "{} does not hold a JSON array",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, records: &[Value]) -> Result<(), RemoteError> {
        let contents = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))
    }

    fn position(&self, records: &[Value], id: &RecordId) -> Result<usize, RemoteError> {
        records
            .iter()
            .position(|r| r.get(&self.id_key).is_some_and(|v| id.matches(v)))
            .ok_or_else(|| RemoteError::Status {
                code: 404,
                message: format!("no record with {} {}", self.id_key, id),
            })
    }

    fn next_id(&self, records: &[Value]) -> i64 {
        records
            .iter()
            .filter_map(|r| r.get(&self.id_key).and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[async_trait]
impl PageService for FixtureStore {
    async fn fetch_page(&self, params: GetDataParams) -> Result<Value, RemoteError> {
        let records = self.load().await?;
        let total = records.len();
        let total_pages = total.div_ceil(self.page_size).max(1);
        let start = (params.page.max(1) as usize - 1).saturating_mul(self.page_size);
        let data: Vec<Value> = records
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        tracing::debug!(page = params.page, records = data.len(), "serving fixture page");

        let mut response = Map::new();
        response.insert(self.data_key.clone(), Value::Array(data));
        response.insert(
            "pagination".to_string(),
            json!({
                "total": total,
                "currentPage": params.page,
                "totalPages": total_pages,
            }),
        );
        Ok(Value::Object(response))
    }
}

#[async_trait]
impl InsertOne for FixtureStore {
    async fn insert_one(&self, data: Value) -> Result<Value, RemoteError> {
        let Value::Object(mut fields) = data else {
            return Err(RemoteError::Status {
                code: 422,
                message: "records must be JSON objects".into(),
            });
        };

        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        if !fields.contains_key(&self.id_key) {
            fields.insert(self.id_key.clone(), json!(self.next_id(&records)));
        }
        let record = Value::Object(fields);
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }
}

#[async_trait]
impl UpdateOne for FixtureStore {
    async fn update_one(&self, id: &RecordId, data: Value) -> Result<Value, RemoteError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let index = self.position(&records, id)?;

        let record = &mut records[index];
        match (record, data) {
            (Value::Object(existing), Value::Object(patch)) => existing.extend(patch),
            (record, data) => *record = data,
        }
        let updated = records[index].clone();
        self.save(&records).await?;
        Ok(updated)
    }
}

#[async_trait]
impl DeleteOne for FixtureStore {
    async fn delete_one(&self, id: &RecordId) -> Result<(), RemoteError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let index = self.position(&records, id)?;
        records.remove(index);
        self.save(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(records: Value) -> (tempfile::TempDir, FixtureStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, records.to_string()).unwrap();
        let store = FixtureStore::new(path, 2, "data", "id");
        (dir, store)
    }

    fn on_disk(store: &FixtureStore) -> Value {
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn pages_records() {
        let (_dir, store) = store_with(json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));

        let page = store.fetch_page(GetDataParams { page: 2 }).await.unwrap();

        assert_eq!(page["data"], json!([{ "id": 3 }]));
        assert_eq!(page["pagination"]["total"], 3);
        assert_eq!(page["pagination"]["currentPage"], 2);
        assert_eq!(page["pagination"]["totalPages"], 2);
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FixtureStore::new(dir.path().join("none.json"), 5, "items", "id");

        let page = store.fetch_page(GetDataParams { page: 1 }).await.unwrap();

        assert_eq!(page["items"], json!([]));
        assert_eq!(page["pagination"]["totalPages"], 1);
    }

    #[tokio::test]
    async fn non_array_file_is_decode_error() {
        let (_dir, store) = store_with(json!({ "id": 1 }));
        let err = store.fetch_page(GetDataParams { page: 1 }).await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn insert_assigns_next_id_and_persists() {
        let (_dir, store) = store_with(json!([{ "id": 4 }]));

        let record = store.insert_one(json!({ "name": "x" })).await.unwrap();

        assert_eq!(record, json!({ "id": 5, "name": "x" }));
        assert_eq!(on_disk(&store), json!([{ "id": 4 }, { "id": 5, "name": "x" }]));
    }

    #[tokio::test]
    async fn insert_rejects_non_objects() {
        let (_dir, store) = store_with(json!([]));
        let err = store.insert_one(json!(3)).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { code: 422, .. }));
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let (_dir, store) = store_with(json!([{ "id": 1, "name": "a", "n": 1 }]));

        let record = store
            .update_one(&RecordId::Int(1), json!({ "name": "b" }))
            .await
            .unwrap();

        assert_eq!(record, json!({ "id": 1, "name": "b", "n": 1 }));
        assert_eq!(on_disk(&store), json!([record]));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_dir, store) = store_with(json!([{ "id": 1 }]));

        let update = store.update_one(&RecordId::Int(2), json!({})).await;
        let delete = store.delete_one(&RecordId::from("1")).await;

        assert!(matches!(update, Err(RemoteError::Status { code: 404, .. })));
        assert!(matches!(delete, Err(RemoteError::Status { code: 404, .. })));
    }

    #[tokio::test]
    async fn delete_persists() {
        let (_dir, store) = store_with(json!([{ "id": 1 }, { "id": 2 }]));

        store.delete_one(&RecordId::Int(1)).await.unwrap();

        assert_eq!(on_disk(&store), json!([{ "id": 2 }]));
    }
}
