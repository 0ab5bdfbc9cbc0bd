//! The in-memory record collection and its local mutators.
//!
//! A [`Collection`] is an ordered sequence of opaque records. Order is
//! fetch/insertion order. Identity is defined by a configurable id field;
//! the container does not enforce uniqueness, so overlapping page fetches
//! can produce duplicates and every mutator acts on all matching records.

use list_types::{Record, RecordId};
use serde::Deserialize;
use serde_json::Value;

/// Field used to identify records when no other key is configured.
pub const DEFAULT_ID_KEY: &str = "id";

/// Where [`Collection::add`] places a new record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Newest first.
    #[default]
    Start,
    /// Append after the fetched pages.
    End,
}

/// Ordered records plus the rules for locating one by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    records: Vec<Record>,
    id_key: String,
    insert_position: InsertPosition,
}

impl Collection {
    /// Create an empty collection keyed on `id_key`.
    pub fn new(id_key: impl Into<String>, insert_position: InsertPosition) -> Self {
        Self {
            records: Vec::new(),
            id_key: id_key.into(),
            insert_position,
        }
    }

    /// The field records are identified by.
    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Current records, in display order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose id field equals `id`.
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| self.has_id(r, id))
    }

    /// Replace every record (initial load, refresh, raw setter).
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    /// Append a fetched page after the existing records.
    pub fn extend(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    /// Insert one record at the configured position.
    pub fn add(&mut self, record: Record) {
        match self.insert_position {
            InsertPosition::Start => self.records.insert(0, record),
            InsertPosition::End => self.records.push(record),
        }
    }

    /// Update every record whose id equals `id`.
    ///
    /// Object patches are shallow-merged over object records; any other
    /// combination replaces the record outright. Returns the number of
    /// records touched.
    pub fn update(&mut self, id: &RecordId, patch: Record) -> usize {
        let id_key = self.id_key.clone();
        let mut touched = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.get(&id_key).is_some_and(|v| id.matches(v)))
        {
            merge_or_replace(record, patch.clone());
            touched += 1;
        }
        touched
    }

    /// Set a single field on every record matching `match_id`.
    ///
    /// Matches on `match_key` when given, otherwise on the id field.
    /// Returns the number of records touched.
    pub fn update_with_key(
        &mut self,
        match_id: &RecordId,
        key: &str,
        value: Value,
        match_key: Option<&str>,
    ) -> usize {
        let match_key = match_key.unwrap_or(&self.id_key).to_string();
        let mut touched = 0;
        for record in self.records.iter_mut() {
            if !record.get(&match_key).is_some_and(|v| match_id.matches(v)) {
                continue;
            }
            if let Value::Object(fields) = record {
                fields.insert(key.to_string(), value.clone());
                touched += 1;
            }
        }
        touched
    }

    /// Remove every record whose id equals `id`. Returns the number removed.
    pub fn delete(&mut self, id: &RecordId) -> usize {
        let before = self.records.len();
        let id_key = self.id_key.clone();
        self.records
            .retain(|r| !r.get(&id_key).is_some_and(|v| id.matches(v)));
        before - self.records.len()
    }

    fn has_id(&self, record: &Record, id: &RecordId) -> bool {
        record.get(&self.id_key).is_some_and(|v| id.matches(v))
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new(DEFAULT_ID_KEY, InsertPosition::default())
    }
}

fn merge_or_replace(record: &mut Record, patch: Record) {
    match (record, patch) {
        (Value::Object(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (record, patch) => *record = patch,
    }
}
