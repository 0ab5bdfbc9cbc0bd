//! Normalizing raw service responses into records plus pagination.
//!
//! A page service returns whatever JSON shape it likes. An [`Extractor`]
//! turns that shape into an [`ExtractionResult`]. Extraction never fails:
//! missing pagination fields degrade to `None` ("unknown"), and a missing
//! record sequence degrades to an empty page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::Record;

/// Field read by [`KeyExtractor`] when no other key is configured.
pub const DEFAULT_DATA_KEY: &str = "data";

/// Parameters passed to the paginated read call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDataParams {
    /// 1-based page number to fetch.
    pub page: u32,
}

/// Normalized shape of one fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Records on this page, in service order.
    pub records: Vec<Record>,
    /// Total number of records across all pages, if reported.
    pub total_results: Option<u64>,
    /// Page number the service says it returned, if reported.
    pub current_page: Option<u32>,
    /// Total number of pages, if reported.
    pub total_pages: Option<u32>,
}

impl ExtractionResult {
    /// A page of records with unknown pagination.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }
}

/// Pure mapping from a raw response to an [`ExtractionResult`].
///
/// Implemented for any `Fn(&Value) -> ExtractionResult`, so closures can be
/// passed directly.
pub trait Extractor: Send + Sync {
    /// Extract records and pagination from a raw response.
    fn extract(&self, response: &Value) -> ExtractionResult;
}

impl<F> Extractor for F
where
    F: Fn(&Value) -> ExtractionResult + Send + Sync,
{
    fn extract(&self, response: &Value) -> ExtractionResult {
        self(response)
    }
}

/// Default extractor.
///
/// Reads `response[data_key]` as the record sequence and
/// `response.pagination.{total, currentPage, totalPages}` as the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExtractor {
    data_key: String,
}

impl KeyExtractor {
    /// Create an extractor reading records from `data_key`.
    pub fn new(data_key: impl Into<String>) -> Self {
        Self {
            data_key: data_key.into(),
        }
    }

    /// The field holding the record sequence.
    pub fn data_key(&self) -> &str {
        &self.data_key
    }
}

impl Default for KeyExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_KEY)
    }
}

impl Extractor for KeyExtractor {
    fn extract(&self, response: &Value) -> ExtractionResult {
        let records = match response.get(&self.data_key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        let pagination = response.get("pagination");
        let field = |name: &str| pagination.and_then(|p| p.get(name)).and_then(Value::as_u64);

        ExtractionResult {
            records,
            total_results: field("total"),
            current_page: field("currentPage").and_then(|v| u32::try_from(v).ok()),
            total_pages: field("totalPages").and_then(|v| u32::try_from(v).ok()),
        }
    }
}
