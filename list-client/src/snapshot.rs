//! Observable view of a resource.
//!
//! Every state transition (fetch admitted, fetch settled, local mutation,
//! mutation flag change) publishes a fresh [`ResourceSnapshot`] through a
//! [`Notifier`]. UIs subscribe and re-render from the latest snapshot.

use list_core::{FetchState, FetchStatus, MutationFlags};
use list_types::Record;
use std::sync::Arc;
use tokio::sync::watch;

/// Point-in-time copy of everything a list view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSnapshot {
    /// Records in display order.
    pub records: Vec<Record>,
    /// Loading status.
    pub status: FetchStatus,
    /// Message of the latest failed fetch.
    pub last_error: Option<String>,
    /// Current 1-based page.
    pub page: u32,
    /// Total pages, if known.
    pub total_pages: Option<u32>,
    /// Total results, if known.
    pub total_results: Option<u64>,
    /// Whether another page is expected.
    pub has_next_page: bool,
    /// An add is in flight.
    pub is_adding: bool,
    /// An update is in flight.
    pub is_updating: bool,
    /// A delete is in flight.
    pub is_deleting: bool,
}

impl ResourceSnapshot {
    /// Initial load in flight.
    pub fn is_fetching(&self) -> bool {
        self.status == FetchStatus::Fetching
    }

    /// Refresh in flight.
    pub fn is_refreshing(&self) -> bool {
        self.status == FetchStatus::Refreshing
    }

    /// Next-page load in flight.
    pub fn is_fetching_more(&self) -> bool {
        self.status == FetchStatus::FetchingMore
    }

    fn apply_fetch(&mut self, state: &FetchState) {
        let cursor = state.cursor();
        self.records = state.records().to_vec();
        self.status = state.status();
        self.last_error = state.last_error().map(str::to_string);
        self.page = cursor.current_page();
        self.total_pages = cursor.total_pages();
        self.total_results = cursor.total_results();
        self.has_next_page = cursor.has_next_page();
    }

    fn apply_mutations(&mut self, flags: &MutationFlags) {
        self.is_adding = flags.is_adding();
        self.is_updating = flags.is_updating();
        self.is_deleting = flags.is_deleting();
    }
}

/// Publishes snapshots to any number of subscribers.
///
/// Cloning a notifier shares the channel, so the fetch side and the
/// mutation side of one resource publish into the same snapshot.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Arc<watch::Sender<ResourceSnapshot>>,
}

impl Notifier {
    /// Create a notifier holding an empty snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ResourceSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ResourceSnapshot> {
        self.tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ResourceSnapshot {
        self.tx.borrow().clone()
    }

    /// Publish the fetch-side fields.
    pub fn publish_fetch(&self, state: &FetchState) {
        self.tx.send_modify(|snapshot| snapshot.apply_fetch(state));
    }

    /// Publish the mutation flags.
    pub fn publish_mutations(&self, flags: &MutationFlags) {
        self.tx.send_modify(|snapshot| snapshot.apply_mutations(flags));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
