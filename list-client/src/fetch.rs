//! Fetcher - drives a [`FetchState`] around the awaited page call.
//!
//! # Architecture
//!
//! The pure state machine in list-core decides whether a fetch may start and
//! how its result composes into the collection. The fetcher performs the
//! I/O in between:
//!
//! ```text
//! fetch_data → FetchState::begin → PageService → Extractor → FetchState::complete
//!                                       ↓ (dropped / panicked)
//!                                 FetchState::abandon
//! ```
//!
//! The state lives behind a synchronous mutex that is never held across an
//! await. A drop guard owns each ticket, so the loading flag is released on
//! every exit path, including cancellation of the returned future.

use list_core::{Completion, FetchMode, FetchState, FetchStatus, FetchTicket, PageCursor};
use list_types::{Extractor, GetDataParams, Record, RecordId};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::config::ResourceOptions;
use crate::lock;
use crate::remote::{ErrorCallback, LocalOps, PageService};
use crate::snapshot::{Notifier, ResourceSnapshot};

/// Arguments of [`Fetcher::fetch_data`].
///
/// `refresh` takes precedence over `more`. Without either flag this is an
/// initial load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Reload from page 1, replacing the collection.
    pub refresh: bool,
    /// Page to request; defaults depend on the mode.
    pub page: Option<u32>,
    /// Append the next page instead of replacing.
    pub more: bool,
}

impl FetchOptions {
    /// Initial load of the current page.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Full reload from page 1.
    pub fn refresh() -> Self {
        Self {
            refresh: true,
            ..Self::default()
        }
    }

    /// Append the page after the current one.
    pub fn more() -> Self {
        Self {
            more: true,
            ..Self::default()
        }
    }

    /// Request a specific page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// The fetch mode these options select.
    pub fn mode(&self) -> FetchMode {
        if self.refresh {
            FetchMode::Refresh
        } else if self.more {
            FetchMode::More
        } else {
            FetchMode::Initial
        }
    }
}

/// Result of one fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rejected without calling the service (duplicate in flight, or no next page).
    Skipped,
    /// The page was applied to the collection.
    Loaded {
        /// Number of records the page contributed.
        records: usize,
        /// Current page after applying.
        page: u32,
    },
    /// The service call failed; the collection is untouched.
    Failed {
        /// The error message, also stored as `last_error`.
        message: String,
    },
    /// A refresh started while this fetch was in flight; its result was dropped.
    Superseded,
}

/// Owns one in-flight ticket and releases it on drop.
struct TicketGuard {
    state: Arc<Mutex<FetchState>>,
    notifier: Notifier,
    ticket: Option<FetchTicket>,
}

impl TicketGuard {
    fn complete(mut self, outcome: Result<list_types::ExtractionResult, String>) -> Option<Completion> {
        let ticket = self.ticket.take()?;
        let mut state = lock(&self.state);
        let completion = state.complete(ticket, outcome);
        self.notifier.publish_fetch(&state);
        Some(completion)
    }
}

impl Drop for TicketGuard {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            tracing::debug!(mode = ?ticket.mode(), "fetch abandoned before completion");
            let mut state = lock(&self.state);
            state.abandon(ticket);
            self.notifier.publish_fetch(&state);
        }
    }
}

/// Fetches and paginates one collection.
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct Fetcher {
    state: Arc<Mutex<FetchState>>,
    service: Arc<dyn PageService>,
    extractor: Arc<dyn Extractor>,
    on_error: Option<ErrorCallback>,
    notifier: Notifier,
}

impl Fetcher {
    /// Create a fetcher over `service`, normalizing responses with `extractor`.
    pub fn new(
        service: Arc<dyn PageService>,
        extractor: Arc<dyn Extractor>,
        options: &ResourceOptions,
    ) -> Self {
        let state = FetchState::new(
            options.id_key.clone(),
            options.insert_position,
            options.fetch_exclusion,
            options.initial_page,
        );
        let fetcher = Self {
            state: Arc::new(Mutex::new(state)),
            service,
            extractor,
            on_error: None,
            notifier: Notifier::new(),
        };
        fetcher.publish();
        fetcher
    }

    /// Notify `on_error` with the message of every failed fetch.
    pub fn with_on_error(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = Some(on_error);
        self
    }

    /// Publish snapshots through `notifier` instead of a private one.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self.publish();
        self
    }

    /// The notifier snapshots are published through.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // --- Queries ---

    /// Fetch a page according to `options`.
    ///
    /// A no-op when the exclusion policy rejects the attempt. Failures never
    /// surface as `Err`: they are stored in `last_error`, passed to the error
    /// callback and reported as [`FetchOutcome::Failed`].
    pub async fn fetch_data(&self, options: FetchOptions) -> FetchOutcome {
        let mode = options.mode();
        let ticket = lock(&self.state).begin(mode, options.page);
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => {
                tracing::debug!(?mode, "fetch already in flight, skipping");
                FetchOutcome::Skipped
            }
        }
    }

    /// Reload from page 1, replacing the collection.
    pub async fn refetch_data(&self) -> FetchOutcome {
        self.fetch_data(FetchOptions::refresh()).await
    }

    /// Append the next page.
    ///
    /// A no-op when there is no next page or any fetch is in flight.
    pub async fn fetch_next_page(&self) -> FetchOutcome {
        let ticket = {
            let mut state = lock(&self.state);
            if !state.cursor().has_next_page() || state.is_busy() {
                None
            } else {
                let page = state.cursor().next_page();
                state.begin(FetchMode::More, Some(page))
            }
        };
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => {
                tracing::debug!("no next page or fetch in flight, skipping");
                FetchOutcome::Skipped
            }
        }
    }

    async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let mode = ticket.mode();
        let params = GetDataParams {
            page: ticket.page(),
        };
        let guard = TicketGuard {
            state: self.state.clone(),
            notifier: self.notifier.clone(),
            ticket: Some(ticket),
        };
        self.publish();

        tracing::debug!(?mode, page = params.page, "fetching page");
        let outcome = self
            .service
            .fetch_page(params)
            .await
            .map(|raw| self.extractor.extract(&raw))
            .map_err(|e| e.to_string());

        match guard.complete(outcome) {
            Some(Completion::Applied { records, page }) => {
                tracing::debug!(?mode, records, page, "page applied");
                FetchOutcome::Loaded { records, page }
            }
            Some(Completion::Failed { message }) => {
                tracing::warn!(?mode, page = params.page, "fetch failed: {}", message);
                if let Some(on_error) = &self.on_error {
                    on_error(&message);
                }
                FetchOutcome::Failed { message }
            }
            Some(Completion::Superseded) | None => {
                tracing::debug!(?mode, page = params.page, "fetch superseded by refresh");
                FetchOutcome::Superseded
            }
        }
    }

    // --- State ---

    /// Run `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&FetchState) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Copy of the current records.
    pub fn records(&self) -> Vec<Record> {
        self.read(|state| state.records().to_vec())
    }

    /// Current loading status.
    pub fn status(&self) -> FetchStatus {
        self.read(FetchState::status)
    }

    /// Message of the latest failed fetch.
    pub fn last_error(&self) -> Option<String> {
        self.read(|state| state.last_error().map(str::to_string))
    }

    /// Copy of the pagination cursor.
    pub fn cursor(&self) -> PageCursor {
        self.read(|state| state.cursor().clone())
    }

    /// Whether another page is expected.
    pub fn has_next_page(&self) -> bool {
        self.read(|state| state.cursor().has_next_page())
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ResourceSnapshot {
        self.notifier.snapshot()
    }

    // --- Local mutators ---

    /// Insert one record at the configured position.
    pub fn add_new_data(&self, record: Record) {
        self.mutate(|state| state.add_new_data(record));
    }

    /// Update the record(s) with `id`. Returns the number touched.
    pub fn update_existing_data(&self, id: &RecordId, patch: Record) -> usize {
        self.mutate(|state| state.update_existing_data(id, patch))
    }

    /// Set `key` to `value` on the record(s) matching `match_id`, matching on
    /// `match_key` when given. Returns the number touched.
    pub fn update_existing_data_with_key(
        &self,
        match_id: &RecordId,
        key: &str,
        value: Value,
        match_key: Option<&str>,
    ) -> usize {
        self.mutate(|state| state.update_existing_data_with_key(match_id, key, value, match_key))
    }

    /// Remove the record(s) with `id`. Returns the number removed.
    pub fn delete_existing_data(&self, id: &RecordId) -> usize {
        self.mutate(|state| state.delete_existing_data(id))
    }

    /// The local mutators, for wiring into a mutation coordinator.
    pub fn local_ops(&self) -> LocalOps {
        let add = self.clone();
        let update = self.clone();
        let delete = self.clone();
        LocalOps::new()
            .with_add(move |record| add.add_new_data(record))
            .with_update(move |id, record| {
                update.update_existing_data(id, record);
            })
            .with_delete(move |id| {
                delete.delete_existing_data(id);
            })
    }

    // --- Raw setters ---

    /// Replace the collection wholesale.
    pub fn set_data(&self, records: Vec<Record>) {
        self.mutate(|state| state.set_data(records));
    }

    /// Overwrite the last error.
    pub fn set_error(&self, error: Option<String>) {
        self.mutate(|state| state.set_error(error));
    }

    /// Overwrite the current page.
    pub fn set_page(&self, page: u32) {
        self.mutate(|state| state.set_page(page));
    }

    /// Overwrite the next-page flag.
    pub fn set_has_next_page(&self, has_next_page: bool) {
        self.mutate(|state| state.set_has_next_page(has_next_page));
    }

    /// Overwrite the total result count.
    pub fn set_total_results(&self, total_results: Option<u64>) {
        self.mutate(|state| state.set_total_results(total_results));
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut FetchState) -> R) -> R {
        let mut state = lock(&self.state);
        let result = f(&mut state);
        self.notifier.publish_fetch(&state);
        result
    }

    fn publish(&self) {
        self.notifier.publish_fetch(&lock(&self.state));
    }
}
