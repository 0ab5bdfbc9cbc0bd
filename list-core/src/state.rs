//! Fetch state machine for a paginated collection.
//!
//! This module owns the collection, its cursor and the loading flags, and
//! decides how each fetch attempt composes into them. It performs no I/O:
//! the caller asks [`FetchState::begin`] for a [`FetchTicket`], awaits the
//! remote call itself, then hands the outcome to [`FetchState::complete`].
//!
//! A ticket that is never completed must be returned through
//! [`FetchState::abandon`] so the loading flag it holds is released. The
//! async driver in list-client does this from a drop guard.

use list_types::{ExtractionResult, Record, RecordId};
use serde::Deserialize;
use serde_json::Value;

use crate::collection::{Collection, InsertPosition};
use crate::cursor::PageCursor;

/// The three kinds of fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// First load: replaces the collection.
    Initial,
    /// Explicit reload from page 1: replaces the collection.
    Refresh,
    /// Next page: appends to the collection.
    More,
}

/// Externally visible loading status.
///
/// Exactly one value at a time. When fetches of different modes overlap,
/// the status reports the highest-priority one in flight
/// (Refreshing, then Fetching, then FetchingMore).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Initial load in flight.
    Fetching,
    /// Refresh in flight.
    Refreshing,
    /// Next-page load in flight.
    FetchingMore,
}

impl FetchStatus {
    /// Check if any fetch is in flight.
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// How strictly overlapping fetches of different modes are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchExclusion {
    /// Only a duplicate of the same mode is rejected. Different modes may
    /// overlap and their results apply in completion order.
    #[default]
    PerMode,
    /// Initial and More loads are rejected while anything is in flight.
    /// A refresh is always admitted and supersedes every fetch already in
    /// flight, earlier refreshes included: their results are discarded on
    /// completion.
    Global,
}

/// Permission to run one fetch, issued by [`FetchState::begin`].
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    mode: FetchMode,
    page: u32,
    epoch: u64,
}

impl FetchTicket {
    /// The fetch mode this ticket was issued for.
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// The page to request from the service.
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// What completing a ticket did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The page was applied to the collection.
    Applied {
        /// Number of records the page contributed.
        records: usize,
        /// Current page after applying.
        page: u32,
    },
    /// The fetch failed; the collection is untouched.
    Failed {
        /// Error message now held in `last_error`.
        message: String,
    },
    /// A later refresh began after this fetch started; its result was
    /// discarded.
    Superseded,
}

// Refreshes are never rejected as duplicates, so they are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InFlight {
    initial: bool,
    refreshes: usize,
    more: bool,
}

impl InFlight {
    fn get(&self, mode: FetchMode) -> bool {
        match mode {
            FetchMode::Initial => self.initial,
            FetchMode::Refresh => self.refreshes > 0,
            FetchMode::More => self.more,
        }
    }

    fn start(&mut self, mode: FetchMode) {
        match mode {
            FetchMode::Initial => self.initial = true,
            FetchMode::Refresh => self.refreshes += 1,
            FetchMode::More => self.more = true,
        }
    }

    fn finish(&mut self, mode: FetchMode) {
        match mode {
            FetchMode::Initial => self.initial = false,
            FetchMode::Refresh => self.refreshes = self.refreshes.saturating_sub(1),
            FetchMode::More => self.more = false,
        }
    }

    fn any(&self) -> bool {
        self.initial || self.refreshes > 0 || self.more
    }
}

/// Collection, cursor and loading flags for one paginated resource.
#[derive(Debug, Clone)]
pub struct FetchState {
    collection: Collection,
    cursor: PageCursor,
    last_error: Option<String>,
    in_flight: InFlight,
    exclusion: FetchExclusion,
    epoch: u64,
}

impl FetchState {
    /// Create an idle, empty state.
    pub fn new(
        id_key: impl Into<String>,
        insert_position: InsertPosition,
        exclusion: FetchExclusion,
        initial_page: u32,
    ) -> Self {
        Self {
            collection: Collection::new(id_key, insert_position),
            cursor: PageCursor::new(initial_page),
            last_error: None,
            in_flight: InFlight::default(),
            exclusion,
            epoch: 0,
        }
    }

    /// The current collection.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Current records, in display order.
    pub fn records(&self) -> &[Record] {
        self.collection.records()
    }

    /// The pagination cursor.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Message of the most recent failed fetch, if the latest attempt failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The exclusion policy in effect.
    pub fn exclusion(&self) -> FetchExclusion {
        self.exclusion
    }

    /// Derived loading status.
    pub fn status(&self) -> FetchStatus {
        if self.in_flight.refreshes > 0 {
            FetchStatus::Refreshing
        } else if self.in_flight.initial {
            FetchStatus::Fetching
        } else if self.in_flight.more {
            FetchStatus::FetchingMore
        } else {
            FetchStatus::Idle
        }
    }

    /// Check if a fetch of `mode` is in flight.
    pub fn is_in_flight(&self, mode: FetchMode) -> bool {
        self.in_flight.get(mode)
    }

    /// Check if any fetch is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.any()
    }

    /// Whether a fetch of `mode` would be admitted right now.
    ///
    /// A refresh is always admitted. Initial and More loads are rejected
    /// while a duplicate (`PerMode`) or any fetch (`Global`) is in flight.
    pub fn admits(&self, mode: FetchMode) -> bool {
        match (self.exclusion, mode) {
            (_, FetchMode::Refresh) => true,
            (FetchExclusion::PerMode, mode) => !self.in_flight.get(mode),
            (FetchExclusion::Global, _) => !self.in_flight.any(),
        }
    }

    /// Start a fetch attempt.
    ///
    /// Returns `None` (no-op) when the attempt is rejected by the exclusion
    /// policy, which never happens for `Refresh`. Otherwise marks `mode` in flight, clears `last_error` and
    /// returns the ticket naming the page to request:
    /// - `Refresh` always requests page 1
    /// - `More` requests `page`, defaulting to the page after the current one
    /// - `Initial` requests `page`, defaulting to the current page
    pub fn begin(&mut self, mode: FetchMode, page: Option<u32>) -> Option<FetchTicket> {
        if !self.admits(mode) {
            return None;
        }

        let page = match mode {
            FetchMode::Refresh => 1,
            FetchMode::More => page.unwrap_or_else(|| self.cursor.next_page()),
            FetchMode::Initial => page.unwrap_or_else(|| self.cursor.current_page()),
        };

        if self.exclusion == FetchExclusion::Global && mode == FetchMode::Refresh {
            self.epoch += 1;
        }

        self.in_flight.start(mode);
        self.last_error = None;

        Some(FetchTicket {
            mode,
            page,
            epoch: self.epoch,
        })
    }

    /// Finish a fetch attempt with its outcome.
    ///
    /// Always releases the ticket's loading flag. On success the page
    /// replaces (Initial, Refresh) or extends (More) the collection and is
    /// folded into the cursor. On failure only `last_error` changes.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ExtractionResult, String>,
    ) -> Completion {
        self.in_flight.finish(ticket.mode);

        if ticket.epoch != self.epoch {
            return Completion::Superseded;
        }

        match outcome {
            Ok(page) => {
                self.cursor.apply(&page, ticket.page);
                let records = page.records.len();
                match ticket.mode {
                    FetchMode::More => self.collection.extend(page.records),
                    FetchMode::Initial | FetchMode::Refresh => {
                        self.collection.replace(page.records)
                    }
                }
                self.last_error = None;
                Completion::Applied {
                    records,
                    page: self.cursor.current_page(),
                }
            }
            Err(message) => {
                self.last_error = Some(message.clone());
                Completion::Failed { message }
            }
        }
    }

    /// Release a ticket without applying anything.
    pub fn abandon(&mut self, ticket: FetchTicket) {
        self.in_flight.finish(ticket.mode);
    }

    // Local mutators

    /// Insert one record at the configured position.
    pub fn add_new_data(&mut self, record: Record) {
        self.collection.add(record);
    }

    /// Update the record(s) with the given id. Returns the number touched.
    pub fn update_existing_data(&mut self, id: &RecordId, patch: Record) -> usize {
        self.collection.update(id, patch)
    }

    /// Set one field on the matching record(s). Returns the number touched.
    pub fn update_existing_data_with_key(
        &mut self,
        match_id: &RecordId,
        key: &str,
        value: Value,
        match_key: Option<&str>,
    ) -> usize {
        self.collection
            .update_with_key(match_id, key, value, match_key)
    }

    /// Remove the record(s) with the given id. Returns the number removed.
    pub fn delete_existing_data(&mut self, id: &RecordId) -> usize {
        self.collection.delete(id)
    }

    // Raw setters

    /// Replace the collection wholesale.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.collection.replace(records);
    }

    /// Overwrite the last error.
    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Overwrite the current page.
    pub fn set_page(&mut self, page: u32) {
        self.cursor.set_page(page);
    }

    /// Overwrite the next-page flag.
    pub fn set_has_next_page(&mut self, has_next_page: bool) {
        self.cursor.set_has_next_page(has_next_page);
    }

    /// Overwrite the total result count.
    pub fn set_total_results(&mut self, total_results: Option<u64>) {
        self.cursor.set_total_results(total_results);
    }
}

impl Default for FetchState {
    fn default() -> Self {
        Self::new(
            crate::collection::DEFAULT_ID_KEY,
            InsertPosition::default(),
            FetchExclusion::default(),
            1,
        )
    }
}
