//! Pagination cursor for a fetched collection.
//!
//! The cursor records where the collection stands in the remote sequence:
//! - The current 1-based page
//! - Total pages and total results, once the service reports them
//! - Whether another page is worth asking for
//!
//! Unknown is not zero: a response that omits a pagination field leaves the
//! previously known value in place.

use list_types::ExtractionResult;

/// Position of the collection within the remote page sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    total_pages: Option<u32>,
    total_results: Option<u64>,
    has_next_page: bool,
}

impl PageCursor {
    /// Create a cursor positioned at `page`, with nothing known yet.
    pub fn new(page: u32) -> Self {
        Self {
            current_page: page,
            total_pages: None,
            total_results: None,
            has_next_page: false,
        }
    }

    /// The current 1-based page.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Total pages, if the service has reported it.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Total results, if the service has reported it.
    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    /// Whether another page is expected after the current one.
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// The page a "more" fetch should request.
    pub fn next_page(&self) -> u32 {
        self.current_page.saturating_add(1)
    }

    /// Fold a successfully extracted page into the cursor.
    ///
    /// `requested_page` is used when the response does not say which page it
    /// is. `has_next_page` compares against total pages when known, and
    /// otherwise assumes more data follows a non-empty page.
    pub fn apply(&mut self, page: &ExtractionResult, requested_page: u32) {
        self.current_page = page.current_page.unwrap_or(requested_page);
        if let Some(total_pages) = page.total_pages {
            self.total_pages = Some(total_pages);
        }
        if let Some(total_results) = page.total_results {
            self.total_results = Some(total_results);
        }
        self.has_next_page = match self.total_pages {
            Some(total_pages) => self.current_page < total_pages,
            None => !page.records.is_empty(),
        };
    }

    /// Raw setter for the current page.
    pub fn set_page(&mut self, page: u32) {
        self.current_page = page;
    }

    /// Raw setter for the next-page flag.
    pub fn set_has_next_page(&mut self, has_next_page: bool) {
        self.has_next_page = has_next_page;
    }

    /// Raw setter for the total result count.
    pub fn set_total_results(&mut self, total_results: Option<u64>) {
        self.total_results = total_results;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(1)
    }
}
