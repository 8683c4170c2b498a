//! Incremental reveal of a result list ("infinite scroll").
//!
//! [`Pagination`] is a sans-IO state machine: it tracks how many pages of
//! the current list are visible and whether a reveal is in progress. The
//! caller owns the timing (the app crate inserts a short delay between
//! [`begin_load_more`](Pagination::begin_load_more) and
//! [`complete_load_more`](Pagination::complete_load_more)).
//!
//! The list itself is identified by a revision number (see
//! [`FilteredPlaces::revision`](crate::filter::FilteredPlaces::revision)).
//! Observing a different revision starts over at page 1.

/// Default number of items revealed per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Proof that a reveal was started against a particular list revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    revision: Option<u64>,
    epoch: u64,
}

#[derive(Debug, Clone)]
pub struct Pagination {
    page_size: usize,
    page: usize,
    loading: bool,
    revision: Option<u64>,
    // bumped by reset() so tickets issued earlier are void
    epoch: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// A page size of 0 is clamped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
            loading: false,
            revision: None,
            epoch: 0,
        }
    }

    /// Resume at `page` of the list identified by `revision`.
    pub fn resume(page_size: usize, revision: u64, page: usize) -> Self {
        let mut pagination = Self::new(page_size);
        pagination.revision = Some(revision);
        pagination.page = page.max(1);
        pagination
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Track the identity of the upstream list; a new identity resets to page 1.
    pub fn observe(&mut self, revision: u64) {
        if self.revision != Some(revision) {
            self.revision = Some(revision);
            self.reset();
        }
    }

    /// Back to page 1. A reveal in flight will not advance the page.
    pub fn reset(&mut self) {
        self.page = 1;
        self.loading = false;
        self.epoch += 1;
    }

    pub fn displayed_len(&self, total: usize) -> usize {
        self.page.saturating_mul(self.page_size).min(total)
    }

    pub fn displayed<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.displayed_len(items.len())]
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.displayed_len(total) < total
    }

    /// Start revealing the next page.
    ///
    /// Returns `None` (and changes nothing) when everything is already shown
    /// or a reveal is already in progress.
    pub fn begin_load_more(&mut self, total: usize) -> Option<LoadTicket> {
        if !self.has_more(total) || self.loading {
            return None;
        }
        self.loading = true;
        Some(LoadTicket {
            revision: self.revision,
            epoch: self.epoch,
        })
    }

    /// Finish a reveal started with [`begin_load_more`](Self::begin_load_more).
    ///
    /// Returns whether the page advanced. A ticket from before the last
    /// reset or revision change is ignored.
    pub fn complete_load_more(&mut self, ticket: LoadTicket) -> bool {
        if ticket.epoch != self.epoch || ticket.revision != self.revision {
            return false;
        }
        self.loading = false;
        self.page += 1;
        true
    }
}
