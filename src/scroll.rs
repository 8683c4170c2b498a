//! Timer-backed infinite scroll.
//!
//! Wraps the core [`Pagination`] state machine with the short reveal
//! delay: the data is already in memory, but revealing the next page
//! after a pause gives the client a visible loading state instead of an
//! abrupt jump.

use std::ops::Range;
use std::time::Duration;

use pulgarpedia_core::Pagination;

#[derive(Debug, Clone)]
pub struct InfiniteScroll {
    pagination: Pagination,
    delay: Duration,
}

impl InfiniteScroll {
    pub fn new(page_size: usize, delay: Duration) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            delay,
        }
    }

    /// Resume at `page` of the list identified by `revision`.
    pub fn resume(page_size: usize, delay: Duration, revision: u64, page: usize) -> Self {
        Self {
            pagination: Pagination::resume(page_size, revision, page),
            delay,
        }
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn observe(&mut self, revision: u64) {
        self.pagination.observe(revision);
    }

    /// Indices of the visible prefix of a list of `total` items.
    pub fn visible(&self, total: usize) -> Range<usize> {
        0..self.pagination.displayed_len(total)
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.pagination.has_more(total)
    }

    /// Reveal the next page after the configured delay.
    ///
    /// Returns the indices that became visible, or `None` when there was
    /// nothing more to show.
    pub async fn load_more(&mut self, total: usize) -> Option<Range<usize>> {
        let before = self.pagination.displayed_len(total);
        let ticket = self.pagination.begin_load_more(total)?;

        tokio::time::sleep(self.delay).await;

        if self.pagination.complete_load_more(ticket) {
            Some(before..self.pagination.displayed_len(total))
        } else {
            None
        }
    }
}
