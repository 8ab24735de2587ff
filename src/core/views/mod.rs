//! Screen state for the dashboard views
//!
//! Each view owns the rows it last fetched and exposes the user actions of
//! its screen as async methods. Store failures are logged and leave the
//! previous rows in place.

pub mod dashboard;
pub mod exchange;
pub mod funds;
pub mod roster;

pub use dashboard::Dashboard;
pub use exchange::{DateRange, ExchangeExplorer};
pub use funds::FundExplorer;
pub use roster::CurrencyRoster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Empty,
    Ready,
}

impl ViewState {
    pub fn of(loading: bool, rows: usize) -> Self {
        match (loading, rows) {
            (true, _) => ViewState::Loading,
            (false, 0) => ViewState::Empty,
            (false, _) => ViewState::Ready,
        }
    }
}

/// One-based page cursor over a fixed-size row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    per_page: usize,
    page: usize,
}

impl Pager {
    pub fn new(per_page: usize) -> Self {
        Self { per_page, page: 1 }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, rows: usize) -> usize {
        rows.div_ceil(self.per_page)
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Moves to `page`, clamped to `[1, total_pages]`.
    pub fn go_to(&mut self, page: usize, rows: usize) {
        self.page = page.clamp(1, self.total_pages(rows).max(1));
    }

    pub fn next(&mut self, rows: usize) {
        self.go_to(self.page + 1, rows);
    }

    pub fn prev(&mut self, rows: usize) {
        self.go_to(self.page.saturating_sub(1), rows);
    }

    /// Rows of the current page, taken from `rows` read back to front.
    pub fn newest_first<'a, T>(&self, rows: &'a [T]) -> Vec<&'a T> {
        rows.iter()
            .rev()
            .skip((self.page - 1) * self.per_page)
            .take(self.per_page)
            .collect()
    }
}
