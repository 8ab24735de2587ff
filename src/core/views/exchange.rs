use crate::core::models::ExchangeRate;
use crate::core::repository::Repository;
use crate::core::views::{Pager, ViewState};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, error, warn};

pub const RATES_PER_PAGE: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    OneMonth,
    #[default]
    ThreeMonths,
    SixMonths,
    OneYear,
    All,
}

impl DateRange {
    pub const ALL_OPTIONS: [DateRange; 5] = [
        DateRange::OneMonth,
        DateRange::ThreeMonths,
        DateRange::SixMonths,
        DateRange::OneYear,
        DateRange::All,
    ];

    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::OneMonth => Some(30),
            DateRange::ThreeMonths => Some(90),
            DateRange::SixMonths => Some(180),
            DateRange::OneYear => Some(365),
            DateRange::All => None,
        }
    }

    /// UTC date `days` before `now`, or `None` for an unbounded range.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        self.days().map(|days| (now - Duration::days(days)).date_naive())
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DateRange::OneMonth => "1M",
                DateRange::ThreeMonths => "3M",
                DateRange::SixMonths => "6M",
                DateRange::OneYear => "1Y",
                DateRange::All => "ALL",
            }
        )
    }
}

impl FromStr for DateRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1M" => Ok(DateRange::OneMonth),
            "3M" => Ok(DateRange::ThreeMonths),
            "6M" => Ok(DateRange::SixMonths),
            "1Y" => Ok(DateRange::OneYear),
            "ALL" | "全部" => Ok(DateRange::All),
            _ => Err(anyhow::anyhow!("Invalid date range: {}", s)),
        }
    }
}

/// Rate history for one active currency over a selectable date range.
pub struct ExchangeExplorer {
    repo: Repository,
    default_currency: String,
    currencies: Vec<String>,
    selected: Option<String>,
    range: DateRange,
    history: Vec<ExchangeRate>,
    loading: bool,
    pager: Pager,
}

impl ExchangeExplorer {
    pub fn new(repo: Repository, default_currency: &str) -> Self {
        Self {
            repo,
            default_currency: default_currency.to_string(),
            currencies: Vec::new(),
            selected: None,
            range: DateRange::default(),
            history: Vec::new(),
            loading: false,
            pager: Pager::new(RATES_PER_PAGE),
        }
    }

    /// Sets the initial range without fetching.
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn state(&self) -> ViewState {
        ViewState::of(self.loading, self.history.len())
    }

    /// Loads the active codes offered by the selector and picks an initial
    /// selection when none is set: the default currency if active, else the
    /// first active code.
    pub async fn load_currencies(&mut self) {
        match self.repo.active_currency_codes().await {
            Ok(codes) => self.currencies = codes,
            Err(e) => {
                error!(error = %e, "Error fetching active currencies");
                return;
            }
        }

        if self.selected.is_none() {
            self.selected = self
                .currencies
                .iter()
                .find(|c| **c == self.default_currency)
                .or_else(|| self.currencies.first())
                .cloned();
            debug!(selected = ?self.selected, "Initial currency selection");
        }
    }

    /// Selects one of the active codes and fetches its history. Any other
    /// code is ignored and leaves the current selection untouched.
    pub async fn select_currency(&mut self, code: &str) -> bool {
        if !self.currencies.iter().any(|c| c == code) {
            warn!(%code, "Currency is not active, keeping current selection");
            return false;
        }
        self.selected = Some(code.to_string());
        self.refresh().await;
        true
    }

    pub async fn set_range(&mut self, range: DateRange) {
        self.range = range;
        self.refresh().await;
    }

    /// Fetches the history for the current selection and range.
    pub async fn refresh(&mut self) {
        self.refresh_at(Utc::now()).await;
    }

    pub async fn refresh_at(&mut self, now: DateTime<Utc>) {
        let Some(currency) = self.selected.clone() else {
            return;
        };

        self.loading = true;
        let since = self.range.lower_bound(now);
        match self.repo.exchange_rates(&currency, since).await {
            Ok(rows) => {
                self.history = rows;
                self.pager.reset();
            }
            Err(e) => error!(error = %e, %currency, "Error fetching exchange rates"),
        }
        self.loading = false;
    }

    /// Chart series, oldest first.
    pub fn chart_series(&self) -> &[ExchangeRate] {
        &self.history
    }

    /// Rows of the current table page, newest first.
    pub fn table_page(&self) -> Vec<&ExchangeRate> {
        self.pager.newest_first(&self.history)
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.history.len())
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to(page, self.history.len());
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.history.len());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev(self.history.len());
    }
}
