use crate::core::models::{FundInfo, FundNav};
use crate::core::repository::Repository;
use crate::core::views::{Pager, ViewState};
use tracing::error;

pub const NAV_HISTORY_LIMIT: usize = 90;
pub const NAVS_PER_PAGE: usize = 10;

/// Recent NAV history for one fund of the reference list.
pub struct FundExplorer {
    repo: Repository,
    funds: Vec<FundInfo>,
    selected: Option<String>,
    // Chronological: the newest-first fetch, reversed.
    history: Vec<FundNav>,
    loading: bool,
    pager: Pager,
}

impl FundExplorer {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            funds: Vec::new(),
            selected: None,
            history: Vec::new(),
            loading: false,
            pager: Pager::new(NAVS_PER_PAGE),
        }
    }

    pub fn funds(&self) -> &[FundInfo] {
        &self.funds
    }

    pub fn selected(&self) -> Option<&FundInfo> {
        let id = self.selected.as_deref()?;
        self.funds.iter().find(|f| f.cnyes_id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> ViewState {
        ViewState::of(self.loading, self.history.len())
    }

    /// Loads the fund list and selects the first fund when the list is
    /// non-empty.
    pub async fn load_funds(&mut self) {
        match self.repo.funds().await {
            Ok(funds) if !funds.is_empty() => {
                self.selected = Some(funds[0].cnyes_id.clone());
                self.funds = funds;
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Error fetching funds"),
        }
    }

    pub async fn select_fund(&mut self, cnyes_id: &str) {
        self.selected = Some(cnyes_id.to_string());
        self.refresh().await;
    }

    pub async fn refresh(&mut self) {
        let Some(cnyes_id) = self.selected.clone() else {
            return;
        };

        self.loading = true;
        match self.repo.recent_fund_navs(&cnyes_id, NAV_HISTORY_LIMIT).await {
            Ok(mut rows) => {
                rows.reverse();
                self.history = rows;
                self.pager.reset();
            }
            Err(e) => error!(error = %e, %cnyes_id, "Error fetching NAV history"),
        }
        self.loading = false;
    }

    /// Chart series, oldest first.
    pub fn chart_series(&self) -> &[FundNav] {
        &self.history
    }

    /// Rows of the current table page, newest first.
    pub fn table_page(&self) -> Vec<&FundNav> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{FUND_DATA, FUND_NAV_HISTORY};
    use crate::core::table::TableStore;
    use crate::store::memory::MemoryStore;
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use std::sync::Arc;

    fn store(nav_days: i64) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_rows(
            FUND_DATA,
            vec![
                json!({"cnyes_id": "F001", "display_name": "Asia Bond", "currency": "USD"}),
                json!({"cnyes_id": "F002", "display_name": "TW Equity", "currency": "TWD"}),
            ],
        );
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let rows = (0..nav_days)
            .map(|i| {
                json!({
                    "cnyes_id": "F001",
                    "price_date": (start + Duration::days(i)).to_string(),
                    "nav": 10.0 + i as f64 / 10.0,
                })
            })
            .collect();
        store.insert_rows(FUND_NAV_HISTORY, rows);
        Arc::new(store)
    }

    async fn loaded(store: Arc<MemoryStore>) -> FundExplorer {
        let mut explorer = FundExplorer::new(Repository::new(store));
        explorer.load_funds().await;
        explorer.refresh().await;
        explorer
    }

    #[tokio::test]
    async fn test_first_fund_selected_by_default() {
        let explorer = loaded(store(3)).await;
        assert_eq!(explorer.selected_id(), Some("F001"));
        assert_eq!(explorer.selected().unwrap().label(), "Asia Bond (USD)");
    }

    #[tokio::test]
    async fn test_fetches_newest_ninety_descending() {
        let store = store(120);
        let explorer = loaded(store.clone()).await;

        let query = store.last_query().unwrap();
        assert_eq!(query.limit, Some(NAV_HISTORY_LIMIT));
        assert_eq!(query.order.as_ref().map(|o| o.ascending), Some(false));
        assert_eq!(explorer.chart_series().len(), 90);
        assert_eq!(
            explorer.chart_series()[0].price_date,
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[tokio::test]
    async fn test_double_reversal_orders() {
        let store = store(25);
        let mut explorer = loaded(store.clone()).await;

        // Newest-first order exactly as the store returned it.
        let fetch_order: Vec<NaiveDate> = {
            let query = store.last_query().unwrap();
            let rows = store.select(&query).await.unwrap();
            rows.iter()
                .map(|r| serde_json::from_value::<NaiveDate>(r["price_date"].clone()).unwrap())
                .collect()
        };

        let chart: Vec<NaiveDate> = explorer.chart_series().iter().map(|n| n.price_date).collect();
        let mut reversed = fetch_order.clone();
        reversed.reverse();
        assert_eq!(chart, reversed);

        let mut table = Vec::new();
        for page in 1..=explorer.total_pages() {
            explorer.go_to_page(page);
            table.extend(explorer.table_page().iter().map(|n| n.price_date));
        }
        assert_eq!(table, fetch_order);
        assert_eq!(explorer.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_zero_rows_is_empty_not_loading() {
        let mut explorer = loaded(store(0)).await;
        assert_eq!(explorer.state(), ViewState::Empty);

        explorer.select_fund("F002").await;
        assert_eq!(explorer.state(), ViewState::Empty);
        assert!(explorer.table_page().is_empty());
    }

    #[tokio::test]
    async fn test_fund_list_failure_leaves_no_selection() {
        let store = store(3);
        store.set_failing(true);
        let explorer = loaded(store.clone()).await;

        assert!(explorer.funds().is_empty());
        assert!(explorer.selected_id().is_none());
        // Only the fund list was requested.
        assert_eq!(store.queries().len(), 1);
        assert_eq!(store.queries()[0].table, FUND_DATA);
    }
}
