use crate::core::models::TargetCurrency;
use crate::core::repository::Repository;
use crate::core::views::ViewState;
use tracing::{error, info};

/// The target-currency roster with per-row active toggles.
pub struct CurrencyRoster {
    repo: Repository,
    currencies: Vec<TargetCurrency>,
    loading: bool,
}

impl CurrencyRoster {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            currencies: Vec::new(),
            loading: true,
        }
    }

    pub fn currencies(&self) -> &[TargetCurrency] {
        &self.currencies
    }

    pub fn state(&self) -> ViewState {
        ViewState::of(self.loading, self.currencies.len())
    }

    pub async fn load(&mut self) {
        self.loading = true;
        match self.repo.target_currencies().await {
            Ok(currencies) => self.currencies = currencies,
            Err(e) => error!(error = %e, "Error fetching currencies"),
        }
        self.loading = false;
    }

    /// Flips `is_active` for `code`.
    ///
    /// The remote row is updated first; the local copy only changes once the
    /// update succeeded. Returns whether the flip was applied.
    pub async fn toggle(&mut self, code: &str) -> bool {
        let Some(current) = self
            .currencies
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.is_active)
        else {
            error!(%code, "Unknown currency code");
            return false;
        };

        if let Err(e) = self.repo.set_currency_active(code, !current).await {
            error!(error = %e, %code, "Error updating currency");
            return false;
        }

        if let Some(currency) = self.currencies.iter_mut().find(|c| c.code == code) {
            currency.is_active = !current;
        }
        info!(%code, active = !current, "Currency toggled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::TARGET_CURRENCIES;
    use crate::store::memory::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_rows(
            TARGET_CURRENCIES,
            vec![
                json!({"code": "USD", "description": "美金", "is_active": true, "created_at": "2025-01-01T00:00:00+00:00"}),
                json!({"code": "AUD", "description": "澳幣", "is_active": false, "created_at": "2025-01-02T00:00:00+00:00"}),
            ],
        );
        Arc::new(store)
    }

    fn active_of(roster: &CurrencyRoster, code: &str) -> bool {
        roster
            .currencies()
            .iter()
            .find(|c| c.code == code)
            .unwrap()
            .is_active
    }

    #[tokio::test]
    async fn test_load_orders_by_code() {
        let mut roster = CurrencyRoster::new(Repository::new(store()));
        assert_eq!(roster.state(), ViewState::Loading);

        roster.load().await;

        let codes: Vec<&str> = roster.currencies().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["AUD", "USD"]);
        assert_eq!(roster.state(), ViewState::Ready);
    }

    #[tokio::test]
    async fn test_loose_rows_still_load_and_toggle() {
        let store = store();
        store.insert_rows(
            TARGET_CURRENCIES,
            vec![json!({"code": "CAD", "description": null, "is_active": false, "created_at": "2025-01-01T08:15:30.123456"})],
        );
        let mut roster = CurrencyRoster::new(Repository::new(store.clone()));
        roster.load().await;

        assert_eq!(roster.currencies().len(), 3);
        assert!(roster.toggle("CAD").await);
        assert!(active_of(&roster, "CAD"));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_value_with_two_updates() {
        let store = store();
        let mut roster = CurrencyRoster::new(Repository::new(store.clone()));
        roster.load().await;

        assert!(roster.toggle("USD").await);
        assert!(!active_of(&roster, "USD"));
        assert!(roster.toggle("USD").await);
        assert!(active_of(&roster, "USD"));

        let sent: Vec<_> = store
            .updates()
            .iter()
            .map(|u| u.patch.get("is_active").cloned().unwrap())
            .collect();
        assert_eq!(sent, vec![json!(false), json!(true)]);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_local_state() {
        let store = store();
        let mut roster = CurrencyRoster::new(Repository::new(store.clone()));
        roster.load().await;

        store.set_failing(true);
        assert!(!roster.toggle("AUD").await);
        assert!(!active_of(&roster, "AUD"));
        assert_eq!(store.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_issues_no_update() {
        let store = store();
        let mut roster = CurrencyRoster::new(Repository::new(store.clone()));
        roster.load().await;

        assert!(!roster.toggle("XXX").await);
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_list() {
        let store = store();
        let mut roster = CurrencyRoster::new(Repository::new(store.clone()));
        roster.load().await;

        store.set_failing(true);
        roster.load().await;
        assert_eq!(roster.currencies().len(), 2);
        assert_eq!(roster.state(), ViewState::Ready);
    }
}
