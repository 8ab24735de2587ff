use crate::core::models::ExchangeRate;
use crate::core::repository::Repository;
use crate::core::views::{CurrencyRoster, ViewState};
use tracing::error;

pub const DASHBOARD_CURRENCY: &str = "USD";
pub const DASHBOARD_POINTS: usize = 30;

/// Landing screen: the currency roster next to the latest USD quotes.
pub struct Dashboard {
    repo: Repository,
    roster: CurrencyRoster,
    // Oldest first.
    recent: Vec<ExchangeRate>,
}

impl Dashboard {
    pub fn new(repo: Repository) -> Self {
        Self {
            roster: CurrencyRoster::new(repo.clone()),
            repo,
            recent: Vec::new(),
        }
    }

    pub fn roster(&self) -> &CurrencyRoster {
        &self.roster
    }

    /// Loads the roster and the recent quotes concurrently.
    pub async fn load(&mut self) {
        let repo = &self.repo;
        let (_, recent) = futures::join!(
            self.roster.load(),
            repo.recent_exchange_rates(DASHBOARD_CURRENCY, DASHBOARD_POINTS)
        );

        match recent {
            Ok(mut rows) => {
                rows.reverse();
                self.recent = rows;
            }
            Err(e) => error!(error = %e, "Error fetching rates"),
        }
    }

    pub fn chart_series(&self) -> &[ExchangeRate] {
        &self.recent
    }

    /// Chart labels as `MM-DD` with the spot sell rate.
    pub fn chart_points(&self) -> Vec<(String, Option<f64>)> {
        self.recent
            .iter()
            .map(|r| (r.date.format("%m-%d").to_string(), r.spot_sell_rate))
            .collect()
    }

    /// The chart has no loading flag of its own; it reads as loading until
    /// rows arrive.
    pub fn chart_state(&self) -> ViewState {
        ViewState::of(self.recent.is_empty(), self.recent.len())
    }
}
