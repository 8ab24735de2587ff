use super::models::{
    EXCHANGE_RATES, ExchangeRate, FUND_DATA, FUND_NAV_HISTORY, FundInfo, FundNav,
    TARGET_CURRENCIES, TargetCurrency,
};
use super::table::{Query, TableStore, Update};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

const RATE_COLUMNS: &str = "base_currency, date, spot_sell_rate, cash_sell_rate";
const NAV_COLUMNS: &str = "cnyes_id, price_date, nav";

/// Typed reads and writes over a [`TableStore`].
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TableStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    async fn fetch<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>> {
        let rows = self
            .store
            .select(&query)
            .await
            .with_context(|| format!("Failed to query {}", query.table))?;
        debug!(table = %query.table, rows = rows.len(), "Fetched rows");

        serde_json::from_value(Value::Array(rows))
            .with_context(|| format!("Failed to decode rows from {}", query.table))
    }

    pub async fn target_currencies(&self) -> Result<Vec<TargetCurrency>> {
        self.fetch(Query::table(TARGET_CURRENCIES).select("*").order("code", true))
            .await
    }

    pub async fn active_currency_codes(&self) -> Result<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct CodeRow {
            code: String,
        }

        let rows: Vec<CodeRow> = self
            .fetch(
                Query::table(TARGET_CURRENCIES)
                    .select("code")
                    .eq("is_active", true)
                    .order("code", true),
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.code).collect())
    }

    #[instrument(skip(self))]
    pub async fn set_currency_active(&self, code: &str, active: bool) -> Result<()> {
        let update = Update::table(TARGET_CURRENCIES)
            .set("is_active", active)
            .eq("code", code);
        self.store
            .update(&update)
            .await
            .with_context(|| format!("Failed to update currency {code}"))
    }

    /// Rates for `currency` in ascending date order, optionally from `since` on.
    pub async fn exchange_rates(
        &self,
        currency: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<ExchangeRate>> {
        let mut query = Query::table(EXCHANGE_RATES)
            .select(RATE_COLUMNS)
            .eq("base_currency", currency);
        if let Some(since) = since {
            query = query.gte("date", since.format("%Y-%m-%d").to_string());
        }
        self.fetch(query.order("date", true)).await
    }

    /// The newest `limit` rates for `currency`, newest first.
    pub async fn recent_exchange_rates(
        &self,
        currency: &str,
        limit: usize,
    ) -> Result<Vec<ExchangeRate>> {
        self.fetch(
            Query::table(EXCHANGE_RATES)
                .select(RATE_COLUMNS)
                .eq("base_currency", currency)
                .order("date", false)
                .limit(limit),
        )
        .await
    }

    pub async fn funds(&self) -> Result<Vec<FundInfo>> {
        self.fetch(Query::table(FUND_DATA).select("cnyes_id, display_name, currency"))
            .await
    }

    /// The newest `limit` NAV quotes for a fund, newest first.
    pub async fn recent_fund_navs(&self, cnyes_id: &str, limit: usize) -> Result<Vec<FundNav>> {
        self.fetch(
            Query::table(FUND_NAV_HISTORY)
                .select(NAV_COLUMNS)
                .eq("cnyes_id", cnyes_id)
                .order("price_date", false)
                .limit(limit),
        )
        .await
    }
}
