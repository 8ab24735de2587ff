//! Table store abstractions
//!
//! A [`Query`] describes one read against a remote table: a projection,
//! equality and lower-bound filters, an optional ordering and a row limit.
//! An [`Update`] patches the rows matching its equality filters.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::Gte(column, _) => column,
        }
    }

    /// Renders the filter as a PostgREST query pair, e.g. `("code", "eq.USD")`.
    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", plain(value))),
            Filter::Gte(column, value) => (column.clone(), format!("gte.{}", plain(value))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Comma separated column list; `*` or an empty list selects everything.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "*")
            .map(String::from)
            .collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn lower_bound(&self, column: &str) -> Option<&Value> {
        self.filters.iter().find_map(|f| match f {
            Filter::Gte(c, v) if c == column => Some(v),
            _ => None,
        })
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };

        let mut params = vec![("select".to_string(), select)];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub filters: Vec<Filter>,
    pub patch: Map<String, Value>,
}

impl Update {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            patch: Map::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.patch.insert(column.to_string(), value.into());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }
}

/// Read/write access to the remote relational store.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>>;
    async fn update(&self, update: &Update) -> Result<()>;
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_for_range_filter() {
        let query = Query::table("exchange_rates")
            .select("date, spot_sell_rate, cash_sell_rate")
            .eq("base_currency", "USD")
            .gte("date", "2025-01-01")
            .order("date", true);

        assert_eq!(
            query.to_params(),
            vec![
                (
                    "select".to_string(),
                    "date,spot_sell_rate,cash_sell_rate".to_string()
                ),
                ("base_currency".to_string(), "eq.USD".to_string()),
                ("date".to_string(), "gte.2025-01-01".to_string()),
                ("order".to_string(), "date.asc".to_string()),
            ]
        );
        assert_eq!(query.lower_bound("date"), Some(&Value::from("2025-01-01")));
    }

    #[test]
    fn test_query_params_with_limit_and_bool() {
        let query = Query::table("fund_nav_history")
            .select("*")
            .eq("is_active", true)
            .order("price_date", false)
            .limit(90);

        let params = query.to_params();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert_eq!(params[1], ("is_active".to_string(), "eq.true".to_string()));
        assert_eq!(params[2], ("order".to_string(), "price_date.desc".to_string()));
        assert_eq!(params[3], ("limit".to_string(), "90".to_string()));
        assert!(query.lower_bound("price_date").is_none());
    }

    #[test]
    fn test_update_params_and_patch() {
        let update = Update::table("target_currencies")
            .set("is_active", false)
            .eq("code", "JPY");

        assert_eq!(
            update.to_params(),
            vec![("code".to_string(), "eq.JPY".to_string())]
        );
        assert_eq!(update.patch.get("is_active"), Some(&Value::Bool(false)));
    }
}
