use crate::core::table::{Filter, Query, TableStore, Update};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tracing::debug;

/// In-memory table store evaluating [`Query`] the way the remote store does.
///
/// Every select and update is recorded so callers can inspect exactly which
/// requests were issued.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    queries: Mutex<Vec<Query>>,
    updates: Mutex<Vec<Update>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rows(&self, table: &str, rows: Vec<Value>) {
        let mut tables = lock(&self.tables);
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// While set, every request fails without touching the tables.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn queries(&self) -> Vec<Query> {
        lock(&self.queries).clone()
    }

    pub fn last_query(&self) -> Option<Query> {
        lock(&self.queries).last().cloned()
    }

    pub fn updates(&self) -> Vec<Update> {
        lock(&self.updates).clone()
    }

    fn check_failing(&self, table: &str) -> Result<()> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(anyhow!("Store unavailable for table {table}"));
        }
        Ok(())
    }
}

/// Locks `mutex`, recovering the data of a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        lock(&self.queries)
            .push(query.clone());
        self.check_failing(&query.table)?;

        let tables = lock(&self.tables);
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        debug!(table = %query.table, rows = rows.len(), "Memory select");
        Ok(rows
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect())
    }

    async fn update(&self, update: &Update) -> Result<()> {
        lock(&self.updates)
            .push(update.clone());
        self.check_failing(&update.table)?;

        let mut tables = lock(&self.tables);
        let rows = tables.entry(update.table.clone()).or_default();
        for row in rows
            .iter_mut()
            .filter(|row| update.filters.iter().all(|f| matches(row, f)))
        {
            if let Value::Object(fields) = row {
                for (column, value) in &update.patch {
                    fields.insert(column.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(filter.column());
    match filter {
        Filter::Eq(_, expected) => cell == Some(expected),
        Filter::Gte(_, bound) => compare(cell, Some(bound)) != Ordering::Less,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn project(row: Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row;
    }
    match row {
        Value::Object(mut fields) => {
            let projected: Map<String, Value> = columns
                .iter()
                .filter_map(|c| fields.remove(c).map(|v| (c.clone(), v)))
                .collect();
            Value::Object(projected)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_rows(
            "fund_nav_history",
            vec![
                json!({"cnyes_id": "A", "price_date": "2025-01-02", "nav": 10.2}),
                json!({"cnyes_id": "A", "price_date": "2025-01-03", "nav": 10.4}),
                json!({"cnyes_id": "B", "price_date": "2025-01-03", "nav": 7.0}),
                json!({"cnyes_id": "A", "price_date": "2025-01-01", "nav": 10.0}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_poisoned_lock_keeps_serving_rows() {
        let store = std::sync::Arc::new(store());
        let poisoner = store.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.tables.lock().unwrap();
            panic!("writer crashed");
        })
        .join();
        assert!(result.is_err());
        assert!(store.tables.is_poisoned());

        store.insert_rows("fund_data", vec![json!({"cnyes_id": "A"})]);
        let rows = store.select(&Query::table("fund_data")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = store();
        let query = Query::table("fund_nav_history")
            .select("price_date, nav")
            .eq("cnyes_id", "A")
            .order("price_date", false)
            .limit(2);

        let rows = store.select(&query).await.unwrap();
        assert_eq!(
            rows,
            vec![
                json!({"price_date": "2025-01-03", "nav": 10.4}),
                json!({"price_date": "2025-01-02", "nav": 10.2}),
            ]
        );
        assert_eq!(store.queries(), vec![query]);
    }

    #[tokio::test]
    async fn test_select_gte_on_numbers() {
        let store = store();
        let query = Query::table("fund_nav_history").gte("nav", 10.2);

        let rows = store.select(&query).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_select_unknown_table_is_empty() {
        let store = store();
        let rows = store.select(&Query::table("missing")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_patches_matching_rows_only() {
        let store = store();
        let update = Update::table("fund_nav_history")
            .set("nav", 7.5)
            .eq("cnyes_id", "B");

        store.update(&update).await.unwrap();

        let rows = store
            .select(&Query::table("fund_nav_history").eq("nav", 7.5))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cnyes_id"], json!("B"));
        assert_eq!(store.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_store_still_records_requests() {
        let store = store();
        store.set_failing(true);

        assert!(store.select(&Query::table("fund_nav_history")).await.is_err());
        assert!(
            store
                .update(&Update::table("fund_nav_history").set("nav", 1.0))
                .await
                .is_err()
        );
        assert_eq!(store.queries().len(), 1);
        assert_eq!(store.updates().len(), 1);
    }
}
