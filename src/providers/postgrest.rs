use crate::core::table::{Query, TableStore, Update};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// Table store backed by a PostgREST endpoint (`{url}/rest/v1/{table}`).
pub struct PostgrestStore {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    code: Option<String>,
    hint: Option<String>,
}

impl PostgrestStore {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key).context("Invalid store key")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {anon_key}")).context("Invalid store key")?,
        );

        let client = Client::builder()
            .user_agent("finsys/0.1")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, table))
            .with_context(|| format!("Invalid store URL: {}", self.base_url))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn check(response: Response, table: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err) => format!(
                "{} (code: {}, hint: {})",
                err.message.unwrap_or_else(|| "unknown error".to_string()),
                err.code.as_deref().unwrap_or("-"),
                err.hint.as_deref().unwrap_or("-"),
            ),
            Err(_) => body,
        };
        Err(anyhow!("Store returned {status} for {table}: {detail}"))
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    #[instrument(name = "StoreSelect", skip(self, query), fields(table = %query.table))]
    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let url = self.table_url(&query.table, &query.to_params())?;
        debug!("Requesting rows from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for table {}", query.table))?;
        let response = Self::check(response, &query.table).await?;

        response
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("Failed to parse rows for table {}", query.table))
    }

    #[instrument(name = "StoreUpdate", skip(self, update), fields(table = %update.table))]
    async fn update(&self, update: &Update) -> Result<()> {
        let url = self.table_url(&update.table, &update.to_params())?;
        debug!(patch = ?update.patch, "Patching rows at {}", url);

        let response = self
            .client
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&update.patch)
            .send()
            .await
            .with_context(|| format!("Request failed for table {}", update.table))?;
        Self::check(response, &update.table).await?;
        Ok(())
    }
}
