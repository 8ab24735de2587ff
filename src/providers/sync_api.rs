use crate::core::sync::{SyncJob, SyncResponse, SyncTrigger};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

/// HTTP client for the crawler's `/api/sync/{kind}` endpoints.
pub struct SyncApiClient {
    base_url: String,
    client: Client,
}

impl SyncApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().user_agent("finsys/0.1").build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn job_url(&self, job: SyncJob) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/sync/{}", self.base_url, job.kind()))
            .with_context(|| format!("Invalid sync API URL: {}", self.base_url))?;
        if let SyncJob::Exchange { year } = job {
            url.query_pairs_mut()
                .append_pair("start_year", &year.to_string())
                .append_pair("end_year", &year.to_string());
        }
        Ok(url)
    }
}

#[async_trait]
impl SyncTrigger for SyncApiClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    #[instrument(name = "SyncTrigger", skip(self), fields(job = %job))]
    async fn trigger(&self, job: SyncJob) -> Result<SyncResponse> {
        let url = self.job_url(job)?;
        debug!("Requesting sync at {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for sync job: {}", e, job))?;

        debug!(status = %response.status(), "Received sync response");
        response
            .json::<SyncResponse>()
            .await
            .with_context(|| format!("Failed to parse sync response for job: {job}"))
    }
}
