use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use tracing::debug;

use super::types::Job;
use crate::query::FetchError;

pub const API_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Client for the public Hacker News Firebase API.
///
/// Every method depends only on its arguments and the base URL, so the
/// methods can be used directly as query fetchers.
#[derive(Debug, Clone)]
pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    pub fn new() -> Self {
        Self::with_client(API_URL, Client::new())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client with explicit connect and request timeouts.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ids of the current job stories, newest first.
    pub async fn fetch_job_ids(&self) -> Result<Vec<u64>, FetchError> {
        let url = format!("{}/jobstories.json", self.base_url);
        self.get_json(&url).await
    }

    /// One job by id. A deleted or unknown item is reported as [`FetchError::Missing`].
    pub async fn fetch_job(&self, id: u64) -> Result<Job, FetchError> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        self.get_json::<Option<Job>>(&url)
            .await?
            .ok_or(FetchError::Missing(id))
    }

    /// Fetch every id concurrently. The result keeps the order of `ids`; the
    /// first failure fails the whole batch.
    pub async fn fetch_jobs(&self, ids: &[u64]) -> Result<Vec<Job>, FetchError> {
        let mut tasks = JoinSet::new();
        for (index, &id) in ids.iter().enumerate() {
            let client = self.clone();
            tasks.spawn(async move { (index, client.fetch_job(id).await) });
        }

        let mut jobs: Vec<Option<Job>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) =
                joined.map_err(|e| FetchError::msg(format!("job fetch task failed: {e}")))?;
            jobs[index] = Some(result?);
        }

        Ok(jobs.into_iter().flatten().collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl Default for HnClient {
    fn default() -> Self {
        Self::new()
    }
}
