//! HTTP client for the external scrape provider.
//!
//! Wraps `reqwest` with provider-specific error handling, token management,
//! and typed response deserialization. A scrape run is one synchronous HTTP
//! call: the provider blocks until the remote job completes and answers
//! with the job's dataset as a JSON array.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScrapeError;
use crate::types::{ScrapeInput, ScrapedPost};

const DEFAULT_BASE_URL: &str = "https://api.apify.com/";

/// Client for the scrape provider's run-synchronously endpoint.
///
/// Manages the HTTP client, API token, actor name, and base URL. Use
/// [`ScrapeClient::new`] for production or [`ScrapeClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ScrapeClient {
    client: Client,
    token: String,
    actor: String,
    base_url: Url,
}

impl ScrapeClient {
    /// Creates a new client pointed at the production provider API.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, actor: &str, timeout_secs: u64) -> Result<Self, ScrapeError> {
        Self::with_base_url(token, actor, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScrapeError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        actor: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("koltrack/0.1 (engagement-tracking)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so path
        // construction works from the root.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| ScrapeError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            token: token.to_owned(),
            actor: actor.to_owned(),
            base_url,
        })
    }

    /// Runs one scrape across `urls` and returns the dataset records in
    /// provider order.
    ///
    /// The call blocks until the remote job completes or the client's fixed
    /// timeout expires; on expiry the call fails and is not retried (the
    /// remote job may keep running — no cancellation is sent).
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Http`] on network failure or timeout.
    /// - [`ScrapeError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScrapeError::Deserialize`] if the body is not a JSON array of
    ///   records.
    pub async fn fetch_posts(
        &self,
        urls: &[String],
        results_limit: usize,
    ) -> Result<Vec<ScrapedPost>, ScrapeError> {
        // Context string for errors and logs; never include the request URL
        // itself, which carries the token.
        let context = format!("run-sync({})", self.actor);
        let input = ScrapeInput {
            username: urls,
            results_limit,
        };

        tracing::debug!(actor = %self.actor, urls = urls.len(), "starting scrape run");

        let response = self
            .client
            .post(self.run_sync_url())
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                context,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let records: Vec<ScrapedPost> =
            serde_json::from_str(&body).map_err(|e| ScrapeError::Deserialize {
                context,
                source: e,
            })?;

        tracing::debug!(actor = %self.actor, records = records.len(), "scrape run complete");
        Ok(records)
    }

    /// Builds the run-synchronously endpoint URL with the token appended as
    /// a query parameter.
    fn run_sync_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!(
            "v2/acts/{}/run-sync-get-dataset-items",
            self.actor
        ));
        url.query_pairs_mut().append_pair("token", &self.token);
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
