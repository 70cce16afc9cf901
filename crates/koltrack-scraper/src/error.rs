use thiserror::Error;

/// Errors returned by the scrape provider client.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// the fixed request timeout expiring. The remote scrape job may keep
    /// running after a local timeout; no cancellation is propagated.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("scrape provider returned status {status} for {context}")]
    UnexpectedStatus { context: String, status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL does not parse.
    #[error("invalid scrape provider base URL '{0}'")]
    InvalidBaseUrl(String),
}
