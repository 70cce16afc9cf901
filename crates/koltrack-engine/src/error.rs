use thiserror::Error;

/// Errors returned by the refresh engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The post id does not exist in the registry.
    #[error("post {0} not found")]
    PostNotFound(i64),

    /// The provider reported the post's URL as unresolvable, or returned no
    /// record for it. Raised by single-post refresh only; batch refresh
    /// silently skips unmatched posts instead.
    #[error("provider could not resolve post: {url}")]
    ProviderNotFound { url: String },

    #[error(transparent)]
    Db(#[from] koltrack_db::DbError),

    #[error(transparent)]
    Scrape(#[from] koltrack_scraper::ScrapeError),

    /// The refresh queue worker has shut down.
    #[error("refresh queue is closed")]
    QueueClosed,
}
