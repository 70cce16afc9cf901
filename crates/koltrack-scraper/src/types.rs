//! Scrape provider request/response types.
//!
//! ## Observed response shape
//!
//! The provider returns a flat JSON array of records, one per scraped post.
//! Every field is optional in practice:
//! - `url` — the canonical post URL; sometimes absent, in which case
//!   `shortCode` (the final path segment of the URL) is the only source
//!   identifier.
//! - `likesCount` / `commentsCount` — engagement counts; absent for media
//!   types the scraper cannot read. Treated as zero downstream.
//! - `timestamp` — the post's original publication time, RFC 3339 UTC.
//! - `error` — `"not_found"` when the target could not be resolved; such
//!   records carry no counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-record marker value the provider uses for unresolvable targets.
pub const NOT_FOUND_MARKER: &str = "not_found";

/// Input document for one scrape run.
///
/// Field names are the provider's, not ours: `username` carries full post
/// URLs, and `resultsLimit` caps the number of records returned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeInput<'a> {
    pub username: &'a [String],
    pub results_limit: usize,
}

/// One record from a scrape run's dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPost {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub short_code: Option<String>,
    #[serde(default)]
    pub likes_count: Option<u64>,
    #[serde(default)]
    pub comments_count: Option<u64>,
    /// Original publication time of the scraped content.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScrapedPost {
    /// `true` when the provider flagged this target as unresolvable.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.error.as_deref() == Some(NOT_FOUND_MARKER)
    }
}
