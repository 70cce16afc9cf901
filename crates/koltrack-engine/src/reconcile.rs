//! Matching scraped records back to tracked posts.
//!
//! The post URL is the only join key. A record matches a post when its
//! `url` equals the post's URL exactly, or — when no record does — when
//! its `shortCode` equals the final path segment of the post's URL. The
//! first matching record in provider order wins, and at most one record is
//! applied per post per refresh.

use chrono::{DateTime, FixedOffset};
use koltrack_core::Observation;
use koltrack_scraper::ScrapedPost;

/// The final non-empty path segment of a URL, with any query string or
/// fragment stripped.
///
/// `short_code("https://www.instagram.com/p/AbCdEf/")` is `"AbCdEf"`.
/// A URL with no path yields its host; an empty string yields `None`.
#[must_use]
pub fn short_code(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.split('/').rev().find(|segment| !segment.is_empty())
}

/// Finds the record to apply to a post, if any.
///
/// Exact-URL equality is tried across the whole batch before the
/// short-code fallback, so an exact match later in the batch beats a
/// short-code match earlier in it. Records the provider flagged as
/// `not_found` never match.
#[must_use]
pub fn match_scraped<'a>(post_url: &str, records: &'a [ScrapedPost]) -> Option<&'a ScrapedPost> {
    let exact = records
        .iter()
        .find(|r| !r.is_not_found() && r.url.as_deref() == Some(post_url));
    if exact.is_some() {
        return exact;
    }

    let code = short_code(post_url)?;
    records
        .iter()
        .find(|r| !r.is_not_found() && r.short_code.as_deref() == Some(code))
}

/// Builds the observation recorded for a matched record.
///
/// `now` is the refresh wall-clock time in the fixed Hong Kong offset —
/// not the record's own timestamp, which (when present) instead feeds the
/// post's creation date. Absent counts are recorded as zero.
#[must_use]
pub fn observation_from(record: &ScrapedPost, now: DateTime<FixedOffset>) -> Observation {
    Observation {
        date: now,
        likes: record.likes_count.unwrap_or(0),
        // The provider reports a comment count; it feeds the views metric.
        views: record.comments_count.unwrap_or(0),
    }
}
