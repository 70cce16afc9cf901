//! Single-post and batch refresh against the scrape provider.

use koltrack_core::now_hong_kong;
use koltrack_db::PostRow;
use koltrack_scraper::{ScrapeClient, ScrapedPost};
use sqlx::PgPool;

use crate::error::EngineError;
use crate::reconcile::{match_scraped, observation_from};

/// Refreshes every tracked post from one provider call.
///
/// Loads all posts, runs a single scrape across their URLs, and applies at
/// most one new observation per matched post. Posts with no matching
/// record are left completely unchanged — an unmatched post is not an
/// error. Each matched post is persisted with its own statement; a failure
/// partway through propagates after earlier writes have been applied (no
/// rollback, no retry).
///
/// Returns the refreshed rows, in registry order.
///
/// # Errors
///
/// Returns [`EngineError::Db`] on store failure or [`EngineError::Scrape`]
/// if the provider call fails.
pub async fn refresh_all(pool: &PgPool, client: &ScrapeClient) -> Result<Vec<PostRow>, EngineError> {
    let posts = koltrack_db::list_posts(pool).await?;
    if posts.is_empty() {
        tracing::info!("no tracked posts; skipping refresh");
        return Ok(Vec::new());
    }

    let refreshed = refresh_posts(pool, client, &posts).await?;
    tracing::info!(
        tracked = posts.len(),
        refreshed = refreshed.len(),
        "batch refresh complete"
    );
    Ok(refreshed)
}

/// Refreshes a given set of posts from one provider call across their URLs.
///
/// Same matching and persistence rules as [`refresh_all`]; used directly
/// when the caller already holds the posts of interest (e.g. a batch of
/// freshly created ones).
///
/// # Errors
///
/// Returns [`EngineError::Db`] on store failure or [`EngineError::Scrape`]
/// if the provider call fails.
pub async fn refresh_posts(
    pool: &PgPool,
    client: &ScrapeClient,
    posts: &[PostRow],
) -> Result<Vec<PostRow>, EngineError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let urls: Vec<String> = posts.iter().map(|p| p.url.clone()).collect();
    let records = client.fetch_posts(&urls, urls.len()).await?;

    let now = now_hong_kong();
    let mut refreshed = Vec::with_capacity(posts.len());
    for post in posts {
        let Some(record) = match_scraped(&post.url, &records) else {
            tracing::debug!(post_id = post.id, "no scrape record matched; post unchanged");
            continue;
        };
        refreshed.push(apply_record(pool, post, record, now).await?);
    }

    Ok(refreshed)
}

/// Refreshes one post from a dedicated provider call.
///
/// Unlike [`refresh_all`], a missing or `not_found` provider record is an
/// explicit [`EngineError::ProviderNotFound`]; the post's observation list
/// is left unchanged in that case.
///
/// # Errors
///
/// - [`EngineError::PostNotFound`] when the id is not in the registry.
/// - [`EngineError::ProviderNotFound`] when the provider cannot resolve
///   the post's URL.
/// - [`EngineError::Db`] / [`EngineError::Scrape`] on store or provider
///   failure.
pub async fn refresh_one(
    pool: &PgPool,
    client: &ScrapeClient,
    post_id: i64,
) -> Result<PostRow, EngineError> {
    let post = koltrack_db::get_post(pool, post_id)
        .await?
        .ok_or(EngineError::PostNotFound(post_id))?;

    let records = client.fetch_posts(std::slice::from_ref(&post.url), 1).await?;
    let record = match records.first() {
        Some(r) if !r.is_not_found() => r,
        _ => {
            return Err(EngineError::ProviderNotFound {
                url: post.url.clone(),
            })
        }
    };

    apply_record(pool, &post, record, now_hong_kong()).await
}

/// Appends one observation built from `record` to the post's full log and
/// writes the whole log back, coalescing the creation date with the
/// record's timestamp.
async fn apply_record(
    pool: &PgPool,
    post: &PostRow,
    record: &ScrapedPost,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<PostRow, EngineError> {
    let mut log = post.counts.0.clone();
    log.append(observation_from(record, now));

    // The row can disappear between the read and this write (concurrent
    // delete); surface that as the post being gone.
    koltrack_db::update_post(pool, post.id, &log, record.timestamp)
        .await?
        .ok_or(EngineError::PostNotFound(post.id))
}
