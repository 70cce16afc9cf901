//! Database operations for the `posts` table.
//!
//! The `counts` column holds the full serialized observation log. Every
//! write replaces the whole column — there are no delta updates, so
//! concurrent writers to the same post resolve as last-writer-wins.

use chrono::{DateTime, Utc};
use koltrack_core::ObservationLog;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// Rendered owner name for posts whose `kol_id` no longer resolves.
pub const UNKNOWN_KOL: &str = "Unknown KOL";

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub url: String,
    pub kol_id: i64,
    /// Canonical creation time of the tracked content. Set to the request
    /// day on tracking; overwritten by the provider's timestamp during
    /// refresh when the provider reports one.
    pub creation_date: Option<DateTime<Utc>>,
    pub counts: Json<ObservationLog>,
    pub created_at: DateTime<Utc>,
}

/// A post joined with its owning KOL's display name.
///
/// `kol_name` is [`UNKNOWN_KOL`] when the referenced KOL has been deleted;
/// the dangling reference itself is preserved.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithKolRow {
    pub id: i64,
    pub url: String,
    pub kol_id: i64,
    pub creation_date: Option<DateTime<Utc>>,
    pub counts: Json<ObservationLog>,
    pub created_at: DateTime<Utc>,
    pub kol_name: String,
}

/// Returns all tracked posts, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts(pool: &PgPool) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT id, url, kol_id, creation_date, counts, created_at \
         FROM posts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all tracked posts joined with the owning KOL's name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_with_kol(pool: &PgPool) -> Result<Vec<PostWithKolRow>, DbError> {
    let rows = sqlx::query_as::<_, PostWithKolRow>(
        "SELECT posts.id, posts.url, posts.kol_id, posts.creation_date, posts.counts, \
                posts.created_at, COALESCE(kols.name, $1) AS kol_name \
         FROM posts \
         LEFT JOIN kols ON posts.kol_id = kols.id \
         ORDER BY posts.id",
    )
    .bind(UNKNOWN_KOL)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single post by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_post(pool: &PgPool, id: i64) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(
        "SELECT id, url, kol_id, creation_date, counts, created_at \
         FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new tracked post and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_post(
    pool: &PgPool,
    url: &str,
    kol_id: i64,
    creation_date: Option<DateTime<Utc>>,
    counts: &ObservationLog,
) -> Result<PostRow, DbError> {
    let row = sqlx::query_as::<_, PostRow>(
        "INSERT INTO posts (url, kol_id, creation_date, counts) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, url, kol_id, creation_date, counts, created_at",
    )
    .bind(url)
    .bind(kol_id)
    .bind(creation_date)
    .bind(Json(counts))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites a post's full observation log, and its creation date when a
/// new one is supplied (`NULL` keeps the stored value).
///
/// Returns the updated row, or `None` if the id does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_post(
    pool: &PgPool,
    id: i64,
    counts: &ObservationLog,
    creation_date: Option<DateTime<Utc>>,
) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(
        "UPDATE posts \
         SET counts = $1, creation_date = COALESCE($2, creation_date) \
         WHERE id = $3 \
         RETURNING id, url, kol_id, creation_date, counts, created_at",
    )
    .bind(Json(counts))
    .bind(creation_date)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a post (and with it, its observation history). Returns `true`
/// when a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_post(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
