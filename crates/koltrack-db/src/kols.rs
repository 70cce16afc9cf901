//! Database operations for the `kols` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `kols` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KolRow {
    pub id: i64,
    pub name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Returns all registered KOLs, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_kols(pool: &PgPool) -> Result<Vec<KolRow>, DbError> {
    let rows = sqlx::query_as::<_, KolRow>(
        "SELECT id, name, avatar, created_at FROM kols ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single KOL by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_kol(pool: &PgPool, id: i64) -> Result<Option<KolRow>, DbError> {
    let row = sqlx::query_as::<_, KolRow>(
        "SELECT id, name, avatar, created_at FROM kols WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Creates a new KOL row and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_kol(pool: &PgPool, name: &str, avatar: &str) -> Result<KolRow, DbError> {
    let row = sqlx::query_as::<_, KolRow>(
        "INSERT INTO kols (name, avatar) VALUES ($1, $2) \
         RETURNING id, name, avatar, created_at",
    )
    .bind(name)
    .bind(avatar)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites a KOL's name and avatar, returning the updated row or `None`
/// if the id does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_kol(
    pool: &PgPool,
    id: i64,
    name: &str,
    avatar: &str,
) -> Result<Option<KolRow>, DbError> {
    let row = sqlx::query_as::<_, KolRow>(
        "UPDATE kols SET name = $1, avatar = $2 WHERE id = $3 \
         RETURNING id, name, avatar, created_at",
    )
    .bind(name)
    .bind(avatar)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a KOL row. Returns `true` when a row was removed.
///
/// Posts referencing the deleted KOL are left untouched; there is no
/// cascade and no foreign key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_kol(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM kols WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
