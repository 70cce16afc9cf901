//! Database operations for the single-row `token_settings` table.

use koltrack_core::TokenSettings;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct TokenSettingsRow {
    likes_per_token: i64,
    views_per_token: i64,
}

impl From<TokenSettingsRow> for TokenSettings {
    fn from(row: TokenSettingsRow) -> Self {
        // Ratios leaving this module are always >= 1; `tokens()` divides by
        // them unchecked.
        Self {
            likes_per_token: u64::try_from(row.likes_per_token.max(1)).unwrap_or(1),
            views_per_token: u64::try_from(row.views_per_token.max(1)).unwrap_or(1),
        }
    }
}

/// Returns the current token conversion settings.
///
/// Falls back to [`TokenSettings::default`] when the settings row is
/// absent (a fresh database before the seed migration ran).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_token_settings(pool: &PgPool) -> Result<TokenSettings, DbError> {
    let row = sqlx::query_as::<_, TokenSettingsRow>(
        "SELECT likes_per_token, views_per_token FROM token_settings WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(TokenSettings::from).unwrap_or_default())
}

/// Overwrites the token conversion settings and returns the stored values.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn update_token_settings(
    pool: &PgPool,
    settings: TokenSettings,
) -> Result<TokenSettings, DbError> {
    let row = sqlx::query_as::<_, TokenSettingsRow>(
        "INSERT INTO token_settings (id, likes_per_token, views_per_token) \
         VALUES (1, $1, $2) \
         ON CONFLICT (id) DO UPDATE SET \
             likes_per_token = EXCLUDED.likes_per_token, \
             views_per_token = EXCLUDED.views_per_token, \
             updated_at = NOW() \
         RETURNING likes_per_token, views_per_token",
    )
    .bind(i64::try_from(settings.likes_per_token).unwrap_or(i64::MAX))
    .bind(i64::try_from(settings.views_per_token).unwrap_or(i64::MAX))
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}
