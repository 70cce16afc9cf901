//! Handlers for `/settings/tokens` — the token conversion ratios.

use axum::{extract::State, response::IntoResponse, Json};
use koltrack_core::TokenSettings;

use super::{map_db_error, ApiError, AppState};

/// `GET /settings/tokens` — the current conversion ratios.
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let settings = koltrack_db::get_token_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(settings))
}

/// `PUT /settings/tokens` — overwrite the conversion ratios.
///
/// Both ratios must be strictly positive; the scoring function divides by
/// them unchecked.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<TokenSettings>,
) -> Result<impl IntoResponse, ApiError> {
    if !body.is_valid() {
        return Err(ApiError::bad_request(
            "conversion ratios must be strictly positive",
        ));
    }

    let stored = koltrack_db::update_token_settings(&state.pool, body)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(stored))
}
