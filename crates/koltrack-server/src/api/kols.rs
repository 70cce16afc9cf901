//! Handlers for `/kols` — the KOL roster.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct KolBody {
    pub id: i64,
    pub name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl From<koltrack_db::KolRow> for KolBody {
    fn from(row: koltrack_db::KolRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            avatar: row.avatar,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct KolPayload {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Placeholder avatar for KOLs registered without one, seeded by name so
/// the same KOL always renders the same face.
fn default_avatar(name: &str) -> String {
    format!(
        "https://api.dicebear.com/6.x/avataaars/svg?seed={}",
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

fn resolve_avatar(name: &str, avatar: Option<String>) -> String {
    match avatar {
        Some(a) if !a.trim().is_empty() => a,
        _ => default_avatar(name),
    }
}

/// `GET /kols` — the full roster.
pub async fn list_kols(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = koltrack_db::list_kols(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let kols: Vec<KolBody> = rows.into_iter().map(KolBody::from).collect();
    Ok(Json(kols))
}

/// `POST /kols` — register a KOL.
pub async fn create_kol(
    State(state): State<AppState>,
    Json(body): Json<KolPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("KOL name cannot be empty"));
    }

    let avatar = resolve_avatar(name, body.avatar);
    let row = koltrack_db::create_kol(&state.pool, name, &avatar)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok((StatusCode::CREATED, Json(KolBody::from(row))))
}

/// `GET /kols/{id}` — a single KOL.
pub async fn get_kol(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = koltrack_db::get_kol(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("KOL not found"))?;

    Ok(Json(KolBody::from(row)))
}

/// `PUT /kols/{id}` — overwrite name and avatar.
pub async fn update_kol(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<KolPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("KOL name cannot be empty"));
    }

    let avatar = resolve_avatar(name, body.avatar);
    let row = koltrack_db::update_kol(&state.pool, id, name, &avatar)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("KOL not found"))?;

    Ok(Json(KolBody::from(row)))
}

/// `DELETE /kols/{id}` — remove the KOL.
///
/// Posts owned by the deleted KOL are deliberately left in place; their
/// `kol_id` dangles and list endpoints render the owner as "Unknown KOL".
pub async fn delete_kol(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = koltrack_db::delete_kol(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("KOL not found"))
    }
}
