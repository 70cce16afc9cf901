//! Handlers for `/posts` and the refresh endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveTime, Utc};
use koltrack_core::ObservationLog;
use koltrack_db::PostRow;
use serde::Deserialize;

use super::{map_db_error, map_engine_error, ApiError, AppState, PostBody};

#[derive(Debug, Deserialize)]
pub struct CreatePostsBody {
    pub posts: Vec<NewPost>,
}

#[derive(Debug, Deserialize)]
pub struct NewPost {
    pub url: String,
    pub kol_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostBody {
    /// Full replacement observation list; bare arrays and the versioned
    /// wrapper are both accepted.
    pub counts: ObservationLog,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
}

/// `GET /posts` — all tracked posts joined with the owning KOL's name.
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = koltrack_db::list_posts_with_kol(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let posts: Vec<PostBody> = rows.into_iter().map(PostBody::from).collect();
    Ok(Json(posts))
}

/// `POST /posts` — track a batch of new posts, then run one scrape across
/// their URLs and merge the results.
///
/// The created rows are kept even when the scrape call fails afterwards;
/// there is no rollback.
pub async fn create_posts(
    State(state): State<AppState>,
    Json(body): Json<CreatePostsBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.posts.is_empty() {
        return Err(ApiError::bad_request("posts must not be empty"));
    }
    for entry in &body.posts {
        if entry.url.trim().is_empty() {
            return Err(ApiError::bad_request("url must not be empty"));
        }
    }

    // The request day, recorded at midnight; refresh overwrites this with
    // the provider's canonical timestamp once one is seen.
    let today = Utc::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();

    let mut created = Vec::with_capacity(body.posts.len());
    for entry in &body.posts {
        let row = koltrack_db::create_post(
            &state.pool,
            entry.url.trim(),
            entry.kol_id,
            Some(today),
            &ObservationLog::new(),
        )
        .await
        .map_err(|e| map_db_error(&e))?;
        created.push(row);
    }

    let refreshed = koltrack_engine::refresh_posts(&state.pool, &state.scraper, &created)
        .await
        .map_err(|e| map_engine_error(&e))?;

    // Swap in the refreshed version of each matched post; unmatched ones
    // are returned as created, with an empty log.
    let mut by_id: HashMap<i64, PostRow> =
        refreshed.into_iter().map(|row| (row.id, row)).collect();
    let merged: Vec<PostRow> = created
        .into_iter()
        .map(|row| by_id.remove(&row.id).unwrap_or(row))
        .collect();

    let mut bodies = Vec::with_capacity(merged.len());
    for row in merged {
        let kol_name = kol_name_for(&state, row.kol_id).await?;
        let mut body = PostBody::from(row);
        body.kol_name = Some(kol_name);
        bodies.push(body);
    }

    Ok((StatusCode::CREATED, Json(bodies)))
}

/// `GET /posts/{id}` — a single tracked post.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = koltrack_db::get_post(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(PostBody::from(row)))
}

/// `PUT /posts/{id}` — overwrite the full observation list, and the
/// creation date when one is supplied.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePostBody>,
) -> Result<impl IntoResponse, ApiError> {
    let row = koltrack_db::update_post(&state.pool, id, &body.counts, body.creation_date)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(PostBody::from(row)))
}

/// `DELETE /posts/{id}` — remove the post and its observation history.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = koltrack_db::delete_post(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Post not found"))
    }
}

/// `GET /posts/{id}/fetch` — single-post refresh, serialized through the
/// process-wide FIFO queue.
pub async fn fetch_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .refresh_queue
        .refresh(id)
        .await
        .map_err(|e| map_engine_error(&e))?;

    Ok(Json(PostBody::from(row)))
}

/// `POST /posts/fetch-all/fetch` — batch refresh across every tracked
/// post. Unmatched posts are silently left unchanged; this endpoint does
/// not go through the refresh queue.
pub async fn fetch_all_posts(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = koltrack_engine::refresh_all(&state.pool, &state.scraper)
        .await
        .map_err(|e| map_engine_error(&e))?;

    let posts: Vec<PostBody> = rows.into_iter().map(PostBody::from).collect();
    Ok(Json(posts))
}

async fn kol_name_for(state: &AppState, kol_id: i64) -> Result<String, ApiError> {
    let kol = koltrack_db::get_kol(&state.pool, kol_id)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(kol.map_or_else(
        || koltrack_db::posts::UNKNOWN_KOL.to_string(),
        |k| k.name,
    ))
}
