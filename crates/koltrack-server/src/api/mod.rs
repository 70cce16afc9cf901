mod analytics;
mod kols;
mod posts;
mod settings;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use koltrack_core::Observation;
use koltrack_db::{PostRow, PostWithKolRow};
use koltrack_engine::RefreshQueue;
use koltrack_scraper::ScrapeClient;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub scraper: Arc<ScrapeClient>,
    pub refresh_queue: RefreshQueue,
}

/// Error body returned by every failing handler:
/// `{"error": "<generic message>", "details": "<underlying error text>"}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(error: &koltrack_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::internal("Internal server error", error.to_string())
}

pub(super) fn map_engine_error(error: &koltrack_engine::EngineError) -> ApiError {
    use koltrack_engine::EngineError;

    match error {
        EngineError::PostNotFound(_) => ApiError::not_found("Post not found"),
        EngineError::ProviderNotFound { .. } => {
            ApiError::not_found("Post not found on the provider")
        }
        EngineError::Db(e) => map_db_error(e),
        EngineError::Scrape(_) | EngineError::QueueClosed => {
            tracing::error!(error = %error, "refresh failed");
            ApiError::internal("Error fetching post update", error.to_string())
        }
    }
}

/// A tracked post on the wire: `counts` is the parsed observation array,
/// `kol_name` is present where the endpoint joins the owner.
#[derive(Debug, Serialize)]
pub struct PostBody {
    pub id: i64,
    pub url: String,
    pub kol_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kol_name: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub counts: Vec<Observation>,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for PostBody {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            kol_id: row.kol_id,
            kol_name: None,
            creation_date: row.creation_date,
            counts: row.counts.0.all().to_vec(),
            created_at: row.created_at,
        }
    }
}

impl From<PostWithKolRow> for PostBody {
    fn from(row: PostWithKolRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            kol_id: row.kol_id,
            kol_name: Some(row.kol_name),
            creation_date: row.creation_date,
            counts: row.counts.0.all().to_vec(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/posts", get(posts::list_posts).post(posts::create_posts))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/fetch", get(posts::fetch_post))
        .route("/posts/fetch-all/fetch", post(posts::fetch_all_posts))
        .route("/kols", get(kols::list_kols).post(kols::create_kol))
        .route(
            "/kols/{id}",
            get(kols::get_kol)
                .put(kols::update_kol)
                .delete(kols::delete_kol),
        )
        .route(
            "/settings/tokens",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/analytics/summary", get(analytics::summary))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match koltrack_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
