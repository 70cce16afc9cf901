//! Handlers for `/analytics/summary` — aggregate engagement totals.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub totals: EngagementTotals,
    pub kols: Vec<KolPerformance>,
}

/// Sums over the newest observation of every tracked post. Posts with an
/// empty log contribute zero — they are counted, not excluded.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct EngagementTotals {
    pub likes: u64,
    pub views: u64,
    pub tokens: u64,
}

#[derive(Debug, Serialize)]
pub struct KolPerformance {
    pub kol_id: i64,
    pub kol_name: String,
    pub total_likes: u64,
    pub total_views: u64,
    pub total_tokens: u64,
}

/// `GET /analytics/summary` — overall totals plus a per-KOL breakdown,
/// scored under the current token settings.
///
/// The breakdown covers registered KOLs only; posts whose owner has been
/// deleted still count toward the overall totals.
pub async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let settings = koltrack_db::get_token_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;
    let posts = koltrack_db::list_posts(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;
    let kols = koltrack_db::list_kols(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let mut totals = EngagementTotals::default();
    for post in &posts {
        let latest = post.counts.latest();
        totals.likes += latest.likes;
        totals.views += latest.views;
        // Tokens floor per post, then sum — not a floor over the summed
        // counts.
        totals.tokens += settings.tokens_for(latest);
    }

    let breakdown = kols
        .into_iter()
        .map(|kol| {
            let mut perf = KolPerformance {
                kol_id: kol.id,
                kol_name: kol.name,
                total_likes: 0,
                total_views: 0,
                total_tokens: 0,
            };
            for post in posts.iter().filter(|p| p.kol_id == kol.id) {
                let latest = post.counts.latest();
                perf.total_likes += latest.likes;
                perf.total_views += latest.views;
                perf.total_tokens += settings.tokens_for(latest);
            }
            perf
        })
        .collect();

    Ok(Json(AnalyticsSummary {
        totals,
        kols: breakdown,
    }))
}
