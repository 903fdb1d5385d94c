use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use redate_shared::errors::{AppError, AppResult, ErrorCode};
use redate_shared::types::auth::AuthUser;
use redate_shared::types::{ApiResponse, Page, PageParams};

use crate::geo;
use crate::models::{User, UserPreference};
use crate::schema::{user_preferences, users};
use crate::services::feed_service::{self, CandidateProfile};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub distance: Option<f64>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /users/nearby - the discovery feed.
///
/// Page 1 is served from the per-user Redis cache when present; swipes,
/// undos, and preference or location updates delete the key. Ordering is
/// random per query, so a candidate can reappear or be skipped between
/// pages.
pub async fn nearby(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> AppResult<Json<ApiResponse<Page<CandidateProfile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let viewer = users::table
        .find(user.id)
        .filter(users::deleted_at.is_null())
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let (lat, lng) = match (viewer.location_lat, viewer.location_lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(AppError::new(ErrorCode::LocationRequired, "location not set")),
    };

    let page = PageParams {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(20),
    };

    let cache_key = feed_service::cache_key(user.id);
    if page.page <= 1 {
        match state.redis.get(&cache_key).await {
            Ok(Some(cached)) => {
                if let Ok(items) = serde_json::from_str::<Vec<CandidateProfile>>(&cached) {
                    tracing::debug!(user_id = %user.id, "feed served from cache");
                    return Ok(Json(ApiResponse::ok(Page::new(items, &page))));
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "feed cache read failed"),
        }
    }

    let prefs: Option<UserPreference> = user_preferences::table
        .find(user.id)
        .first::<UserPreference>(&mut conn)
        .optional()?;

    let filters =
        feed_service::effective_filters(prefs.as_ref(), params.distance, params.min_age, params.max_age);

    let bbox = geo::bounding_box(lat, lng, filters.max_distance_km);
    let today = state.calendar.local_date(Utc::now());
    let birth_window = feed_service::birth_date_window(today, filters.min_age, filters.max_age);

    let candidates = feed_service::candidates(
        &mut conn,
        user.id,
        &bbox,
        birth_window,
        page.limit(),
        page.offset(),
    )?;

    let items = feed_service::annotate(lat, lng, candidates, filters.max_distance_km, today);

    if page.page <= 1 {
        match serde_json::to_string(&items) {
            Ok(json) => {
                if let Err(e) = state
                    .redis
                    .set(&cache_key, &json, state.config.feed_cache_ttl_secs)
                    .await
                {
                    tracing::warn!(error = %e, "feed cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "feed cache serialization failed"),
        }
    }

    Ok(Json(ApiResponse::ok(Page::new(items, &page))))
}
