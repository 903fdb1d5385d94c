use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use redate_shared::errors::{AppError, AppResult, ErrorCode};
use redate_shared::types::auth::AuthUser;
use redate_shared::types::{ApiResponse, Page, PageParams};

use crate::events::publisher;
use crate::models::{Match, NewReport, Report, User};
use crate::schema::{matches, reports, users};
use crate::services::{feed_service, match_service};
use crate::AppState;

// --- GET /matches ---

#[derive(Debug, Deserialize)]
pub struct MatchListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub recent_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MatchPreview {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub matched_user_id: Uuid,
    pub name: Option<String>,
    pub photos: serde_json::Value,
    pub tier: String,
    pub age: Option<i32>,
}

pub async fn list(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchListParams>,
) -> AppResult<Json<ApiResponse<Page<MatchPreview>>>> {
    let page = PageParams {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(20),
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let cutoff = params.recent_only.then(|| Utc::now() - Duration::days(30));

    let mut query = matches::table
        .filter(matches::is_unmatched.eq(false))
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .into_boxed();

    let mut count_query = matches::table
        .filter(matches::is_unmatched.eq(false))
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .select(count_star())
        .into_boxed();

    if let Some(cutoff) = cutoff {
        query = query.filter(matches::created_at.ge(cutoff));
        count_query = count_query.filter(matches::created_at.ge(cutoff));
    }

    let total: i64 = count_query.first(&mut conn)?;

    let rows: Vec<Match> = query
        .order(matches::created_at.desc())
        .limit(page.limit())
        .offset(page.offset())
        .load::<Match>(&mut conn)?;

    let partner_ids: Vec<Uuid> = rows.iter().map(|m| m.partner_of(user.id)).collect();
    let partners: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&partner_ids))
        .load::<User>(&mut conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let today = state.calendar.local_date(Utc::now());
    let items = rows
        .into_iter()
        .filter_map(|m| {
            let partner_id = m.partner_of(user.id);
            let partner = partners.get(&partner_id)?;
            Some(MatchPreview {
                id: m.id,
                created_at: m.created_at,
                matched_user_id: partner_id,
                name: partner.name.clone(),
                photos: partner.photos.clone(),
                tier: partner.tier.clone(),
                age: partner.birth_date.map(|b| feed_service::age_on(b, today)),
            })
        })
        .collect();

    Ok(Json(ApiResponse::ok(Page::new(items, &page).with_total(total))))
}

// --- GET /matches/count ---

#[derive(Debug, Serialize)]
pub struct MatchCountResponse {
    pub total_matches: i64,
    pub recent_matches: i64,
}

pub async fn count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MatchCountResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = matches::table
        .filter(matches::is_unmatched.eq(false))
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .count()
        .get_result(&mut conn)?;

    let recent: i64 = matches::table
        .filter(matches::is_unmatched.eq(false))
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .filter(matches::created_at.ge(Utc::now() - Duration::days(7)))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(MatchCountResponse {
        total_matches: total,
        recent_matches: recent,
    })))
}

// --- GET /matches/:match_id ---

#[derive(Debug, Serialize)]
pub struct MatchDetail {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub matched_user_id: Uuid,
    pub name: Option<String>,
    pub photos: serde_json::Value,
    pub bio: Option<String>,
    pub tier: String,
    pub verified: bool,
    pub age: Option<i32>,
}

pub async fn detail(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MatchDetail>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let matched = find_active_member_match(&mut conn, match_id, user.id)?;
    let partner_id = matched.partner_of(user.id);

    let partner = users::table
        .find(partner_id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "matched user not found"))?;

    let today = state.calendar.local_date(Utc::now());
    Ok(Json(ApiResponse::ok(MatchDetail {
        id: matched.id,
        created_at: matched.created_at,
        matched_user_id: partner_id,
        name: partner.name,
        photos: partner.photos,
        bio: partner.bio,
        tier: partner.tier,
        verified: partner.verified,
        age: partner.birth_date.map(|b| feed_service::age_on(b, today)),
    })))
}

// --- DELETE /matches/:match_id ---

#[derive(Debug, Serialize)]
pub struct UnmatchResponse {
    pub unmatched: bool,
}

pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UnmatchResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let matched = find_active_member_match(&mut conn, match_id, user.id)?;

    let closed = match_service::close(&mut conn, matched.id)?;

    publisher::publish_match_unmatched(&state.rabbitmq, &closed, user.id).await;

    Ok(Json(ApiResponse::ok_with_message(
        UnmatchResponse { unmatched: true },
        "match closed",
    )))
}

// --- POST /matches/:match_id/report ---

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reason: Option<String>,
    pub description: Option<String>,
}

pub async fn report(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<ReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let reason = req
        .reason
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::ReasonRequired, "reason required"))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Reports stay valid after an unmatch, so no active-only filter here.
    let matched = matches::table
        .find(match_id)
        .first::<Match>(&mut conn)
        .optional()?
        .filter(|m| m.involves(user.id))
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    let new_report = NewReport {
        reporter_id: user.id,
        reported_id: matched.partner_of(user.id),
        match_id: matched.id,
        reason,
        description: req.description,
    };

    let report: Report = diesel::insert_into(reports::table)
        .values(&new_report)
        .get_result(&mut conn)?;

    publisher::publish_match_reported(&state.rabbitmq, &report).await;

    Ok(Json(ApiResponse::ok(report)))
}

/// A match is only visible to its two members; outsiders get the same
/// not-found as a nonexistent id.
fn find_active_member_match(
    conn: &mut PgConnection,
    match_id: Uuid,
    user_id: Uuid,
) -> AppResult<Match> {
    matches::table
        .find(match_id)
        .filter(matches::is_unmatched.eq(false))
        .first::<Match>(conn)
        .optional()?
        .filter(|m| m.involves(user_id))
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
}
