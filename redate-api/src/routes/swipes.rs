use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use redate_shared::errors::{AppError, AppResult, ErrorCode};
use redate_shared::types::auth::AuthUser;
use redate_shared::types::{ApiResponse, NotificationTemplate, Page, PageParams};

use crate::events::publisher;
use crate::models::{Match, Swipe, SwipeAction, User};
use crate::schema::{swipes, users};
use crate::services::quota::{self, QuotaAction};
use crate::services::{feed_service, match_service, swipe_service};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub match_created: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<Match>,
}

// --- POST /swipes/:target_id/{like,dislike,superlike} ---

pub async fn like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    perform_swipe(&state, user.id, target_id, SwipeAction::Like).await
}

pub async fn dislike(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    perform_swipe(&state, user.id, target_id, SwipeAction::Dislike).await
}

pub async fn superlike(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    perform_swipe(&state, user.id, target_id, SwipeAction::SuperLike).await
}

/// Shared swipe path: quota check, ledger write, match resolution. The
/// ledger write and the match-resolution attempt commit together or not at
/// all; cache and notification side effects run after the commit and never
/// fail the request.
async fn perform_swipe(
    state: &Arc<AppState>,
    actor_id: Uuid,
    target_id: Uuid,
    action: SwipeAction,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    if actor_id == target_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "cannot swipe yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = users::table
        .find(actor_id)
        .filter(users::deleted_at.is_null())
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    users::table
        .find(target_id)
        .filter(users::deleted_at.is_null())
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "target user not found"))?;

    let quota_check = match action {
        SwipeAction::Like => Some((
            QuotaAction::Like,
            ErrorCode::LikeQuotaExceeded,
            "daily swipe limit reached, upgrade to keep swiping",
        )),
        SwipeAction::SuperLike => Some((
            QuotaAction::SuperLike,
            ErrorCode::SuperLikeQuotaExceeded,
            "daily super like limit reached",
        )),
        SwipeAction::Dislike => None,
    };

    if let Some((quota_action, code, message)) = quota_check {
        let window = state.calendar.day_window(Utc::now());
        let used = swipe_service::count_in_window(&mut conn, actor_id, action, window)?;
        if !quota::is_allowed(actor.tier(), quota_action, used) {
            return Err(AppError::new(code, message));
        }
    }

    if swipe_service::find_decision(&mut conn, actor_id, target_id)?.is_some() {
        return Err(AppError::new(ErrorCode::AlreadySwiped, "already swiped this user"));
    }

    let result = conn.transaction::<(Swipe, Option<(Match, bool)>), AppError, _>(|conn| {
        let swipe = swipe_service::record(conn, actor_id, target_id, action)?;
        let resolution = if action.is_positive() {
            match_service::resolve_mutual(conn, actor_id, target_id)?
        } else {
            None
        };
        Ok((swipe, resolution))
    });

    let (swipe, resolution) = match result {
        // Lost a race with a concurrent identical swipe; the ledger keeps
        // the first decision.
        Err(AppError::Database(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _,
        ))) => {
            return Err(AppError::new(ErrorCode::AlreadySwiped, "already swiped this user"));
        }
        other => other?,
    };

    tracing::debug!(
        swipe_id = %swipe.id,
        actor_id = %actor_id,
        target_id = %target_id,
        action = %action,
        matched = resolution.is_some(),
        "swipe recorded"
    );

    feed_service::invalidate_feed(&state.redis, actor_id).await;

    if let Some((matched, created)) = &resolution {
        if *created {
            feed_service::invalidate_feed(&state.redis, target_id).await;
            let template = if action == SwipeAction::SuperLike {
                NotificationTemplate::SuperLiked
            } else {
                NotificationTemplate::NewMatch
            };
            publisher::publish_match_created(&state.rabbitmq, matched, target_id, template).await;
        }
    }

    Ok(Json(ApiResponse::ok(SwipeResponse {
        match_created: resolution.is_some(),
        matched: resolution.map(|(m, _)| m),
    })))
}

// --- POST /swipes/undo ---

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub reverted: bool,
    pub match_removed: bool,
}

pub async fn undo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UndoResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = users::table
        .find(user.id)
        .filter(users::deleted_at.is_null())
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let window = state.calendar.day_window(Utc::now());
    let undos_today = swipe_service::count_undos_in_window(&mut conn, user.id, window)?;
    if !quota::is_allowed(actor.tier(), QuotaAction::Undo, undos_today) {
        return Err(AppError::new(ErrorCode::UndoQuotaExceeded, "daily undo limit reached"));
    }

    let last = swipe_service::latest(&mut conn, user.id)?
        .ok_or_else(|| AppError::new(ErrorCode::NothingToUndo, "no swipes to undo"))?;

    let closed = conn.transaction::<Option<Match>, AppError, _>(|conn| {
        let closed = match_service::close_active_between(conn, user.id, last.swiped_id)?;
        swipe_service::delete_by_id(conn, last.id)?;
        swipe_service::record_undo(conn, user.id)?;
        Ok(closed)
    })?;

    tracing::debug!(
        actor_id = %user.id,
        target_id = %last.swiped_id,
        match_removed = closed.is_some(),
        "swipe undone"
    );

    feed_service::invalidate_feed(&state.redis, user.id).await;
    publisher::publish_swipe_undone(&state.rabbitmq, user.id, last.swiped_id, closed.is_some())
        .await;

    Ok(Json(ApiResponse::ok(UndoResponse {
        reverted: true,
        match_removed: closed.is_some(),
    })))
}

// --- GET /swipes/history ---

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwipeHistoryEntry {
    pub id: Uuid,
    pub swiped_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
    pub photos: serde_json::Value,
    pub age: Option<i32>,
}

pub async fn history(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<ApiResponse<Page<SwipeHistoryEntry>>>> {
    let action = params
        .action
        .as_deref()
        .map(str::parse::<SwipeAction>)
        .transpose()
        .map_err(|e| AppError::new(ErrorCode::InvalidSwipeAction, e))?;

    let page = PageParams {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(20),
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = swipes::table
        .inner_join(users::table)
        .filter(swipes::swiper_id.eq(user.id))
        .into_boxed();

    if let Some(action) = action {
        query = query.filter(swipes::action.eq(action.to_string()));
    }

    let rows: Vec<(Swipe, User)> = query
        .order(swipes::created_at.desc())
        .limit(page.limit())
        .offset(page.offset())
        .load::<(Swipe, User)>(&mut conn)?;

    let today = state.calendar.local_date(Utc::now());
    let items = rows
        .into_iter()
        .map(|(swipe, target)| SwipeHistoryEntry {
            id: swipe.id,
            swiped_id: swipe.swiped_id,
            action: swipe.action,
            created_at: swipe.created_at,
            name: target.name,
            photos: target.photos,
            age: target.birth_date.map(|b| feed_service::age_on(b, today)),
        })
        .collect();

    Ok(Json(ApiResponse::ok(Page::new(items, &page))))
}
