use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use redate_shared::errors::{AppError, AppResult, ErrorCode};
use redate_shared::types::auth::AuthUser;
use redate_shared::types::ApiResponse;

use crate::models::{CompleteProfile, UpdateUserProfile, UpsertPreferences, User, UserPreference};
use crate::schema::{user_preferences, users};
use crate::services::feed_service;
use crate::AppState;

const MIN_AGE_YEARS: i32 = 18;

fn load_user(conn: &mut PgConnection, id: uuid::Uuid) -> AppResult<User> {
    users::table
        .find(id)
        .filter(users::deleted_at.is_null())
        .first::<User>(conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

// --- POST /users/profile ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub looking_for: String,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

pub async fn create_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let today = state.calendar.local_date(Utc::now());
    if feed_service::age_on(req.birth_date, today) < MIN_AGE_YEARS {
        return Err(AppError::new(ErrorCode::Underage, "must be 18 or older"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    load_user(&mut conn, user.id)?;

    let photos = serde_json::to_value(&req.photos).map_err(|e| AppError::internal(e.to_string()))?;

    let changes = CompleteProfile {
        name: req.name,
        birth_date: req.birth_date,
        gender: req.gender,
        looking_for: req.looking_for,
        bio: req.bio,
        photos,
    };

    let updated = diesel::update(users::table.find(user.id))
        .set((&changes, users::updated_at.eq(Utc::now())))
        .get_result::<User>(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- GET /users/me ---

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub age: Option<i32>,
    pub preferences: Option<UserPreference>,
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = load_user(&mut conn, user.id)?;

    let preferences: Option<UserPreference> = user_preferences::table
        .find(user.id)
        .first::<UserPreference>(&mut conn)
        .optional()?;

    let today = state.calendar.local_date(Utc::now());
    let age = profile.birth_date.map(|b| feed_service::age_on(b, today));

    Ok(Json(ApiResponse::ok(MeResponse {
        user: profile,
        age,
        preferences,
    })))
}

// --- PUT /users/profile ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateUserProfile>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    load_user(&mut conn, user.id)?;

    let updated = diesel::update(users::table.find(user.id))
        .set((&payload, users::updated_at.eq(Utc::now())))
        .get_result::<User>(&mut conn)?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- POST /users/photo ---

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub photo_url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    pub photos: serde_json::Value,
}

/// Photo binaries live in external object storage; this endpoint only
/// maintains the ordered url list, with the primary photo first.
pub async fn add_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPhotoRequest>,
) -> AppResult<Json<ApiResponse<PhotosResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = load_user(&mut conn, user.id)?;

    let mut photos = match profile.photos {
        serde_json::Value::Array(items) => items,
        _ => vec![],
    };

    let url = serde_json::Value::String(req.photo_url);
    if req.is_primary {
        photos.insert(0, url);
    } else {
        photos.push(url);
    }

    let photos = serde_json::Value::Array(photos);
    diesel::update(users::table.find(user.id))
        .set((users::photos.eq(&photos), users::updated_at.eq(Utc::now())))
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(PhotosResponse { photos })))
}

// --- POST /users/location ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct LocationUpdatedResponse {
    pub updated: bool,
}

pub async fn update_location(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateLocationRequest>,
) -> AppResult<Json<ApiResponse<LocationUpdatedResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(users::table.find(user.id).filter(users::deleted_at.is_null()))
        .set((
            users::location_lat.eq(req.latitude),
            users::location_lng.eq(req.longitude),
            users::location_last_seen.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    // The cached feed was computed for the old position.
    feed_service::invalidate_feed(&state.redis, user.id).await;

    Ok(Json(ApiResponse::ok(LocationUpdatedResponse { updated: true })))
}

// --- PUT /users/preferences ---

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub max_distance_km: Option<i32>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub looking_for_gender: Option<String>,
}

pub async fn set_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreferencesRequest>,
) -> AppResult<Json<ApiResponse<UserPreference>>> {
    let min_age = req.min_age.unwrap_or(feed_service::DEFAULT_MIN_AGE);
    let max_age = req.max_age.unwrap_or(feed_service::DEFAULT_MAX_AGE);
    if min_age > max_age {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "min_age cannot exceed max_age",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    load_user(&mut conn, user.id)?;

    let upsert = UpsertPreferences {
        user_id: user.id,
        max_distance_km: req
            .max_distance_km
            .unwrap_or(feed_service::DEFAULT_MAX_DISTANCE_KM as i32),
        min_age,
        max_age,
        looking_for_gender: req.looking_for_gender,
    };

    let preferences = diesel::insert_into(user_preferences::table)
        .values(&upsert)
        .on_conflict(user_preferences::user_id)
        .do_update()
        .set((&upsert, user_preferences::updated_at.eq(Utc::now())))
        .get_result::<UserPreference>(&mut conn)?;

    // Stored preferences shape the feed query.
    feed_service::invalidate_feed(&state.redis, user.id).await;

    Ok(Json(ApiResponse::ok(preferences)))
}
