use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AppJson, AppPath};
use crate::auth::AuthUser;
use crate::db::users::{self, UserUpdate};
use crate::errors::{AppError, AppResult};
use crate::models::UserSettings;
use crate::services::validation::{confirm_deletion, ValidationError};
use crate::state::AppState;

// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let user = {
        let db = state.db()?;
        users::get_user_by_id(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "user": user })))
}

// PUT /api/users/:id
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub profile_image_url: Option<String>,
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> AppResult<Json<Value>> {
    auth.require_self(&id)?;

    if req.first_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ValidationError::NameRequired.into());
    }

    let update = UserUpdate {
        first_name: req.first_name.as_deref().map(str::trim),
        last_name: req.last_name.as_deref().map(str::trim),
        phone: req.phone.as_deref(),
        date_of_birth: req.date_of_birth.as_deref(),
        profile_image_url: req.profile_image_url.as_deref(),
    };

    let user = {
        let db = state.db()?;
        if !users::update_user(&db, &id, &update)? {
            return Err(AppError::not_found("User not found"));
        }
        users::get_user_by_id(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(json!({ "success": true, "user": user })))
}

// DELETE /api/users/:id
#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub confirmation: String,
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<DeleteAccountRequest>,
) -> AppResult<Json<Value>> {
    auth.require_self(&id)?;
    confirm_deletion(&req.confirmation)?;

    let deleted = {
        let db = state.db()?;
        users::delete_user(&db, &id)?
    };
    if !deleted {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, "account deleted");
    Ok(Json(json!({ "success": true })))
}

// GET /api/users/:id/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    auth.require_self(&id)?;

    let settings = {
        let db = state.db()?;
        users::get_settings(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found("Settings not found"))?;

    Ok(Json(json!({ "success": true, "settings": settings })))
}

// PUT /api/users/:id/settings
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub theme: Option<String>,
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<UpdateSettingsRequest>,
) -> AppResult<Json<Value>> {
    auth.require_self(&id)?;

    let settings = {
        let db = state.db()?;
        let current = users::get_settings(&db, &id)?.unwrap_or_else(|| UserSettings {
            user_id: id.clone(),
            email_notifications: true,
            push_notifications: true,
            theme: "light".to_string(),
        });

        let settings = UserSettings {
            email_notifications: req.email_notifications.unwrap_or(current.email_notifications),
            push_notifications: req.push_notifications.unwrap_or(current.push_notifications),
            theme: req.theme.unwrap_or(current.theme),
            ..current
        };
        users::save_settings(&db, &settings)?;
        settings
    };

    Ok(Json(json!({ "success": true, "settings": settings })))
}
