use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::AppJson;
use crate::auth::{password, AuthError, AuthUser, LinkPurpose};
use crate::db::{self, users};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::services::validation::{validate_password, validate_signup, SignupForm};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const EMAIL_TAKEN: &str = "Email already exists";

// POST /api/auth/signup
#[derive(Deserialize)]
pub struct SignupRequest {
    pub id: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub role: UserRole,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub profile_image_url: Option<String>,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignupRequest>,
) -> AppResult<Json<Value>> {
    validate_signup(&SignupForm {
        email: &req.email,
        password: &req.password,
        confirm_password: req.confirm_password.as_deref(),
        first_name: &req.first_name,
    })?;

    let email = req.email.trim().to_string();
    let taken = {
        let db = state.db()?;
        users::email_exists(&db, &email)?
    };
    if taken {
        return Err(AppError::validation(EMAIL_TAKEN));
    }

    let password_hash = password::hash_password(&req.password, state.config.bcrypt_cost).await?;
    let now = Utc::now().naive_utc();
    let user = User {
        id: req
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        email,
        password_hash,
        role: req.role,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: req.phone,
        date_of_birth: req.date_of_birth,
        profile_image_url: req.profile_image_url,
        email_verified: false,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        users::register_user(&db, &user).map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::validation(EMAIL_TAKEN)
            } else {
                AppError::from(e)
            }
        })?;
    }

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user signed up");

    if let Err(e) = state
        .mailer
        .send_welcome(&user.email, &user.full_name(), user.role)
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "welcome email not sent");
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(json!({ "success": true, "user": user, "token": token })))
}

// POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    let user = {
        let db = state.db()?;
        users::get_user_by_email(&db, req.email.trim())?
    };

    let Some(user) = user else {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };
    if !password::verify_password(&req.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(json!({ "success": true, "user": user, "token": token })))
}

// POST /api/auth/reset-password
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// The link is bound to the password hash it was issued against, so a
/// successful reset spends it.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<Value>> {
    let links = state.mailer.links();
    let claims = links.verify(LinkPurpose::PasswordReset, &req.token)?;
    validate_password(&req.new_password)?;

    let user = {
        let db = state.db()?;
        users::get_user_by_email(&db, &claims.email)?
    }
    .ok_or_else(|| AppError::not_found("User not found"))?;
    links.ensure_bound(&claims, &user.password_hash)?;

    let password_hash = password::hash_password(&req.new_password, state.config.bcrypt_cost).await?;
    let replaced = {
        let db = state.db()?;
        users::replace_password_hash(&db, &user.id, &user.password_hash, &password_hash)?
    };
    if !replaced {
        return Err(AuthError::LinkUsed.into());
    }

    tracing::info!(user_id = %user.id, "password reset");
    Ok(Json(json!({ "success": true })))
}

// POST /api/auth/verify-email
#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<VerifyEmailRequest>,
) -> AppResult<Json<Value>> {
    let claims = state
        .mailer
        .links()
        .verify(LinkPurpose::EmailVerification, &req.token)?;

    let updated = {
        let db = state.db()?;
        users::mark_email_verified(&db, &claims.email)?
    };
    if !updated {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(json!({ "success": true })))
}

// POST /api/auth/change-password
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<Value>> {
    let user = {
        let db = state.db()?;
        users::get_user_by_id(&db, &auth.user_id)?
    }
    .ok_or_else(|| AppError::not_found("User not found"))?;

    if !password::verify_password(&req.current_password, &user.password_hash).await? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect.".to_string(),
        ));
    }
    validate_password(&req.new_password)?;

    let password_hash = password::hash_password(&req.new_password, state.config.bcrypt_cost).await?;
    {
        let db = state.db()?;
        users::update_password_hash(&db, &user.id, &password_hash)?;
    }

    Ok(Json(json!({ "success": true })))
}
