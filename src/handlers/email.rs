use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppJson;
use crate::db::users;
use crate::errors::AppResult;
use crate::models::UserRole;
use crate::state::AppState;

// POST /api/send-welcome-email
#[derive(Deserialize)]
pub struct WelcomeEmailRequest {
    pub to: String,
    pub name: String,
    #[serde(alias = "type")]
    pub role: UserRole,
}

pub async fn send_welcome_email(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<WelcomeEmailRequest>,
) -> AppResult<Json<Value>> {
    state.mailer.send_welcome(&req.to, &req.name, req.role).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

// POST /api/send-password-reset
pub async fn send_password_reset(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<EmailRequest>,
) -> AppResult<Json<Value>> {
    let email = req.email.trim();
    let user = {
        let db = state.db()?;
        users::get_user_by_email(&db, email)?
    };

    // unknown addresses get the same answer as known ones
    match user {
        Some(user) => {
            state
                .mailer
                .send_password_reset(&user.email, &user.password_hash)
                .await?
        }
        None => tracing::info!(email, "password reset requested for unknown address"),
    }
    Ok(Json(json!({ "success": true })))
}

// POST /api/send-verification-email
pub async fn send_verification_email(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<EmailRequest>,
) -> AppResult<Json<Value>> {
    state.mailer.send_verification(req.email.trim()).await?;
    Ok(Json(json!({ "success": true })))
}
