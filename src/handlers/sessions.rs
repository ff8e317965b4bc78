use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{parse_date, AppJson, AppPath};
use crate::db::{profiles, sessions};
use crate::errors::{AppError, AppResult};
use crate::models::{Session, SessionStatus};
use crate::state::AppState;

// GET /api/sessions/:user_id
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let sessions = {
        let db = state.db()?;
        sessions::get_sessions_for_user(&db, &user_id)?
    };

    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

// POST /api/sessions
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub instructor_id: String,
    pub client_id: String,
    pub title: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: Option<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
}

/// Books without checking the slot; two clients can take the same time.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateSessionRequest>,
) -> AppResult<Json<Value>> {
    let date = parse_date(&req.date)?;
    let now = Utc::now().naive_utc();

    let session = Session {
        id: Uuid::new_v4().to_string(),
        instructor_id: req.instructor_id,
        client_id: req.client_id,
        title: req.title,
        date,
        start_time: req.start_time,
        end_time: req.end_time,
        session_type: req.session_type.unwrap_or_else(|| "personal".to_string()),
        notes: req.notes,
        price: req.price,
        status: SessionStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        sessions::create_session(&db, &session)?;
        profiles::link_client(&db, &session.instructor_id, &session.client_id)?;
    }

    tracing::info!(
        session_id = %session.id,
        instructor_id = %session.instructor_id,
        client_id = %session.client_id,
        date = %session.date,
        start = %session.start_time,
        "session booked"
    );
    Ok(Json(json!({ "success": true, "session": session })))
}

// PUT /api/sessions/:id/status
#[derive(Deserialize)]
pub struct SessionStatusRequest {
    pub status: SessionStatus,
}

pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<SessionStatusRequest>,
) -> AppResult<Json<Value>> {
    let session = {
        let db = state.db()?;
        if !sessions::update_session_status(&db, &id, req.status)? {
            return Err(AppError::not_found("Session not found"));
        }
        sessions::get_session(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found("Session not found"))?;

    Ok(Json(json!({ "success": true, "session": session })))
}
