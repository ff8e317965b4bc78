use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath};
use crate::db::progress;
use crate::errors::{AppError, AppResult};
use crate::models::ProgressRecord;
use crate::state::AppState;

// GET /api/progress/:user_id
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let records = {
        let db = state.db()?;
        progress::get_records_for_client(&db, &user_id)?
    };

    Ok(Json(json!({ "success": true, "progress": records })))
}

// POST /api/progress
#[derive(Deserialize)]
pub struct CreateProgressRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_progress(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateProgressRequest>,
) -> AppResult<Json<Value>> {
    if req.kind.trim().is_empty() {
        return Err(AppError::validation("Progress type is required."));
    }

    let record = ProgressRecord {
        id: Uuid::new_v4().to_string(),
        client_id: req.user_id,
        kind: req.kind,
        value: req.value,
        unit: req.unit,
        notes: req.notes,
        recorded_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db()?;
        progress::create_record(&db, &record)?;
    }

    Ok(Json(json!({ "success": true, "progress": record })))
}
