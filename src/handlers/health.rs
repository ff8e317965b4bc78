use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppResult;
use crate::state::AppState;

// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// GET /api/test
pub async fn db_check(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let timestamp: String = {
        let db = state.db()?;
        db.query_row("SELECT datetime('now')", [], |row| row.get(0))
            .context("database check failed")?
    };

    Ok(Json(json!({ "success": true, "timestamp": timestamp })))
}
