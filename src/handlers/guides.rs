use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::videos::InstructorFilter;
use super::{AppJson, AppPath, AppQuery};
use crate::db::content;
use crate::errors::{AppError, AppResult};
use crate::models::WorkoutGuide;
use crate::state::AppState;

const NOT_FOUND: &str = "Workout guide not found";

// GET /api/workout-guides
pub async fn list_guides(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<InstructorFilter>,
) -> AppResult<Json<Value>> {
    let guides = {
        let db = state.db()?;
        content::list_guides(&db, filter.instructor_id.as_deref())?
    };

    Ok(Json(json!({ "success": true, "guides": guides })))
}

// POST /api/workout-guides
#[derive(Deserialize)]
pub struct CreateGuideRequest {
    pub instructor_id: Option<String>,
    pub workout_plan_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub file_url: String,
    pub file_name: Option<String>,
    pub access_level: Option<String>,
    #[serde(default)]
    pub price: f64,
}

pub async fn create_guide(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateGuideRequest>,
) -> AppResult<Json<Value>> {
    if req.title.trim().is_empty() || req.file_url.trim().is_empty() {
        return Err(AppError::validation("Title and file URL are required."));
    }

    let guide = WorkoutGuide {
        id: Uuid::new_v4().to_string(),
        instructor_id: req.instructor_id,
        workout_plan_id: req.workout_plan_id,
        title: req.title,
        description: req.description,
        file_url: req.file_url,
        file_name: req.file_name,
        access_level: req.access_level.unwrap_or_else(|| "free".to_string()),
        price: req.price,
        downloads: 0,
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db()?;
        content::create_guide(&db, &guide)?;
    }

    Ok(Json(json!({ "success": true, "guide": guide })))
}

// DELETE /api/workout-guides/:id
pub async fn delete_guide(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let deleted = {
        let db = state.db()?;
        content::delete_guide(&db, &id)?
    };
    if !deleted {
        return Err(AppError::not_found(NOT_FOUND));
    }

    Ok(Json(json!({ "success": true })))
}

// POST /api/workout-guides/:id/download
pub async fn download_guide(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let guide = {
        let db = state.db()?;
        if !content::increment_guide_downloads(&db, &id)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        content::get_guide(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(json!({
        "success": true,
        "file_url": guide.file_url,
        "downloads": guide.downloads,
    })))
}
