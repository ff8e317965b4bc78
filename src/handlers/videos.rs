use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath, AppQuery};
use crate::db::content;
use crate::errors::{AppError, AppResult};
use crate::models::Video;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct InstructorFilter {
    pub instructor_id: Option<String>,
}

// GET /api/videos
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<InstructorFilter>,
) -> AppResult<Json<Value>> {
    let videos = {
        let db = state.db()?;
        content::list_videos(&db, filter.instructor_id.as_deref())?
    };

    Ok(Json(json!({ "success": true, "videos": videos })))
}

// POST /api/videos
#[derive(Deserialize)]
pub struct CreateVideoRequest {
    pub instructor_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration: Option<i64>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateVideoRequest>,
) -> AppResult<Json<Value>> {
    if req.title.trim().is_empty() || req.url.trim().is_empty() {
        return Err(AppError::validation("Title and URL are required."));
    }

    let video = Video {
        id: Uuid::new_v4().to_string(),
        instructor_id: req.instructor_id,
        title: req.title,
        description: req.description,
        url: req.url,
        thumbnail_url: req.thumbnail_url,
        duration: req.duration,
        category: req.category,
        tags: req.tags,
        price: req.price,
        views: 0,
        likes: 0,
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db()?;
        content::create_video(&db, &video)?;
    }

    Ok(Json(json!({ "success": true, "video": video })))
}

// DELETE /api/videos/:id
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let deleted = {
        let db = state.db()?;
        content::delete_video(&db, &id)?
    };
    if !deleted {
        return Err(AppError::not_found("Video not found"));
    }

    Ok(Json(json!({ "success": true })))
}
