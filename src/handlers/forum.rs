use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath, AppQuery};
use crate::auth::AuthUser;
use crate::db::{forum, users};
use crate::errors::{AppError, AppResult};
use crate::models::ForumPost;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

// GET /api/forum/posts
#[derive(Deserialize)]
pub struct PostsQuery {
    pub limit: Option<i64>,
}

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<PostsQuery>,
) -> AppResult<Json<Value>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let posts = {
        let db = state.db()?;
        forum::list_posts(&db, limit)?
    };

    Ok(Json(json!({ "success": true, "posts": posts })))
}

// POST /api/forum/posts
#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppJson(req): AppJson<CreatePostRequest>,
) -> AppResult<Json<Value>> {
    let title = req.title.trim();
    let content = req.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::validation("Title and content are required."));
    }

    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().naive_utc();

    let author = {
        let db = state.db()?;
        let author = users::get_user_by_id(&db, &auth.user_id)?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
        forum::create_post(&db, &id, &author.id, title, content, &created_at)?;
        author
    };

    let post = ForumPost {
        id,
        author_id: author.id.clone(),
        author_name: author.full_name(),
        title: title.to_string(),
        content: content.to_string(),
        likes: 0,
        created_at,
    };

    Ok(Json(json!({ "success": true, "post": post })))
}

// POST /api/forum/posts/:id/like
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let likes = {
        let db = state.db()?;
        if !forum::post_exists(&db, &id)? {
            return Err(AppError::not_found("Post not found"));
        }
        forum::like_post(&db, &id, &auth.user_id)?
    };

    match likes {
        Some(likes) => Ok(Json(json!({ "success": true, "likes": likes }))),
        None => Err(AppError::Conflict(
            "You've already liked this post.".to_string(),
        )),
    }
}
