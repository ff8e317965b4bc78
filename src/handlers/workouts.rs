use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath, AppQuery};
use crate::db::content::{self, PlanFilter, PlanUpdate};
use crate::db::{self, profiles};
use crate::errors::{AppError, AppResult};
use crate::models::{WorkoutExercise, WorkoutPlan, WorkoutPlanDetail, WorkoutPlanReview};
use crate::state::AppState;

const NOT_FOUND: &str = "Workout plan not found";

// GET /api/workout-plans
#[derive(Deserialize)]
pub struct PlanQuery {
    pub instructor_id: Option<String>,
    pub is_platform: Option<String>,
}

pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<PlanQuery>,
) -> AppResult<Json<Value>> {
    // an instructor filter wins over the platform flag
    let filter = match (query.instructor_id.as_deref(), query.is_platform.as_deref()) {
        (Some(id), _) if !id.is_empty() => PlanFilter::Instructor(id),
        (_, Some("true")) => PlanFilter::Platform,
        _ => PlanFilter::All,
    };

    let plans = {
        let db = state.db()?;
        content::list_workout_plans(&db, filter)?
    };

    Ok(Json(json!({ "success": true, "plans": plans })))
}

// POST /api/workout-plans
#[derive(Deserialize)]
pub struct CreatePlanRequest {
    pub instructor_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_duration")]
    pub duration_weeks: i64,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: String,
    #[serde(default)]
    pub equipment_needed: Vec<String>,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub is_platform_plan: bool,
    #[serde(default)]
    pub price: f64,
    pub preview_video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

fn default_duration() -> i64 {
    1
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreatePlanRequest>,
) -> AppResult<Json<Value>> {
    if req.title.trim().is_empty() {
        return Err(AppError::validation("Title is required."));
    }

    let now = Utc::now().naive_utc();
    let plan = WorkoutPlan {
        id: Uuid::new_v4().to_string(),
        instructor_id: req.instructor_id,
        title: req.title,
        description: req.description,
        duration_weeks: req.duration_weeks,
        difficulty_level: req.difficulty_level,
        equipment_needed: req.equipment_needed,
        target_muscles: req.target_muscles,
        is_platform_plan: req.is_platform_plan,
        price: req.price,
        preview_video_url: req.preview_video_url,
        thumbnail_url: req.thumbnail_url,
        created_at: now,
        updated_at: now,
    };

    // always fresh: a body copied from another plan carries that plan's ids
    let exercises: Vec<WorkoutExercise> = req
        .exercises
        .into_iter()
        .map(|exercise| WorkoutExercise {
            id: Uuid::new_v4().to_string(),
            ..exercise
        })
        .collect();

    {
        let db = state.db()?;
        content::create_workout_plan(&db, &plan, &exercises)?;
    }

    tracing::info!(plan_id = %plan.id, exercises = exercises.len(), "workout plan created");
    Ok(Json(json!({ "success": true, "plan": plan, "exercises": exercises })))
}

// GET /api/workout-plans/:id
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let detail = {
        let db = state.db()?;
        let summary = content::get_workout_plan(&db, &id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        let exercises = content::get_plan_exercises(&db, &id)?;
        WorkoutPlanDetail { summary, exercises }
    };

    Ok(Json(json!({ "success": true, "plan": detail })))
}

// PUT /api/workout-plans/:id
#[derive(Deserialize)]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_weeks: Option<i64>,
    pub difficulty_level: Option<String>,
    pub price: Option<f64>,
    pub preview_video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

pub async fn update_plan(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<UpdatePlanRequest>,
) -> AppResult<Json<Value>> {
    let update = PlanUpdate {
        title: req.title.as_deref(),
        description: req.description.as_deref(),
        duration_weeks: req.duration_weeks,
        difficulty_level: req.difficulty_level.as_deref(),
        price: req.price,
        preview_video_url: req.preview_video_url.as_deref(),
        thumbnail_url: req.thumbnail_url.as_deref(),
    };

    let plan = {
        let db = state.db()?;
        if !content::update_workout_plan(&db, &id, &update)? {
            return Err(AppError::not_found(NOT_FOUND));
        }
        content::get_workout_plan(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "success": true, "plan": plan })))
}

// DELETE /api/workout-plans/:id
pub async fn delete_plan(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let deleted = {
        let db = state.db()?;
        content::delete_workout_plan(&db, &id)?
    };
    if !deleted {
        return Err(AppError::not_found(NOT_FOUND));
    }

    Ok(Json(json!({ "success": true })))
}

// POST /api/workout-plans/:id/reviews
#[derive(Deserialize)]
pub struct ReviewRequest {
    pub user_id: String,
    pub rating: i64,
    pub comment: Option<String>,
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<ReviewRequest>,
) -> AppResult<Json<Value>> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::validation("Rating must be between 1 and 5."));
    }

    let review = WorkoutPlanReview {
        id: Uuid::new_v4().to_string(),
        workout_plan_id: id,
        user_id: req.user_id,
        rating: req.rating,
        comment: req.comment,
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db()?;
        let plan = content::get_workout_plan(&db, &review.workout_plan_id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        content::add_review(&db, &review).map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("You have already reviewed this workout plan.".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        if let Some(instructor_id) = plan.plan.instructor_id.as_deref() {
            profiles::refresh_instructor_rating(&db, instructor_id)?;
        }
    }

    Ok(Json(json!({ "success": true, "review": review })))
}
