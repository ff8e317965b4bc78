use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub instructor_id: Option<String>,
    pub title: String,
    pub description: String,
    pub duration_weeks: i64,
    pub difficulty_level: String,
    pub equipment_needed: Vec<String>,
    pub target_muscles: Vec<String>,
    pub is_platform_plan: bool,
    pub price: f64,
    pub preview_video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Catalogue row: the plan with its author's name and review aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutPlanSummary {
    #[serde(flatten)]
    pub plan: WorkoutPlan,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutPlanDetail {
    #[serde(flatten)]
    pub summary: WorkoutPlanSummary,
    pub exercises: Vec<WorkoutExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_week")]
    pub week_number: i64,
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub sets: Option<i64>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub rest_time: Option<i64>,
    #[serde(default)]
    pub weight_suggestion: Option<String>,
    #[serde(default)]
    pub form_tips: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sequence_order: i64,
}

fn default_week() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutPlanReview {
    pub id: String,
    pub workout_plan_id: String,
    pub user_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutGuide {
    pub id: String,
    pub instructor_id: Option<String>,
    pub workout_plan_id: Option<String>,
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub file_name: Option<String>,
    pub access_level: String,
    pub price: f64,
    pub downloads: i64,
    pub created_at: NaiveDateTime,
}
