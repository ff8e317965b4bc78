use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath};
use crate::db::{billing, profiles, TIMESTAMP_FORMAT};
use crate::errors::{AppError, AppResult};
use crate::models::{InstructorFees, UserSubscription};
use crate::state::AppState;

// GET /api/subscription-plans
pub async fn list_plans(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let plans = {
        let db = state.db()?;
        billing::list_plans(&db)?
    };

    Ok(Json(json!({ "success": true, "plans": plans })))
}

// POST /api/subscribe
#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub user_id: String,
    pub plan_id: String,
    pub instructor_id: Option<String>,
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubscribeRequest>,
) -> AppResult<Json<Value>> {
    let subscription = {
        let db = state.db()?;
        let plan = billing::get_plan(&db, &req.plan_id)?
            .ok_or_else(|| AppError::not_found("Plan not found"))?;

        let start = Utc::now().naive_utc();
        let subscription = UserSubscription {
            id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            plan_id: plan.id.clone(),
            instructor_id: req.instructor_id.or_else(|| plan.instructor_id.clone()),
            start_date: start,
            end_date: plan.period.end_date(start),
            status: "active".to_string(),
        };
        billing::create_subscription(&db, &subscription)?;

        let kind = if plan.is_platform_plan { "platform" } else { "instructor" };
        profiles::update_client_subscription(
            &db,
            &subscription.user_id,
            &subscription.end_date.format(TIMESTAMP_FORMAT).to_string(),
            kind,
            &plan.name,
        )?;

        if let Some(instructor_id) = subscription.instructor_id.as_deref() {
            profiles::link_client(&db, instructor_id, &subscription.user_id)?;
        }
        subscription
    };

    tracing::info!(
        user_id = %subscription.user_id,
        plan_id = %subscription.plan_id,
        end_date = %subscription.end_date,
        "subscription started"
    );
    Ok(Json(json!({ "success": true, "subscription": subscription })))
}

// GET /api/subscriptions/:user_id
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let subscriptions = {
        let db = state.db()?;
        billing::get_subscriptions_for_user(&db, &user_id)?
    };

    Ok(Json(json!({ "success": true, "subscriptions": subscriptions })))
}

// POST /api/instructor-fees
#[derive(Deserialize)]
pub struct FeesRequest {
    pub instructor_id: String,
    #[serde(default)]
    pub session_fee: f64,
    #[serde(default)]
    pub video_fee: f64,
    #[serde(default)]
    pub workout_plan_fee: f64,
    #[serde(default)]
    pub platform_commission_rate: f64,
    pub currency: Option<String>,
}

pub async fn upsert_fees(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<FeesRequest>,
) -> AppResult<Json<Value>> {
    let amounts = [
        req.session_fee,
        req.video_fee,
        req.workout_plan_fee,
        req.platform_commission_rate,
    ];
    if amounts.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(AppError::validation("Fees must be non-negative numbers."));
    }

    let fees = InstructorFees {
        instructor_id: req.instructor_id,
        session_fee: req.session_fee,
        video_fee: req.video_fee,
        workout_plan_fee: req.workout_plan_fee,
        platform_commission_rate: req.platform_commission_rate,
        currency: req.currency.unwrap_or_else(|| "USD".to_string()),
    };

    {
        let db = state.db()?;
        billing::upsert_fees(&db, &fees)?;
    }

    Ok(Json(json!({ "success": true, "fees": fees })))
}
