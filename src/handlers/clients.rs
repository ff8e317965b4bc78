use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppJson, AppPath};
use crate::db::{profiles, progress};
use crate::errors::{AppError, AppResult};
use crate::models::{Demographic, Health, Measurements, ProgressRecord};
use crate::services::health_metrics;
use crate::services::validation::validate_demographics;
use crate::state::AppState;

const NOT_FOUND: &str = "Client profile not found";

// POST /api/create-client-profile
#[derive(Deserialize)]
pub struct CreateClientProfileRequest {
    pub user_id: String,
    pub demographic: Demographic,
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub measurements: Measurements,
}

pub async fn create_client_profile(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateClientProfileRequest>,
) -> AppResult<Json<Value>> {
    validate_demographics(&req.demographic)?;

    let mut health = req.health;
    health.bmi = match (req.demographic.weight_kg, req.demographic.height_cm) {
        (Some(weight), Some(height)) => health_metrics::bmi(weight, height),
        _ => None,
    };

    let now = Utc::now().naive_utc();
    let initial = |kind: &str, value: Option<f64>, unit: &str| ProgressRecord {
        id: Uuid::new_v4().to_string(),
        client_id: req.user_id.clone(),
        kind: kind.to_string(),
        value,
        unit: Some(unit.to_string()),
        notes: None,
        recorded_at: now,
    };
    let records = [
        initial("weight", req.demographic.weight_kg, "kg"),
        initial("measurement", req.measurements.chest, "cm"),
    ];

    {
        let db = state.db()?;
        let saved = profiles::save_client_intake(
            &db,
            &req.user_id,
            &req.demographic,
            &health,
            &req.measurements,
        )?;
        if !saved {
            return Err(AppError::not_found(NOT_FOUND));
        }
        for record in &records {
            progress::create_record(&db, record)?;
        }
    }

    tracing::info!(client_id = %req.user_id, bmi = ?health.bmi, "client profile completed");
    Ok(Json(json!({ "success": true, "bmi": health.bmi })))
}

// GET /api/clients/:id/profile
pub async fn get_client_profile(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let profile = {
        let db = state.db()?;
        profiles::get_client_profile(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "success": true, "profile": profile })))
}
