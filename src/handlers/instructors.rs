use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_date, AppJson, AppPath, AppQuery};
use crate::db::{billing, profiles, sessions, users};
use crate::errors::{AppError, AppResult};
use crate::models::availability::weekday_name;
use crate::models::{
    ClientLinkStatus, InstructorFees, InstructorProfile, InstructorStats, User, UserRole,
    WeeklyAvailability,
};
use crate::services::scheduling;
use crate::state::AppState;

const NOT_FOUND: &str = "Instructor not found";

#[derive(Serialize)]
pub struct InstructorSummary {
    #[serde(flatten)]
    pub user: User,
    pub profile: InstructorProfile,
    pub fees: Option<InstructorFees>,
    pub availability_summary: String,
}

#[derive(Serialize)]
pub struct InstructorDetail {
    #[serde(flatten)]
    pub summary: InstructorSummary,
    pub stats: InstructorStats,
}

// GET /api/instructors
pub async fn list_instructors(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let instructors = {
        let db = state.db()?;
        let mut out = vec![];
        for (user, profile) in profiles::list_instructors(&db)? {
            let fees = billing::get_fees(&db, &user.id)?;
            out.push(InstructorSummary {
                availability_summary: profile.availability.to_human_readable(),
                user,
                profile,
                fees,
            });
        }
        out
    };

    Ok(Json(json!({ "success": true, "instructors": instructors })))
}

// GET /api/instructors/:id
pub async fn get_instructor(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let today = Utc::now().date_naive();

    let detail = {
        let db = state.db()?;
        let user = users::get_user_by_id(&db, &id)?
            .filter(|u| u.role == UserRole::Instructor)
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        let profile = profiles::get_instructor_profile(&db, &id)?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
        let fees = billing::get_fees(&db, &id)?;
        let stats = profiles::instructor_stats(&db, &id, today)?;

        InstructorDetail {
            summary: InstructorSummary {
                availability_summary: profile.availability.to_human_readable(),
                user,
                profile,
                fees,
            },
            stats,
        }
    };

    Ok(Json(json!({ "success": true, "instructor": detail })))
}

// PUT /api/instructors/:id/profile
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub specialties: Option<Vec<String>>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<Value>> {
    let profile = {
        let db = state.db()?;
        let updated = profiles::update_instructor_profile(
            &db,
            &id,
            req.bio.as_deref(),
            req.specialties.as_deref(),
        )?;
        if !updated {
            return Err(AppError::not_found(NOT_FOUND));
        }
        profiles::get_instructor_profile(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(json!({ "success": true, "profile": profile })))
}

// GET /api/instructors/:id/availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let availability = {
        let db = state.db()?;
        profiles::get_availability(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(json!({
        "success": true,
        "summary": availability.to_human_readable(),
        "availability": availability,
    })))
}

// PUT /api/instructors/:id/availability
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(availability): AppJson<WeeklyAvailability>,
) -> AppResult<Json<Value>> {
    let saved = {
        let db = state.db()?;
        profiles::save_availability(&db, &id, &availability)?
    };
    if !saved {
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(instructor_id = %id, "availability updated");
    Ok(Json(json!({
        "success": true,
        "summary": availability.to_human_readable(),
        "availability": availability,
    })))
}

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: String,
}

// GET /api/instructors/:id/slots?date=YYYY-MM-DD
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppQuery(query): AppQuery<DateQuery>,
) -> AppResult<Json<Value>> {
    let date = parse_date(&query.date)?;

    let slots = {
        let db = state.db()?;
        scheduling::slots_for_date(&db, &id, date)?
    };

    Ok(Json(json!({
        "success": true,
        "date": date,
        "weekday": weekday_name(date.weekday()),
        "slots": slots,
    })))
}

// GET /api/instructors/:id/schedule?date=YYYY-MM-DD
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppQuery(query): AppQuery<DateQuery>,
) -> AppResult<Json<Value>> {
    let date = parse_date(&query.date)?;

    let sessions = {
        let db = state.db()?;
        sessions::get_instructor_sessions_on(&db, &id, date)?
    };

    Ok(Json(json!({ "success": true, "date": date, "sessions": sessions })))
}

// GET /api/instructors/:id/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let today = Utc::now().date_naive();

    let stats = {
        let db = state.db()?;
        if profiles::get_instructor_profile(&db, &id)?.is_none() {
            return Err(AppError::not_found(NOT_FOUND));
        }
        profiles::instructor_stats(&db, &id, today)?
    };

    Ok(Json(json!({ "success": true, "stats": stats })))
}

// GET /api/instructors/:id/clients
#[derive(Deserialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
}

pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppQuery(query): AppQuery<ClientsQuery>,
) -> AppResult<Json<Value>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let clients = {
        let db = state.db()?;
        profiles::list_clients(&db, &id, search)?
    };

    Ok(Json(json!({ "success": true, "clients": clients })))
}

// PUT /api/instructors/:id/clients/:client_id
#[derive(Deserialize)]
pub struct ClientStatusRequest {
    pub status: ClientLinkStatus,
}

pub async fn set_client_status(
    State(state): State<Arc<AppState>>,
    AppPath((id, client_id)): AppPath<(String, String)>,
    AppJson(req): AppJson<ClientStatusRequest>,
) -> AppResult<Json<Value>> {
    let updated = {
        let db = state.db()?;
        profiles::set_client_status(&db, &id, &client_id, req.status)?
    };
    if !updated {
        return Err(AppError::not_found("Client not found"));
    }

    Ok(Json(json!({ "success": true, "status": req.status })))
}
