pub mod auth;
pub mod billing;
pub mod clients;
pub mod email;
pub mod forum;
pub mod guides;
pub mod health;
pub mod instructors;
pub mod progress;
pub mod sessions;
pub mod users;
pub mod videos;
pub mod workouts;

use axum::extract::{FromRequest, FromRequestParts};
use chrono::NaiveDate;

use crate::errors::AppError;

/// `Json` whose rejections render as `{"success": false, "error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}
