use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub instructor_id: String,
    pub client_id: String,
    pub title: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub status: SessionStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A session joined with both participants' names, as listed to either side.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithNames {
    #[serde(flatten)]
    pub session: Session,
    pub instructor_first_name: String,
    pub instructor_last_name: String,
    pub client_first_name: String,
    pub client_last_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "cancelled" => SessionStatus::Cancelled,
            _ => SessionStatus::Scheduled,
        }
    }
}
