use serde::{Deserialize, Serialize};

use super::availability::WeeklyAvailability;

#[derive(Debug, Clone, Serialize)]
pub struct InstructorProfile {
    pub instructor_id: String,
    pub bio: String,
    pub specialties: Vec<String>,
    pub rating: f64,
    pub review_count: i64,
    pub verified: bool,
    pub availability: WeeklyAvailability,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstructorFees {
    pub instructor_id: String,
    pub session_fee: f64,
    pub video_fee: f64,
    pub workout_plan_fee: f64,
    pub platform_commission_rate: f64,
    pub currency: String,
}

/// Instructor dashboard figures, derived on read.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InstructorStats {
    pub total_clients: i64,
    pub active_clients: i64,
    pub total_sessions: i64,
    pub upcoming_sessions: i64,
    pub total_earnings: f64,
    pub workout_plans: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClientLinkStatus {
    Active,
    Inactive,
}

impl ClientLinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientLinkStatus::Active => "active",
            ClientLinkStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "inactive" => ClientLinkStatus::Inactive,
            _ => ClientLinkStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorClient {
    pub client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: ClientLinkStatus,
    pub sessions_booked: i64,
    pub since: String,
}
