use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProgressRecord {
    pub id: String,
    pub client_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
}
