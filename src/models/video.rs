use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: String,
    pub instructor_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration: Option<i64>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub price: f64,
    pub views: i64,
    pub likes: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoListing {
    #[serde(flatten)]
    pub video: Video,
    pub first_name: String,
    pub last_name: String,
}
