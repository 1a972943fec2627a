// src/models/video.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'learning_videos' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LearningVideo {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Content type: 'video' or 'document'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub content_type: String,

    /// URL of the hosted content.
    pub url: String,

    /// Disaster category (e.g., "earthquake", "flood").
    pub category: String,

    /// Duration in seconds.
    pub duration: Option<i32>,

    pub uploaded_by: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for uploading new learning content.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadContentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 20))]
    #[serde(rename = "type")]
    pub content_type: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub url: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Represents the 'video_progress' table in the database.
/// One row per (user, video); upserted, latest value wins.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VideoProgress {
    pub id: i64,
    pub user_id: i64,
    pub video_id: i64,

    /// Percentage watched, 0..=100.
    pub progress: i32,

    pub completed: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for reporting playback progress.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    #[validate(range(min = 0, max = 100))]
    pub progress: i32,
    pub completed: bool,
}

/// Progress row joined with video metadata for listings.
#[derive(Debug, Serialize, FromRow)]
pub struct ProgressHistoryEntry {
    pub video_id: i64,
    pub video_title: String,
    pub video_category: String,
    pub video_duration: Option<i32>,
    pub progress: i32,
    pub completed: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
