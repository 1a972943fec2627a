// src/models/drill.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'mock_drills' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MockDrill {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Drill type: 'earthquake', 'fire', 'flood', 'lockdown', ...
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub drill_type: String,

    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    pub location: String,

    /// Step-by-step instructions for participants.
    pub instructions: Option<String>,

    pub created_by: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for scheduling a new drill.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDrillRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    #[serde(rename = "type")]
    pub drill_type: String,
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(max = 5000))]
    pub instructions: Option<String>,
}

/// Represents the 'drill_registrations' table in the database.
/// Unique per (user, drill); a second registration is rejected.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DrillRegistration {
    pub id: i64,
    pub user_id: i64,
    pub drill_id: i64,
    pub registered_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Registration row joined with drill metadata for listings.
#[derive(Debug, Serialize, FromRow)]
pub struct RegistrationHistoryEntry {
    pub id: i64,
    pub drill_id: i64,
    pub drill_title: String,
    pub drill_type: String,
    pub scheduled_date: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub registered_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'drill_attendance' table in the database.
/// One row per (user, drill); upserted, latest value wins.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DrillAttendance {
    pub id: i64,
    pub user_id: i64,
    pub drill_id: i64,
    pub attended: bool,
    pub marked_by: i64,
    pub marked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for marking a participant's attendance.
#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub user_id: i64,
    pub attended: bool,
}
