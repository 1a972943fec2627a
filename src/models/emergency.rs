// src/models/emergency.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'emergency_contacts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub department: Option<String>,

    /// Lower numbers are listed first.
    pub priority: i32,

    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for adding a contact to the directory.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 30))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub priority: i32,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Represents the 'emergency_alerts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub id: i64,
    pub message: String,

    /// Alert type: 'drill', 'weather', 'lockdown', ...
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub alert_type: String,

    /// Roles the alert targets, stored as a JSONB array.
    pub target_roles: Json<Vec<String>>,

    pub sent_by: i64,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending an alert.
#[derive(Debug, Deserialize, Validate)]
pub struct SendAlertRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(length(min = 1, max = 50))]
    #[serde(rename = "type")]
    pub alert_type: String,
    pub target_roles: Option<Vec<String>>,
}

/// Alert row joined with sender info for listings.
#[derive(Debug, Serialize, FromRow)]
pub struct AlertHistoryEntry {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub sender_name: String,
    pub sender_role: String,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
}
