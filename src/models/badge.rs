// src/models/badge.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Badge tiers, ordered lowest to highest.
/// 'beginner' exists in the tier set but no score threshold awards it.
pub const BADGE_TIERS: [&str; 4] = ["beginner", "intermediate", "advanced", "expert"];

/// Represents the 'user_badges' table in the database.
/// Append-only; repeated attempts may earn the same tier again.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub user_id: i64,

    /// One of `BADGE_TIERS`.
    pub badge_type: String,

    /// The quiz whose attempt triggered the award.
    pub quiz_id: i64,

    pub earned_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Badge row joined with quiz metadata for listings.
#[derive(Debug, Serialize, FromRow)]
pub struct BadgeHistoryEntry {
    pub id: i64,
    pub badge_type: String,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub quiz_category: String,
    pub earned_at: Option<chrono::DateTime<chrono::Utc>>,
}
