// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Roles a user account can hold.
pub const ROLES: [&str; 4] = ["student", "teacher", "parent", "admin"];

/// Roles allowed to create quizzes/drills and mark attendance.
pub const STAFF_ROLES: [&str; 2] = ["teacher", "admin"];

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique email address, used for login.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Display name.
    pub name: String,

    /// User role: 'student', 'teacher', 'parent' or 'admin'.
    pub role: String,

    /// School-issued student identifier, if any.
    pub student_id: Option<String>,

    /// For parent accounts: the user ID of the linked student.
    pub parent_of: Option<i64>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for a student account as seen by its parent.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentSummary {
    pub id: i64,
    pub name: String,
    pub student_id: Option<String>,
    pub email: String,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(custom(function = validate_role))]
    pub role: String,
    #[validate(length(max = 50))]
    pub student_id: Option<String>,
    pub parent_of: Option<i64>,
}

fn validate_role(role: &str) -> Result<(), validator::ValidationError> {
    if !ROLES.contains(&role) {
        return Err(validator::ValidationError::new("unknown_role"));
    }
    Ok(())
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for updating the caller's own profile. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub student_id: Option<String>,
    pub parent_of: Option<i64>,
}
