// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{StudentSummary, UpdateProfileRequest, User},
    utils::jwt::{Claims, require_role},
};

/// Get the caller's profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, name, role, student_id, parent_of, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the caller's profile. Fields are optional; role and email are
/// not user-editable.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id();

    // Check existence
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Perform updates sequentially if fields are present
    if let Some(new_name) = &payload.name {
        sqlx::query("UPDATE users SET name = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_name)
            .bind(user_id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    if let Some(new_student_id) = &payload.student_id {
        sqlx::query("UPDATE users SET student_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_student_id)
            .bind(user_id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    if let Some(new_parent_of) = payload.parent_of {
        sqlx::query("UPDATE users SET parent_of = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_parent_of)
            .bind(user_id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, name, role, student_id, parent_of, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "message": "Profile updated successfully",
        "user": user
    })))
}

/// Lists all users, newest first. Admin only.
pub async fn list_users(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &["admin"])?;

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, name, role, student_id, parent_of, created_at, updated_at
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Lists the student accounts linked to the calling parent.
pub async fn list_my_students(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &["parent"])?;

    let students = sqlx::query_as::<_, StudentSummary>(
        r#"
        SELECT id, name, student_id, email
        FROM users
        WHERE parent_of = $1
        ORDER BY name ASC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch students: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(students))
}
