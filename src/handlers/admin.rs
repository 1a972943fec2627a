// src/handlers/admin.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::video::{LearningVideo, UploadContentRequest},
    utils::jwt::Claims,
};

/// Per-role user count, aggregated for the dashboard.
#[derive(sqlx::FromRow)]
struct RoleCount {
    role: String,
    count: i64,
}

/// Aggregates over all recorded quiz attempts.
#[derive(sqlx::FromRow)]
struct AttemptStats {
    total_attempts: i64,
    avg_score: Option<f64>,
    avg_percentage: Option<f64>,
}

/// Dashboard statistics: user counts by role, quiz attempt aggregates,
/// total drill count. Admin only (enforced by the route middleware).
pub async fn get_stats(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let role_counts = sqlx::query_as::<_, RoleCount>(
        r#"
        SELECT role, COUNT(*) AS count
        FROM users
        GROUP BY role
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch user stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user_stats: serde_json::Map<String, serde_json::Value> = role_counts
        .into_iter()
        .map(|rc| (rc.role, serde_json::json!(rc.count)))
        .collect();

    let attempt_stats = sqlx::query_as::<_, AttemptStats>(
        r#"
        SELECT
            COUNT(*) AS total_attempts,
            AVG(score)::FLOAT8 AS avg_score,
            AVG(percentage)::FLOAT8 AS avg_percentage
        FROM quiz_attempts
        "#,
    )
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let total_drills: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mock_drills")
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch drill stats: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(serde_json::json!({
        "userStats": user_stats,
        "quizStats": {
            "totalAttempts": attempt_stats.total_attempts,
            "avgScore": attempt_stats.avg_score,
            "avgPercentage": attempt_stats.avg_percentage,
        },
        "drillStats": {
            "totalDrills": total_drills,
        }
    })))
}

/// Uploads a new piece of learning content. Admin only.
pub async fn upload_content(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UploadContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let content = sqlx::query_as::<_, LearningVideo>(
        r#"
        INSERT INTO learning_videos (title, description, type, url, category, duration, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, title, description, type, url, category, duration, uploaded_by, created_at
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.content_type)
    .bind(&payload.url)
    .bind(&payload.category)
    .bind(payload.duration)
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upload content: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Content uploaded successfully",
            "content": content
        })),
    ))
}
