// src/handlers/video.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::video::{
        LearningVideo, ProgressHistoryEntry, UpdateProgressRequest, VideoProgress,
    },
    utils::jwt::Claims,
};

/// Lists all learning videos, newest first.
pub async fn list_videos(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let videos = sqlx::query_as::<_, LearningVideo>(
        r#"
        SELECT id, title, description, type, url, category, duration, uploaded_by, created_at
        FROM learning_videos
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch videos: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(videos))
}

/// Retrieves a single video by ID.
pub async fn get_video(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let video = sqlx::query_as::<_, LearningVideo>(
        r#"
        SELECT id, title, description, type, url, category, duration, uploaded_by, created_at
        FROM learning_videos
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(video))
}

/// Records playback progress for the caller.
///
/// One row per (user, video); a later report replaces the earlier one.
pub async fn update_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // 404 before upserting, so progress rows never point at deleted content.
    sqlx::query_scalar::<_, i64>("SELECT id FROM learning_videos WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Video not found".to_string()))?;

    let progress = sqlx::query_as::<_, VideoProgress>(
        r#"
        INSERT INTO video_progress (user_id, video_id, progress, completed, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (user_id, video_id) DO UPDATE SET
            progress = EXCLUDED.progress,
            completed = EXCLUDED.completed,
            updated_at = NOW()
        RETURNING id, user_id, video_id, progress, completed, updated_at
        "#,
    )
    .bind(claims.user_id())
    .bind(id)
    .bind(payload.progress)
    .bind(payload.completed)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update video progress: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "message": "Progress updated successfully",
        "progress": progress
    })))
}

/// Lists the caller's progress across all videos.
pub async fn list_my_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let progress = sqlx::query_as::<_, ProgressHistoryEntry>(
        r#"
        SELECT
            p.video_id,
            v.title AS video_title,
            v.category AS video_category,
            v.duration AS video_duration,
            p.progress,
            p.completed,
            p.updated_at
        FROM video_progress p
        JOIN learning_videos v ON p.video_id = v.id
        WHERE p.user_id = $1
        ORDER BY p.updated_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch video progress: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(progress))
}
