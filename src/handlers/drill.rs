// src/handlers/drill.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        drill::{
            CreateDrillRequest, DrillAttendance, DrillRegistration, MarkAttendanceRequest,
            MockDrill, RegistrationHistoryEntry,
        },
        user::STAFF_ROLES,
    },
    utils::{
        html::clean_html,
        jwt::{Claims, require_role},
    },
};

/// Lists all drills, soonest first.
pub async fn list_drills(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let drills = sqlx::query_as::<_, MockDrill>(
        r#"
        SELECT id, title, description, type, scheduled_date, location, instructions, created_by, created_at
        FROM mock_drills
        ORDER BY scheduled_date ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch drills: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(drills))
}

/// Retrieves a single drill by ID.
pub async fn get_drill(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let drill = sqlx::query_as::<_, MockDrill>(
        r#"
        SELECT id, title, description, type, scheduled_date, location, instructions, created_by, created_at
        FROM mock_drills
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Drill not found".to_string()))?;

    Ok(Json(drill))
}

/// Schedules a new drill. Teacher/Admin only.
pub async fn create_drill(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDrillRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &STAFF_ROLES)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Instructions are rendered to every participant; sanitize them.
    let instructions = payload.instructions.as_deref().map(clean_html);

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO mock_drills (title, description, type, scheduled_date, location, instructions, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.drill_type)
    .bind(payload.scheduled_date)
    .bind(&payload.location)
    .bind(&instructions)
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create drill: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Registers the caller for a drill.
/// A second registration for the same drill is rejected with 409.
pub async fn register_for_drill(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM mock_drills WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Drill not found".to_string()))?;

    let registration = sqlx::query_as::<_, DrillRegistration>(
        r#"
        INSERT INTO drill_registrations (user_id, drill_id)
        VALUES ($1, $2)
        RETURNING id, user_id, drill_id, registered_at
        "#,
    )
    .bind(claims.user_id())
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict("Already registered for this drill".to_string())
        } else {
            tracing::error!("Failed to register for drill: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok(Json(serde_json::json!({
        "message": "Registered for drill successfully",
        "registration": registration
    })))
}

/// Marks a participant's attendance. Teacher/Admin only.
///
/// One row per (user, drill); re-marking replaces the earlier value.
pub async fn mark_attendance(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &STAFF_ROLES)?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM mock_drills WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Drill not found".to_string()))?;

    let attendance = sqlx::query_as::<_, DrillAttendance>(
        r#"
        INSERT INTO drill_attendance (user_id, drill_id, attended, marked_by, marked_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (user_id, drill_id) DO UPDATE SET
            attended = EXCLUDED.attended,
            marked_by = EXCLUDED.marked_by,
            marked_at = NOW()
        RETURNING id, user_id, drill_id, attended, marked_by, marked_at
        "#,
    )
    .bind(payload.user_id)
    .bind(id)
    .bind(payload.attended)
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to mark attendance: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "message": "Attendance marked successfully",
        "attendance": attendance
    })))
}

/// Lists the caller's drill registrations, newest first.
pub async fn list_my_registrations(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let registrations = sqlx::query_as::<_, RegistrationHistoryEntry>(
        r#"
        SELECT
            r.id,
            r.drill_id,
            d.title AS drill_title,
            d.type AS drill_type,
            d.scheduled_date,
            d.location,
            r.registered_at
        FROM drill_registrations r
        JOIN mock_drills d ON r.drill_id = d.id
        WHERE r.user_id = $1
        ORDER BY r.registered_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch registrations: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(registrations))
}
