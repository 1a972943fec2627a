// src/handlers/emergency.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        emergency::{
            AlertHistoryEntry, CreateContactRequest, EmergencyAlert, EmergencyContact,
            SendAlertRequest,
        },
        user::STAFF_ROLES,
    },
    utils::{
        html::clean_html,
        jwt::{Claims, require_role},
    },
};

/// Lists the emergency contact directory, highest priority first.
pub async fn list_contacts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let contacts = sqlx::query_as::<_, EmergencyContact>(
        r#"
        SELECT id, name, phone, email, department, priority, description, created_at
        FROM emergency_contacts
        ORDER BY priority ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch emergency contacts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(contacts))
}

/// Adds a contact to the directory. Admin only.
pub async fn create_contact(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &["admin"])?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let contact = sqlx::query_as::<_, EmergencyContact>(
        r#"
        INSERT INTO emergency_contacts (name, phone, email, department, priority, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, phone, email, department, priority, description, created_at
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.department)
    .bind(payload.priority)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to add emergency contact: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Emergency contact added successfully",
            "contact": contact
        })),
    ))
}

/// Records an emergency alert. Teacher/Admin only.
///
/// Delivery (SMS, push, email) is not wired up; the alert row is the record
/// that clients poll. Unspecified target_roles means all non-admin roles.
pub async fn send_alert(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendAlertRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &STAFF_ROLES)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let message = clean_html(&payload.message);
    let target_roles = payload
        .target_roles
        .unwrap_or_else(|| vec!["student".to_string(), "teacher".to_string(), "parent".to_string()]);

    let alert = sqlx::query_as::<_, EmergencyAlert>(
        r#"
        INSERT INTO emergency_alerts (message, type, target_roles, sent_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, message, type, target_roles, sent_by, sent_at
        "#,
    )
    .bind(&message)
    .bind(&payload.alert_type)
    .bind(sqlx::types::Json(&target_roles))
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record emergency alert: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(
        alert_id = alert.id,
        alert_type = %alert.alert_type,
        sent_by = alert.sent_by,
        "emergency alert recorded"
    );

    Ok(Json(serde_json::json!({
        "message": "Emergency alert sent successfully",
        "alert": alert
    })))
}

/// Lists the 50 most recent alerts with sender info.
pub async fn list_alerts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let alerts = sqlx::query_as::<_, AlertHistoryEntry>(
        r#"
        SELECT
            a.id,
            a.message,
            a.type AS alert_type,
            u.name AS sender_name,
            u.role AS sender_role,
            a.sent_at
        FROM emergency_alerts a
        JOIN users u ON a.sent_by = u.id
        ORDER BY a.sent_at DESC
        LIMIT 50
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch emergency alerts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(alerts))
}
