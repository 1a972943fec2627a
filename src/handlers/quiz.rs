// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::{ADVANCED_THRESHOLD, EXPERT_THRESHOLD, INTERMEDIATE_THRESHOLD},
    error::AppError,
    models::{
        badge::BadgeHistoryEntry,
        quiz::{
            AttemptHistoryEntry, CreateQuizRequest, PublicQuiz, Question, Quiz, SubmitQuizRequest,
        },
        user::STAFF_ROLES,
    },
    utils::jwt::{Claims, require_role},
};

/// Scores a submitted answer sheet against the quiz questions.
///
/// Answers are matched by position. Extra answers beyond the question count
/// are ignored; missing answers never count as correct. Returns
/// (correct_count, percentage), where percentage rounds half away from zero.
fn score_answers(questions: &[Question], answers: &[i32]) -> (i32, i32) {
    if questions.is_empty() {
        return (0, 0);
    }

    let mut score = 0;
    for (i, question) in questions.iter().enumerate() {
        if answers.get(i) == Some(&question.correct_answer) {
            score += 1;
        }
    }

    let percentage = ((score as f64 / questions.len() as f64) * 100.0).round() as i32;
    (score, percentage)
}

/// Maps a percentage to the badge tier it earns, if any.
/// Thresholds are checked highest first; at most one tier per attempt.
fn badge_for_percentage(percentage: i32) -> Option<&'static str> {
    if percentage >= EXPERT_THRESHOLD {
        Some("expert")
    } else if percentage >= ADVANCED_THRESHOLD {
        Some("advanced")
    } else if percentage >= INTERMEDIATE_THRESHOLD {
        Some("intermediate")
    } else {
        None
    }
}

/// Serializes a quiz for the caller, hiding correct answers and
/// explanations from everyone who is not teacher/admin.
fn quiz_response(quiz: Quiz, claims: &Claims) -> Response {
    if STAFF_ROLES.contains(&claims.role.as_str()) {
        Json(quiz).into_response()
    } else {
        Json(PublicQuiz::from(quiz)).into_response()
    }
}

/// Lists all quizzes, newest first.
/// Non-staff callers receive questions without the correct-answer indices.
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, category, difficulty, questions, created_by, created_at
        FROM quizzes
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quizzes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if STAFF_ROLES.contains(&claims.role.as_str()) {
        Ok(Json(quizzes).into_response())
    } else {
        let public: Vec<PublicQuiz> = quizzes.into_iter().map(PublicQuiz::from).collect();
        Ok(Json(public).into_response())
    }
}

/// Retrieves a single quiz by ID, with the same redaction rule as the list.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, category, difficulty, questions, created_by, created_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(quiz_response(quiz, &claims))
}

/// Creates a new quiz. Teacher/Admin only.
/// Quizzes are immutable once created.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, &STAFF_ROLES)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (title, description, category, difficulty, questions, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(&payload.difficulty)
    .bind(sqlx::types::Json(&payload.questions))
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Submits a quiz attempt: scores the answers, records the attempt and
/// awards a badge when the percentage clears a threshold.
///
/// The attempt insert and the badge insert share one transaction, so an
/// attempt can never be recorded with its badge missing.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, category, difficulty, questions, created_by, created_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let (score, percentage) = score_answers(&quiz.questions.0, &req.answers);
    let badge = badge_for_percentage(percentage);
    let user_id = claims.user_id();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_attempts (user_id, quiz_id, answers, score, percentage)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(quiz.id)
    .bind(sqlx::types::Json(&req.answers))
    .bind(score)
    .bind(percentage)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if let Some(tier) = badge {
        sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_type, quiz_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(tier)
        .bind(quiz.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to award badge: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let badges: Vec<&str> = badge.into_iter().collect();

    Ok(Json(serde_json::json!({
        "message": "Quiz submitted successfully",
        "attempt_id": attempt_id,
        "score": score,
        "percentage": percentage,
        "badges": badges
    })))
}

/// Lists the caller's quiz attempts, newest first.
pub async fn list_my_attempts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, AttemptHistoryEntry>(
        r#"
        SELECT
            a.id,
            a.quiz_id,
            q.title AS quiz_title,
            q.category AS quiz_category,
            a.score,
            a.percentage,
            a.completed_at
        FROM quiz_attempts a
        JOIN quizzes q ON a.quiz_id = q.id
        WHERE a.user_id = $1
        ORDER BY a.completed_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch attempts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(attempts))
}

/// Lists the caller's badges, newest first.
pub async fn list_my_badges(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let badges = sqlx::query_as::<_, BadgeHistoryEntry>(
        r#"
        SELECT
            b.id,
            b.badge_type,
            b.quiz_id,
            q.title AS quiz_title,
            q.category AS quiz_category,
            b.earned_at
        FROM user_badges b
        JOIN quizzes q ON b.quiz_id = q.id
        WHERE b.user_id = $1
        ORDER BY b.earned_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch badges: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(badges))
}
