// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Difficulty levels, ordered easiest to hardest.
pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

/// A single question embedded in a quiz.
/// Quizzes store their whole question sequence as a JSONB array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub question: String,

    /// Ordered answer options.
    pub options: Vec<String>,

    /// Index into `options` of the correct answer.
    pub correct_answer: i32,

    /// Optional explanation shown after answering.
    pub explanation: Option<String>,
}

/// Represents the 'quizzes' table in the database.
/// Quizzes are immutable once created; there is no update path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Disaster category (e.g., "earthquake", "fire").
    pub category: String,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    /// Ordered question sequence, stored as a JSONB array.
    pub questions: Json<Vec<Question>>,

    pub created_by: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Question DTO for quiz-taking clients (excludes answer and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// Quiz DTO for quiz-taking clients.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub questions: Vec<PublicQuestion>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        let questions = quiz
            .questions
            .0
            .into_iter()
            .map(|q| PublicQuestion {
                question: q.question,
                options: q.options,
            })
            .collect();

        PublicQuiz {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            category: quiz.category,
            difficulty: quiz.difficulty,
            questions,
            created_at: quiz.created_at,
        }
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: String,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    if !DIFFICULTIES.contains(&difficulty) {
        return Err(validator::ValidationError::new("unknown_difficulty"));
    }
    Ok(())
}

fn validate_questions(questions: &[Question]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("questions_cannot_be_empty"));
    }
    for q in questions {
        if q.question.is_empty() || q.question.len() > 1000 {
            return Err(validator::ValidationError::new("question_text_length"));
        }
        if q.options.len() < 2 {
            return Err(validator::ValidationError::new("too_few_options"));
        }
        if q.options.iter().any(|o| o.is_empty() || o.len() > 500) {
            return Err(validator::ValidationError::new("option_length"));
        }
        // The correct-answer index must point at an existing option.
        if q.correct_answer < 0 || q.correct_answer as usize >= q.options.len() {
            return Err(validator::ValidationError::new("correct_answer_out_of_bounds"));
        }
    }
    Ok(())
}

/// DTO for submitting a quiz attempt.
/// Answers are option indices, positionally matched to the quiz questions.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<i32>,
}

/// Represents the 'quiz_attempts' table in the database.
/// Attempts are append-only; a row is never mutated after insertion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub answers: Json<Vec<i32>>,
    pub score: i32,
    pub percentage: i32,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Attempt row joined with quiz metadata for history listings.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptHistoryEntry {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub quiz_category: String,
    pub score: i32,
    pub percentage: i32,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
