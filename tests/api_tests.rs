// tests/api_tests.rs

use backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // Note: For Postgres, you must have a running database.
    // We'll read from DATABASE_URL environment variable.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState { pool, config };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background (ConnectInfo feeds the rate limiter)
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

/// Registers a user with the given role and returns a login token.
async fn register_and_login(address: &str, client: &reqwest::Client, role: &str) -> String {
    let email = format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let resp = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": password,
            "name": "Test User",
            "role": role
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status().as_u16(), 201);

    let login_resp = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    login_resp["token"].as_str().expect("Token not found").to_string()
}

/// Creates a four-question quiz as the given staff token and returns its id.
async fn create_fixture_quiz(address: &str, client: &reqwest::Client, token: &str) -> i64 {
    let resp = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Earthquake basics",
            "description": "What to do when the ground shakes",
            "category": "earthquake",
            "difficulty": "easy",
            "questions": [
                {"question": "Q1", "options": ["A", "B", "C"], "correct_answer": 1, "explanation": null},
                {"question": "Q2", "options": ["A", "B"], "correct_answer": 0, "explanation": "Drop, cover, hold on."},
                {"question": "Q3", "options": ["A", "B", "C"], "correct_answer": 2, "explanation": null},
                {"question": "Q4", "options": ["A", "B"], "correct_answer": 1, "explanation": null}
            ]
        }))
        .send()
        .await
        .expect("Create quiz failed");
    assert_eq!(resp.status().as_u16(), 201);

    let body: serde_json::Value = resp.json().await.unwrap();
    body["id"].as_i64().expect("Quiz id not found")
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: Send a password that is too short
    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "short@example.com",
            "password": "yo",
            "name": "Shorty",
            "role": "student"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "role@example.com",
            "password": "password123",
            "name": "Nobody",
            "role": "superuser"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quizzes_require_auth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/quizzes", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn student_cannot_create_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student_token = register_and_login(&address, &client, "student").await;

    let response = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({
            "title": "Nope",
            "description": "",
            "category": "fire",
            "difficulty": "easy",
            "questions": [
                {"question": "Q", "options": ["A", "B"], "correct_answer": 0, "explanation": null}
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn quiz_rejects_out_of_bounds_correct_answer() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher_token = register_and_login(&address, &client, "teacher").await;

    let response = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({
            "title": "Broken",
            "description": "",
            "category": "fire",
            "difficulty": "easy",
            "questions": [
                {"question": "Q", "options": ["A", "B"], "correct_answer": 5, "explanation": null}
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quiz_answers_are_hidden_from_students() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher_token = register_and_login(&address, &client, "teacher").await;
    let student_token = register_and_login(&address, &client, "student").await;
    let quiz_id = create_fixture_quiz(&address, &client, &teacher_token).await;

    // Student view: options only
    let student_view: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let first = &student_view["questions"][0];
    assert!(first["options"].is_array());
    assert!(first.get("correct_answer").is_none());
    assert!(first.get("explanation").is_none());

    // Staff view: full question data
    let teacher_view: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(teacher_view["questions"][0]["correct_answer"], 1);
}

#[tokio::test]
async fn test_quiz_submission_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher_token = register_and_login(&address, &client, "teacher").await;
    let student_token = register_and_login(&address, &client, "student").await;
    let quiz_id = create_fixture_quiz(&address, &client, &teacher_token).await;

    // 1. Perfect submission earns the expert badge
    let submit_resp = client
        .post(&format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": [1, 0, 2, 1] }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(submit_resp.status().as_u16(), 200);
    let result: serde_json::Value = submit_resp.json().await.unwrap();
    assert_eq!(result["score"], 4);
    assert_eq!(result["percentage"], 100);
    assert_eq!(result["badges"], serde_json::json!(["expert"]));

    // 2. A second submission with one wrong answer is scored independently
    let submit_resp = client
        .post(&format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": [1, 1, 2, 1] }))
        .send()
        .await
        .expect("Submit failed");

    let result: serde_json::Value = submit_resp.json().await.unwrap();
    assert_eq!(result["score"], 3);
    assert_eq!(result["percentage"], 75);
    assert_eq!(result["badges"], serde_json::json!(["advanced"]));

    // 3. Attempt history holds both attempts, newest first
    let attempts: serde_json::Value = client
        .get(&format!("{}/api/quizzes/user/attempts", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["percentage"], 75);
    assert_eq!(attempts[1]["percentage"], 100);
    assert_eq!(attempts[0]["quiz_title"], "Earthquake basics");

    // 4. Both badges were recorded
    let badges: serde_json::Value = client
        .get(&format!("{}/api/quizzes/user/badges", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let badges = badges.as_array().unwrap();
    assert_eq!(badges.len(), 2);
    assert_eq!(badges[0]["badge_type"], "advanced");
    assert_eq!(badges[1]["badge_type"], "expert");
}

#[tokio::test]
async fn low_score_earns_no_badge() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher_token = register_and_login(&address, &client, "teacher").await;
    let student_token = register_and_login(&address, &client, "student").await;
    let quiz_id = create_fixture_quiz(&address, &client, &teacher_token).await;

    // 1 of 4 correct: 25%, below every threshold
    let result: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": [1, 1, 1, 0] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["score"], 1);
    assert_eq!(result["percentage"], 25);
    assert_eq!(result["badges"], serde_json::json!([]));

    let badges: serde_json::Value = client
        .get(&format!("{}/api/quizzes/user/badges", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(badges.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn submit_unknown_quiz_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student_token = register_and_login(&address, &client, "student").await;

    let response = client
        .post(&format!("{}/api/quizzes/999999999/submit", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": [0] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}
