// tests/progress_tests.rs

use backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "progress_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState { pool, config };
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

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

#[tokio::test]
async fn test_video_progress_upsert() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = register_and_login(&address, &client, "admin").await;
    let student_token = register_and_login(&address, &client, "student").await;

    // Admin uploads a video
    let upload: serde_json::Value = client
        .post(&format!("{}/api/admin/content/upload", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "title": "Fire safety at home",
            "description": "Extinguisher basics",
            "type": "video",
            "url": "https://videos.example.com/fire-safety.mp4",
            "category": "fire",
            "duration": 420
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let video_id = upload["content"]["id"].as_i64().unwrap();

    // Student reports 40%, then 80%
    for (progress, completed) in [(40, false), (80, false)] {
        let resp = client
            .post(&format!("{}/api/videos/{}/progress", address, video_id))
            .header("Authorization", format!("Bearer {}", student_token))
            .json(&serde_json::json!({ "progress": progress, "completed": completed }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    // Exactly one row remains, holding the latest value
    let progress: serde_json::Value = client
        .get(&format!("{}/api/videos/user/progress", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = progress.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["progress"], 80);
    assert_eq!(rows[0]["completed"], false);
    assert_eq!(rows[0]["video_title"], "Fire safety at home");
}

#[tokio::test]
async fn progress_out_of_range_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = register_and_login(&address, &client, "admin").await;
    let student_token = register_and_login(&address, &client, "student").await;

    let upload: serde_json::Value = client
        .post(&format!("{}/api/admin/content/upload", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "title": "Flood response",
            "description": "",
            "type": "video",
            "url": "https://videos.example.com/flood.mp4",
            "category": "flood",
            "duration": 300
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let video_id = upload["content"]["id"].as_i64().unwrap();

    let resp = client
        .post(&format!("{}/api/videos/{}/progress", address, video_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "progress": 150, "completed": false }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn test_drill_registration_and_attendance() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher_token = register_and_login(&address, &client, "teacher").await;
    let student_token = register_and_login(&address, &client, "student").await;

    // Teacher schedules a drill
    let create_resp = client
        .post(&format!("{}/api/drills", address))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({
            "title": "Quarterly earthquake drill",
            "description": "Full building evacuation",
            "type": "earthquake",
            "scheduled_date": "2026-09-15T09:00:00Z",
            "location": "Main campus",
            "instructions": "Line up at the <b>assembly point</b>."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status().as_u16(), 201);
    let drill: serde_json::Value = create_resp.json().await.unwrap();
    let drill_id = drill["id"].as_i64().unwrap();

    // Student registers once: success
    let first = client
        .post(&format!("{}/api/drills/{}/register", address, drill_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 200);
    let body: serde_json::Value = first.json().await.unwrap();
    let student_id = body["registration"]["user_id"].as_i64().unwrap();

    // Registering again for the same drill is rejected
    let second = client
        .post(&format!("{}/api/drills/{}/register", address, drill_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);

    // Students cannot mark attendance
    let forbidden = client
        .post(&format!("{}/api/drills/{}/attendance", address, drill_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "user_id": student_id, "attended": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    // Teacher marks attendance; re-marking replaces the value
    for attended in [true, false] {
        let resp = client
            .post(&format!("{}/api/drills/{}/attendance", address, drill_id))
            .header("Authorization", format!("Bearer {}", teacher_token))
            .json(&serde_json::json!({ "user_id": student_id, "attended": attended }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["attendance"]["attended"], attended);
    }

    // Registration history shows the drill
    let registrations: serde_json::Value = client
        .get(&format!("{}/api/drills/user/registrations", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = registrations.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["drill_title"], "Quarterly earthquake drill");
}

#[tokio::test]
async fn test_emergency_directory_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = register_and_login(&address, &client, "admin").await;
    let student_token = register_and_login(&address, &client, "student").await;

    // Students cannot add contacts
    let forbidden = client
        .post(&format!("{}/api/emergency/contacts", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({
            "name": "Campus security",
            "phone": "555-0100",
            "priority": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    // Admin adds a contact
    let created = client
        .post(&format!("{}/api/emergency/contacts", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "name": "Campus security",
            "phone": "555-0100",
            "department": "Security",
            "priority": 1,
            "description": "24/7 dispatch"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);

    // Everyone can browse the directory
    let contacts_resp = client
        .get(&format!("{}/api/emergency/contacts", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap();
    assert_eq!(contacts_resp.status().as_u16(), 200);
    let contacts: serde_json::Value = contacts_resp.json().await.unwrap();
    assert!(!contacts.as_array().unwrap().is_empty());

    // Alert messages are sanitized before storage
    let alert: serde_json::Value = client
        .post(&format!("{}/api/emergency/alert", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "message": "Evacuate now<script>alert(1)</script>",
            "type": "drill"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let stored = alert["alert"]["message"].as_str().unwrap();
    assert!(!stored.contains("<script>"));
    assert!(stored.contains("Evacuate now"));
}
