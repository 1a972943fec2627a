// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, drill, emergency, profile, quiz, video},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, quizzes, videos, drills, emergency, admin).
/// * Applies global middleware (Trace, CORS, rate limit).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Keyed by peer IP; the server must be driven through
    // `into_make_service_with_connect_info` for the extractor to see one.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .unwrap();
    let governor_conf = Arc::new(governor_conf);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route("/", get(profile::list_users))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/students", get(profile::list_my_students));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route("/user/attempts", get(quiz::list_my_attempts))
        .route("/user/badges", get(quiz::list_my_badges))
        .route("/{id}", get(quiz::get_quiz))
        .route("/{id}/submit", post(quiz::submit_quiz));

    let video_routes = Router::new()
        .route("/", get(video::list_videos))
        .route("/user/progress", get(video::list_my_progress))
        .route("/{id}", get(video::get_video))
        .route("/{id}/progress", post(video::update_progress));

    let drill_routes = Router::new()
        .route("/", get(drill::list_drills).post(drill::create_drill))
        .route("/user/registrations", get(drill::list_my_registrations))
        .route("/{id}", get(drill::get_drill))
        .route("/{id}/register", post(drill::register_for_drill))
        .route("/{id}/attendance", post(drill::mark_attendance));

    let emergency_routes = Router::new()
        .route(
            "/contacts",
            get(emergency::list_contacts).post(emergency::create_contact),
        )
        .route("/alert", post(emergency::send_alert))
        .route("/alerts", get(emergency::list_alerts));

    // Double middleware protection: Auth first, then Admin check
    let admin_routes = Router::new()
        .route("/stats", get(admin::get_stats))
        .route("/content/upload", post(admin::upload_content))
        .layer(middleware::from_fn(admin_middleware));

    let protected_routes = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/videos", video_routes)
        .nest("/api/drills", drill_routes)
        .nest("/api/emergency", emergency_routes)
        .nest("/api/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(GovernorLayer::new(governor_conf))
        .with_state(state)
}
