// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{MAX_UPLOAD_BYTES, MULTIPART_HEADROOM_BYTES},
    handlers::{auth, document, profile, study_plan},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, profile, documents, plans).
/// * Everything except `/api/auth` requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me).put(profile::update_me))
        .layer(require_auth.clone());

    let document_routes = Router::new()
        .route(
            "/",
            get(document::list_documents).post(document::upload_document),
        )
        .route("/{id}", get(document::get_document))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_HEADROOM_BYTES))
        .layer(require_auth.clone());

    let plan_routes = Router::new()
        .route("/", get(study_plan::list_plans).post(study_plan::create_plan))
        .route("/{id}", get(study_plan::get_plan))
        .route(
            "/{id}/topics/{topic_id}/subtopics/{subtopic_id}",
            put(study_plan::update_subtopic_status),
        )
        .route(
            "/{id}/schedule/{day_id}/sessions/{session_id}/complete",
            post(study_plan::complete_session),
        )
        .layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/plans", plan_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
