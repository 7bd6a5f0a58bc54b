pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/restore", post(handlers::handle_restore))
        .route(
            "/api/v1/sessions/:candidate_id",
            get(handlers::handle_get_session).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:candidate_id/fields",
            post(handlers::handle_provide_field),
        )
        .route(
            "/api/v1/sessions/:candidate_id/start",
            post(handlers::handle_start),
        )
        .route(
            "/api/v1/sessions/:candidate_id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:candidate_id/reset",
            post(handlers::handle_reset),
        )
        .route(
            "/api/v1/sessions/:candidate_id/snapshot",
            get(handlers::handle_snapshot),
        )
        // Candidates (reporting)
        .route("/api/v1/candidates", get(handlers::handle_list_candidates))
        .route(
            "/api/v1/candidates/stats",
            get(handlers::handle_candidate_stats),
        )
        .route("/api/v1/candidates/:id", get(handlers::handle_get_candidate))
        .with_state(state)
}
