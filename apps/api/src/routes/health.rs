use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version, content mode and the number of live sessions.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let content = if state.config.anthropic_api_key.is_some() {
        "remote"
    } else {
        "offline"
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "content": content,
        "question_count": state.config.question_count,
        "active_sessions": state.registry.len().await
    }))
}
