use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::InterviewSession;
use crate::interview::models::{Answer, Candidate, ContactDetails, ContactField, Phase, Question};
use crate::interview::registry::SessionHandle;
use crate::interview::snapshot::SessionSnapshot;
use crate::interview::store::{CandidateQuery, CandidateStats};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProvideFieldRequest {
    pub field: ContactField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub text: String,
}

/// What a client needs to render the interview screen.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub candidate_id: Uuid,
    pub phase: Phase,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: Option<Question>,
    pub remaining_seconds: u32,
    pub timer_active: bool,
    pub missing_fields: Vec<ContactField>,
    pub answers: Vec<Answer>,
    pub candidate: Candidate,
}

impl SessionView {
    fn of(engine: &InterviewSession) -> Self {
        let session = engine.session();
        Self {
            candidate_id: engine.candidate_id(),
            phase: session.phase,
            current_index: session.current_index,
            total_questions: session.questions.len(),
            current_question: engine.current_question().cloned(),
            remaining_seconds: session.remaining_seconds,
            timer_active: session.timer_active,
            missing_fields: session.missing_fields.clone(),
            answers: session.answers.clone(),
            candidate: engine.candidate().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub answer: Answer,
    pub session: SessionView,
}

async fn session_handle(state: &AppState, candidate_id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .registry
        .get(candidate_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No session for candidate {candidate_id}")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(contact): Json<ContactDetails>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let engine = InterviewSession::intake(Arc::clone(&state.services), contact).await?;
    let view = SessionView::of(&engine);
    state.registry.register(engine).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:candidate_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let engine = handle.lock().await;
    Ok(Json(SessionView::of(&engine)))
}

/// POST /api/v1/sessions/:candidate_id/fields
pub async fn handle_provide_field(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(req): Json<ProvideFieldRequest>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let mut engine = handle.lock().await;
    engine.provide_field(req.field, &req.value).await?;
    Ok(Json(SessionView::of(&engine)))
}

/// POST /api/v1/sessions/:candidate_id/start
pub async fn handle_start(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let mut engine = handle.lock().await;
    engine.skip_collection().await?;
    Ok(Json(SessionView::of(&engine)))
}

/// POST /api/v1/sessions/:candidate_id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let mut engine = handle.lock().await;
    let answer = engine.submit_answer(&req.text).await?;
    Ok(Json(SubmitAnswerResponse {
        answer,
        session: SessionView::of(&engine),
    }))
}

/// POST /api/v1/sessions/:candidate_id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let mut engine = handle.lock().await;
    engine.reset().await?;
    Ok(Json(SessionView::of(&engine)))
}

/// DELETE /api/v1/sessions/:candidate_id
/// Stops the session's ticker and forgets it. The candidate record stays in the store.
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .remove(candidate_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No session for candidate {candidate_id}")))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:candidate_id/snapshot
pub async fn handle_snapshot(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = session_handle(&state, candidate_id).await?;
    let engine = handle.lock().await;
    Ok(Json(engine.snapshot()))
}

/// POST /api/v1/sessions/restore
pub async fn handle_restore(
    State(state): State<AppState>,
    Json(snapshot): Json<SessionSnapshot>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let engine = InterviewSession::restore(Arc::clone(&state.services), snapshot).await?;
    let candidate_id = engine.candidate_id();
    // The store is only touched once the registry slot is ours.
    let handle = state.registry.register(engine).await?;
    let mut engine = handle.lock().await;
    if let Err(e) = engine.persist_restored().await {
        drop(engine);
        state.registry.remove(candidate_id).await;
        return Err(e);
    }
    Ok((StatusCode::CREATED, Json(SessionView::of(&engine))))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(state.services.store.list(&query).await?))
}

/// GET /api/v1/candidates/stats
pub async fn handle_candidate_stats(
    State(state): State<AppState>,
) -> Result<Json<CandidateStats>, AppError> {
    Ok(Json(state.services.store.stats().await?))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, AppError> {
    state
        .services
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}
