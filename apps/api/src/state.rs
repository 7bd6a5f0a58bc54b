use std::sync::Arc;

use crate::config::Config;
use crate::interview::engine::InterviewServices;
use crate::interview::registry::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Supplier, evaluator, aggregator and candidate store shared by every session.
    pub services: Arc<InterviewServices>,
    pub registry: SessionRegistry,
    pub config: Config,
}
