//! Live sessions keyed by candidate, each with its own one-second ticker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::InterviewSession;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Serialized access to one session: whoever holds the lock is the only writer.
pub type SessionHandle = Arc<Mutex<InterviewSession>>;

struct Entry {
    handle: SessionHandle,
    ticker: JoinHandle<()>,
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the session and starts its ticker. A candidate may hold only
    /// one session at a time.
    pub async fn register(&self, session: InterviewSession) -> Result<SessionHandle, AppError> {
        let candidate_id = session.candidate_id();
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&candidate_id) {
            return Err(AppError::Conflict(format!(
                "Candidate {candidate_id} already has an active session"
            )));
        }

        let handle = Arc::new(Mutex::new(session));
        let ticker = spawn_ticker(candidate_id, Arc::clone(&handle));
        sessions.insert(
            candidate_id,
            Entry {
                handle: Arc::clone(&handle),
                ticker,
            },
        );
        debug!("Registered session for candidate {candidate_id}");
        Ok(handle)
    }

    pub async fn get(&self, candidate_id: Uuid) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&candidate_id)
            .map(|entry| Arc::clone(&entry.handle))
    }

    /// Stops the ticker and drops the session from the registry.
    pub async fn remove(&self, candidate_id: Uuid) -> Option<SessionHandle> {
        let entry = self.sessions.write().await.remove(&candidate_id)?;
        entry.ticker.abort();
        debug!("Removed session for candidate {candidate_id}");
        Some(entry.handle)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn spawn_ticker(candidate_id: Uuid, handle: SessionHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut session = handle.lock().await;
            if let Err(e) = session.tick().await {
                warn!("Tick failed for candidate {candidate_id}: {e}");
            }
        }
    })
}
