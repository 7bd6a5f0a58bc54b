//! Candidate persistence.
//!
//! The engine only needs create / update / attach_result; the list and stats
//! queries back the reporting endpoints. `InMemoryCandidateStore` is the
//! in-process implementation; durable backends plug in behind the same trait.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::interview::models::{Candidate, CandidateStatus, InterviewResult};

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<CandidateStatus>,
    /// Drops the stored interview result.
    pub clear_result: bool,
    pub updated_at: DateTime<Utc>,
}

impl CandidatePatch {
    pub fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            name: None,
            email: None,
            phone: None,
            status: None,
            clear_result: false,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Score,
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateQuery {
    pub search: Option<String>,
    pub status: Option<CandidateStatus>,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateStats {
    pub total: usize,
    pub completed: usize,
    /// Mean total score over completed candidates; 0 when none completed.
    pub average_score: f64,
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn create(&self, candidate: Candidate) -> Result<Candidate>;

    async fn get(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>>;

    /// Marks the candidate completed and stores its interview result.
    async fn attach_result(&self, id: Uuid, result: InterviewResult) -> Result<Option<Candidate>>;

    async fn list(&self, query: &CandidateQuery) -> Result<Vec<Candidate>>;

    async fn stats(&self) -> Result<CandidateStats>;
}

#[derive(Default)]
pub struct InMemoryCandidateStore {
    candidates: RwLock<HashMap<Uuid, Candidate>>,
}

impl InMemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn create(&self, candidate: Candidate) -> Result<Candidate> {
        debug!("Storing candidate {}", candidate.id);
        self.candidates
            .write()
            .await
            .insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.candidates.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>> {
        let mut candidates = self.candidates.write().await;
        let Some(candidate) = candidates.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            candidate.name = Some(name);
        }
        if let Some(email) = patch.email {
            candidate.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            candidate.phone = Some(phone);
        }
        if let Some(status) = patch.status {
            candidate.status = status;
        }
        if patch.clear_result {
            candidate.result = None;
        }
        candidate.updated_at = patch.updated_at;
        Ok(Some(candidate.clone()))
    }

    async fn attach_result(&self, id: Uuid, result: InterviewResult) -> Result<Option<Candidate>> {
        let mut candidates = self.candidates.write().await;
        let Some(candidate) = candidates.get_mut(&id) else {
            return Ok(None);
        };
        candidate.status = CandidateStatus::Completed;
        candidate.updated_at = result.end_time;
        candidate.result = Some(result);
        Ok(Some(candidate.clone()))
    }

    async fn list(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
        let candidates: Vec<Candidate> = self.candidates.read().await.values().cloned().collect();
        Ok(apply_query(candidates, query))
    }

    async fn stats(&self) -> Result<CandidateStats> {
        let candidates = self.candidates.read().await;
        Ok(compute_stats(candidates.values()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reporting helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn apply_query(candidates: Vec<Candidate>, query: &CandidateQuery) -> Vec<Candidate> {
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut matched: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| query.status.map_or(true, |status| c.status == status))
        .filter(|c| needle.as_deref().map_or(true, |n| matches_search(c, n)))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort_by);
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    matched
}

fn matches_search(candidate: &Candidate, needle: &str) -> bool {
    [&candidate.name, &candidate.email, &candidate.phone]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &Candidate, b: &Candidate, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Score => a.total_score().unwrap_or(0).cmp(&b.total_score().unwrap_or(0)),
        SortKey::Name => a
            .display_name()
            .to_lowercase()
            .cmp(&b.display_name().to_lowercase()),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    // Stable tie-break so equal keys list in creation order.
    primary.then_with(|| a.created_at.cmp(&b.created_at))
}

pub fn compute_stats<'a>(candidates: impl Iterator<Item = &'a Candidate>) -> CandidateStats {
    let mut total = 0;
    let mut completed = 0;
    let mut score_sum = 0u64;
    for candidate in candidates {
        total += 1;
        if candidate.status == CandidateStatus::Completed {
            completed += 1;
            score_sum += u64::from(candidate.total_score().unwrap_or(0));
        }
    }
    let average_score = if completed == 0 {
        0.0
    } else {
        score_sum as f64 / completed as f64
    };
    CandidateStats {
        total,
        completed,
        average_score,
    }
}
