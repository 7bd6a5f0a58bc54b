//! Answer scoring through an ordered cascade of pluggable scorers.
//!
//! Default cascade: `RemoteAnswerScorer` (Claude) → `KeywordAnswerScorer`
//! (pure-Rust, deterministic). The keyword scorer never fails, so the cascade
//! always produces a result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interview::content::{bounded, ContentService, RemoteError};
use crate::interview::models::{KeywordCounts, Provenance, Question};
use crate::interview::templates::{keyword_table, KeywordTable, HIGH_WEIGHT, LOW_WEIGHT, MEDIUM_WEIGHT};

/// Trimmed answers shorter than this are not keyword-scored.
pub const MIN_ANSWER_CHARS: usize = 10;
pub const TOO_BRIEF_SCORE: u8 = 2;
pub const TOO_BRIEF_FEEDBACK: &str =
    "Answer is too brief. Please provide more detailed explanation.";
const MAX_LENGTH_BONUS: f64 = 2.0;
const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub score: u8, // 0 – 10
    pub feedback: String,
    pub keywords: KeywordCounts,
    pub scored_by: Provenance,
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AnswerScorer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, answer: &str, question: &Question) -> Result<Evaluation, RemoteError>;
}

/// Delegates to the remote content service under the remote deadline.
pub struct RemoteAnswerScorer {
    content: Arc<dyn ContentService>,
    timeout: Duration,
}

impl RemoteAnswerScorer {
    pub fn new(content: Arc<dyn ContentService>, timeout: Duration) -> Self {
        Self { content, timeout }
    }
}

#[async_trait]
impl AnswerScorer for RemoteAnswerScorer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn score(&self, answer: &str, question: &Question) -> Result<Evaluation, RemoteError> {
        let remote = bounded(self.timeout, self.content.evaluate_answer(answer, question)).await?;
        Ok(Evaluation {
            score: remote.score.min(10),
            feedback: remote.feedback,
            keywords: remote.keywords,
            scored_by: Provenance::Remote,
        })
    }
}

/// Keyword-weighted local scorer.
///
/// Algorithm:
/// 1. Trimmed answer shorter than `MIN_ANSWER_CHARS` → fixed score, no keyword scan
/// 2. Each distinct keyword found (case-insensitive substring) adds its tier weight: 3 / 2 / 1
/// 3. Length bonus: `min(chars / 100, 2)`
/// 4. Total clamped to 10, rounded to the nearest integer
/// 5. Feedback band from the unrounded total: ≥8, ≥6, ≥4, else
pub struct KeywordAnswerScorer;

#[async_trait]
impl AnswerScorer for KeywordAnswerScorer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn score(&self, answer: &str, question: &Question) -> Result<Evaluation, RemoteError> {
        Ok(score_with_keywords(answer, keyword_table(question.topic)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cascade
// ────────────────────────────────────────────────────────────────────────────

pub struct AnswerEvaluator {
    scorers: Vec<Arc<dyn AnswerScorer>>,
}

impl AnswerEvaluator {
    /// Remote first, keyword scoring as the terminal fallback.
    pub fn new(content: Arc<dyn ContentService>, remote_timeout: Duration) -> Self {
        Self::with_scorers(vec![
            Arc::new(RemoteAnswerScorer::new(content, remote_timeout)),
            Arc::new(KeywordAnswerScorer),
        ])
    }

    pub fn with_scorers(scorers: Vec<Arc<dyn AnswerScorer>>) -> Self {
        Self { scorers }
    }

    pub async fn evaluate(&self, answer: &str, question: &Question) -> Evaluation {
        for scorer in &self.scorers {
            match scorer.score(answer, question).await {
                Ok(evaluation) => {
                    debug!(
                        "Answer to {} scored {}/10 by {} scorer",
                        question.id,
                        evaluation.score,
                        scorer.name()
                    );
                    return evaluation;
                }
                Err(e) => warn!("{} scorer failed, trying next: {e}", scorer.name()),
            }
        }
        score_with_keywords(answer, keyword_table(question.topic))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local keyword algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn score_with_keywords(answer: &str, table: &KeywordTable) -> Evaluation {
    let trimmed = answer.trim();
    let length = trimmed.chars().count();

    if length < MIN_ANSWER_CHARS {
        return Evaluation {
            score: TOO_BRIEF_SCORE,
            feedback: TOO_BRIEF_FEEDBACK.to_string(),
            keywords: KeywordCounts::default(),
            scored_by: Provenance::Fallback,
        };
    }

    let normalized = trimmed.to_lowercase();
    let matches = |tier: &[&str]| tier.iter().filter(|kw| normalized.contains(*kw)).count() as u32;
    let keywords = KeywordCounts {
        high: matches(table.high),
        medium: matches(table.medium),
        low: matches(table.low),
    };

    let base = f64::from(
        keywords.high * HIGH_WEIGHT + keywords.medium * MEDIUM_WEIGHT + keywords.low * LOW_WEIGHT,
    );
    let length_bonus = (length as f64 / 100.0).min(MAX_LENGTH_BONUS);
    let total = (base + length_bonus).min(MAX_SCORE);

    Evaluation {
        score: total.round() as u8,
        feedback: feedback_for(total).to_string(),
        keywords,
        scored_by: Provenance::Fallback,
    }
}

pub fn feedback_for(score: f64) -> &'static str {
    if score >= 8.0 {
        "Excellent answer! Demonstrates strong understanding of the topic."
    } else if score >= 6.0 {
        "Good answer with solid understanding. Consider elaborating on key concepts."
    } else if score >= 4.0 {
        "Decent answer, but could benefit from more specific details and examples."
    } else {
        "Answer needs more depth and specific technical details."
    }
}
