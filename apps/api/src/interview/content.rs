//! Remote content-generation service.
//!
//! Every operation here may fail or time out. Callers treat any `RemoteError`
//! as a signal to fall back to local content, never as a user-facing error.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::interview::models::{Answer, Candidate, Difficulty, KeywordCounts, Question, Topic};
use crate::interview::prompts::{
    EVALUATION_PROMPT_TEMPLATE, QUESTION_PROMPT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_TEXT_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

const QUESTION_MAX_TOKENS: u32 = 200;
const EVALUATION_MAX_TOKENS: u32 = 400;
const SUMMARY_MAX_TOKENS: u32 = 600;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("content service is not configured")]
    Unavailable,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("malformed remote response: {0}")]
    Malformed(String),
}

/// Score returned by the remote evaluator, already range-checked.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteEvaluation {
    pub score: u8,
    pub feedback: String,
    #[serde(default)]
    pub keywords: KeywordCounts,
}

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn generate_question(
        &self,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<String, RemoteError>;

    async fn evaluate_answer(
        &self,
        answer: &str,
        question: &Question,
    ) -> Result<RemoteEvaluation, RemoteError>;

    async fn generate_summary(
        &self,
        answers: &[Answer],
        candidate: &Candidate,
    ) -> Result<String, RemoteError>;
}

/// Runs a remote call under a hard deadline; expiry becomes `RemoteError::Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(RemoteError::Timeout(limit)))
}

// ────────────────────────────────────────────────────────────────────────────
// Claude-backed implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmContentService {
    llm: LlmClient,
}

impl LlmContentService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentService for LlmContentService {
    async fn generate_question(
        &self,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<String, RemoteError> {
        let prompt = QUESTION_PROMPT_TEMPLATE
            .replace("{difficulty}", difficulty.as_str())
            .replace("{topic}", topic.as_str());
        let text = self
            .llm
            .call_text(&prompt, PLAIN_TEXT_SYSTEM, QUESTION_MAX_TOKENS)
            .await?;
        Ok(text.trim_matches('"').trim().to_string())
    }

    async fn evaluate_answer(
        &self,
        answer: &str,
        question: &Question,
    ) -> Result<RemoteEvaluation, RemoteError> {
        let prompt = EVALUATION_PROMPT_TEMPLATE
            .replace("{topic}", question.topic.as_str())
            .replace("{difficulty}", question.difficulty.as_str())
            .replace("{question}", &question.text)
            .replace("{answer}", answer);
        let evaluation: RemoteEvaluation = self
            .llm
            .call_json(&prompt, JSON_ONLY_SYSTEM, EVALUATION_MAX_TOKENS)
            .await?;
        validate_evaluation(evaluation)
    }

    async fn generate_summary(
        &self,
        answers: &[Answer],
        candidate: &Candidate,
    ) -> Result<String, RemoteError> {
        let per_question: Vec<_> = answers
            .iter()
            .enumerate()
            .map(|(i, a)| {
                serde_json::json!({
                    "question": i + 1,
                    "score": a.score,
                    "feedback": a.feedback,
                    "time_spent_seconds": a.time_spent_seconds,
                })
            })
            .collect();
        let answers_json = serde_json::to_string(&per_question)
            .map_err(|e| RemoteError::Malformed(format!("failed to serialize answers: {e}")))?;
        let total: u32 = answers.iter().map(|a| u32::from(a.score)).sum();

        let prompt = SUMMARY_PROMPT_TEMPLATE
            .replace("{candidate}", candidate.display_name())
            .replace("{total_score}", &total.to_string())
            .replace("{max_score}", &(answers.len() * 10).to_string())
            .replace("{answers_json}", &answers_json);
        Ok(self
            .llm
            .call_text(&prompt, PLAIN_TEXT_SYSTEM, SUMMARY_MAX_TOKENS)
            .await?)
    }
}

fn validate_evaluation(evaluation: RemoteEvaluation) -> Result<RemoteEvaluation, RemoteError> {
    if evaluation.score > 10 {
        return Err(RemoteError::Malformed(format!(
            "score {} is outside 0..=10",
            evaluation.score
        )));
    }
    if evaluation.feedback.trim().is_empty() {
        return Err(RemoteError::Malformed("empty feedback".to_string()));
    }
    Ok(evaluation)
}

// ────────────────────────────────────────────────────────────────────────────
// Offline implementation
// ────────────────────────────────────────────────────────────────────────────

/// Used when no API key is configured: every call fails, so all cascades run locally.
pub struct OfflineContentService;

#[async_trait]
impl ContentService for OfflineContentService {
    async fn generate_question(&self, _: Topic, _: Difficulty) -> Result<String, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn evaluate_answer(&self, _: &str, _: &Question) -> Result<RemoteEvaluation, RemoteError> {
        Err(RemoteError::Unavailable)
    }

    async fn generate_summary(&self, _: &[Answer], _: &Candidate) -> Result<String, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_converts_expiry_to_timeout() {
        let result: Result<(), RemoteError> = bounded(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(RemoteError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_fast_results() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, RemoteError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_out_of_range_score_is_malformed() {
        let evaluation = RemoteEvaluation {
            score: 11,
            feedback: "Great".to_string(),
            keywords: KeywordCounts::default(),
        };
        assert!(matches!(
            validate_evaluation(evaluation),
            Err(RemoteError::Malformed(_))
        ));
    }

    #[test]
    fn test_remote_evaluation_keywords_default_when_absent() {
        let evaluation: RemoteEvaluation =
            serde_json::from_str(r#"{"score": 6, "feedback": "Solid answer."}"#).unwrap();
        assert_eq!(evaluation.keywords, KeywordCounts::default());
    }

    #[tokio::test]
    async fn test_offline_service_always_fails() {
        let service = OfflineContentService;
        assert!(matches!(
            service.generate_question(Topic::React, Difficulty::Easy).await,
            Err(RemoteError::Unavailable)
        ));
    }
}
