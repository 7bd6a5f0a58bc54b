//! Content-service doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::interview::content::{ContentService, RemoteError, RemoteEvaluation};
use crate::interview::models::{Answer, Candidate, Difficulty, Question, Topic};

async fn stall() {
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

#[derive(Debug, Clone, Copy, Default)]
pub enum QuestionMode {
    /// Fresh text per call; easy calls finish last so completion order differs from slot order.
    #[default]
    Unique,
    /// Same text for every call.
    Constant(&'static str),
    Fail,
    /// Never returns within any reasonable deadline.
    Hang,
}

#[derive(Default)]
pub struct ScriptedContent {
    pub question_mode: QuestionMode,
    pub evaluation: Option<RemoteEvaluation>,
    pub summary: Option<String>,
    /// Evaluation and summary calls stall for an hour before answering.
    pub stall_evaluation: bool,
    pub stall_summary: bool,
    pub question_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
}

#[async_trait]
impl ContentService for ScriptedContent {
    async fn generate_question(
        &self,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<String, RemoteError> {
        let n = self.question_calls.fetch_add(1, Ordering::SeqCst);
        match self.question_mode {
            QuestionMode::Unique => {
                let delay = match difficulty {
                    Difficulty::Easy => 30,
                    Difficulty::Medium => 20,
                    Difficulty::Hard => 10,
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(format!(
                    "Remote {} question {n} about {}?",
                    difficulty.as_str(),
                    topic.as_str()
                ))
            }
            QuestionMode::Constant(text) => Ok(text.to_string()),
            QuestionMode::Fail => Err(RemoteError::Unavailable),
            QuestionMode::Hang => {
                stall().await;
                Err(RemoteError::Unavailable)
            }
        }
    }

    async fn evaluate_answer(
        &self,
        _answer: &str,
        _question: &Question,
    ) -> Result<RemoteEvaluation, RemoteError> {
        if self.stall_evaluation {
            stall().await;
        }
        self.evaluation.clone().ok_or(RemoteError::Unavailable)
    }

    async fn generate_summary(
        &self,
        _answers: &[Answer],
        _candidate: &Candidate,
    ) -> Result<String, RemoteError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_summary {
            stall().await;
        }
        self.summary.clone().ok_or(RemoteError::Unavailable)
    }
}
