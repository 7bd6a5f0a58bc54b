//! Session aggregation: the final score and narrative summary for a candidate.
//!
//! Summary cascade: remote summary → banded canned narrative → one-line
//! completion notice. Completion never depends on which level succeeded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::interview::content::{bounded, ContentService, RemoteError};
use crate::interview::models::{Answer, Candidate, CandidateStatus, InterviewResult, Session};
use crate::interview::timer::Clock;

#[async_trait]
pub trait SummaryWriter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, answers: &[Answer], candidate: &Candidate) -> Result<String, RemoteError>;
}

pub struct RemoteSummaryWriter {
    content: Arc<dyn ContentService>,
    timeout: Duration,
}

impl RemoteSummaryWriter {
    pub fn new(content: Arc<dyn ContentService>, timeout: Duration) -> Self {
        Self { content, timeout }
    }
}

#[async_trait]
impl SummaryWriter for RemoteSummaryWriter {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn write(&self, answers: &[Answer], candidate: &Candidate) -> Result<String, RemoteError> {
        let summary = bounded(self.timeout, self.content.generate_summary(answers, candidate)).await?;
        if summary.trim().is_empty() {
            return Err(RemoteError::Malformed("empty summary".to_string()));
        }
        Ok(summary)
    }
}

/// Canned narrative picked by average per-question score. Fails on an empty
/// answer list, where no average exists.
pub struct BandedSummaryWriter;

#[async_trait]
impl SummaryWriter for BandedSummaryWriter {
    fn name(&self) -> &'static str {
        "banded"
    }

    async fn write(&self, answers: &[Answer], candidate: &Candidate) -> Result<String, RemoteError> {
        if answers.is_empty() {
            return Err(RemoteError::Malformed(
                "no answers to average".to_string(),
            ));
        }
        let total: u32 = answers.iter().map(|a| u32::from(a.score)).sum();
        let average = f64::from(total) / answers.len() as f64;
        Ok(banded_summary(candidate.display_name(), average))
    }
}

pub fn banded_summary(name: &str, average: f64) -> String {
    if average >= 8.0 {
        format!(
            "{name} demonstrated excellent technical knowledge and problem-solving skills throughout the interview. \
             They provided detailed, well-structured answers that showed deep understanding of React, JavaScript, and web development concepts. \
             Strong candidate for full-stack development roles with immediate contribution potential."
        )
    } else if average >= 6.0 {
        format!(
            "{name} showed good understanding of fundamental concepts with some areas for improvement. \
             Their answers were generally clear and demonstrated practical knowledge. \
             With some additional experience, they would be a solid contributor to development teams."
        )
    } else if average >= 4.0 {
        format!(
            "{name} has basic understanding of the topics but needs more hands-on experience. \
             Their answers lacked depth in some technical areas and would benefit from further study. \
             May need mentorship and training before taking on complex development tasks."
        )
    } else {
        format!(
            "{name} needs significant improvement in technical knowledge and problem-solving skills. \
             Their answers were often brief and lacked understanding of key concepts. \
             Would benefit from foundational training before being considered for development roles."
        )
    }
}

/// Last-resort summary; cannot fail.
pub fn completion_notice(name: &str, total_score: u32) -> String {
    format!("{name} completed the interview with a total score of {total_score}.")
}

pub struct SessionAggregator {
    writers: Vec<Arc<dyn SummaryWriter>>,
    clock: Arc<dyn Clock>,
}

impl SessionAggregator {
    pub fn new(content: Arc<dyn ContentService>, remote_timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_writers(
            vec![
                Arc::new(RemoteSummaryWriter::new(content, remote_timeout)),
                Arc::new(BandedSummaryWriter),
            ],
            clock,
        )
    }

    pub fn with_writers(writers: Vec<Arc<dyn SummaryWriter>>, clock: Arc<dyn Clock>) -> Self {
        Self { writers, clock }
    }

    /// Attaches the interview result and marks the candidate completed.
    ///
    /// A candidate that is already completed with a result is returned
    /// unchanged, so repeated calls never re-total or re-summarize.
    pub async fn finalize(&self, session: &Session, candidate: &Candidate) -> Candidate {
        if candidate.status == CandidateStatus::Completed && candidate.result.is_some() {
            info!("Candidate {} already finalized, skipping", candidate.id);
            return candidate.clone();
        }

        let total_score = session.total_score();
        let summary = self.summarize(&session.answers, candidate, total_score).await;
        let now = self.clock.now();

        let mut finalized = candidate.clone();
        finalized.status = CandidateStatus::Completed;
        finalized.updated_at = now;
        finalized.result = Some(InterviewResult {
            total_score,
            summary,
            end_time: now,
            questions: session.questions.clone(),
            answers: session.answers.clone(),
        });

        info!(
            "Finalized candidate {}: {}/{} over {} answers",
            candidate.id,
            total_score,
            session.answers.len() * 10,
            session.answers.len()
        );
        finalized
    }

    async fn summarize(&self, answers: &[Answer], candidate: &Candidate, total_score: u32) -> String {
        for writer in &self.writers {
            match writer.write(answers, candidate).await {
                Ok(summary) => return summary,
                Err(e) => warn!("{} summary failed, trying next: {e}", writer.name()),
            }
        }
        completion_notice(candidate.display_name(), total_score)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::interview::content::OfflineContentService;
    use crate::interview::models::{
        ContactDetails, Difficulty, KeywordCounts, Phase, Provenance, Question, Topic,
    };
    use crate::interview::testing::ScriptedContent;
    use crate::interview::timer::SystemClock;

    fn answered_session(scores: &[u8]) -> Session {
        let questions: Vec<Question> = scores
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Question::new(
                    format!("Question {i}?"),
                    Difficulty::Easy,
                    Topic::React,
                    Provenance::Template,
                )
            })
            .collect();
        let answers = questions
            .iter()
            .zip(scores)
            .map(|(q, &score)| Answer {
                id: Uuid::new_v4(),
                question_id: q.id,
                text: "An answer".to_string(),
                submitted_at: Utc::now(),
                time_spent_seconds: 10,
                score,
                feedback: "ok".to_string(),
                keywords: KeywordCounts::default(),
            })
            .collect();
        Session {
            phase: Phase::Completed,
            current_index: questions.len(),
            questions,
            answers,
            ..Default::default()
        }
    }

    fn candidate(name: &str) -> Candidate {
        Candidate::new(
            ContactDetails {
                name: Some(name.to_string()),
                email: Some("grace@example.com".to_string()),
                phone: Some("555-0100".to_string()),
            },
            Utc::now(),
        )
    }

    fn offline_aggregator() -> SessionAggregator {
        SessionAggregator::new(
            Arc::new(OfflineContentService),
            Duration::from_secs(1),
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn test_finalize_sums_scores_and_attaches_transcript() {
        let session = answered_session(&[7, 8, 9]);
        let finalized = offline_aggregator()
            .finalize(&session, &candidate("Grace Hopper"))
            .await;

        assert_eq!(finalized.status, CandidateStatus::Completed);
        let result = finalized.result.unwrap();
        assert_eq!(result.total_score, 24);
        assert_eq!(result.questions.len(), 3);
        assert_eq!(result.answers, session.answers);
        assert!(result.summary.starts_with("Grace Hopper demonstrated excellent"));
    }

    #[tokio::test]
    async fn test_finalize_twice_is_a_no_op() {
        let aggregator = offline_aggregator();
        let session = answered_session(&[5, 6]);
        let once = aggregator.finalize(&session, &candidate("Grace")).await;
        let twice = aggregator.finalize(&session, &once).await;

        assert_eq!(once, twice);
        let result = twice.result.unwrap();
        assert_eq!(result.total_score, 11);
        assert_eq!(result.answers.len(), 2);
    }

    #[tokio::test]
    async fn test_remote_summary_preferred() {
        let content = Arc::new(ScriptedContent {
            summary: Some("Remote narrative.".to_string()),
            ..Default::default()
        });
        let aggregator =
            SessionAggregator::new(content.clone(), Duration::from_secs(1), Arc::new(SystemClock));

        let finalized = aggregator
            .finalize(&answered_session(&[3]), &candidate("Linus"))
            .await;

        assert_eq!(finalized.result.unwrap().summary, "Remote narrative.");
        assert_eq!(content.summary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_remote_summary_falls_back_to_banded_narrative() {
        let content = Arc::new(ScriptedContent {
            summary: Some("Remote narrative.".to_string()),
            stall_summary: true,
            ..Default::default()
        });
        let aggregator =
            SessionAggregator::new(content.clone(), Duration::from_secs(1), Arc::new(SystemClock));

        let started = tokio::time::Instant::now();
        let finalized = aggregator
            .finalize(&answered_session(&[7, 8, 9]), &candidate("Grace Hopper"))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(content.summary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(finalized.status, CandidateStatus::Completed);
        let result = finalized.result.unwrap();
        assert_eq!(result.total_score, 24);
        assert_eq!(result.summary, banded_summary("Grace Hopper", 8.0));
    }

    #[tokio::test]
    async fn test_empty_session_falls_through_to_completion_notice() {
        let finalized = offline_aggregator()
            .finalize(&answered_session(&[]), &candidate("Ada"))
            .await;
        let result = finalized.result.unwrap();
        assert_eq!(result.summary, completion_notice("Ada", 0));
        assert_eq!(finalized.status, CandidateStatus::Completed);
    }

    #[test]
    fn test_banded_summary_thresholds() {
        assert!(banded_summary("A", 8.0).contains("excellent"));
        assert!(banded_summary("A", 6.0).contains("good understanding"));
        assert!(banded_summary("A", 4.0).contains("basic understanding"));
        assert!(banded_summary("A", 3.9).contains("significant improvement"));
    }

    #[tokio::test]
    async fn test_anonymous_candidate_named_in_summary() {
        let anonymous = Candidate::new(ContactDetails::default(), Utc::now());
        let finalized = offline_aggregator()
            .finalize(&answered_session(&[1, 1]), &anonymous)
            .await;
        assert!(finalized
            .result
            .unwrap()
            .summary
            .starts_with("Anonymous Candidate"));
    }
}
