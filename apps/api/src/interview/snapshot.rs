//! Serialized session + candidate, for resuming an interview after a restart.
//!
//! The wire form keeps `remaining_seconds` signed so a negative counter can be
//! detected and rejected instead of failing inside serde with a vague message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interview::models::{Answer, Candidate, ContactField, Phase, Question, Session};

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("snapshot has {answers} answers for only {questions} questions")]
    TooManyAnswers { answers: usize, questions: usize },

    #[error("snapshot has negative remaining seconds ({0})")]
    NegativeRemaining(i64),

    #[error("snapshot remaining seconds {0} is out of range")]
    RemainingOutOfRange(i64),

    #[error("snapshot question index {index} is past the {questions} questions")]
    IndexOutOfRange { index: usize, questions: usize },

    #[error("answer {position} does not belong to the question at the same position")]
    MisalignedAnswer { position: usize },

    #[error("snapshot is in phase {phase:?} with {answers} answers at index {index}")]
    InconsistentProgress {
        phase: Phase,
        answers: usize,
        index: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub phase: Phase,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub current_index: usize,
    pub remaining_seconds: i64,
    pub timer_active: bool,
    #[serde(default)]
    pub missing_fields: Vec<ContactField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session: SessionRecord,
    pub candidate: Candidate,
}

impl SessionSnapshot {
    pub fn capture(session: &Session, candidate: &Candidate) -> Self {
        Self {
            session: SessionRecord {
                phase: session.phase,
                questions: session.questions.clone(),
                answers: session.answers.clone(),
                current_index: session.current_index,
                remaining_seconds: i64::from(session.remaining_seconds),
                timer_active: session.timer_active,
                missing_fields: session.missing_fields.clone(),
            },
            candidate: candidate.clone(),
        }
    }

    /// Validates the snapshot and splits it back into live values.
    pub fn restore(self) -> Result<(Session, Candidate), SnapshotError> {
        let record = self.session;
        let questions = record.questions.len();
        let answers = record.answers.len();

        if answers > questions {
            return Err(SnapshotError::TooManyAnswers { answers, questions });
        }
        if record.remaining_seconds < 0 {
            return Err(SnapshotError::NegativeRemaining(record.remaining_seconds));
        }
        let remaining_seconds = u32::try_from(record.remaining_seconds)
            .map_err(|_| SnapshotError::RemainingOutOfRange(record.remaining_seconds))?;
        if record.current_index > questions {
            return Err(SnapshotError::IndexOutOfRange {
                index: record.current_index,
                questions,
            });
        }
        if let Some(position) = record
            .questions
            .iter()
            .zip(&record.answers)
            .position(|(q, a)| q.id != a.question_id)
        {
            return Err(SnapshotError::MisalignedAnswer { position });
        }

        // An active session is answering the question right after the last answer.
        let progress_ok = if record.phase.is_active() {
            record.current_index == answers && answers < questions
        } else {
            true
        };
        if !progress_ok {
            return Err(SnapshotError::InconsistentProgress {
                phase: record.phase,
                answers,
                index: record.current_index,
            });
        }

        let session = Session {
            phase: record.phase,
            questions: record.questions,
            answers: record.answers,
            current_index: record.current_index,
            remaining_seconds,
            timer_active: record.timer_active && record.phase.is_active(),
            missing_fields: record.missing_fields,
        };
        Ok((session, self.candidate))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::interview::models::{ContactDetails, Difficulty, KeywordCounts, Provenance};

    fn active_session() -> Session {
        let questions: Vec<Question> = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .map(|d| Question::new(format!("{} question?", d.as_str()), d, d.topic(), Provenance::Template))
            .collect();
        let answers = vec![Answer {
            id: Uuid::new_v4(),
            question_id: questions[0].id,
            text: "Components and state".to_string(),
            submitted_at: Utc::now(),
            time_spent_seconds: 12,
            score: 6,
            feedback: "Good".to_string(),
            keywords: KeywordCounts::default(),
        }];
        Session {
            phase: Phase::WaitingAnswer,
            questions,
            answers,
            current_index: 1,
            remaining_seconds: 41,
            timer_active: true,
            missing_fields: vec![],
        }
    }

    fn snapshot_json(session: &Session) -> serde_json::Value {
        let candidate = Candidate::new(ContactDetails::default(), Utc::now());
        serde_json::to_value(SessionSnapshot::capture(session, &candidate)).unwrap()
    }

    #[test]
    fn test_capture_then_restore_preserves_session() {
        let session = active_session();
        let json = snapshot_json(&session);
        let snapshot: SessionSnapshot = serde_json::from_value(json).unwrap();
        let (restored, _) = snapshot.restore().unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_rejects_more_answers_than_questions() {
        let mut session = active_session();
        session.questions.truncate(0);
        session.current_index = 0;
        let snapshot: SessionSnapshot = serde_json::from_value(snapshot_json(&session)).unwrap();
        assert_eq!(
            snapshot.restore().unwrap_err(),
            SnapshotError::TooManyAnswers {
                answers: 1,
                questions: 0
            }
        );
    }

    #[test]
    fn test_rejects_negative_remaining_seconds() {
        let mut json = snapshot_json(&active_session());
        json["session"]["remaining_seconds"] = serde_json::json!(-5);
        let snapshot: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(
            snapshot.restore().unwrap_err(),
            SnapshotError::NegativeRemaining(-5)
        );
    }

    #[test]
    fn test_rejects_index_past_question_list() {
        let mut json = snapshot_json(&active_session());
        json["session"]["current_index"] = serde_json::json!(9);
        let snapshot: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_answer_for_another_question() {
        let mut session = active_session();
        session.answers[0].question_id = session.questions[2].id;
        let snapshot: SessionSnapshot = serde_json::from_value(snapshot_json(&session)).unwrap();
        assert_eq!(
            snapshot.restore().unwrap_err(),
            SnapshotError::MisalignedAnswer { position: 0 }
        );
    }

    #[test]
    fn test_rejects_active_session_with_skipped_question() {
        let mut session = active_session();
        session.current_index = 2;
        let snapshot: SessionSnapshot = serde_json::from_value(snapshot_json(&session)).unwrap();
        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::InconsistentProgress { .. })
        ));
    }

    #[test]
    fn test_idle_snapshot_restores_with_timer_off() {
        let mut json = snapshot_json(&Session::default());
        json["session"]["timer_active"] = serde_json::json!(true);
        let snapshot: SessionSnapshot = serde_json::from_value(json).unwrap();
        let (restored, _) = snapshot.restore().unwrap();
        assert_eq!(restored.phase, Phase::Idle);
        assert!(!restored.timer_active);
    }
}
