use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Tier order used when laying out a session.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Fixed countdown per question, in seconds.
    pub fn budget_seconds(self) -> u32 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 60,
            Difficulty::Hard => 120,
        }
    }

    /// The topic every slot of this tier is bound to.
    pub fn topic(self) -> Topic {
        match self {
            Difficulty::Easy => Topic::React,
            Difficulty::Medium => Topic::Javascript,
            Difficulty::Hard => Topic::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    React,
    Javascript,
    General,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::React => "react",
            Topic::Javascript => "javascript",
            Topic::General => "general",
        }
    }
}

/// Where a question or evaluation came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Remote,
    Template,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub difficulty: Difficulty,
    pub topic: Topic,
    pub generated_by: Provenance,
}

impl Question {
    pub fn new(text: String, difficulty: Difficulty, topic: Topic, generated_by: Provenance) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            difficulty,
            topic,
            generated_by,
        }
    }
}

/// Case-folded, trimmed form used for duplicate detection.
pub fn normalize_question_text(text: &str) -> String {
    text.trim().to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Answers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordCounts {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_seconds: u32,
    pub score: u8, // 0 – 10
    pub feedback: String,
    pub keywords: KeywordCounts,
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    CollectingInfo,
    AskingQuestion,
    WaitingAnswer,
    Completed,
}

impl Phase {
    /// A question is on screen and its timer may be running.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::AskingQuestion | Phase::WaitingAnswer)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub current_index: usize,
    pub remaining_seconds: u32,
    pub timer_active: bool,
    pub missing_fields: Vec<ContactField>,
}

impl Session {
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase.is_active() {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    pub fn total_score(&self) -> u32 {
        self.answers.iter().map(|a| u32::from(a.score)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate
// ────────────────────────────────────────────────────────────────────────────

pub const ANONYMOUS_NAME: &str = "Anonymous Candidate";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Pending,
    Interviewing,
    Completed,
}

/// Partial contact data as returned by the external extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDetails {
    /// Required fields that are absent or blank, in name/email/phone order.
    pub fn missing_fields(&self) -> Vec<ContactField> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push(ContactField::Name);
        }
        if blank(&self.email) {
            missing.push(ContactField::Email);
        }
        if blank(&self.phone) {
            missing.push(ContactField::Phone);
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewResult {
    pub total_score: u32,
    pub summary: String,
    pub end_time: DateTime<Utc>,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub result: Option<InterviewResult>,
}

impl Candidate {
    pub fn new(contact: ContactDetails, now: DateTime<Utc>) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            id: Uuid::new_v4(),
            name: clean(contact.name),
            email: clean(contact.email),
            phone: clean(contact.phone),
            status: CandidateStatus::Pending,
            created_at: now,
            updated_at: now,
            result: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_NAME)
    }

    pub fn set_field(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
        };
        *slot = Some(value);
    }

    pub fn total_score(&self) -> Option<u32> {
        self.result.as_ref().map(|r| r.total_score)
    }
}
