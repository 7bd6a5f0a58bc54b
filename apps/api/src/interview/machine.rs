//! Phase state machine.
//!
//! `transition` is pure: it takes the current session and an event and returns
//! the next session plus the side effects the caller must run (arm or cancel
//! the timer, fetch questions, finalize). Nothing here touches the timer,
//! the network, or the candidate store.

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::interview::models::{Answer, ContactField, Phase, Question, Session};

#[derive(Debug, Clone)]
pub enum Event {
    /// Contact extraction finished; carries the required fields still missing.
    Intake { missing: Vec<ContactField> },
    FieldProvided(ContactField),
    /// Operator starts the interview without the remaining contact fields.
    SkipCollection,
    QuestionsSupplied(Vec<Question>),
    /// Timer state after one logical second.
    Countdown { remaining_seconds: u32 },
    AnswerRecorded(Answer),
    Reset,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Intake { .. } => "intake",
            Event::FieldProvided(_) => "field_provided",
            Event::SkipCollection => "skip_collection",
            Event::QuestionsSupplied(_) => "questions_supplied",
            Event::Countdown { .. } => "countdown",
            Event::AnswerRecorded(_) => "answer_recorded",
            Event::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SupplyQuestions,
    ArmTimer { budget_seconds: u32 },
    CancelTimer,
    Finalize,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Step {
    fn new(session: Session, effects: Vec<Effect>) -> Self {
        Self { session, effects }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("'{event}' is not allowed while the session is {phase:?}")]
    NotAllowed { event: &'static str, phase: Phase },

    #[error("questions were already supplied for this session")]
    AlreadySupplied,

    #[error("answer targets question {got}, but the current question is {expected}")]
    WrongQuestion { expected: Uuid, got: Uuid },

    #[error("every question already has an answer")]
    AllAnswered,
}

/// The question an incoming answer has to target, or why none can be answered.
pub fn answerable_question(session: &Session) -> Result<&Question, TransitionError> {
    if !session.phase.is_active() {
        return Err(TransitionError::NotAllowed {
            event: "answer_recorded",
            phase: session.phase,
        });
    }
    if session.answers.len() >= session.questions.len() {
        return Err(TransitionError::AllAnswered);
    }
    session
        .questions
        .get(session.current_index)
        .ok_or(TransitionError::AllAnswered)
}

pub fn transition(session: &Session, event: Event) -> Result<Step, TransitionError> {
    let phase = session.phase;
    let not_allowed = |event: &Event| TransitionError::NotAllowed {
        event: event.name(),
        phase,
    };
    debug!("Session event '{}' in phase {:?}", event.name(), phase);

    match event {
        Event::Intake { missing } => {
            if phase != Phase::Idle {
                return Err(not_allowed(&Event::Intake { missing }));
            }
            let mut next = session.clone();
            if missing.is_empty() {
                next.missing_fields.clear();
                Ok(Step::new(next, vec![Effect::SupplyQuestions]))
            } else {
                next.missing_fields = missing;
                next.phase = Phase::CollectingInfo;
                Ok(Step::new(next, vec![]))
            }
        }

        Event::FieldProvided(field) => {
            if phase != Phase::CollectingInfo {
                return Err(not_allowed(&Event::FieldProvided(field)));
            }
            let mut next = session.clone();
            next.missing_fields.retain(|f| *f != field);
            let effects = if next.missing_fields.is_empty() {
                vec![Effect::SupplyQuestions]
            } else {
                vec![]
            };
            Ok(Step::new(next, effects))
        }

        Event::SkipCollection => match phase {
            Phase::Idle | Phase::CollectingInfo => {
                Ok(Step::new(session.clone(), vec![Effect::SupplyQuestions]))
            }
            _ => Err(not_allowed(&Event::SkipCollection)),
        },

        Event::QuestionsSupplied(questions) => {
            if !matches!(phase, Phase::Idle | Phase::CollectingInfo) {
                return Err(not_allowed(&Event::QuestionsSupplied(questions)));
            }
            if !session.questions.is_empty() {
                return Err(TransitionError::AlreadySupplied);
            }
            let mut next = session.clone();
            next.current_index = 0;
            next.answers.clear();
            next.questions = questions;
            match next.questions.first().map(|q| q.difficulty.budget_seconds()) {
                Some(budget) => {
                    next.phase = Phase::AskingQuestion;
                    next.remaining_seconds = budget;
                    next.timer_active = true;
                    Ok(Step::new(next, vec![Effect::ArmTimer { budget_seconds: budget }]))
                }
                None => {
                    next.phase = Phase::Completed;
                    next.remaining_seconds = 0;
                    next.timer_active = false;
                    Ok(Step::new(next, vec![Effect::Finalize]))
                }
            }
        }

        Event::Countdown { remaining_seconds } => {
            if !phase.is_active() || !session.timer_active {
                // Late tick after the timer was cancelled.
                return Ok(Step::new(session.clone(), vec![]));
            }
            let mut next = session.clone();
            next.remaining_seconds = remaining_seconds;
            next.phase = Phase::WaitingAnswer;
            if remaining_seconds == 0 {
                next.timer_active = false;
            }
            Ok(Step::new(next, vec![]))
        }

        Event::AnswerRecorded(answer) => {
            let current = answerable_question(session)?;
            if answer.question_id != current.id {
                return Err(TransitionError::WrongQuestion {
                    expected: current.id,
                    got: answer.question_id,
                });
            }

            let mut next = session.clone();
            next.answers.push(answer);
            next.timer_active = false;
            let mut effects = vec![Effect::CancelTimer];

            let next_index = session.current_index + 1;
            match next.questions.get(next_index).map(|q| q.difficulty.budget_seconds()) {
                Some(budget) => {
                    next.current_index = next_index;
                    next.phase = Phase::AskingQuestion;
                    next.remaining_seconds = budget;
                    next.timer_active = true;
                    effects.push(Effect::ArmTimer { budget_seconds: budget });
                }
                None => {
                    next.current_index = next.questions.len();
                    next.phase = Phase::Completed;
                    next.remaining_seconds = 0;
                    effects.push(Effect::Finalize);
                }
            }
            Ok(Step::new(next, effects))
        }

        Event::Reset => Ok(Step::new(Session::default(), vec![Effect::CancelTimer])),
    }
}
