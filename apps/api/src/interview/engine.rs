//! Interview engine for one candidate's live session.
//!
//! Owns the session value, the candidate record and the countdown, and runs
//! the effects the state machine asks for. Every mutating method takes
//! `&mut self`; the registry wraps each engine in a mutex so ticks, answers
//! and field updates never interleave.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::aggregator::SessionAggregator;
use crate::interview::content::ContentService;
use crate::interview::evaluator::AnswerEvaluator;
use crate::interview::machine::{answerable_question, transition, Effect, Event, Step};
use crate::interview::models::{
    Answer, Candidate, CandidateStatus, ContactDetails, ContactField, Phase, Question, Session,
};
use crate::interview::snapshot::SessionSnapshot;
use crate::interview::store::{CandidatePatch, CandidateStore};
use crate::interview::supplier::QuestionSupplier;
use crate::interview::timer::{Clock, TimerController, TimerSignal};

/// Collaborators shared by every session.
pub struct InterviewServices {
    pub supplier: QuestionSupplier,
    pub evaluator: AnswerEvaluator,
    pub aggregator: SessionAggregator,
    pub store: Arc<dyn CandidateStore>,
    pub clock: Arc<dyn Clock>,
    pub question_count: usize,
}

impl InterviewServices {
    pub fn new(
        content: Arc<dyn ContentService>,
        store: Arc<dyn CandidateStore>,
        clock: Arc<dyn Clock>,
        question_count: usize,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            supplier: QuestionSupplier::new(Arc::clone(&content), remote_timeout),
            evaluator: AnswerEvaluator::new(Arc::clone(&content), remote_timeout),
            aggregator: SessionAggregator::new(content, remote_timeout, Arc::clone(&clock)),
            store,
            clock,
            question_count,
        }
    }
}

pub struct InterviewSession {
    session: Session,
    candidate: Candidate,
    timer: TimerController,
    services: Arc<InterviewServices>,
    /// Whether the candidate record exists in the store.
    persisted: bool,
}

impl InterviewSession {
    /// Creates the candidate from extracted contact data and either starts
    /// collecting the missing fields or goes straight to the first question.
    pub async fn intake(
        services: Arc<InterviewServices>,
        contact: ContactDetails,
    ) -> Result<Self, AppError> {
        let missing = contact.missing_fields();
        let candidate = services
            .store
            .create(Candidate::new(contact, services.clock.now()))
            .await?;
        info!(
            "Intake for candidate {} ({} missing fields)",
            candidate.id,
            missing.len()
        );

        let mut engine = Self {
            session: Session::default(),
            candidate,
            timer: TimerController::new(),
            services,
            persisted: true,
        };
        engine.apply(Event::Intake { missing }).await?;
        Ok(engine)
    }

    /// Rebuilds a session from a validated snapshot. An active question keeps
    /// counting down from the saved remaining seconds.
    ///
    /// Nothing is written to the store here; call `persist_restored` once the
    /// session has been registered. A snapshot is refused when the stored
    /// candidate already finished an interview, or when it pairs a completed
    /// candidate with a question still in progress. An existing stored record
    /// is taken over as-is.
    pub async fn restore(
        services: Arc<InterviewServices>,
        snapshot: SessionSnapshot,
    ) -> Result<Self, AppError> {
        let (mut session, candidate) = snapshot.restore()?;
        let candidate_id = candidate.id;

        if candidate.status == CandidateStatus::Completed && session.phase.is_active() {
            return Err(AppError::Conflict(format!(
                "Snapshot for candidate {candidate_id} is completed but has a question in progress"
            )));
        }

        let stored = services.store.get(candidate_id).await?;
        if let Some(existing) = &stored {
            if existing.status == CandidateStatus::Completed && existing.result.is_some() {
                return Err(AppError::Conflict(format!(
                    "Candidate {candidate_id} already completed an interview"
                )));
            }
        }
        let persisted = stored.is_some();
        let candidate = stored.unwrap_or(candidate);

        let mut timer = TimerController::new();
        if let Some(question) = session.current_question() {
            timer.resume(question.difficulty.budget_seconds(), session.remaining_seconds);
            session.remaining_seconds = timer.remaining();
            session.timer_active = true;
        }

        info!(
            "Restored session for candidate {} in phase {:?} at question {}",
            candidate_id, session.phase, session.current_index
        );
        Ok(Self {
            session,
            candidate,
            timer,
            services,
            persisted,
        })
    }

    /// Stores a restored candidate the store does not know yet and finalizes a
    /// completed session that never received its result.
    pub async fn persist_restored(&mut self) -> Result<(), AppError> {
        if !self.persisted {
            self.candidate = self.services.store.create(self.candidate.clone()).await?;
            self.persisted = true;
        }
        if self.session.phase == Phase::Completed && self.candidate.result.is_none() {
            self.finalize().await?;
        }
        Ok(())
    }

    pub fn candidate_id(&self) -> Uuid {
        self.candidate.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session, &self.candidate)
    }

    pub async fn provide_field(&mut self, field: ContactField, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Validation(format!(
                "Value for {field:?} must not be empty"
            )));
        }
        let step = transition(&self.session, Event::FieldProvided(field))?;

        let now = self.services.clock.now();
        self.candidate.set_field(field, value.to_string());
        self.candidate.updated_at = now;
        let mut patch = CandidatePatch::at(now);
        match field {
            ContactField::Name => patch.name = Some(value.to_string()),
            ContactField::Email => patch.email = Some(value.to_string()),
            ContactField::Phone => patch.phone = Some(value.to_string()),
        }
        self.persist_patch(patch).await?;

        self.commit(step).await
    }

    /// Operator override: start the interview without the remaining fields.
    pub async fn skip_collection(&mut self) -> Result<(), AppError> {
        self.apply(Event::SkipCollection).await
    }

    /// Scores and records a manual answer for the current question.
    ///
    /// Blank text is rejected before evaluation and leaves the session untouched.
    pub async fn submit_answer(&mut self, text: &str) -> Result<Answer, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Answer text must not be empty".to_string(),
            ));
        }
        self.record_answer(text).await
    }

    /// One logical second. Returns the placeholder answer when the countdown
    /// expired and was auto-submitted.
    pub async fn tick(&mut self) -> Result<Option<Answer>, AppError> {
        if !self.timer.is_armed() {
            return Ok(None);
        }
        let signal = self.timer.tick();
        self.apply(Event::Countdown {
            remaining_seconds: self.timer.remaining(),
        })
        .await?;

        match signal {
            Some(TimerSignal::AutoSubmit { answer_text }) => {
                info!(
                    "Time ran out on question {} for candidate {}",
                    self.session.current_index + 1,
                    self.candidate.id
                );
                self.record_answer(answer_text).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Back to idle with no questions. The candidate record is kept.
    pub async fn reset(&mut self) -> Result<(), AppError> {
        self.apply(Event::Reset).await?;
        info!("Session for candidate {} reset", self.candidate.id);
        Ok(())
    }

    // ── internals ──────────────────────────────────────────────────────────

    async fn record_answer(&mut self, text: &str) -> Result<Answer, AppError> {
        let question = answerable_question(&self.session)?.clone();
        let time_spent_seconds = self.timer.elapsed();
        let evaluation = self.services.evaluator.evaluate(text, &question).await;

        let answer = Answer {
            id: Uuid::new_v4(),
            question_id: question.id,
            text: text.to_string(),
            submitted_at: self.services.clock.now(),
            time_spent_seconds,
            score: evaluation.score,
            feedback: evaluation.feedback,
            keywords: evaluation.keywords,
        };
        self.apply(Event::AnswerRecorded(answer.clone())).await?;
        Ok(answer)
    }

    async fn apply(&mut self, event: Event) -> Result<(), AppError> {
        let step = transition(&self.session, event)?;
        self.commit(step).await
    }

    /// Installs the step's session and runs its effects. Question supply
    /// feeds its result back in as a follow-up event.
    async fn commit(&mut self, mut step: Step) -> Result<(), AppError> {
        loop {
            let previous = self.session.phase;
            self.session = step.session;
            if previous != self.session.phase {
                info!(
                    "Candidate {}: {:?} -> {:?}",
                    self.candidate.id, previous, self.session.phase
                );
            }

            let mut follow_up = None;
            for effect in step.effects {
                match effect {
                    Effect::SupplyQuestions => {
                        self.mark_interviewing().await?;
                        let questions = self
                            .services
                            .supplier
                            .supply(self.services.question_count)
                            .await;
                        follow_up = Some(Event::QuestionsSupplied(questions));
                    }
                    Effect::ArmTimer { budget_seconds } => self.timer.arm(budget_seconds),
                    Effect::CancelTimer => self.timer.cancel(),
                    Effect::Finalize => self.finalize().await?,
                }
            }

            match follow_up {
                Some(event) => step = transition(&self.session, event)?,
                None => return Ok(()),
            }
        }
    }

    /// A new run starts from a clean record: any earlier result is dropped.
    async fn mark_interviewing(&mut self) -> Result<(), AppError> {
        if self.candidate.status == CandidateStatus::Interviewing && self.candidate.result.is_none()
        {
            return Ok(());
        }
        let now = self.services.clock.now();
        self.candidate.status = CandidateStatus::Interviewing;
        self.candidate.result = None;
        self.candidate.updated_at = now;
        self.persist_patch(CandidatePatch {
            status: Some(CandidateStatus::Interviewing),
            clear_result: true,
            ..CandidatePatch::at(now)
        })
        .await
    }

    async fn finalize(&mut self) -> Result<(), AppError> {
        let finalized = self
            .services
            .aggregator
            .finalize(&self.session, &self.candidate)
            .await;
        if let Some(result) = finalized.result.clone() {
            let stored = self
                .services
                .store
                .attach_result(finalized.id, result)
                .await?;
            if stored.is_none() {
                warn!(
                    "Candidate {} missing from store, result kept in session only",
                    finalized.id
                );
            }
        }
        self.candidate = finalized;
        Ok(())
    }

    async fn persist_patch(&self, patch: CandidatePatch) -> Result<(), AppError> {
        if self.services.store.update(self.candidate.id, patch).await?.is_none() {
            warn!("Candidate {} missing from store, update skipped", self.candidate.id);
        }
        Ok(())
    }
}
