//! Question supply: builds the ordered question list for a session.
//!
//! Flow: plan tiers → fan out one remote generation per slot → join →
//! assemble in slot order, replacing failures and duplicates with template
//! or generic questions.
//!
//! The returned list always has exactly the requested length and no two
//! questions share normalized text.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::interview::content::{bounded, ContentService, RemoteError};
use crate::interview::models::{normalize_question_text, Difficulty, Provenance, Question, Topic};
use crate::interview::templates::{generic_question, template_pool};

pub struct QuestionSupplier {
    content: Arc<dyn ContentService>,
    remote_timeout: Duration,
}

impl QuestionSupplier {
    pub fn new(content: Arc<dyn ContentService>, remote_timeout: Duration) -> Self {
        Self {
            content,
            remote_timeout,
        }
    }

    pub async fn supply(&self, total_questions: usize) -> Vec<Question> {
        let plan = tier_plan(total_questions);
        let remote = self.fetch_remote(&plan).await;
        let questions = assemble(&plan, remote, &mut rand::thread_rng());

        let remote_count = questions
            .iter()
            .filter(|q| q.generated_by == Provenance::Remote)
            .count();
        info!(
            "Supplied {} questions ({} remote, {} local)",
            questions.len(),
            remote_count,
            questions.len() - remote_count
        );
        questions
    }

    /// One concurrent remote call per slot. Results come back indexed by slot,
    /// independent of completion order.
    async fn fetch_remote(&self, plan: &[Difficulty]) -> Vec<Result<String, RemoteError>> {
        let mut tasks = JoinSet::new();
        for (slot, &difficulty) in plan.iter().enumerate() {
            let content = Arc::clone(&self.content);
            let limit = self.remote_timeout;
            tasks.spawn(async move {
                let topic = difficulty.topic();
                let outcome = bounded(limit, content.generate_question(topic, difficulty)).await;
                (slot, outcome)
            });
        }

        let mut by_slot: Vec<Option<Result<String, RemoteError>>> =
            plan.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => by_slot[slot] = Some(outcome),
                Err(e) => warn!("Question generation task did not complete: {e}"),
            }
        }

        by_slot
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| {
                    Err(RemoteError::Malformed(
                        "generation task did not complete".to_string(),
                    ))
                })
            })
            .collect()
    }
}

/// Difficulty per slot: three contiguous tiers (easy, medium, hard), each
/// `floor(n/3)` long, with the `n mod 3` leftover slots handed out one per
/// tier starting from easy.
pub fn tier_plan(total_questions: usize) -> Vec<Difficulty> {
    let base = total_questions / 3;
    let remainder = total_questions % 3;

    Difficulty::ALL
        .iter()
        .enumerate()
        .flat_map(|(tier, &difficulty)| {
            let extra = usize::from(tier < remainder);
            std::iter::repeat(difficulty).take(base + extra)
        })
        .collect()
}

fn assemble<R: Rng>(
    plan: &[Difficulty],
    remote: Vec<Result<String, RemoteError>>,
    rng: &mut R,
) -> Vec<Question> {
    let mut used: HashSet<String> = HashSet::new();
    let mut questions = Vec::with_capacity(plan.len());

    for (slot, (&difficulty, outcome)) in plan.iter().zip(remote).enumerate() {
        let topic = difficulty.topic();
        let question = match outcome {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    warn!("Slot {}: remote question was empty, using local pool", slot + 1);
                    local_question(difficulty, topic, &used, rng)
                } else if used.contains(&normalize_question_text(&text)) {
                    warn!("Slot {}: remote question duplicates an earlier one, using local pool", slot + 1);
                    local_question(difficulty, topic, &used, rng)
                } else {
                    Question::new(text, difficulty, topic, Provenance::Remote)
                }
            }
            Err(e) => {
                warn!("Slot {}: remote generation failed ({e}), using local pool", slot + 1);
                local_question(difficulty, topic, &used, rng)
            }
        };
        used.insert(normalize_question_text(&question.text));
        questions.push(question);
    }

    questions
}

/// Uniform pick among unused templates; generic sentence once the pool is spent.
fn local_question<R: Rng>(
    difficulty: Difficulty,
    topic: Topic,
    used: &HashSet<String>,
    rng: &mut R,
) -> Question {
    let unused: Vec<&str> = template_pool(difficulty, topic)
        .iter()
        .copied()
        .filter(|t| !used.contains(&normalize_question_text(t)))
        .collect();

    if let Some(text) = unused.choose(rng) {
        return Question::new(text.to_string(), difficulty, topic, Provenance::Template);
    }

    warn!(
        "Template pool exhausted for {}/{}, using generic question",
        difficulty.as_str(),
        topic.as_str()
    );
    let base = generic_question(topic);
    let mut text = base.clone();
    let mut follow_up = 1;
    while used.contains(&normalize_question_text(&text)) {
        follow_up += 1;
        text = format!("{base} (follow-up {follow_up})");
    }
    Question::new(text, difficulty, topic, Provenance::Fallback)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::interview::content::OfflineContentService;
    use crate::interview::testing::{QuestionMode, ScriptedContent};

    fn count(plan: &[Difficulty], difficulty: Difficulty) -> usize {
        plan.iter().filter(|&&d| d == difficulty).count()
    }

    fn assert_distinct(questions: &[Question]) {
        let unique: HashSet<_> = questions
            .iter()
            .map(|q| normalize_question_text(&q.text))
            .collect();
        assert_eq!(unique.len(), questions.len(), "duplicate question text");
    }

    fn offline_supplier() -> QuestionSupplier {
        QuestionSupplier::new(Arc::new(OfflineContentService), Duration::from_secs(1))
    }

    #[test]
    fn test_tier_plan_even_split() {
        let plan = tier_plan(6);
        assert_eq!(
            plan,
            vec![
                Difficulty::Easy,
                Difficulty::Easy,
                Difficulty::Medium,
                Difficulty::Medium,
                Difficulty::Hard,
                Difficulty::Hard
            ]
        );
    }

    #[test]
    fn test_tier_plan_remainder_round_robin_from_easy() {
        let seven = tier_plan(7);
        assert_eq!(
            (count(&seven, Difficulty::Easy), count(&seven, Difficulty::Medium), count(&seven, Difficulty::Hard)),
            (3, 2, 2)
        );
        let eight = tier_plan(8);
        assert_eq!(
            (count(&eight, Difficulty::Easy), count(&eight, Difficulty::Medium), count(&eight, Difficulty::Hard)),
            (3, 3, 2)
        );
        assert_eq!(tier_plan(1), vec![Difficulty::Easy]);
        assert!(tier_plan(0).is_empty());
    }

    #[test]
    fn test_tier_plan_is_contiguous_and_ordered() {
        for n in 0..40 {
            let plan = tier_plan(n);
            assert_eq!(plan.len(), n);
            assert!(plan.windows(2).all(|w| w[0] <= w[1]), "n={n}");
        }
    }

    #[tokio::test]
    async fn test_all_remote_failures_six_questions_two_per_tier() {
        let questions = offline_supplier().supply(6).await;

        assert_eq!(questions.len(), 6);
        let plan: Vec<_> = questions.iter().map(|q| q.difficulty).collect();
        assert_eq!(plan, tier_plan(6));
        assert!(questions
            .iter()
            .all(|q| q.generated_by == Provenance::Template));
        assert_distinct(&questions);
    }

    #[tokio::test]
    async fn test_always_exact_count_and_distinct_even_past_pool_size() {
        let supplier = offline_supplier();
        for n in [0, 1, 2, 5, 9, 24, 30] {
            let questions = supplier.supply(n).await;
            assert_eq!(questions.len(), n);
            assert_distinct(&questions);
        }
    }

    #[tokio::test]
    async fn test_exhausted_pool_yields_generic_fallback() {
        // 30 questions → 10 easy slots against an 8-entry pool.
        let questions = offline_supplier().supply(30).await;
        let easy_fallbacks: Vec<_> = questions
            .iter()
            .filter(|q| q.difficulty == Difficulty::Easy && q.generated_by == Provenance::Fallback)
            .collect();
        assert_eq!(easy_fallbacks.len(), 2);
        assert!(easy_fallbacks[0].text.contains("react"));
        assert_ne!(easy_fallbacks[0].text, easy_fallbacks[1].text);
    }

    #[tokio::test]
    async fn test_remote_results_keep_slot_order() {
        let content = Arc::new(ScriptedContent::default());
        let supplier = QuestionSupplier::new(content.clone(), Duration::from_secs(5));

        let questions = supplier.supply(6).await;

        assert_eq!(content.question_calls.load(Ordering::SeqCst), 6);
        assert!(questions.iter().all(|q| q.generated_by == Provenance::Remote));
        let difficulties: Vec<_> = questions.iter().map(|q| q.difficulty).collect();
        assert_eq!(difficulties, tier_plan(6));
        for q in &questions {
            assert!(q.text.contains(q.difficulty.as_str()));
            assert_eq!(q.topic, q.difficulty.topic());
        }
    }

    #[tokio::test]
    async fn test_duplicate_remote_text_falls_back_to_templates() {
        let content = Arc::new(ScriptedContent {
            question_mode: QuestionMode::Constant("Explain state."),
            ..Default::default()
        });
        let supplier = QuestionSupplier::new(content, Duration::from_secs(5));

        let questions = supplier.supply(6).await;

        assert_eq!(questions[0].generated_by, Provenance::Remote);
        assert!(questions[1..]
            .iter()
            .all(|q| q.generated_by == Provenance::Template));
        assert_distinct(&questions);
    }

    #[tokio::test]
    async fn test_failing_remote_fills_every_slot_from_templates() {
        let content = Arc::new(ScriptedContent {
            question_mode: QuestionMode::Fail,
            ..Default::default()
        });
        let supplier = QuestionSupplier::new(content.clone(), Duration::from_secs(5));

        let questions = supplier.supply(6).await;

        assert_eq!(content.question_calls.load(Ordering::SeqCst), 6);
        assert_eq!(questions.len(), 6);
        let difficulties: Vec<_> = questions.iter().map(|q| q.difficulty).collect();
        assert_eq!(difficulties, tier_plan(6));
        assert!(questions
            .iter()
            .all(|q| q.generated_by == Provenance::Template));
        assert_distinct(&questions);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_remote_times_out_into_templates() {
        let content = Arc::new(ScriptedContent {
            question_mode: QuestionMode::Hang,
            ..Default::default()
        });
        let supplier = QuestionSupplier::new(content, Duration::from_secs(2));

        let questions = supplier.supply(3).await;

        assert_eq!(questions.len(), 3);
        assert!(questions
            .iter()
            .all(|q| q.generated_by == Provenance::Template));
    }

    #[test]
    fn test_generic_fallback_skips_used_text() {
        let mut used: HashSet<String> = template_pool(Difficulty::Hard, Topic::General)
            .iter()
            .map(|t| normalize_question_text(t))
            .collect();
        used.insert(normalize_question_text(&generic_question(Topic::General)));

        let question = local_question(Difficulty::Hard, Topic::General, &used, &mut rand::thread_rng());
        assert_eq!(question.generated_by, Provenance::Fallback);
        assert!(question.text.ends_with("(follow-up 2)"));
    }
}
