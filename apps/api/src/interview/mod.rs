// Interview Session Engine
// Implements: question supply, answer scoring, per-question countdown, phase
// transitions, finalization and snapshot/resume.
// Remote content goes through `content::ContentService`; every remote failure
// falls back to local templates or keyword scoring.

pub mod aggregator;
pub mod content;
pub mod engine;
pub mod evaluator;
pub mod handlers;
pub mod machine;
pub mod models;
pub mod prompts;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod supplier;
pub mod templates;
pub mod timer;

#[cfg(test)]
mod testing;
