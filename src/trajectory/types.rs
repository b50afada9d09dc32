//! Serialisable transcripts of finished episodes.
//!
//! These are what a training loop persists or feeds into advantage
//! estimation: one [`EpisodeRecord`] per episode, one [`StepRecord`] per
//! scored step.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::env::{RewardBreakdown, StepResult, TerminationReason};

// ---------------------------------------------------------------------------
// Single step
// ---------------------------------------------------------------------------

/// One scored step within an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// One-based step index, as reported by the controller.
    pub step_index: usize,
    /// The question the agent answered.
    pub question: String,
    /// The raw agent response.
    pub response: String,
    /// What the extractor pulled out of the response.
    pub extraction_result: String,
    pub reward: f64,
    pub rewards: RewardBreakdown,
    /// Whether the verifier accepted the answer.
    pub correct: bool,
}

impl StepRecord {
    /// Build a record from the question/response pair and the step's result.
    pub fn from_result(question: &str, response: &str, result: &StepResult) -> Self {
        Self {
            step_index: result.info.step.unwrap_or_default(),
            question: question.to_string(),
            response: response.to_string(),
            extraction_result: result.info.extraction_result.clone().unwrap_or_default(),
            reward: result.reward,
            rewards: result.rewards.clone(),
            correct: result
                .info
                .verification_result
                .as_ref()
                .is_some_and(|v| v.is_success()),
        }
    }
}

// ---------------------------------------------------------------------------
// Full episode
// ---------------------------------------------------------------------------

/// A complete episode transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Same id as the controller's `EpisodeStats::episode_id`.
    pub id: Uuid,
    /// Which environment produced this episode (free-form label).
    pub environment: String,
    pub steps: Vec<StepRecord>,
    /// Sum of per-step rewards.
    pub total_reward: f64,
    /// Fraction of steps the verifier accepted.
    pub success_rate: f64,
    /// `None` when the runner stopped the episode at its own step cap.
    pub termination_reason: Option<TerminationReason>,
}

impl EpisodeRecord {
    pub fn new(id: Uuid, environment: impl Into<String>) -> Self {
        Self {
            id,
            environment: environment.into(),
            steps: Vec::new(),
            total_reward: 0.0,
            success_rate: 0.0,
            termination_reason: None,
        }
    }

    pub fn push(&mut self, step: StepRecord) {
        self.total_reward += step.reward;
        self.steps.push(step);
        let correct = self.steps.iter().filter(|s| s.correct).count();
        self.success_rate = correct as f64 / self.steps.len() as f64;
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }
}

// ---------------------------------------------------------------------------
// Aggregate over a run
// ---------------------------------------------------------------------------

/// Summary over many episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub episodes: usize,
    pub steps: usize,
    /// Mean of per-episode total reward.
    pub mean_reward: f64,
    /// Fraction of all steps (across episodes) the verifier accepted.
    pub accuracy: f64,
}

impl RunSummary {
    pub fn from_records(records: &[EpisodeRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let steps: usize = records.iter().map(EpisodeRecord::num_steps).sum();
        let correct = records
            .iter()
            .flat_map(|r| &r.steps)
            .filter(|s| s.correct)
            .count();
        let mean_reward =
            records.iter().map(|r| r.total_reward).sum::<f64>() / records.len() as f64;

        Self {
            episodes: records.len(),
            steps,
            mean_reward,
            accuracy: if steps == 0 {
                0.0
            } else {
                correct as f64 / steps as f64
            },
        }
    }
}
