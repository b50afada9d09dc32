//! Per-episode mutable state.
//!
//! [`EpisodeState`] is rebuilt by every `reset` and owned exclusively by the
//! controller. The setup flag is not part of it: it lives on the controller
//! and survives across episodes until `teardown`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reward::RewardBreakdown;
use super::types::{Action, Observation, TerminationReason};
use crate::error::{EpisodeError, Result};
use crate::task::DataPoint;

/// Free-form running statistics for one episode. A clone of this travels in
/// every `StepResult::info.state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode_id: Uuid,
    /// The item behind the most recently sampled observation.
    pub current_datapoint: Option<DataPoint>,
    /// Number of scored steps.
    pub attempts: usize,
    /// Running mean of per-step correctness, in `[0, 1]`.
    pub success_rate: f64,
    /// One breakdown per scored step, oldest first.
    pub rewards: Vec<RewardBreakdown>,
    pub termination_reason: Option<TerminationReason>,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self {
            episode_id: Uuid::new_v4(),
            current_datapoint: None,
            attempts: 0,
            success_rate: 0.0,
            rewards: Vec::new(),
            termination_reason: None,
        }
    }

    /// Fold one binary correctness value into the running mean.
    pub fn record_attempt(&mut self, correctness: f64) {
        let before = self.attempts as f64;
        self.success_rate = (self.success_rate * before + correctness) / (before + 1.0);
        self.attempts += 1;
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of the current episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeState {
    current_step: usize,
    episode_ended: bool,
    last_observation: Option<Observation>,
    history: Vec<(Observation, Action)>,
    pub(crate) stats: EpisodeStats,
}

impl EpisodeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn episode_ended(&self) -> bool {
        self.episode_ended
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.last_observation.as_ref()
    }

    /// (observation, action) pairs, one per completed step.
    pub fn history(&self) -> &[(Observation, Action)] {
        &self.history
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Install the first observation of a freshly reset episode.
    pub(crate) fn start(&mut self, observation: Observation, ended: Option<TerminationReason>) {
        self.episode_ended = ended.is_some();
        self.stats.termination_reason = ended;
        self.last_observation = Some(observation);
    }

    /// Advance the step counter and record the action against the current
    /// observation. Returns the new step index.
    pub(crate) fn begin_step(&mut self, action: Action) -> Result<usize> {
        let observation = self
            .last_observation
            .clone()
            .ok_or(EpisodeError::NoObservation)?;
        self.current_step += 1;
        self.history.push((observation, action));
        Ok(self.current_step)
    }

    pub(crate) fn finish_step(&mut self, next: Observation, ended: Option<TerminationReason>) {
        self.episode_ended = ended.is_some();
        if ended.is_some() {
            self.stats.termination_reason = ended;
        }
        self.last_observation = Some(next);
    }
}
