//! Episode collection: the orchestrator side of the controller contract.
//!
//! The [`EpisodeRunner`] drives episodes by repeatedly:
//!   1. presenting the observation to the response policy,
//!   2. wrapping the response into an [`Action`],
//!   3. stepping the controller,
//!   4. recording the scored step.

use anyhow::{Context, Result};

use crate::agent::{ResponsePolicy, TeacherAgent};
use crate::env::{Action, EpisodeController, EpisodeHooks};
use crate::extract::Extractor;
use crate::task::TaskSource;
use crate::trajectory::types::{EpisodeRecord, StepRecord};
use crate::verify::Verifier;

/// Step cap used when the controller itself has no budget.
pub const DEFAULT_STEP_CAP: usize = 32;

/// Runs whole episodes against an [`EpisodeController`].
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    /// Label written into each record.
    env_label: String,
    /// Hard stop for controllers without a step budget.
    step_cap: usize,
}

impl EpisodeRunner {
    pub fn new(env_label: &str) -> Self {
        Self {
            env_label: env_label.to_string(),
            step_cap: DEFAULT_STEP_CAP,
        }
    }

    pub fn with_step_cap(mut self, step_cap: usize) -> Self {
        self.step_cap = step_cap.max(1);
        self
    }

    /// Collect `num_episodes` episodes.
    pub async fn collect_episodes<T, V, X, H, A, P>(
        &self,
        env: &mut EpisodeController<T, V, X, H, A>,
        policy: &P,
        num_episodes: usize,
    ) -> Result<Vec<EpisodeRecord>>
    where
        T: TaskSource,
        V: Verifier,
        X: Extractor,
        H: EpisodeHooks,
        A: TeacherAgent,
        P: ResponsePolicy,
    {
        let mut records = Vec::with_capacity(num_episodes);

        for ep in 0..num_episodes {
            let record = self.run_episode(env, policy).await?;
            tracing::info!(
                episode = ep,
                steps = record.num_steps(),
                reward = record.total_reward,
                success_rate = record.success_rate,
                reason = ?record.termination_reason,
                "collected episode"
            );
            records.push(record);
        }

        Ok(records)
    }

    /// Run a single episode from `reset` until `done` or the step cap.
    pub async fn run_episode<T, V, X, H, A, P>(
        &self,
        env: &mut EpisodeController<T, V, X, H, A>,
        policy: &P,
    ) -> Result<EpisodeRecord>
    where
        T: TaskSource,
        V: Verifier,
        X: Extractor,
        H: EpisodeHooks,
        A: TeacherAgent,
        P: ResponsePolicy,
    {
        let mut observation = env.reset().await.context("failed to reset environment")?;
        let mut record = EpisodeRecord::new(env.state().stats().episode_id, &self.env_label);

        if env.state().episode_ended() {
            record.termination_reason = env.state().stats().termination_reason;
            return Ok(record);
        }

        let cap = env.config().step_budget().unwrap_or(self.step_cap);
        for _ in 0..cap {
            let response = policy.respond(&observation).await?;
            let action = Action::answering(&observation, response.clone());
            let step_no = env.current_step() + 1;
            let result = env
                .step(action)
                .await
                .with_context(|| format!("step {step_no} failed"))?;

            record.push(StepRecord::from_result(
                &observation.question,
                &response,
                &result,
            ));

            if result.done {
                record.termination_reason = result.info.reason;
                break;
            }
            observation = result.observation;
        }

        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
