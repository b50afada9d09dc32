//! The episode controller: lifecycle and step state machine.
//!
//! ```text
//! Uninitialized --setup--> Ready --reset--> InEpisode --step(done)--> EpisodeDone
//!                            ^                                            |
//!                            +------------------reset---------------------+
//! any --teardown--> TornDown
//! ```
//!
//! The controller owns all control flow. Collaborators (task source,
//! verifier, extractor, optional teacher) and hooks only supply data. Exactly
//! one of `setup`/`reset`/`step`/`teardown` may be in flight per instance;
//! they all take `&mut self`, so the borrow checker enforces that within a
//! process. Cancelling one of these futures mid-flight leaves the episode in
//! an unspecified state: call `reset` before stepping again.

use super::hooks::{DefaultHooks, EpisodeHooks};
use super::reward::RewardAggregator;
use super::sampler::{ObservationSampler, Sample};
use super::state::EpisodeState;
use super::types::{Action, JsonMap, Observation, StepInfo, StepResult, TerminationReason};
use crate::agent::{NoTeacher, TeacherAgent};
use crate::config::EnvironmentConfig;
use crate::error::{EpisodeError, Result};
use crate::extract::Extractor;
use crate::task::TaskSource;
use crate::verify::{Verifier, VerifierInput};

/// Coarse lifecycle phase, derived from the controller's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Uninitialized,
    Ready,
    InEpisode,
    EpisodeDone,
    TornDown,
}

/// Drives one verifiable-reward episode at a time.
pub struct EpisodeController<T, V, X, H = DefaultHooks, A = NoTeacher> {
    config: EnvironmentConfig,
    task_source: T,
    verifier: V,
    extractor: X,
    hooks: H,
    teacher: Option<A>,
    sampler: ObservationSampler,
    aggregator: RewardAggregator,
    is_setup: bool,
    torn_down: bool,
    state: EpisodeState,
}

impl<T, V, X> EpisodeController<T, V, X>
where
    T: TaskSource,
    V: Verifier,
    X: Extractor,
{
    pub fn new(config: EnvironmentConfig, task_source: T, verifier: V, extractor: X) -> Self {
        Self {
            config,
            task_source,
            verifier,
            extractor,
            hooks: DefaultHooks,
            teacher: None,
            sampler: ObservationSampler,
            aggregator: RewardAggregator,
            is_setup: false,
            torn_down: false,
            state: EpisodeState::new(),
        }
    }
}

impl<T, V, X, H, A> EpisodeController<T, V, X, H, A>
where
    T: TaskSource,
    V: Verifier,
    X: Extractor,
    H: EpisodeHooks,
    A: TeacherAgent,
{
    /// Replace the reward-shaping / termination hooks.
    pub fn with_hooks<H2: EpisodeHooks>(self, hooks: H2) -> EpisodeController<T, V, X, H2, A> {
        EpisodeController {
            config: self.config,
            task_source: self.task_source,
            verifier: self.verifier,
            extractor: self.extractor,
            hooks,
            teacher: self.teacher,
            sampler: self.sampler,
            aggregator: self.aggregator,
            is_setup: self.is_setup,
            torn_down: self.torn_down,
            state: self.state,
        }
    }

    /// Attach a teacher agent, reset during setup.
    pub fn with_teacher<A2: TeacherAgent>(self, teacher: A2) -> EpisodeController<T, V, X, H, A2> {
        EpisodeController {
            config: self.config,
            task_source: self.task_source,
            verifier: self.verifier,
            extractor: self.extractor,
            hooks: self.hooks,
            teacher: Some(teacher),
            sampler: self.sampler,
            aggregator: self.aggregator,
            is_setup: self.is_setup,
            torn_down: self.torn_down,
            state: self.state,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Initialise collaborators. No-op when already set up.
    ///
    /// On failure nothing is marked as set up; the whole call must be retried.
    pub async fn setup(&mut self) -> Result<()> {
        if self.is_setup {
            return Ok(());
        }

        if let Err(source) = self.task_source.setup().await {
            return Err(setup_failed("task source", source));
        }
        if let Err(source) = self.verifier.setup().await {
            return Err(setup_failed("verifier", source));
        }
        if let Err(source) = self.extractor.setup().await {
            return Err(setup_failed("extractor", source));
        }
        if let Some(teacher) = self.teacher.as_mut() {
            if let Err(source) = teacher.reset().await {
                return Err(setup_failed("teacher agent", source));
            }
        }

        self.is_setup = true;
        self.torn_down = false;
        tracing::info!("environment setup completed");
        Ok(())
    }

    /// Release collaborator resources. No-op when not set up.
    ///
    /// Every cleanup hook runs even if an earlier one fails; the first failure
    /// is returned. The controller is marked as not set up either way.
    pub async fn teardown(&mut self) -> Result<()> {
        if !self.is_setup {
            return Ok(());
        }
        self.is_setup = false;
        self.torn_down = true;

        let results = [
            ("task source", self.task_source.cleanup().await),
            ("verifier", self.verifier.cleanup().await),
            ("extractor", self.extractor.cleanup().await),
        ];

        let mut first_error = None;
        for (component, result) in results {
            if let Err(source) = result {
                tracing::error!(component, error = %source, "teardown failed");
                first_error.get_or_insert(EpisodeError::Teardown { component, source });
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                tracing::info!("environment teardown completed");
                Ok(())
            }
        }
    }

    /// Start a new episode and return its first observation.
    ///
    /// Sets up lazily. If the task source cannot produce an item the terminal
    /// observation is returned and the episode is already over: `episode_ended`
    /// stays true, so a following `step` fails with
    /// [`EpisodeError::EpisodeEnded`] until the next `reset`.
    pub async fn reset(&mut self) -> Result<Observation> {
        if !self.is_setup {
            self.setup().await?;
        }

        self.state = EpisodeState::new();

        let (observation, ended) = self.next_observation().await;
        if let Some(reason) = ended {
            tracing::warn!(%reason, "episode ended at reset");
        }
        self.state.start(observation.clone(), ended);

        tracing::info!(
            episode = %self.state.stats.episode_id,
            terminal = observation.is_terminal(),
            "episode reset"
        );
        Ok(observation)
    }

    /// Score one agent action and advance the episode.
    pub async fn step(&mut self, action: Action) -> Result<StepResult> {
        let budget = self.config.step_budget();

        // The budget check precedes every other check.
        if budget.is_some_and(|max| self.state.current_step() >= max) {
            tracing::debug!(step = self.state.current_step(), "step budget already spent");
            return Ok(StepResult::budget_exhausted(self.state.current_step()));
        }

        if !self.is_setup {
            return Err(EpisodeError::NotSetUp);
        }
        if self.state.episode_ended() {
            return Err(EpisodeError::EpisodeEnded);
        }

        let step = self.state.begin_step(action.clone())?;

        let extraction_result = self
            .extractor
            .extract(&action.llm_response)
            .await
            .map_err(EpisodeError::Extraction)?
            .unwrap_or_default();

        let verification = self
            .verifier
            .verify(VerifierInput {
                llm_response: extraction_result.clone(),
                ground_truth: action.final_answer.clone(),
            })
            .await
            .map_err(EpisodeError::Verification)?;

        let (reward, rewards) = self
            .aggregator
            .aggregate(
                &self.hooks,
                &mut self.state.stats,
                &action,
                &extraction_result,
                &verification,
            )
            .await?;

        let termination = if budget.is_some_and(|max| step >= max) {
            Some(TerminationReason::MaxStepsReached)
        } else if self.hooks.should_terminate(&self.state, &verification) {
            Some(TerminationReason::Policy)
        } else {
            None
        };

        let (observation, ended) = match termination {
            Some(reason) => (Observation::terminal(step), Some(reason)),
            None => self.next_observation().await,
        };
        let done = ended.is_some();
        self.state.finish_step(observation.clone(), ended);

        tracing::debug!(
            step,
            reward,
            correct = verification.is_success(),
            done,
            "environment step"
        );

        Ok(StepResult {
            observation,
            reward,
            rewards,
            done,
            info: StepInfo {
                reason: ended,
                extraction_result: Some(extraction_result),
                verification_result: Some(verification),
                step: Some(step),
                state: Some(self.state.stats.clone()),
            },
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The construction-time configuration.
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// A copy of the free-form construction metadata.
    pub fn metadata(&self) -> JsonMap {
        self.config.metadata.clone()
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn task_source(&self) -> &T {
        &self.task_source
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn phase(&self) -> ControllerPhase {
        if !self.is_setup {
            if self.torn_down {
                ControllerPhase::TornDown
            } else {
                ControllerPhase::Uninitialized
            }
        } else if self.state.last_observation().is_none() {
            ControllerPhase::Ready
        } else if self.state.episode_ended() {
            ControllerPhase::EpisodeDone
        } else {
            ControllerPhase::InEpisode
        }
    }

    // -- internal helpers ---------------------------------------------------

    /// Sample the observation for the current step. A terminal sample ends the
    /// episode with [`TerminationReason::SamplingFailed`].
    async fn next_observation(&mut self) -> (Observation, Option<TerminationReason>) {
        let step = self.state.current_step();
        match self.sampler.sample(&mut self.task_source, step).await {
            Sample::Item {
                observation,
                datapoint,
            } => {
                self.state.stats.current_datapoint = Some(datapoint);
                (observation, None)
            }
            Sample::Terminal { observation, cause } => {
                tracing::debug!(step, ?cause, "ending episode on terminal sample");
                (observation, Some(TerminationReason::SamplingFailed))
            }
        }
    }
}

fn setup_failed(component: &'static str, source: anyhow::Error) -> EpisodeError {
    tracing::error!(component, error = %source, "environment setup failed");
    EpisodeError::Setup { component, source }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
