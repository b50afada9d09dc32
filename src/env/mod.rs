//! The training-episode environment.
//!
//! - [`types`] -- [`Action`], [`Observation`], [`StepResult`] and friends.
//! - [`state`] -- per-episode progress and running statistics.
//! - [`sampler`] -- turns task-source items into observations.
//! - [`reward`] -- correctness scoring and breakdown merging.
//! - [`hooks`] -- environment-specific reward shaping and termination.
//! - [`controller`] -- the [`EpisodeController`] state machine tying it all
//!   together.

pub mod controller;
pub mod hooks;
pub mod reward;
pub mod sampler;
pub mod state;
pub mod types;

pub use controller::{ControllerPhase, EpisodeController};
pub use hooks::{DefaultHooks, EpisodeHooks, RewardContext};
pub use reward::{RewardAggregator, RewardBreakdown, CORRECTNESS};
pub use sampler::{ObservationSampler, Sample, SampleFailure};
pub use state::{EpisodeState, EpisodeStats};
pub use types::{Action, JsonMap, Observation, StepInfo, StepResult, TerminationReason};
