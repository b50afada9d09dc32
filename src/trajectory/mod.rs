//! Episode transcripts and the runner that produces them.
//!
//! - [`types::StepRecord`], [`types::EpisodeRecord`] -- what happened during
//!   an episode, in a form that can be written to disk.
//! - [`types::RunSummary`] -- aggregate reward and accuracy over many episodes.
//! - [`collector::EpisodeRunner`] -- drives a response policy through an
//!   [`EpisodeController`](crate::env::EpisodeController) and records the result.

pub mod collector;
pub mod types;

pub use collector::{EpisodeRunner, DEFAULT_STEP_CAP};
pub use types::{EpisodeRecord, RunSummary, StepRecord};
