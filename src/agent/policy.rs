//! Response policies: the agent side of the loop.
//!
//! A [`ResponsePolicy`] turns an observation into a raw model response. The
//! episode runner in [`crate::trajectory`] wraps that response into an
//! [`Action`](crate::env::Action) and hands it to the controller.

use anyhow::Result;

use crate::env::Observation;

/// The subset of agent capabilities the episode runner relies on.
#[allow(async_fn_in_trait)]
pub trait ResponsePolicy: Send + Sync {
    /// Produce a raw response for the given observation.
    async fn respond(&self, observation: &Observation) -> Result<String>;
}

/// Answers with the reference answer carried in the observation context.
///
/// Useful for smoke-testing a task file: every well-formed item should verify.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleResponder;

impl ResponsePolicy for OracleResponder {
    async fn respond(&self, observation: &Observation) -> Result<String> {
        Ok(observation.reference_answer().unwrap_or_default().to_string())
    }
}

/// Repeats the question back. Never correct on a sensible task file.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

impl ResponsePolicy for EchoResponder {
    async fn respond(&self, observation: &Observation) -> Result<String> {
        Ok(observation.question.clone())
    }
}
