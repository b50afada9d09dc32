//! Environment-specific extension points.
//!
//! Hooks contribute data only: extra reward components and an extra
//! termination condition. The controller keeps all control flow.

use anyhow::Result;

use super::reward::RewardBreakdown;
use super::state::{EpisodeState, EpisodeStats};
use super::types::Action;
use crate::verify::VerificationResult;

/// Everything a reward-shaping hook may look at for one step.
#[derive(Debug, Clone, Copy)]
pub struct RewardContext<'a> {
    pub action: &'a Action,
    pub extraction_result: &'a str,
    pub verification: &'a VerificationResult,
    /// Episode statistics, already including this step's attempt.
    pub stats: &'a EpisodeStats,
}

#[allow(async_fn_in_trait)]
pub trait EpisodeHooks: Send + Sync {
    /// Additional named reward components for this step. Keys returned here
    /// replace the base breakdown's on collision.
    async fn extra_rewards(&self, _ctx: &RewardContext<'_>) -> Result<RewardBreakdown> {
        Ok(RewardBreakdown::new())
    }

    /// Domain-specific termination, checked after the step budget.
    fn should_terminate(&self, _state: &EpisodeState, _verification: &VerificationResult) -> bool {
        false
    }
}

/// No extra rewards, no extra termination.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl EpisodeHooks for DefaultHooks {}
