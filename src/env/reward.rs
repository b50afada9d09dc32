//! Reward aggregation.
//!
//! Every step scores a mandatory `correctness` component (1.0 when the
//! verifier reports success, else 0.0). The environment's
//! [`EpisodeHooks::extra_rewards`] may add named components; on a key
//! collision the hook's value wins. The scalar reward is the plain sum of the
//! merged breakdown, so any weighting has to happen inside the hook.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::hooks::{EpisodeHooks, RewardContext};
use super::state::EpisodeStats;
use super::types::Action;
use crate::error::{EpisodeError, Result};
use crate::verify::VerificationResult;

/// Reserved breakdown key for the verifier-derived component.
pub const CORRECTNESS: &str = "correctness";

/// Named reward components for one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardBreakdown(BTreeMap<String, f64>);

impl RewardBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn correctness(&self) -> Option<f64> {
        self.get(CORRECTNESS)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge `other` into `self`; `other` wins on collision.
    pub fn merge(&mut self, other: RewardBreakdown) {
        self.0.extend(other.0);
    }

    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(String, f64)> for RewardBreakdown {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Combines the correctness signal with hook-supplied components and keeps
/// the episode's running statistics up to date.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardAggregator;

impl RewardAggregator {
    /// Score one step.
    ///
    /// Updates `stats.success_rate` and `stats.attempts`, calls the hook, and
    /// appends the merged breakdown to `stats.rewards`. Returns the total and
    /// the breakdown. A failing hook leaves `stats` untouched.
    pub async fn aggregate<H: EpisodeHooks>(
        &self,
        hooks: &H,
        stats: &mut EpisodeStats,
        action: &Action,
        extraction_result: &str,
        verification: &VerificationResult,
    ) -> Result<(f64, RewardBreakdown)> {
        let correctness = if verification.is_success() { 1.0 } else { 0.0 };
        let mut rewards = RewardBreakdown::new().with(CORRECTNESS, correctness);

        // The hook sees the stats with this step counted; they are only
        // committed once the hook succeeds.
        let mut projected = stats.clone();
        projected.record_attempt(correctness);

        let ctx = RewardContext {
            action,
            extraction_result,
            verification,
            stats: &projected,
        };
        let extra = hooks
            .extra_rewards(&ctx)
            .await
            .map_err(EpisodeError::RewardHook)?;
        rewards.merge(extra);

        projected.rewards.push(rewards.clone());
        *stats = projected;
        Ok((rewards.total(), rewards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::hooks::DefaultHooks;

    struct LengthPenalty;

    impl EpisodeHooks for LengthPenalty {
        async fn extra_rewards(&self, ctx: &RewardContext<'_>) -> anyhow::Result<RewardBreakdown> {
            let penalty = -0.01 * ctx.action.llm_response.len() as f64;
            Ok(RewardBreakdown::new().with("length", penalty))
        }
    }

    struct OverrideCorrectness;

    impl EpisodeHooks for OverrideCorrectness {
        async fn extra_rewards(&self, _ctx: &RewardContext<'_>) -> anyhow::Result<RewardBreakdown> {
            Ok(RewardBreakdown::new().with(CORRECTNESS, 0.25).with("format", 0.5))
        }
    }

    struct FailingHook;

    impl EpisodeHooks for FailingHook {
        async fn extra_rewards(&self, _ctx: &RewardContext<'_>) -> anyhow::Result<RewardBreakdown> {
            anyhow::bail!("judge model unreachable")
        }
    }

    fn action(response: &str) -> Action {
        Action::new("2+2?", response).with_final_answer("4")
    }

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base = RewardBreakdown::new().with(CORRECTNESS, 1.0);
        base.merge(RewardBreakdown::new().with(CORRECTNESS, 0.0).with("style", 0.2));
        assert_eq!(base.correctness(), Some(0.0));
        assert_eq!(base.get("style"), Some(0.2));
        assert!((base.total() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn correctness_only_by_default() {
        let mut stats = EpisodeStats::new();
        let (total, rewards) = RewardAggregator
            .aggregate(
                &DefaultHooks,
                &mut stats,
                &action("4"),
                "4",
                &VerificationResult::success("4"),
            )
            .await
            .unwrap();

        assert_eq!(total, 1.0);
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards.correctness(), Some(1.0));
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.rewards, vec![rewards]);
    }

    #[tokio::test]
    async fn extra_components_are_summed() {
        let mut stats = EpisodeStats::new();
        let (total, rewards) = RewardAggregator
            .aggregate(
                &LengthPenalty,
                &mut stats,
                &action("four"),
                "four",
                &VerificationResult::failure("four"),
            )
            .await
            .unwrap();

        assert_eq!(rewards.correctness(), Some(0.0));
        assert!((rewards.get("length").unwrap() + 0.04).abs() < 1e-9);
        assert!((total + 0.04).abs() < 1e-9);
    }

    #[tokio::test]
    async fn hook_may_override_correctness_but_not_success_rate() {
        let mut stats = EpisodeStats::new();
        let (total, rewards) = RewardAggregator
            .aggregate(
                &OverrideCorrectness,
                &mut stats,
                &action("4"),
                "4",
                &VerificationResult::success("4"),
            )
            .await
            .unwrap();

        assert_eq!(rewards.correctness(), Some(0.25));
        assert!((total - 0.75).abs() < 1e-9);
        // The running rate tracks the verifier, not the overridden component.
        assert_eq!(stats.success_rate, 1.0);
    }

    #[tokio::test]
    async fn hook_failure_is_reported() {
        let mut stats = EpisodeStats::new();
        let err = RewardAggregator
            .aggregate(
                &FailingHook,
                &mut stats,
                &action("4"),
                "4",
                &VerificationResult::success("4"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EpisodeError::RewardHook(_)));
        assert!(stats.rewards.is_empty());
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[tokio::test]
    async fn hook_sees_the_current_attempt() {
        struct AttemptBonus;

        impl EpisodeHooks for AttemptBonus {
            async fn extra_rewards(
                &self,
                ctx: &RewardContext<'_>,
            ) -> anyhow::Result<RewardBreakdown> {
                Ok(RewardBreakdown::new().with("attempt", ctx.stats.attempts as f64))
            }
        }

        let mut stats = EpisodeStats::new();
        let (_, rewards) = RewardAggregator
            .aggregate(
                &AttemptBonus,
                &mut stats,
                &action("4"),
                "4",
                &VerificationResult::success("4"),
            )
            .await
            .unwrap();
        assert_eq!(rewards.get("attempt"), Some(1.0));
        assert_eq!(stats.attempts, 1);
    }
}
