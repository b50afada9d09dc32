//! Optional teacher / reward-shaping agent.
//!
//! The controller only resets the teacher during setup. Any richer use (hints,
//! process rewards) belongs in an [`EpisodeHooks`](crate::env::EpisodeHooks)
//! implementation that holds its own handle to the teacher.

use anyhow::Result;

#[allow(async_fn_in_trait)]
pub trait TeacherAgent: Send + Sync {
    /// Clear any conversation state before the environment is used.
    async fn reset(&mut self) -> Result<()>;
}

/// Placeholder used when no teacher is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTeacher;

impl TeacherAgent for NoTeacher {
    async fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}
