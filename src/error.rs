//! Error taxonomy for the episode controller.
//!
//! Ordering errors are caller bugs and are never retried. Collaborator errors
//! wrap whatever the extractor, verifier, or reward hook returned and name the
//! stage that failed. Data errors (bad or exhausted task items) never show up
//! here: the sampler absorbs them into a terminal observation.

use thiserror::Error;

/// Errors raised by [`EpisodeController`](crate::env::EpisodeController).
#[derive(Error, Debug)]
pub enum EpisodeError {
    #[error("environment not set up; call setup() or reset() first")]
    NotSetUp,

    #[error("episode has ended; call reset() first")]
    EpisodeEnded,

    #[error("no current observation; call reset() first")]
    NoObservation,

    #[error("setup failed for {component}")]
    Setup {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("teardown failed for {component}")]
    Teardown {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("extractor failed")]
    Extraction(#[source] anyhow::Error),

    #[error("verifier failed")]
    Verification(#[source] anyhow::Error),

    #[error("reward hook failed")]
    RewardHook(#[source] anyhow::Error),
}

impl EpisodeError {
    /// Whether this is a caller-ordering error (step before reset, step after
    /// done, use before setup).
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::NotSetUp | Self::EpisodeEnded | Self::NoObservation
        )
    }
}

pub type Result<T, E = EpisodeError> = std::result::Result<T, E>;
