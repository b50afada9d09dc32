//! verigym: an episode controller for verifiable-reward training loops.
//!
//! An [`env::EpisodeController`] samples problems from a [`task::TaskSource`],
//! extracts the verifiable part of each agent response with an
//! [`extract::Extractor`], checks it with a [`verify::Verifier`], and turns
//! the verdict into a reward with an auditable breakdown.

pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod extract;
pub mod task;
pub mod trajectory;
pub mod verify;
