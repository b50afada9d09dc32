use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Construction-time configuration for an [`EpisodeController`](crate::env::EpisodeController).
///
/// Never mutated after the controller is built; the controller only hands out
/// read-only views and clones of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Step budget per episode. `None` (or `Some(0)`) means unbounded.
    #[serde(default)]
    pub max_steps: Option<usize>,
    /// Free-form environment parameters, exposed back through
    /// `EpisodeController::metadata`.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl EnvironmentConfig {
    /// A configuration with the given step budget and no metadata.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// The effective step budget. A zero budget counts as no budget.
    pub fn step_budget(&self) -> Option<usize> {
        self.max_steps.filter(|&n| n > 0)
    }
}
