//! Turning task-source items into observations.
//!
//! Items are picked cyclically: index = `step mod len(source)`. Any data
//! problem (empty source, failed generation, missing or incomplete item) is
//! logged and answered with a terminal observation instead of an error, so a
//! bad item ends the episode rather than the process.

use super::types::{JsonMap, Observation};
use crate::task::{DataPoint, TaskSource};

/// Why the sampler fell back to a terminal observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleFailure {
    /// The source is empty and cannot generate items.
    Exhausted,
    /// On-demand generation returned an error.
    GenerationFailed(String),
    /// Generation succeeded but the source is still empty.
    StillEmpty,
    /// No item at the computed index.
    MissingItem { index: usize },
    /// The item lacks `question` or `final_answer`.
    IncompleteItem { index: usize },
}

/// Result of one sampling attempt.
#[derive(Debug, Clone)]
pub enum Sample {
    Item {
        observation: Observation,
        datapoint: DataPoint,
    },
    Terminal {
        observation: Observation,
        cause: SampleFailure,
    },
}

impl Sample {
    pub fn observation(&self) -> &Observation {
        match self {
            Self::Item { observation, .. } | Self::Terminal { observation, .. } => observation,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationSampler;

impl ObservationSampler {
    /// Produce the observation for `step` from `source`.
    pub async fn sample<T: TaskSource>(&self, source: &mut T, step: usize) -> Sample {
        if source.is_empty() {
            if !source.is_extendable() {
                tracing::error!(step, "task source is empty and cannot generate new items");
                return terminal(step, SampleFailure::Exhausted);
            }

            tracing::warn!(step, "task source is empty, generating a new item");
            if let Err(e) = source.generate_new(1).await {
                tracing::error!(step, error = %e, "failed to generate new task item");
                return terminal(step, SampleFailure::GenerationFailed(e.to_string()));
            }
            tracing::info!(step, "generated new task item");

            if source.is_empty() {
                tracing::error!(step, "task source is still empty after generation");
                return terminal(step, SampleFailure::StillEmpty);
            }
        }

        let index = step % source.len();
        let Some(datapoint) = source.get(index) else {
            tracing::error!(index, "no task item at index");
            return terminal(step, SampleFailure::MissingItem { index });
        };
        if !datapoint.is_complete() {
            tracing::error!(index, "task item is missing required fields");
            return terminal(step, SampleFailure::IncompleteItem { index });
        }

        let observation = build_observation(&datapoint, step, index);
        tracing::debug!(step, index, "sampled observation");
        Sample::Item {
            observation,
            datapoint,
        }
    }
}

fn terminal(step: usize, cause: SampleFailure) -> Sample {
    Sample::Terminal {
        observation: Observation::terminal(step),
        cause,
    }
}

fn build_observation(datapoint: &DataPoint, step: usize, index: usize) -> Observation {
    let mut context = JsonMap::new();
    context.insert("final_answer".into(), datapoint.final_answer.clone().into());
    context.insert("difficulty".into(), datapoint.difficulty.clone().into());
    context.insert("rationale".into(), datapoint.rationale.clone().into());

    let mut metadata = JsonMap::new();
    metadata.insert("step".into(), step.into());
    metadata.insert("datapoint_id".into(), index.to_string().into());
    metadata.insert(
        "verified".into(),
        datapoint
            .metadata
            .get("verified")
            .cloned()
            .unwrap_or(serde_json::Value::Bool(false)),
    );
    // Item-supplied keys win.
    metadata.extend(datapoint.metadata.clone());

    Observation {
        question: datapoint.question.clone(),
        context,
        metadata: Some(metadata),
    }
}
