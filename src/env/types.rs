//! Values exchanged between the controller and its orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reward::RewardBreakdown;
use super::state::EpisodeStats;
use crate::verify::VerificationResult;

/// String-keyed open-ended map used for context and metadata.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Question text of the terminal observation.
pub const TERMINAL_QUESTION: &str = "Episode completed";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One agent turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The task or query given to the model.
    pub problem_statement: String,
    /// The raw model response.
    pub llm_response: String,
    /// Reference solution, used as ground truth by the verifier.
    #[serde(default)]
    pub final_answer: Option<String>,
    /// Generation metadata (model parameters, confidence, ...).
    #[serde(default)]
    pub metadata: JsonMap,
    /// When the response was generated (UTC).
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Action {
    pub fn new(problem_statement: impl Into<String>, llm_response: impl Into<String>) -> Self {
        Self {
            problem_statement: problem_statement.into(),
            llm_response: llm_response.into(),
            final_answer: None,
            metadata: JsonMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_final_answer(mut self, final_answer: impl Into<String>) -> Self {
        self.final_answer = Some(final_answer.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Build the action answering `observation`, taking the reference answer
    /// from its context when present.
    pub fn answering(observation: &Observation, llm_response: impl Into<String>) -> Self {
        Self {
            final_answer: observation.reference_answer().map(str::to_string),
            ..Self::new(observation.question.clone(), llm_response)
        }
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// What the controller hands to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub question: String,
    /// Reference answer, difficulty, and rationale when known.
    #[serde(default)]
    pub context: JsonMap,
    #[serde(default)]
    pub metadata: Option<JsonMap>,
}

impl Observation {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: JsonMap::new(),
            metadata: None,
        }
    }

    /// The sentinel observation signalling the end of an episode.
    pub fn terminal(final_step: usize) -> Self {
        let mut metadata = JsonMap::new();
        metadata.insert("terminal".into(), true.into());
        metadata.insert("final_step".into(), final_step.into());
        Self {
            question: TERMINAL_QUESTION.into(),
            context: JsonMap::new(),
            metadata: Some(metadata),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("terminal"))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// The reference answer carried in the context, if any.
    pub fn reference_answer(&self) -> Option<&str> {
        self.context.get("final_answer").and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step result
// ---------------------------------------------------------------------------

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The step budget was reached.
    MaxStepsReached,
    /// The task source could not produce a usable observation.
    SamplingFailed,
    /// An [`EpisodeHooks`](super::EpisodeHooks) termination policy fired.
    Policy,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxStepsReached => "max_steps_reached",
            Self::SamplingFailed => "sampling_failed",
            Self::Policy => "policy",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary information returned with every step.
///
/// A budget short-circuit only fills `reason`; a regular step fills
/// everything else, plus `reason` when the step ended the episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<TerminationReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerificationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<EpisodeStats>,
}

/// Outcome of one `step` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// The next observation, or the terminal one when `done`.
    pub observation: Observation,
    /// Sum of `rewards`.
    pub reward: f64,
    pub rewards: RewardBreakdown,
    pub done: bool,
    pub info: StepInfo,
}

impl StepResult {
    /// The result returned when `step` is called with the budget already spent.
    pub fn budget_exhausted(final_step: usize) -> Self {
        Self {
            observation: Observation::terminal(final_step),
            reward: 0.0,
            rewards: RewardBreakdown::default(),
            done: true,
            info: StepInfo {
                reason: Some(TerminationReason::MaxStepsReached),
                ..StepInfo::default()
            },
        }
    }
}
