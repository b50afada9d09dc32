//! Verifiers: collaborators that judge an extracted response against a
//! reference answer.
//!
//! The controller only looks at [`VerificationResult::status`]; the remaining
//! fields are diagnostics that travel back to the caller inside `StepResult::info`.

use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// What the verifier is asked to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierInput {
    /// The extracted (verifiable) part of the model response.
    pub llm_response: String,
    /// The reference answer, when the action carried one.
    pub ground_truth: Option<String>,
}

/// Coarse verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Success,
    Failure,
    Error,
    Timeout,
}

impl VerificationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The verifier's verdict plus optional diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerificationOutcome,
    /// Free-form verifier output (e.g. the normalised answer that was compared).
    #[serde(default)]
    pub result: String,
    /// Wall-clock time spent verifying, in seconds.
    #[serde(default)]
    pub duration_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl VerificationResult {
    pub fn new(status: VerificationOutcome, result: impl Into<String>) -> Self {
        Self {
            status,
            result: result.into(),
            duration_secs: 0.0,
            error_message: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn success(result: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::Success, result)
    }

    pub fn failure(result: impl Into<String>) -> Self {
        Self::new(VerificationOutcome::Failure, result)
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The verifier trait.
#[allow(async_fn_in_trait)]
pub trait Verifier: Send + Sync {
    /// Judge `input.llm_response` against `input.ground_truth`.
    async fn verify(&self, input: VerifierInput) -> Result<VerificationResult>;

    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Exact-match verifier
// ---------------------------------------------------------------------------

/// Compares the response to the ground truth after trimming whitespace.
/// Case-sensitive unless built with [`ExactMatchVerifier::case_insensitive`].
#[derive(Debug, Clone)]
pub struct ExactMatchVerifier {
    case_sensitive: bool,
}

impl ExactMatchVerifier {
    pub fn new() -> Self {
        Self {
            case_sensitive: true,
        }
    }

    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }

    fn normalise(&self, s: &str) -> String {
        let trimmed = s.trim();
        if self.case_sensitive {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        }
    }
}

impl Default for ExactMatchVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier for ExactMatchVerifier {
    async fn verify(&self, input: VerifierInput) -> Result<VerificationResult> {
        let started = Instant::now();

        let Some(truth) = input.ground_truth.as_deref() else {
            return Ok(VerificationResult::failure(input.llm_response)
                .with_error("no ground truth provided"));
        };

        let candidate = self.normalise(&input.llm_response);
        let status = if candidate == self.normalise(truth) {
            VerificationOutcome::Success
        } else {
            VerificationOutcome::Failure
        };

        let mut result = VerificationResult::new(status, candidate);
        result.duration_secs = started.elapsed().as_secs_f64();
        Ok(result)
    }
}
