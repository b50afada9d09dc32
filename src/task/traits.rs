//! Core task-source trait and the item type it serves.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One problem item served by a [`TaskSource`].
///
/// `question` and `final_answer` are required for the item to be usable; they
/// default to empty strings on deserialisation so that a malformed item can
/// still be loaded and then rejected by the sampler with a logged index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// The problem statement shown to the agent.
    #[serde(default)]
    pub question: String,
    /// The reference answer the verifier checks against.
    #[serde(default)]
    pub final_answer: String,
    /// Optional worked solution.
    #[serde(default)]
    pub rationale: Option<String>,
    /// Optional difficulty label (e.g. "easy", "level-3").
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Item-supplied metadata, merged into the observation metadata.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl DataPoint {
    pub fn new(question: impl Into<String>, final_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            final_answer: final_answer.into(),
            ..Self::default()
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether both required fields are present.
    pub fn is_complete(&self) -> bool {
        !self.question.is_empty() && !self.final_answer.is_empty()
    }
}

/// The task-source trait.
///
/// `setup`, `cleanup`, and `generate_new` are optional capabilities: the
/// default bodies are no-ops (or refuse, for generation) so sources only
/// implement what they support.
#[allow(async_fn_in_trait)]
pub trait TaskSource: Send + Sync {
    /// Number of items currently available.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the item at `index`, or `None` if there is no usable item there.
    fn get(&self, index: usize) -> Option<DataPoint>;

    /// Prepare the source before the first episode.
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release resources held by the source.
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether the source can create new items on demand.
    fn is_extendable(&self) -> bool {
        false
    }

    /// Create `count` new items and append them to the source.
    async fn generate_new(&mut self, count: usize) -> Result<()> {
        anyhow::bail!("task source cannot generate {count} new item(s)")
    }
}
