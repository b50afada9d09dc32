//! A fixed, in-memory task source.

use std::path::Path;

use anyhow::{Context, Result};

use super::traits::{DataPoint, TaskSource};

/// A task source backed by a `Vec<DataPoint>`. Not extendable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskSource {
    items: Vec<DataPoint>,
}

impl InMemoryTaskSource {
    pub fn new(items: Vec<DataPoint>) -> Self {
        Self { items }
    }

    /// Load items from a JSON file containing an array of [`DataPoint`]s.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tasks from {}", path.display()))?;
        let items: Vec<DataPoint> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse tasks from {}", path.display()))?;
        tracing::debug!(path = %path.display(), items = items.len(), "loaded task source");
        Ok(Self { items })
    }

    pub fn items(&self) -> &[DataPoint] {
        &self.items
    }
}

impl TaskSource for InMemoryTaskSource {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<DataPoint> {
        self.items.get(index).cloned()
    }
}
