//! Extractors: collaborators that isolate the verifiable part of a raw model
//! response.
//!
//! An extractor returning `None` is not an error; the controller treats it as
//! an empty extraction.

use anyhow::Result;

/// The extractor trait.
#[allow(async_fn_in_trait)]
pub trait Extractor: Send + Sync {
    /// Pull the verifiable portion out of `raw`, or `None` if there is none.
    async fn extract(&self, raw: &str) -> Result<Option<String>>;

    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Returns the whole response, trimmed. Blank responses extract to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExtractor;

impl Extractor for PassthroughExtractor {
    async fn extract(&self, raw: &str) -> Result<Option<String>> {
        let trimmed = raw.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}

/// Returns the content of the last `open ... close` span in the response,
/// e.g. `\boxed{` ... `}`. Nested braces inside the span are balanced when
/// `close` is `}`.
#[derive(Debug, Clone)]
pub struct DelimitedExtractor {
    open: String,
    close: String,
}

impl DelimitedExtractor {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Extractor for LaTeX `\boxed{...}` answers.
    pub fn boxed() -> Self {
        Self::new("\\boxed{", "}")
    }

    fn last_span<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let start = raw.rfind(&self.open)? + self.open.len();
        let rest = &raw[start..];

        if self.close == "}" {
            let mut depth = 0usize;
            for (i, ch) in rest.char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' if depth == 0 => return Some(&rest[..i]),
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            return None;
        }

        rest.find(&self.close).map(|end| &rest[..end])
    }
}

impl Extractor for DelimitedExtractor {
    async fn extract(&self, raw: &str) -> Result<Option<String>> {
        Ok(self
            .last_span(raw)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_trims_and_drops_blank() {
        let ex = PassthroughExtractor;
        assert_eq!(ex.extract("  7 \n").await.unwrap().as_deref(), Some("7"));
        assert_eq!(ex.extract("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn boxed_takes_last_span() {
        let ex = DelimitedExtractor::boxed();
        let raw = "First guess \\boxed{3}, but actually \\boxed{4}.";
        assert_eq!(ex.extract(raw).await.unwrap().as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn boxed_balances_nested_braces() {
        let ex = DelimitedExtractor::boxed();
        let raw = "So the answer is \\boxed{\\frac{1}{2}}";
        assert_eq!(
            ex.extract(raw).await.unwrap().as_deref(),
            Some("\\frac{1}{2}")
        );
    }

    #[tokio::test]
    async fn unterminated_span_extracts_nothing() {
        let ex = DelimitedExtractor::boxed();
        assert_eq!(ex.extract("\\boxed{12").await.unwrap(), None);
        assert_eq!(ex.extract("no answer here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn custom_delimiters() {
        let ex = DelimitedExtractor::new("<answer>", "</answer>");
        let raw = "<think>hmm</think><answer> Paris </answer>";
        assert_eq!(ex.extract(raw).await.unwrap().as_deref(), Some("Paris"));
    }
}
