//! Thought fragments extracted from local model output

/// Opening tag of a visible reasoning block
pub const THINK_OPEN: &str = "<think>";
/// Closing tag of a visible reasoning block
pub const THINK_CLOSE: &str = "</think>";

/// Reasoning text used to prime the upstream model
///
/// Lives for a single request. An empty fragment means nothing is injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThoughtFragment(String);

impl ThoughtFragment {
    /// Fragment that injects nothing
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Extract a fragment from accumulated local model output.
    ///
    /// Everything after the first `<think>` is kept, trimmed, and closed with
    /// `</think>`. Closing tags already present in the text are not
    /// interpreted. Without an opening tag the fragment is empty.
    pub fn extract(text: &str) -> Self {
        match text.find(THINK_OPEN) {
            Some(start) => {
                let reasoning = text[start + THINK_OPEN.len()..].trim();
                Self(format!("{}{}", reasoning, THINK_CLOSE))
            }
            None => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
