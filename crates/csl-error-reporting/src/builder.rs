//! Builder API for diagnostic messages.

use csl_source_map::SourceInfo;

use crate::diagnostic::{DiagnosticKind, DiagnosticMessage};

/// Incrementally assembles a [`DiagnosticMessage`].
///
/// ```
/// use csl_error_reporting::{DiagnosticKind, DiagnosticMessageBuilder};
///
/// let msg = DiagnosticMessageBuilder::warning("Reference downgraded to null")
///     .with_code("C-2-2")
///     .problem("Provider `aws` failed: timed out")
///     .build();
/// assert_eq!(msg.kind, DiagnosticKind::Warning);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// Set the problem statement. Calling it twice keeps the last one.
    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    /// Attach a location if one is known.
    pub fn with_location(mut self, location: impl Into<Option<SourceInfo>>) -> Self {
        self.message.location = location.into();
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_full_message() {
        let msg = DiagnosticMessageBuilder::error("Empty map key")
            .with_code("C-1-3")
            .problem("Entries in `server` must have a key")
            .add_hint("Did you mean to spread a map with `...`?")
            .with_location(SourceInfo::default())
            .build();

        let text = msg.to_text();
        assert!(text.starts_with("Error [C-1-3]: Empty map key"));
        assert!(text.contains("Entries in `server` must have a key"));
        assert!(text.contains("? Did you mean to spread"));
        assert!(text.contains("<anonymous>:1:1"));
    }

    #[test]
    fn test_builder_without_location() {
        let msg = DiagnosticMessageBuilder::info("note")
            .with_location(None::<SourceInfo>)
            .build();
        assert!(msg.location.is_none());
        assert!(msg.hints.is_empty());
    }
}
