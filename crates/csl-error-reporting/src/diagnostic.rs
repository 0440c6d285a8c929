//! Core diagnostic message types.

use csl_source_map::SourceInfo;
use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that was tolerated (e.g. a reference downgraded to null)
    Warning,
    /// Informational message
    Info,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        }
    }
}

/// A structured diagnostic.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "C-2-1") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong
/// 5. **Hints**: Optional guidance for fixing
/// 6. **Location**: Where in which file the problem was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hints: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceInfo>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            hints: Vec::new(),
            location: None,
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

    /// Set the error code (`C-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: SourceInfo) -> Self {
        self.location = Some(location);
        self
    }

    /// Get the documentation URL for this error, if it has a catalogued code.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    /// Render as plain text.
    ///
    /// ```text
    /// Error [C-2-1]: title
    ///   --> main.csl:3:9
    /// Problem statement here
    /// ? Hint
    /// ```
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        match &self.code {
            Some(code) => lines.push(format!("{} [{}]: {}", self.kind.label(), code, self.title)),
            None => lines.push(format!("{}: {}", self.kind.label(), self.title)),
        }
        if let Some(location) = &self.location {
            lines.push(format!("  --> {}", location));
        }
        if let Some(problem) = &self.problem {
            lines.push(problem.clone());
        }
        for hint in &self.hints {
            lines.push(format!("? {}", hint));
        }

        lines.join("\n")
    }

    /// Render as a JSON value for machine-readable output.
    ///
    /// The location is flattened into `filename`, `line`, and `column`
    /// (1-based) so consumers do not need to know about ranges.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut obj = json!({
            "kind": self.kind,
            "title": self.title,
        });
        if let Some(code) = &self.code {
            obj["code"] = json!(code);
        }
        if let Some(problem) = &self.problem {
            obj["problem"] = json!(problem);
        }
        if !self.hints.is_empty() {
            obj["hints"] = json!(self.hints);
        }
        if let Some(location) = &self.location {
            obj["location"] = json!({
                "filename": location.filename.as_ref(),
                "line": location.line(),
                "column": location.column(),
            });
        }
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csl_source_map::{Location, Range};

    fn location() -> SourceInfo {
        SourceInfo::new(
            "main.csl",
            Range::new(Location::new(20, 2, 8), Location::new(28, 2, 16)),
        )
    }

    #[test]
    fn test_constructors() {
        assert_eq!(DiagnosticMessage::error("e").kind, DiagnosticKind::Error);
        assert_eq!(DiagnosticMessage::warning("w").kind, DiagnosticKind::Warning);
        assert_eq!(DiagnosticMessage::info("i").kind, DiagnosticKind::Info);
    }

    #[test]
    fn test_to_text_simple_error() {
        let msg = DiagnosticMessage::error("Something went wrong");
        assert_eq!(msg.to_text(), "Error: Something went wrong");
    }

    #[test]
    fn test_to_text_with_code_and_location() {
        let msg = DiagnosticMessage::error("Provider not registered")
            .with_code("C-2-1")
            .with_location(location());
        assert_eq!(
            msg.to_text(),
            "Error [C-2-1]: Provider not registered\n  --> main.csl:3:9"
        );
    }

    #[test]
    fn test_docs_url() {
        let msg = DiagnosticMessage::error("Unresolved").with_code("C-2-2");
        assert!(msg.docs_url().unwrap().contains("C-2-2"));
        assert!(DiagnosticMessage::error("plain").docs_url().is_none());
    }

    #[test]
    fn test_to_json_flattens_location() {
        let msg = DiagnosticMessage::warning("Reference downgraded")
            .with_code("C-2-2")
            .with_location(location());
        let json = msg.to_json();

        assert_eq!(json["kind"], "warning");
        assert_eq!(json["code"], "C-2-2");
        assert_eq!(json["location"]["filename"], "main.csl");
        assert_eq!(json["location"]["line"], 3);
        assert_eq!(json["location"]["column"], 9);
        assert!(json.get("problem").is_none());
    }
}
