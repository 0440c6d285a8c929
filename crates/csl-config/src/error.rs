//! Conversion and composition errors.

use csl_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use csl_source_map::SourceInfo;
use thiserror::Error;

/// Failure to turn a syntax tree into a [`Value`](crate::Value).
///
/// Nested failures are wrapped with the key or list index they occurred
/// under, so the message reads outside-in: `failed to convert key "db":
/// failed to convert list index 2: ...`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("unsupported expression: {kind} at {source_info}")]
    UnsupportedExpression { kind: String, source_info: SourceInfo },

    #[error("map entry has no expression at {source_info}")]
    NilExpression { source_info: SourceInfo },

    #[error("map entry has an empty key at {source_info}")]
    EmptyMapKey { source_info: SourceInfo },

    #[error("spread is not allowed inside a source configuration at {source_info}")]
    SpreadNotAllowedHere { source_info: SourceInfo },

    #[error("spread entry also names key {key:?} at {source_info}")]
    KeyedSpread { key: String, source_info: SourceInfo },

    #[error("nesting exceeds the maximum depth of {max_depth} at {source_info}")]
    NestingTooDeep { max_depth: usize, source_info: SourceInfo },

    #[error("failed to convert key {key:?}: {source}")]
    InKey {
        key: String,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("failed to convert list index {index}: {source}")]
    InIndex {
        index: usize,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    pub fn in_key(self, key: impl Into<String>) -> Self {
        ConvertError::InKey {
            key: key.into(),
            source: Box::new(self),
        }
    }

    pub fn in_index(self, index: usize) -> Self {
        ConvertError::InIndex {
            index,
            source: Box::new(self),
        }
    }

    /// The innermost failure, with the key/index wrappers peeled off.
    pub fn root_cause(&self) -> &ConvertError {
        match self {
            ConvertError::InKey { source, .. } | ConvertError::InIndex { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Location of the innermost failure.
    pub fn location(&self) -> Option<&SourceInfo> {
        match self.root_cause() {
            ConvertError::UnsupportedExpression { source_info, .. }
            | ConvertError::NilExpression { source_info }
            | ConvertError::EmptyMapKey { source_info }
            | ConvertError::SpreadNotAllowedHere { source_info }
            | ConvertError::KeyedSpread { source_info, .. }
            | ConvertError::NestingTooDeep { source_info, .. } => Some(source_info),
            ConvertError::InKey { .. } | ConvertError::InIndex { .. } => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.root_cause() {
            ConvertError::UnsupportedExpression { .. } => "C-1-1",
            ConvertError::NilExpression { .. } => "C-1-2",
            ConvertError::EmptyMapKey { .. } => "C-1-3",
            ConvertError::SpreadNotAllowedHere { .. } => "C-1-4",
            ConvertError::NestingTooDeep { .. } => "C-1-5",
            ConvertError::KeyedSpread { .. } => "C-1-6",
            ConvertError::InKey { .. } | ConvertError::InIndex { .. } => "C-0-1",
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let title = match self.root_cause() {
            ConvertError::UnsupportedExpression { .. } => "Unsupported expression",
            ConvertError::NilExpression { .. } => "Missing expression",
            ConvertError::EmptyMapKey { .. } => "Empty map key",
            ConvertError::SpreadNotAllowedHere { .. } => "Spread not allowed here",
            ConvertError::NestingTooDeep { .. } => "Nesting too deep",
            ConvertError::KeyedSpread { .. } => "Spread with a key",
            ConvertError::InKey { .. } | ConvertError::InIndex { .. } => "Conversion failed",
        };
        let mut builder = DiagnosticMessageBuilder::error(title)
            .with_code(self.code())
            .problem(self.to_string())
            .with_location(self.location().cloned());
        match self.root_cause() {
            ConvertError::SpreadNotAllowedHere { .. } => {
                builder = builder.add_hint("Source configurations must spell out every key explicitly");
            }
            ConvertError::KeyedSpread { .. } => {
                builder = builder.add_hint("Write either `key = value` or `...value`, not both");
            }
            _ => {}
        }
        builder.build()
    }
}

/// Failure while folding maps together.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// A spread contributed something other than a map.
    #[error("cannot spread a {found} into a map at {source_info}")]
    NonMapMergeTarget {
        found: &'static str,
        source_info: SourceInfo,
    },

    /// A spread still pointed at a provider when the map was composed.
    #[error("spread reference `{reference}` was not resolved before composition at {source_info}")]
    UnresolvedSpread { reference: String, source_info: SourceInfo },
}

impl ComposeError {
    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            ComposeError::NonMapMergeTarget { source_info, .. }
            | ComposeError::UnresolvedSpread { source_info, .. } => Some(source_info),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ComposeError::NonMapMergeTarget { .. } => "C-3-1",
            ComposeError::UnresolvedSpread { .. } => "C-3-2",
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let builder = match self {
            ComposeError::NonMapMergeTarget { found, .. } => {
                DiagnosticMessageBuilder::error("Spread target is not a map")
                    .problem(format!("A spread must produce a map, but this one produced a {found}"))
                    .add_hint("Use a wildcard reference such as `alias:path.*` to spread provider data")
            }
            ComposeError::UnresolvedSpread { reference, .. } => {
                DiagnosticMessageBuilder::error("Unresolved spread")
                    .problem(format!("`{reference}` must be resolved before its map can be composed"))
            }
        };
        builder
            .with_code(self.code())
            .with_location(self.location().cloned())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csl_source_map::{Location, Range};

    fn at(line: usize, column: usize) -> SourceInfo {
        let start = Location::new(0, line - 1, column - 1);
        SourceInfo::new("main.csl", Range::new(start, start))
    }

    #[test]
    fn test_wrapped_message_reads_outside_in() {
        let err = ConvertError::UnsupportedExpression {
            kind: "function call".into(),
            source_info: at(4, 9),
        }
        .in_index(2)
        .in_key("db");

        assert_eq!(
            err.to_string(),
            "failed to convert key \"db\": failed to convert list index 2: \
             unsupported expression: function call at main.csl:4:9"
        );
        assert_eq!(err.code(), "C-1-1");
        assert_eq!(err.location().map(|l| l.line()), Some(4));
    }

    #[test]
    fn test_convert_diagnostic() {
        let err = ConvertError::SpreadNotAllowedHere { source_info: at(2, 3) }.in_key("config");
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("C-1-4"));
        assert_eq!(diagnostic.hints.len(), 1);
        assert!(diagnostic.to_text().contains("main.csl:2:3"));
    }

    #[test]
    fn test_compose_diagnostic() {
        let err = ComposeError::NonMapMergeTarget {
            found: "list",
            source_info: at(7, 1),
        };
        assert_eq!(err.to_string(), "cannot spread a list into a map at main.csl:7:1");
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("C-3-1"));
        assert_eq!(diagnostic.location, Some(at(7, 1)));
    }
}
