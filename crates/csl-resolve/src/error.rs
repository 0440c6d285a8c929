/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Resolution and provider registry errors.
 */

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use csl_config::ComposeError;
use csl_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use csl_source_map::SourceInfo;
use thiserror::Error;

/// Shared, clonable failure cause. Fetch outcomes are cached and handed to
/// every reference that points at the same data, so causes must be `Clone`.
pub type Cause = Arc<dyn StdError + Send + Sync>;

/// Convert a provider's `anyhow` error into a shareable cause.
pub(crate) fn cause_from(err: anyhow::Error) -> Cause {
    Arc::from(Box::<dyn StdError + Send + Sync>::from(err))
}

/// Failure to set up a provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("unknown provider type {provider_type:?} for source {alias:?}")]
    UnknownProviderType { alias: String, provider_type: String },

    #[error("failed to initialise provider {alias:?}: {cause}")]
    Init {
        alias: String,
        #[source]
        cause: Cause,
    },
}

/// A fetch that did not complete within the configured per-fetch timeout.
#[derive(Debug, Clone, Copy, Error)]
#[error("fetch timed out after {after:?}")]
pub struct FetchTimeout {
    pub after: Duration,
}

/// A wildcard reference whose fetched value has no entries to project into.
#[derive(Debug, Clone, Error)]
#[error("wildcard expects a map or list, but the provider returned a {found}")]
pub struct WildcardTargetError {
    pub found: &'static str,
}

/// Failure to resolve a value.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("provider not registered for alias {alias:?} at {location}")]
    ProviderNotRegistered { alias: String, location: SourceInfo },

    #[error("unable to resolve reference {alias}:{} at {location}: {cause}", .path.join("."))]
    UnresolvedReference {
        alias: String,
        path: Vec<String>,
        location: SourceInfo,
        #[source]
        cause: Cause,
    },

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("resolution was cancelled")]
    Cancelled,

    #[error("resolution deadline exceeded")]
    DeadlineExceeded,
}

impl ResolveError {
    /// Cancellation and deadline errors stop the whole run and are never
    /// downgraded to warnings.
    pub fn is_interruption(&self) -> bool {
        matches!(self, ResolveError::Cancelled | ResolveError::DeadlineExceeded)
    }

    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            ResolveError::ProviderNotRegistered { location, .. }
            | ResolveError::UnresolvedReference { location, .. } => Some(location),
            ResolveError::Compose(err) => err.location(),
            ResolveError::Cancelled | ResolveError::DeadlineExceeded => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::ProviderNotRegistered { .. } => "C-2-1",
            ResolveError::UnresolvedReference { cause, .. } => {
                if cause.as_ref().downcast_ref::<ProviderError>().is_some() {
                    "C-2-4"
                } else {
                    "C-2-2"
                }
            }
            ResolveError::Compose(err) => err.code(),
            ResolveError::Cancelled | ResolveError::DeadlineExceeded => "C-2-3",
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let builder = match self {
            ResolveError::ProviderNotRegistered { alias, .. } => {
                DiagnosticMessageBuilder::error("Provider not registered")
                    .problem(format!("No source declares the alias `{alias}`"))
                    .add_hint(format!("Add a `source {alias} = \"<type>\" {{ ... }}` declaration"))
            }
            ResolveError::UnresolvedReference { alias, path, cause, .. } => {
                let title = if self.code() == "C-2-4" {
                    "Provider setup failed"
                } else {
                    "Unresolved reference"
                };
                DiagnosticMessageBuilder::error(title)
                    .problem(format!("`{alias}:{}` could not be resolved: {cause}", path.join(".")))
            }
            ResolveError::Compose(err) => return err.to_diagnostic(),
            ResolveError::Cancelled | ResolveError::DeadlineExceeded => {
                DiagnosticMessageBuilder::error("Resolution cancelled").problem(self.to_string())
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

    fn location() -> SourceInfo {
        SourceInfo::from_offsets("main.csl", "a = 1\nb = aws:vpc.id\n", 10, 20)
    }

    #[test]
    fn test_not_registered_message_names_alias_and_position() {
        let err = ResolveError::ProviderNotRegistered {
            alias: "aws".into(),
            location: location(),
        };
        assert_eq!(err.to_string(), "provider not registered for alias \"aws\" at main.csl:2:5");
        assert_eq!(err.code(), "C-2-1");
    }

    #[test]
    fn test_unresolved_reference_keeps_cause() {
        let err = ResolveError::UnresolvedReference {
            alias: "aws".into(),
            path: vec!["vpc".into(), "id".into()],
            location: location(),
            cause: cause_from(anyhow::anyhow!("connection refused")),
        };
        assert_eq!(
            err.to_string(),
            "unable to resolve reference aws:vpc.id at main.csl:2:5: connection refused"
        );
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("connection refused"));
        assert_eq!(err.code(), "C-2-2");
        assert!(!err.is_interruption());
    }

    #[test]
    fn test_init_failure_has_its_own_code() {
        let init = ProviderError::Init {
            alias: "aws".into(),
            cause: cause_from(anyhow::anyhow!("missing credentials")),
        };
        let err = ResolveError::UnresolvedReference {
            alias: "aws".into(),
            path: vec![],
            location: location(),
            cause: Arc::new(init),
        };
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("C-2-4"));
        assert_eq!(diagnostic.title, "Provider setup failed");
    }

    #[test]
    fn test_interruptions() {
        assert!(ResolveError::Cancelled.is_interruption());
        assert!(ResolveError::DeadlineExceeded.is_interruption());
        assert_eq!(ResolveError::DeadlineExceeded.code(), "C-2-3");
        assert!(ResolveError::Cancelled.location().is_none());
    }
}
