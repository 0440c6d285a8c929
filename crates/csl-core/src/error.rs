//! Error types for csl-core

use csl_config::ConvertError;
use csl_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use csl_resolve::{ProviderError, ResolveError};
use csl_source_map::SourceInfo;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to convert {file}: {source}")]
    Convert {
        file: String,
        #[source]
        source: ConvertError,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("failed to resolve {file}: {source}")]
    Resolve {
        file: String,
        #[source]
        source: ResolveError,
    },

    #[error("invalid compile options: {0}")]
    Options(#[from] toml::de::Error),
}

impl CompileError {
    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            CompileError::Convert { source, .. } => source.location(),
            CompileError::Resolve { source, .. } => source.location(),
            CompileError::Provider(_) | CompileError::Options(_) => None,
        }
    }

    /// Lower into a diagnostic for an external formatter.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            CompileError::Convert { source, .. } => source.to_diagnostic(),
            CompileError::Resolve { source, .. } => source.to_diagnostic(),
            CompileError::Provider(err) => DiagnosticMessageBuilder::error("Provider setup failed")
                .with_code("C-2-4")
                .problem(err.to_string())
                .build(),
            CompileError::Options(err) => DiagnosticMessageBuilder::error("Invalid compile options")
                .with_code("C-0-2")
                .problem(err.to_string())
                .build(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
