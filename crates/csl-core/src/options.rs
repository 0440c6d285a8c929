/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile options, loaded from TOML.
 */

//! Options for one compilation.
//!
//! ```toml
//! allow_missing_provider = true
//! max_concurrent_providers = 8
//! fetch_timeout_ms = 5000
//!
//! [variables]
//! region = "eu-west-1"
//! replicas = 3
//! ```

use std::time::Duration;

use csl_resolve::{DEFAULT_MAX_CONCURRENT_PROVIDERS, ResolveOptions};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Downgrade missing providers and failed fetches to warnings.
    pub allow_missing_provider: bool,
    /// Upper bound on concurrent provider fetches; `1` resolves sequentially.
    pub max_concurrent_providers: usize,
    /// Per-fetch timeout in milliseconds.
    pub fetch_timeout_ms: Option<u64>,
    /// Values served by the built-in `var` provider.
    pub variables: IndexMap<String, serde_json::Value>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            allow_missing_provider: false,
            max_concurrent_providers: DEFAULT_MAX_CONCURRENT_PROVIDERS,
            fetch_timeout_ms: None,
            variables: IndexMap::new(),
        }
    }
}

impl CompileOptions {
    /// Parse options from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, CompileError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        let options = ResolveOptions::default()
            .allow_missing_provider(self.allow_missing_provider)
            .max_concurrent_providers(self.max_concurrent_providers);
        match self.fetch_timeout_ms {
            Some(ms) => options.fetch_timeout(Duration::from_millis(ms)),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let options = CompileOptions::from_toml_str("").unwrap();
        assert_eq!(options, CompileOptions::default());
        assert_eq!(options.resolve_options(), ResolveOptions::default());
    }

    #[test]
    fn test_full_toml() {
        let options = CompileOptions::from_toml_str(
            r#"
            allow_missing_provider = true
            max_concurrent_providers = 1
            fetch_timeout_ms = 250

            [variables]
            region = "eu-west-1"
            replicas = 3

            [variables.tags]
            team = "core"
            "#,
        )
        .unwrap();

        assert!(options.allow_missing_provider);
        assert_eq!(options.variables["region"], "eu-west-1");
        assert_eq!(options.variables["replicas"], 3);
        assert_eq!(options.variables["tags"]["team"], "core");

        let resolve = options.resolve_options();
        assert_eq!(resolve.fetch_timeout, Some(Duration::from_millis(250)));
        assert!(!resolve.is_parallel());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = CompileOptions::from_toml_str("allow_missing = true").unwrap_err();
        assert!(matches!(err, CompileError::Options(_)));
        assert!(err.to_string().contains("allow_missing"));

        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("C-0-2"));
        assert!(diagnostic.docs_url().is_some_and(|url| url.ends_with("C-0-2")));
    }
}
