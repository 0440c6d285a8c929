//! Error code catalog and lookup.
//!
//! Maps error codes (like "C-2-1") to their metadata. Codes follow
//! `C-<subsystem>-<number>`: 0 internal, 1 conversion, 2 resolution,
//! 3 composition.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "convert", "resolve", "compose")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    /// URL to documentation (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// When this error was introduced (version)
    pub since_version: String,
}

/// Global error catalog, embedded at compile time from `error_catalog.json`.
///
/// # Panics
///
/// Panics on first access if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in the CSL compiler")
});

/// Look up error code information.
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Get documentation URL for an error code.
pub fn get_docs_url(code: &str) -> Option<&str> {
    ERROR_CATALOG
        .get(code)
        .and_then(|info| info.docs_url.as_deref())
}

/// Get the subsystem name for an error code.
///
/// ```
/// use csl_error_reporting::catalog::get_subsystem;
///
/// assert_eq!(get_subsystem("C-2-1"), Some("resolve"));
/// ```
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_internal_error_exists() {
        let info = get_error_info("C-0-1").unwrap();
        assert_eq!(info.subsystem, "internal");
        assert_eq!(info.title, "Internal Error");
    }

    #[test]
    fn test_codes_match_subsystem_numbers() {
        for (code, info) in ERROR_CATALOG.iter() {
            let subsystem_number = code.split('-').nth(1).unwrap();
            let expected = match subsystem_number {
                "0" if info.subsystem == "options" => "options",
                "0" => "internal",
                "1" => "convert",
                "2" => "resolve",
                "3" => "compose",
                other => panic!("unexpected subsystem number {other} in {code}"),
            };
            assert_eq!(info.subsystem, expected, "code {code}");
        }
    }

    #[test]
    fn test_options_error_is_not_internal() {
        assert_eq!(get_subsystem("C-0-2"), Some("options"));
    }

    #[test]
    fn test_get_docs_url() {
        let url = get_docs_url("C-1-3").unwrap();
        assert!(url.ends_with("C-1-3"));
    }

    #[test]
    fn test_nonexistent_code() {
        assert!(get_error_info("C-99-99").is_none());
        assert!(get_subsystem("C-99-99").is_none());
    }
}
