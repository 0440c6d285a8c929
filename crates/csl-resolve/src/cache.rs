/*
 * cache.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-run fetch cache with single-flight semantics.
 */

//! Fetch outcomes, keyed by `alias:path`.
//!
//! Each key owns a [`tokio::sync::OnceCell`]. The first requester runs the
//! fetch; concurrent requesters for the same key wait on the cell and share
//! the outcome. Failures are cached as well, so a broken path is fetched at
//! most once per run even when many references point at it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use csl_config::Value;
use tokio::sync::OnceCell;

use crate::error::Cause;

/// What one fetch produced.
pub type FetchOutcome = Result<Value, Cause>;

/// Build the cache key for a reference: `alias ":" path joined by "/"`.
///
/// ```
/// use csl_resolve::build_cache_key;
///
/// assert_eq!(build_cache_key("config", &["key"]), "config:key");
/// assert_eq!(build_cache_key("network", &["vpc", "subnets", "0"]), "network:vpc/subnets/0");
/// assert_eq!(build_cache_key::<&str>("root", &[]), "root:");
/// ```
pub fn build_cache_key<S: AsRef<str>>(alias: &str, path: &[S]) -> String {
    let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    format!("{alias}:{}", path.join("/"))
}

/// Fetch outcomes for one resolution run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<FetchOutcome>>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell for `key`, created empty on first use.
    pub(crate) fn slot(&self, key: &str) -> Arc<OnceCell<FetchOutcome>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.to_string()).or_default())
    }

    /// The completed outcome for `key`, if a fetch for it has finished.
    pub fn get(&self, key: &str) -> Option<FetchOutcome> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// The cached value for `key`, if its fetch succeeded.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.get(key).and_then(Result::ok)
    }

    /// Number of keys with a completed fetch.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(build_cache_key("config", &["key"]), "config:key");
        assert_eq!(
            build_cache_key("network", &["vpc".to_string(), "subnets".to_string(), "0".to_string()]),
            "network:vpc/subnets/0"
        );
        assert_eq!(build_cache_key::<String>("root", &[]), "root:");
        // same inputs, same key
        assert_eq!(build_cache_key("a", &["b", "c"]), build_cache_key("a", &["b", "c"]));
        assert_ne!(build_cache_key("a", &["b", "c"]), build_cache_key("a", &["b.c"]));
    }

    #[tokio::test]
    async fn test_slot_is_shared_per_key() {
        let cache = ResolutionCache::new();
        let first = cache.slot("net:vpc");
        let second = cache.slot("net:vpc");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());

        first
            .get_or_init(|| async { Ok(Value::from("vpc-123")) })
            .await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_value("net:vpc"), Some(Value::from("vpc-123")));
        assert!(cache.get("net:other").is_none());
    }
}
