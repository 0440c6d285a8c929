/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Resolver options.
 */

use std::time::Duration;

/// Default bound on concurrent provider fetches.
pub const DEFAULT_MAX_CONCURRENT_PROVIDERS: usize = 4;

/// Options controlling one resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Downgrade missing providers and failed fetches to a warning and `null`.
    pub allow_missing_provider: bool,
    /// Per-fetch timeout. `None` waits as long as the context allows.
    pub fetch_timeout: Option<Duration>,
    /// Upper bound on fetches in flight at once. `0` and `1` both resolve
    /// siblings one after another.
    pub max_concurrent_providers: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            allow_missing_provider: false,
            fetch_timeout: None,
            max_concurrent_providers: DEFAULT_MAX_CONCURRENT_PROVIDERS,
        }
    }
}

impl ResolveOptions {
    pub fn allow_missing_provider(mut self, allow: bool) -> Self {
        self.allow_missing_provider = allow;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn max_concurrent_providers(mut self, max: usize) -> Self {
        self.max_concurrent_providers = max;
        self
    }

    /// Whether sibling subtrees resolve concurrently.
    pub fn is_parallel(&self) -> bool {
        self.max_concurrent_providers > 1
    }

    /// Number of semaphore permits, never zero.
    pub(crate) fn permits(&self) -> usize {
        self.max_concurrent_providers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResolveOptions::default();
        assert!(!options.allow_missing_provider);
        assert_eq!(options.fetch_timeout, None);
        assert_eq!(options.max_concurrent_providers, 4);
        assert!(options.is_parallel());
    }

    #[test]
    fn test_zero_bound_is_sequential() {
        let options = ResolveOptions::default().max_concurrent_providers(0);
        assert!(!options.is_parallel());
        assert_eq!(options.permits(), 1);
    }
}
