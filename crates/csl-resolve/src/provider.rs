/*
 * provider.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Provider capability.
 */

//! The capability the resolver consumes.
//!
//! A provider is any source of configuration data addressable by a path:
//! a local file, an out-of-process plugin, the compiler's own variables.
//! The engine only knows this trait; concrete providers live elsewhere.

use async_trait::async_trait;
use csl_config::{Value, ValueMap};

use crate::context::ResolveContext;

/// What a provider receives when it is initialised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderConfig {
    /// The alias the provider was declared under (`source <alias> = ...`)
    pub alias: String,
    /// The declaration's configuration block, references already resolved
    pub config: ValueMap,
}

/// A source of configuration data.
///
/// # Lifecycle
///
/// A provider is constructed lazily, the first time one of its references is
/// resolved, and `init` runs exactly once before any `fetch`. The instance is
/// then shared for the rest of the compilation, so `fetch` must be safe to
/// call concurrently.
///
/// # Cancellation
///
/// Long-running fetches should watch `ctx` and return early once it is
/// cancelled. The resolver also drops in-flight fetches when the context is
/// interrupted, so an implementation that ignores `ctx` is still correct.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use csl_resolve::{Provider, ResolveContext};
/// use csl_config::Value;
///
/// struct Constant(Value);
///
/// #[async_trait]
/// impl Provider for Constant {
///     async fn fetch(&self, _ctx: &ResolveContext, _path: &[String]) -> anyhow::Result<Value> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Prepare the provider. Called once, before any `fetch`.
    async fn init(&mut self, _ctx: &ResolveContext, _config: ProviderConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the value at `path`. An empty path asks for the provider's root.
    async fn fetch(&self, ctx: &ResolveContext, path: &[String]) -> anyhow::Result<Value>;
}

/// Constructs uninitialised providers of one type.
pub trait ProviderFactory: Send + Sync {
    fn create(&self) -> Box<dyn Provider>;
}

impl<F> ProviderFactory for F
where
    F: Fn() -> Box<dyn Provider> + Send + Sync,
{
    fn create(&self) -> Box<dyn Provider> {
        self()
    }
}
