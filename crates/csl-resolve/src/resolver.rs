/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reference resolution over Value trees.
 */

//! The resolver: replaces every [`Reference`] in a tree with provider data.
//!
//! # Concurrency
//!
//! Sibling subtrees (list items, map values, the entries of a spread-carrying
//! map) resolve concurrently inside the caller's task via `try_join_all`. A
//! shared semaphore bounds the number of `fetch` calls in flight; it is held
//! only around the fetch itself, so waiting on the cache or on a provider's
//! initialisation never occupies a permit. The first error drops the
//! remaining siblings, which cancels their in-flight fetches. Outcomes that
//! completed before that stay cached.
//!
//! # Determinism
//!
//! A spread-carrying map is composed only after every one of its values has
//! resolved, and always in declaration order, so the result never depends on
//! which fetch finished first.

use std::sync::Arc;

use csl_config::{
    MapEntries, OrderedEntry, Reference, Value, ValueMap, compose_ordered, reject_unresolved_spread,
};
use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use tokio::sync::Semaphore;

use crate::cache::{FetchOutcome, ResolutionCache, build_cache_key};
use crate::context::ResolveContext;
use crate::error::{Cause, FetchTimeout, ResolveError, WildcardTargetError, cause_from};
use crate::options::ResolveOptions;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;

/// Receives one message per downgraded reference.
pub type WarningSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Resolves references for one compilation run.
///
/// The resolver owns the run's fetch cache: resolving the same input twice
/// with one resolver issues no additional fetches. Create a new resolver for
/// every compilation.
pub struct Resolver {
    registry: Arc<ProviderRegistry>,
    options: ResolveOptions,
    cache: ResolutionCache,
    permits: Semaphore,
    warning_sink: Option<WarningSink>,
}

impl Resolver {
    pub fn new(registry: Arc<ProviderRegistry>, options: ResolveOptions) -> Self {
        let permits = Semaphore::new(options.permits());
        Self {
            registry,
            options,
            cache: ResolutionCache::new(),
            permits,
            warning_sink: None,
        }
    }

    /// Send downgrade warnings to `sink` as well as to the log.
    pub fn with_warning_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.warning_sink = Some(Arc::new(sink));
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve every reference in `value`.
    ///
    /// Scalars come back unchanged, lists keep their order, secrets stay
    /// wrapped, and spread-carrying maps come back as plain maps.
    pub async fn resolve_value(&self, ctx: &ResolveContext, value: Value) -> Result<Value, ResolveError> {
        self.resolve(ctx, value).await
    }

    /// Resolve every value of a plain map.
    pub async fn resolve_map(&self, ctx: &ResolveContext, map: ValueMap) -> Result<ValueMap, ResolveError> {
        let (keys, values): (Vec<String>, Vec<Value>) = map.into_iter().unzip();
        let values = self.resolve_all(ctx, values).await?;
        Ok(keys.into_iter().zip(values).collect())
    }

    fn resolve<'a>(&'a self, ctx: &'a ResolveContext, value: Value) -> BoxFuture<'a, Result<Value, ResolveError>> {
        async move {
            ctx.check()?;
            match value {
                Value::Scalar(_) => Ok(value),
                Value::List(items) => Ok(Value::List(self.resolve_all(ctx, items).await?)),
                Value::Map(MapEntries::Plain(map)) => Ok(Value::map(self.resolve_map(ctx, map).await?)),
                Value::Map(MapEntries::WithSpreads(entries)) => self.resolve_ordered(ctx, entries).await,
                Value::Reference(reference) => self.resolve_reference(ctx, reference).await,
                Value::Secret(inner) => Ok(Value::secret(self.resolve(ctx, *inner).await?)),
            }
        }
        .boxed()
    }

    async fn resolve_all(&self, ctx: &ResolveContext, values: Vec<Value>) -> Result<Vec<Value>, ResolveError> {
        self.join(values.into_iter().map(|value| self.resolve(ctx, value)).collect())
            .await
    }

    /// Await sibling futures, concurrently unless resolution is sequential.
    async fn join<'a, T>(
        &self,
        futures: Vec<BoxFuture<'a, Result<T, ResolveError>>>,
    ) -> Result<Vec<T>, ResolveError> {
        if !self.options.is_parallel() {
            let mut resolved = Vec::with_capacity(futures.len());
            for future in futures {
                resolved.push(future.await?);
            }
            return Ok(resolved);
        }
        try_join_all(futures).await
    }

    async fn resolve_ordered(
        &self,
        ctx: &ResolveContext,
        entries: Vec<OrderedEntry>,
    ) -> Result<Value, ResolveError> {
        let mut heads = Vec::with_capacity(entries.len());
        let mut futures = Vec::with_capacity(entries.len());
        for entry in entries {
            let future = if entry.is_spread() {
                self.resolve_spread(ctx, entry.value)
            } else {
                self.resolve(ctx, entry.value).map(|value| value.map(Some)).boxed()
            };
            heads.push((entry.key, entry.source_info));
            futures.push(future);
        }

        let values = self.join(futures).await?;
        let resolved = heads
            .into_iter()
            .zip(values)
            // `None` marks a downgraded spread, which contributes nothing
            .filter_map(|((key, source_info), value)| {
                value.map(|value| OrderedEntry {
                    key,
                    value,
                    source_info,
                })
            })
            .collect();

        Ok(Value::map(compose_ordered(resolved, reject_unresolved_spread)?))
    }

    /// Resolve a spread's value. `None` when its reference was downgraded.
    fn resolve_spread<'a>(
        &'a self,
        ctx: &'a ResolveContext,
        value: Value,
    ) -> BoxFuture<'a, Result<Option<Value>, ResolveError>> {
        async move {
            ctx.check()?;
            match value {
                Value::Reference(reference) => match self.lookup(ctx, reference).await {
                    Ok(value) => Ok(Some(value)),
                    Err(err) => self.downgrade(err).map(|_| None),
                },
                Value::Secret(inner) => Ok(self.resolve_spread(ctx, *inner).await?.map(Value::secret)),
                other => self.resolve(ctx, other).await.map(Some),
            }
        }
        .boxed()
    }

    async fn resolve_reference(&self, ctx: &ResolveContext, reference: Reference) -> Result<Value, ResolveError> {
        match self.lookup(ctx, reference).await {
            Ok(value) => Ok(value),
            Err(err) => self.downgrade(err),
        }
    }

    /// Fetch (or reuse) the data behind `reference`. Never downgrades.
    async fn lookup(&self, ctx: &ResolveContext, reference: Reference) -> Result<Value, ResolveError> {
        let key = build_cache_key(&reference.alias, reference.fetch_path());
        if let Some(outcome) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return finish(reference, outcome);
        }

        let lookup = tokio::select! {
            biased;
            interrupted = ctx.interrupted() => return Err(interrupted),
            lookup = self.registry.get_provider(ctx, &reference.alias) => lookup,
        };
        let provider = match lookup {
            Ok(Some(provider)) => provider,
            Ok(None) => {
                return Err(ResolveError::ProviderNotRegistered {
                    alias: reference.alias,
                    location: reference.source_info,
                });
            }
            Err(err) => return Err(unresolved(reference, Arc::new(err))),
        };

        let cell = self.cache.slot(&key);
        let outcome = cell
            .get_or_try_init(|| async {
                tracing::debug!(key = %key, "Cache miss");
                self.fetch(ctx, provider.as_ref(), reference.fetch_path()).await
            })
            .await?
            .clone();
        finish(reference, outcome)
    }

    /// One provider call, bounded by the semaphore and the fetch timeout and
    /// raced against the context. `Err` only for interruptions: provider
    /// failures are outcomes and get cached.
    async fn fetch(
        &self,
        ctx: &ResolveContext,
        provider: &dyn Provider,
        path: &[String],
    ) -> Result<FetchOutcome, ResolveError> {
        ctx.check()?;
        let _permit = tokio::select! {
            biased;
            interrupted = ctx.interrupted() => return Err(interrupted),
            permit = self.permits.acquire() => permit.map_err(|_| ResolveError::Cancelled)?,
        };
        ctx.check()?;

        let outcome = match self.options.fetch_timeout {
            Some(after) => tokio::select! {
                biased;
                interrupted = ctx.interrupted() => return Err(interrupted),
                result = tokio::time::timeout(after, provider.fetch(ctx, path)) => match result {
                    Ok(result) => result.map_err(cause_from),
                    Err(_) => Err(Arc::new(FetchTimeout { after }) as Cause),
                },
            },
            None => tokio::select! {
                biased;
                interrupted = ctx.interrupted() => return Err(interrupted),
                result = provider.fetch(ctx, path) => result.map_err(cause_from),
            },
        };
        Ok(outcome)
    }

    /// Turn `err` into a warning and `null` when missing providers are allowed.
    fn downgrade(&self, err: ResolveError) -> Result<Value, ResolveError> {
        if !self.options.allow_missing_provider || err.is_interruption() {
            return Err(err);
        }
        let message = format!("{err}; using null");
        tracing::warn!(code = err.code(), "{message}");
        if let Some(sink) = &self.warning_sink {
            sink(&message);
        }
        Ok(Value::null())
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn finish(reference: Reference, outcome: FetchOutcome) -> Result<Value, ResolveError> {
    outcome
        .and_then(|value| project(value, reference.projection()))
        .map_err(|cause| unresolved(reference, cause))
}

fn unresolved(reference: Reference, cause: Cause) -> ResolveError {
    ResolveError::UnresolvedReference {
        alias: reference.alias,
        path: reference.path,
        location: reference.source_info,
        cause,
    }
}

/// Apply the segments after a wildcard to every entry of the fetched value.
fn project(value: Value, projection: &[String]) -> Result<Value, Cause> {
    if projection.is_empty() {
        return Ok(value);
    }
    match value {
        Value::Map(MapEntries::Plain(map)) => Ok(Value::map(
            map.into_iter()
                .filter_map(|(key, entry)| entry.get_path(projection).cloned().map(|v| (key, v)))
                .collect(),
        )),
        Value::List(items) => Ok(Value::List(
            items
                .iter()
                .filter_map(|item| item.get_path(projection).cloned())
                .collect(),
        )),
        Value::Secret(inner) => project(*inner, projection).map(Value::secret),
        other => Err(Arc::new(WildcardTargetError {
            found: other.kind_name(),
        })),
    }
}
