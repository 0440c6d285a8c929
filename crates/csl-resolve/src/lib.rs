/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reference resolution for CSL documents.
 */

//! Reference resolution for CSL documents.
//!
//! A converted document still contains [`Reference`](csl_config::Reference)
//! values: pointers such as `network:vpc.id` into data owned by a provider.
//! This crate replaces them with real data.
//!
//! - [`Provider`] is the capability a data source implements;
//!   [`ProviderFactory`] constructs one.
//! - [`ProviderTypeRegistry`] maps provider type names to factories;
//!   [`ProviderRegistry`] maps the aliases of one compilation to lazily
//!   initialised providers.
//! - [`Resolver`] walks a value tree, fetching each distinct `alias:path`
//!   at most once per run, with bounded concurrency and cooperative
//!   cancellation through [`ResolveContext`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use csl_resolve::{ProviderRegistry, ProviderTypeRegistry, ResolveContext, ResolveOptions, Resolver};
//!
//! let registry = Arc::new(ProviderRegistry::new(Arc::new(ProviderTypeRegistry::new())));
//! registry.insert("net", Arc::new(MyNetworkProvider::connect()?));
//!
//! let resolver = Resolver::new(registry, ResolveOptions::default());
//! let resolved = resolver.resolve_value(&ResolveContext::new(), converted_root).await?;
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod options;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use cache::{FetchOutcome, ResolutionCache, build_cache_key};
pub use context::ResolveContext;
pub use error::{Cause, FetchTimeout, ProviderError, ResolveError, WildcardTargetError};
pub use options::{DEFAULT_MAX_CONCURRENT_PROVIDERS, ResolveOptions};
pub use provider::{Provider, ProviderConfig, ProviderFactory};
pub use registry::{ProviderRegistry, ProviderTypeRegistry};
pub use resolver::{Resolver, WarningSink};
