/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compilation driver: documents in, snapshot out.
 */

//! The compilation driver.
//!
//! A compilation runs in two passes over the documents, in load order:
//!
//! 1. Convert every document and register its `source` declarations. A
//!    declaration's configuration is resolved before it is registered, so it
//!    may use `var.` references or data from sources declared before it.
//! 2. Resolve every document's root and deep-merge the results. An earlier
//!    file is the base, a later file overrides it.
//!
//! One [`ProviderRegistry`] and one [`Resolver`] serve the whole
//! compilation, so a provider is initialised once and each `alias:path` is
//! fetched once however many documents refer to it.

use std::sync::{Arc, Mutex, PoisonError};

use csl_ast::Document;
use csl_config::{VAR_ALIAS, Value, ValueMap, convert_document, deep_merge_all};
use csl_resolve::{ProviderRegistry, ProviderTypeRegistry, ResolveContext, Resolver, WarningSink};
use serde::Serialize;

use crate::error::{CompileError, Result};
use crate::options::CompileOptions;
use crate::variables::VariablesProvider;

/// The fully resolved result of a compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// The merged configuration. Contains no references.
    pub values: ValueMap,
    /// Downgraded references, in the order they were reported.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The snapshot as one value, with every secret replaced by `"<redacted>"`.
    pub fn redacted(&self) -> Value {
        Value::map(self.values.clone()).redact_secrets()
    }
}

/// Compiles documents against a set of provider types.
pub struct Compiler {
    types: Arc<ProviderTypeRegistry>,
    options: CompileOptions,
    warning_sink: Option<WarningSink>,
}

impl Compiler {
    pub fn new(types: Arc<ProviderTypeRegistry>, options: CompileOptions) -> Self {
        Self {
            types,
            options,
            warning_sink: None,
        }
    }

    /// Also forward every warning to `sink` as it is reported.
    pub fn with_warning_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.warning_sink = Some(Arc::new(sink));
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `documents`, given in load order, into one snapshot.
    pub async fn compile(&self, ctx: &ResolveContext, documents: &[Document]) -> Result<Snapshot> {
        let registry = Arc::new(ProviderRegistry::new(Arc::clone(&self.types)));
        registry.insert(
            VAR_ALIAS,
            Arc::new(VariablesProvider::from_json(&self.options.variables)),
        );

        let warnings = Arc::new(Mutex::new(Vec::new()));
        let resolver = Resolver::new(Arc::clone(&registry), self.options.resolve_options())
            .with_warning_sink({
                let warnings = Arc::clone(&warnings);
                let forward = self.warning_sink.clone();
                move |message: &str| {
                    if let Some(forward) = &forward {
                        forward(message);
                    }
                    warnings
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(message.to_string());
                }
            });

        let mut roots = Vec::with_capacity(documents.len());
        for document in documents {
            let file = document.filename().to_string();
            let converted = convert_document(document).map_err(|source| CompileError::Convert {
                file: file.clone(),
                source,
            })?;

            for declaration in converted.sources {
                let config = resolver
                    .resolve_map(ctx, declaration.config)
                    .await
                    .map_err(|source| CompileError::Resolve {
                        file: file.clone(),
                        source,
                    })?;
                registry.register(declaration.alias, declaration.provider_type, config)?;
            }
            roots.push((file, converted.root));
        }

        let mut layers = Vec::with_capacity(roots.len());
        for (file, root) in roots {
            let resolved = resolver
                .resolve_value(ctx, root)
                .await
                .map_err(|source| CompileError::Resolve {
                    file: file.clone(),
                    source,
                })?;
            let layer = resolved.into_map().unwrap_or_default();
            tracing::info!(file = %file, keys = layer.len(), "Compiled document");
            layers.push(layer);
        }

        let values = deep_merge_all(layers);
        let warnings = std::mem::take(&mut *warnings.lock().unwrap_or_else(PoisonError::into_inner));
        tracing::debug!(
            documents = documents.len(),
            fetched = resolver.cache().len(),
            warnings = warnings.len(),
            "Compilation finished"
        );
        Ok(Snapshot { values, warnings })
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("types", &self.types)
            .field("options", &self.options)
            .finish()
    }
}
