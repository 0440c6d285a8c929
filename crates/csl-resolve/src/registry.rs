/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Provider type and alias registries.
 */

//! Where providers come from.
//!
//! [`ProviderTypeRegistry`] knows how to build a provider of each type
//! (`"file"`, `"terraform"`, ...). [`ProviderRegistry`] maps the aliases a
//! compilation declared to lazily built instances: a declared alias costs
//! nothing until a reference to it is resolved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use csl_config::ValueMap;
use tokio::sync::OnceCell;

use crate::context::ResolveContext;
use crate::error::{ProviderError, cause_from};
use crate::provider::{Provider, ProviderConfig, ProviderFactory};

/// Provider type name → factory.
#[derive(Default)]
pub struct ProviderTypeRegistry {
    factories: HashMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `provider_type`, replacing any previous one.
    pub fn register_type(&mut self, provider_type: impl Into<String>, factory: impl ProviderFactory + 'static) {
        self.factories.insert(provider_type.into(), Arc::new(factory));
    }

    pub fn contains(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// Build and initialise a provider.
    pub async fn create_provider(
        &self,
        ctx: &ResolveContext,
        provider_type: &str,
        alias: &str,
        config: ValueMap,
    ) -> Result<Arc<dyn Provider>, ProviderError> {
        let factory = self
            .factories
            .get(provider_type)
            .ok_or_else(|| ProviderError::UnknownProviderType {
                alias: alias.to_string(),
                provider_type: provider_type.to_string(),
            })?;

        let mut provider = factory.create();
        let config = ProviderConfig {
            alias: alias.to_string(),
            config,
        };
        provider
            .init(ctx, config)
            .await
            .map_err(|e| ProviderError::Init {
                alias: alias.to_string(),
                cause: cause_from(e),
            })?;

        tracing::debug!(alias, provider_type, "Provider initialised");
        Ok(Arc::from(provider))
    }
}

impl std::fmt::Debug for ProviderTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderTypeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

enum ProviderSlot {
    /// Already initialised, installed with [`ProviderRegistry::insert`].
    Installed(Arc<dyn Provider>),
    /// Declared by a `source` statement; built on first use.
    Declared {
        provider_type: String,
        config: ValueMap,
        instance: OnceCell<Result<Arc<dyn Provider>, ProviderError>>,
    },
}

/// Alias → provider, for one compilation.
///
/// Construction and `init` run at most once per alias. Concurrent callers
/// asking for the same alias wait for that single initialisation; callers
/// asking for different aliases never wait on each other.
pub struct ProviderRegistry {
    types: Arc<ProviderTypeRegistry>,
    slots: Mutex<HashMap<String, Arc<ProviderSlot>>>,
}

impl ProviderRegistry {
    pub fn new(types: Arc<ProviderTypeRegistry>) -> Self {
        Self {
            types,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Declare `alias` as a provider of `provider_type`.
    ///
    /// Returns `Ok(false)` if the alias was already declared; the first
    /// declaration stays in effect. Unknown provider types are rejected here,
    /// before any reference is resolved.
    pub fn register(
        &self,
        alias: impl Into<String>,
        provider_type: impl Into<String>,
        config: ValueMap,
    ) -> Result<bool, ProviderError> {
        let alias = alias.into();
        let provider_type = provider_type.into();
        if !self.types.contains(&provider_type) {
            return Err(ProviderError::UnknownProviderType { alias, provider_type });
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.contains_key(&alias) {
            tracing::debug!(alias = %alias, provider_type = %provider_type, "Alias already registered, keeping first declaration");
            return Ok(false);
        }
        tracing::debug!(alias = %alias, provider_type = %provider_type, "Registered provider");
        slots.insert(
            alias,
            Arc::new(ProviderSlot::Declared {
                provider_type,
                config,
                instance: OnceCell::new(),
            }),
        );
        Ok(true)
    }

    /// Install an initialised provider under `alias`.
    ///
    /// Like [`register`](Self::register), the first provider for an alias wins.
    pub fn insert(&self, alias: impl Into<String>, provider: Arc<dyn Provider>) -> bool {
        let alias = alias.into();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.contains_key(&alias) {
            tracing::debug!(alias = %alias, "Alias already registered, ignoring installed provider");
            return false;
        }
        slots.insert(alias, Arc::new(ProviderSlot::Installed(provider)));
        true
    }

    pub fn contains(&self, alias: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.contains_key(alias)
    }

    /// Registered aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut aliases: Vec<String> = slots.keys().cloned().collect();
        aliases.sort();
        aliases
    }

    /// The provider for `alias`, building and initialising it on first use.
    ///
    /// `Ok(None)` means no provider is registered under `alias`. An
    /// initialisation failure is remembered and returned to every later
    /// caller.
    pub async fn get_provider(
        &self,
        ctx: &ResolveContext,
        alias: &str,
    ) -> Result<Option<Arc<dyn Provider>>, ProviderError> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(alias) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(None),
            }
        };

        match slot.as_ref() {
            ProviderSlot::Installed(provider) => Ok(Some(Arc::clone(provider))),
            ProviderSlot::Declared {
                provider_type,
                config,
                instance,
            } => {
                let outcome = instance
                    .get_or_init(|| async {
                        tracing::debug!(alias, provider_type = %provider_type, "Initialising provider");
                        self.types
                            .create_provider(ctx, provider_type, alias, config.clone())
                            .await
                    })
                    .await;
                outcome.clone().map(Some)
            }
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("aliases", &self.aliases())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use csl_config::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Echo {
        alias: String,
        fail_init: bool,
    }

    #[async_trait]
    impl Provider for Echo {
        async fn init(&mut self, _ctx: &ResolveContext, config: ProviderConfig) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if self.fail_init {
                anyhow::bail!("bad credentials");
            }
            self.alias = config.alias;
            Ok(())
        }

        async fn fetch(&self, _ctx: &ResolveContext, path: &[String]) -> anyhow::Result<Value> {
            Ok(Value::from(format!("{}:{}", self.alias, path.join("."))))
        }
    }

    fn types(created: Arc<AtomicUsize>) -> Arc<ProviderTypeRegistry> {
        let mut types = ProviderTypeRegistry::new();
        let counter = Arc::clone(&created);
        types.register_type("echo", move || -> Box<dyn Provider> {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Echo {
                alias: String::new(),
                fail_init: false,
            })
        });
        types.register_type("broken", || -> Box<dyn Provider> {
            Box::new(Echo {
                alias: String::new(),
                fail_init: true,
            })
        });
        Arc::new(types)
    }

    #[tokio::test]
    async fn test_unknown_alias_is_none() {
        let registry = ProviderRegistry::new(types(Arc::default()));
        let provider = registry.get_provider(&ResolveContext::new(), "nope").await.unwrap();
        assert!(provider.is_none());
    }

    #[tokio::test]
    async fn test_register_twice_keeps_first() {
        let registry = ProviderRegistry::new(types(Arc::default()));
        assert!(registry.register("net", "echo", ValueMap::new()).unwrap());
        assert!(!registry.register("net", "broken", ValueMap::new()).unwrap());

        let ctx = ResolveContext::new();
        let provider = registry.get_provider(&ctx, "net").await.unwrap().unwrap();
        let value = provider.fetch(&ctx, &["vpc".to_string()]).await.unwrap();
        assert_eq!(value, Value::from("net:vpc"));
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let registry = ProviderRegistry::new(types(Arc::default()));
        let err = registry.register("net", "terraform", ValueMap::new()).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProviderType { .. }));
        assert!(!registry.contains("net"));
    }

    #[tokio::test]
    async fn test_init_runs_once_under_concurrency() {
        let created = Arc::new(AtomicUsize::new(0));
        let registry = ProviderRegistry::new(types(Arc::clone(&created)));
        registry.register("net", "echo", ValueMap::new()).unwrap();

        let ctx = ResolveContext::new();
        let lookups = (0..8).map(|_| registry.get_provider(&ctx, "net"));
        let providers = futures::future::try_join_all(lookups).await.unwrap();

        assert_eq!(providers.len(), 8);
        assert!(providers.iter().all(Option::is_some));
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_init_failure_is_remembered() {
        let registry = ProviderRegistry::new(types(Arc::default()));
        registry.register("aws", "broken", ValueMap::new()).unwrap();

        let ctx = ResolveContext::new();
        for _ in 0..2 {
            let Err(err) = registry.get_provider(&ctx, "aws").await else {
                panic!("expected init failure");
            };
            assert_eq!(err.to_string(), "failed to initialise provider \"aws\": bad credentials");
        }
    }

    #[tokio::test]
    async fn test_insert_installed_provider() {
        let registry = ProviderRegistry::new(types(Arc::default()));
        let provider: Arc<dyn Provider> = Arc::new(Echo {
            alias: "fixed".into(),
            fail_init: false,
        });
        assert!(registry.insert("fixed", Arc::clone(&provider)));
        assert!(!registry.insert("fixed", provider));
        assert_eq!(registry.aliases(), ["fixed"]);

        let ctx = ResolveContext::new();
        let found = registry.get_provider(&ctx, "fixed").await.unwrap().unwrap();
        assert_eq!(found.fetch(&ctx, &[]).await.unwrap(), Value::from("fixed:"));
    }
}
