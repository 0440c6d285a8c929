//! Compilation driver for CSL documents
//!
//! This crate ties the engine together: it converts parsed documents,
//! registers their `source` declarations, resolves every reference and
//! merges the documents into one [`Snapshot`].
//!
//! # Architecture
//!
//! - [`Compiler`] - Runs one compilation over documents in load order
//! - [`CompileOptions`] - Missing-provider policy, concurrency, timeouts and
//!   variables; loadable from TOML
//! - [`VariablesProvider`] - Built-in provider behind `var.` references
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use csl_core::{CompileOptions, Compiler, ProviderTypeRegistry, ResolveContext};
//!
//! let mut types = ProviderTypeRegistry::new();
//! types.register_type("file", || -> Box<dyn Provider> { Box::new(FileProvider::default()) });
//!
//! let options = CompileOptions::from_toml_str(&std::fs::read_to_string("csl.toml")?)?;
//! let compiler = Compiler::new(Arc::new(types), options);
//! let snapshot = compiler.compile(&ResolveContext::new(), &documents).await?;
//! println!("{}", serde_json::to_string_pretty(&snapshot.redacted())?);
//! ```

pub mod compiler;
pub mod error;
pub mod options;
pub mod variables;

// Re-export commonly used types
pub use compiler::{Compiler, Snapshot};
pub use error::{CompileError, Result};
pub use options::CompileOptions;
pub use variables::VariablesProvider;

pub use csl_resolve::{Provider, ProviderConfig, ProviderTypeRegistry, ResolveContext};
