//! Value model, tree conversion and composition for CSL documents.
//!
//! This crate turns a parsed [`csl_ast::Document`] into the engine's data
//! representation and merges such trees. It is synchronous and never talks to
//! providers; reference resolution lives in `csl-resolve`.
//!
//! # Key Features
//!
//! - **Composition intent is preserved**: a map that contains spreads keeps its
//!   entries in declaration order ([`MapEntries::WithSpreads`]); a map without
//!   spreads is a plain key/value map ([`MapEntries::Plain`]).
//! - **`var.` sugar**: string literals and dotted paths starting with `var.`
//!   become references to the `var` provider.
//! - **Deterministic precedence**: [`deep_merge`] merges maps recursively with
//!   last-write-wins leaves; [`compose_ordered`] folds entries in declaration
//!   order so later declarations always win.
//!
//! # Example
//!
//! ```rust
//! use csl_config::{deep_merge, Value, ValueMap};
//!
//! let base: ValueMap = [("port".to_string(), Value::from(8080))].into_iter().collect();
//! let overlay: ValueMap = [("port".to_string(), Value::from(9000))].into_iter().collect();
//!
//! let merged = deep_merge(base, overlay);
//! assert_eq!(merged["port"], Value::from(9000));
//! ```

mod compose;
mod convert;
mod error;
mod types;

pub use compose::{compose_ordered, deep_merge, deep_merge_all, reject_unresolved_spread};
pub use convert::{ConvertedDocument, MAX_DEPTH, SourceDeclaration, VAR_ALIAS, convert, convert_document};
pub use error::{ComposeError, ConvertError};
pub use types::{MapEntries, OrderedEntry, Reference, Scalar, Value, ValueMap};

// Re-export for convenience
pub use csl_ast::WILDCARD;
pub use csl_source_map::SourceInfo;
