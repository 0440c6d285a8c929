//! Error reporting and diagnostic messages for the CSL compiler.
//!
//! Every stage of the engine (conversion, resolution, composition) reports
//! failures as a typed error that can be lowered into a [`DiagnosticMessage`].
//! A diagnostic carries the structured pieces an external formatter needs:
//! kind, error code, title, problem statement, hints, and the
//! [`SourceInfo`](csl_source_map::SourceInfo) of the offending value.
//!
//! Rendering source snippets is deliberately left to that formatter; this
//! crate only produces plain text and JSON.
//!
//! # Example
//!
//! ```
//! use csl_error_reporting::DiagnosticMessageBuilder;
//!
//! let diagnostic = DiagnosticMessageBuilder::error("Provider not registered")
//!     .with_code("C-2-1")
//!     .problem("No source declares the alias `aws`")
//!     .add_hint("Did you forget a `source aws` declaration?")
//!     .build();
//!
//! assert!(diagnostic.to_text().contains("Error [C-2-1]"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use diagnostic::{DiagnosticKind, DiagnosticMessage};
