//! Syntax tree for CSL documents.
//!
//! This crate only defines the tree; producing it from text is the job of the
//! grammar, which lives outside this workspace. The tree is an owned structure
//! with a [`SourceInfo`] on every node, so later stages can report errors with
//! a `file:line:col` location without holding on to the source text.
//!
//! A document is a sequence of top-level [`Statement`]s:
//!
//! ```text
//! source aws = "aws" { region = "eu-west-1" }   // Statement::Source
//!
//! app {                                         // Statement::Section
//!   name = "billing"
//!   ...defaults:app.*                           // spread entry
//!   region = var.region                         // `var.` sugar
//! }
//!
//! ...shared:common.*                            // Statement::Spread
//! ```

mod document;
mod expr;

pub use document::{Document, MapEntry, Section, SectionBody, SourceDeclaration, SpreadStatement, Statement};
pub use expr::{CallExpr, Expr, ExprKind, Mark, Number, ReferenceExpr, WILDCARD};

pub use csl_source_map::SourceInfo;
