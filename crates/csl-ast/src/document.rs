//! Statements and entries.

use crate::expr::Expr;
use csl_source_map::SourceInfo;

/// One parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub statements: Vec<Statement>,
    /// Spans the whole file; its `filename` names the document.
    pub source_info: SourceInfo,
}

impl Document {
    pub fn new(statements: Vec<Statement>, source_info: SourceInfo) -> Self {
        Self {
            statements,
            source_info,
        }
    }

    pub fn filename(&self) -> &str {
        &self.source_info.filename
    }

    /// Source declarations of this document, in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceDeclaration> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Source(source) => Some(source),
            _ => None,
        })
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Section(Section),
    Source(SourceDeclaration),
    Spread(SpreadStatement),
}

impl Statement {
    pub fn source_info(&self) -> &SourceInfo {
        match self {
            Statement::Section(section) => &section.source_info,
            Statement::Source(source) => &source.source_info,
            Statement::Spread(spread) => &spread.source_info,
        }
    }
}

/// A named top-level block: `name { ... }` or `name = <expr>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub body: SectionBody,
    pub source_info: SourceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// `name = <expr>`
    Inline(Expr),
    /// `name { entries }`
    Block(Vec<MapEntry>),
}

/// `source <alias> = "<type>" { config }`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDeclaration {
    pub alias: String,
    pub provider_type: String,
    pub config: Vec<MapEntry>,
    pub source_info: SourceInfo,
}

/// `...<expr>` at the top level of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadStatement {
    pub value: Expr,
    pub source_info: SourceInfo,
}

/// An entry inside a block or inline map.
///
/// The grammar produces `key = value` entries and `...value` spreads. A
/// recovering parser may leave `key` or `value` empty; the converter rejects
/// those rather than guessing.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Option<String>,
    pub value: Option<Expr>,
    /// Written with the `...` spread operator
    pub spread: bool,
    pub source_info: SourceInfo,
}

impl MapEntry {
    /// `key = value`
    pub fn keyed(key: impl Into<String>, value: Expr, source_info: SourceInfo) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value),
            spread: false,
            source_info,
        }
    }

    /// `...value`
    pub fn spread(value: Expr, source_info: SourceInfo) -> Self {
        Self {
            key: None,
            value: Some(value),
            spread: true,
            source_info,
        }
    }
}
