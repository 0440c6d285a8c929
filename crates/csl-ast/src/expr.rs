//! Expressions.

use crate::document::MapEntry;
use csl_source_map::SourceInfo;

/// Path segment that turns a reference into a spread of every key below it.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub source_info: SourceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `"text"`
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    /// A bare word, e.g. `enabled`
    Identifier(String),
    /// A dotted path of bare words, e.g. `var.region` or `a.b.c`
    Path(Vec<String>),
    /// `alias:seg.seg`
    Reference(ReferenceExpr),
    /// `{ entries }`
    Map(Vec<MapEntry>),
    /// `[ items ]`
    List(Vec<Expr>),
    /// `@secret <expr>`
    Marked(Mark, Box<Expr>),
    /// `name(args)`
    Call(CallExpr),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Secret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceExpr {
    pub alias: String,
    pub path: Vec<String>,
}

impl ReferenceExpr {
    pub fn new(alias: impl Into<String>, path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            alias: alias.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.path.iter().any(|segment| segment == WILDCARD)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
}

impl Expr {
    pub fn new(kind: ExprKind, source_info: SourceInfo) -> Self {
        Self { kind, source_info }
    }

    pub fn string(value: impl Into<String>, source_info: SourceInfo) -> Self {
        Self::new(ExprKind::String(value.into()), source_info)
    }

    pub fn integer(value: i64, source_info: SourceInfo) -> Self {
        Self::new(ExprKind::Number(Number::Integer(value)), source_info)
    }

    pub fn path(segments: impl IntoIterator<Item = impl Into<String>>, source_info: SourceInfo) -> Self {
        Self::new(
            ExprKind::Path(segments.into_iter().map(Into::into).collect()),
            source_info,
        )
    }

    pub fn reference(
        alias: impl Into<String>,
        path: impl IntoIterator<Item = impl Into<String>>,
        source_info: SourceInfo,
    ) -> Self {
        Self::new(ExprKind::Reference(ReferenceExpr::new(alias, path)), source_info)
    }

    pub fn map(entries: Vec<MapEntry>, source_info: SourceInfo) -> Self {
        Self::new(ExprKind::Map(entries), source_info)
    }

    pub fn list(items: Vec<Expr>, source_info: SourceInfo) -> Self {
        Self::new(ExprKind::List(items), source_info)
    }

    pub fn secret(inner: Expr, source_info: SourceInfo) -> Self {
        Self::new(ExprKind::Marked(Mark::Secret, Box::new(inner)), source_info)
    }
}

impl ExprKind {
    /// Short name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::String(_) => "string",
            ExprKind::Number(_) => "number",
            ExprKind::Bool(_) => "boolean",
            ExprKind::Null => "null",
            ExprKind::Identifier(_) => "identifier",
            ExprKind::Path(_) => "path",
            ExprKind::Reference(_) => "reference",
            ExprKind::Map(_) => "map",
            ExprKind::List(_) => "list",
            ExprKind::Marked(..) => "marked expression",
            ExprKind::Call(_) => "function call",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_wildcard_detection() {
        assert!(ReferenceExpr::new("net", ["vpc", "*"]).has_wildcard());
        assert!(ReferenceExpr::new("net", ["*", "id"]).has_wildcard());
        assert!(!ReferenceExpr::new("net", ["vpc", "id"]).has_wildcard());
        assert!(!ReferenceExpr::new("net", Vec::<String>::new()).has_wildcard());
    }

    #[test]
    fn test_describe() {
        let call = ExprKind::Call(CallExpr {
            name: "env".into(),
            args: vec![],
        });
        assert_eq!(call.describe(), "function call");
        assert_eq!(ExprKind::Null.describe(), "null");
    }
}
