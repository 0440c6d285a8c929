//! Conversion from the syntax tree to [`Value`].
//!
//! The converter is total over the expression set the grammar produces and
//! never evaluates anything: references stay references, secrets stay
//! wrapped. Whether a map keeps its declaration order is decided here, once,
//! by looking for spread entries.

use crate::error::ConvertError;
use crate::types::{MapEntries, OrderedEntry, Reference, Scalar, Value, ValueMap};
use csl_ast::{Document, Expr, ExprKind, MapEntry, Mark, Number, SectionBody, Statement};
use csl_source_map::SourceInfo;

/// Deepest map/list/secret nesting the converter accepts.
pub const MAX_DEPTH: usize = 256;

/// Alias that `var.` sugar expands to.
pub const VAR_ALIAS: &str = "var";

/// A `source` declaration, with its configuration block converted.
///
/// The configuration may still contain references (typically `var.` sugar);
/// they are resolved before the provider is initialised.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDeclaration {
    pub alias: String,
    pub provider_type: String,
    pub config: ValueMap,
    pub source_info: SourceInfo,
}

/// Everything the engine needs from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedDocument {
    /// The document's sections as a map value.
    pub root: Value,
    /// Source declarations in declaration order.
    pub sources: Vec<SourceDeclaration>,
}

/// Convert a document's sections into a map value.
///
/// Source declarations are ignored; use [`convert_document`] to get them too.
pub fn convert(document: &Document) -> Result<Value, ConvertError> {
    convert_document(document).map(|converted| converted.root)
}

/// Convert a document into its root map and its source declarations.
pub fn convert_document(document: &Document) -> Result<ConvertedDocument, ConvertError> {
    let converter = Converter::default();
    let mut root = Vec::new();
    let mut sources = Vec::new();

    for statement in &document.statements {
        match statement {
            Statement::Section(section) => {
                if section.name.is_empty() {
                    return Err(ConvertError::EmptyMapKey {
                        source_info: section.source_info.clone(),
                    });
                }
                let value = match &section.body {
                    SectionBody::Inline(expr) => converter.expr(expr, 1),
                    SectionBody::Block(entries) => converter.map(entries, 1).map(Value::Map),
                }
                .map_err(|e| e.in_key(&section.name))?;
                root.push(OrderedEntry::keyed(
                    section.name.clone(),
                    value,
                    section.source_info.clone(),
                ));
            }
            Statement::Spread(spread) => {
                let value = converter.expr(&spread.value, 1)?;
                root.push(OrderedEntry::spread(value, spread.source_info.clone()));
            }
            Statement::Source(source) => {
                if source.alias.is_empty() {
                    return Err(ConvertError::EmptyMapKey {
                        source_info: source.source_info.clone(),
                    });
                }
                let config = Converter::source_config()
                    .config(&source.config)
                    .map_err(|e| e.in_key(&source.alias))?;
                sources.push(SourceDeclaration {
                    alias: source.alias.clone(),
                    provider_type: source.provider_type.clone(),
                    config,
                    source_info: source.source_info.clone(),
                });
            }
        }
    }

    Ok(ConvertedDocument {
        root: Value::Map(MapEntries::from_ordered(root)),
        sources,
    })
}

#[derive(Debug, Clone, Copy, Default)]
struct Converter {
    in_source_config: bool,
}

impl Converter {
    fn source_config() -> Self {
        Converter {
            in_source_config: true,
        }
    }

    fn expr(self, expr: &Expr, depth: usize) -> Result<Value, ConvertError> {
        if depth > MAX_DEPTH {
            return Err(ConvertError::NestingTooDeep {
                max_depth: MAX_DEPTH,
                source_info: expr.source_info.clone(),
            });
        }

        let value = match &expr.kind {
            ExprKind::String(s) => var_reference(s.split('.'), &expr.source_info)
                .unwrap_or_else(|| Value::Scalar(Scalar::String(s.clone()))),
            ExprKind::Number(Number::Integer(i)) => Value::Scalar(Scalar::Integer(*i)),
            ExprKind::Number(Number::Float(f)) => Value::Scalar(Scalar::Float(*f)),
            ExprKind::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
            ExprKind::Null => Value::null(),
            ExprKind::Identifier(name) => Value::Scalar(Scalar::String(name.clone())),
            ExprKind::Path(segments) => {
                var_reference(segments.iter().map(String::as_str), &expr.source_info)
                    .unwrap_or_else(|| Value::Scalar(Scalar::String(segments.join("."))))
            }
            ExprKind::Reference(reference) => Value::Reference(Reference::new(
                reference.alias.clone(),
                reference.path.clone(),
                expr.source_info.clone(),
            )),
            ExprKind::Map(entries) => Value::Map(self.map(entries, depth + 1)?),
            ExprKind::List(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.expr(item, depth + 1).map_err(|e| e.in_index(index)))
                    .collect::<Result<_, _>>()?,
            ),
            ExprKind::Marked(Mark::Secret, inner) => Value::secret(self.expr(inner, depth + 1)?),
            ExprKind::Call(call) => {
                return Err(ConvertError::UnsupportedExpression {
                    kind: format!("{} `{}`", expr.kind.describe(), call.name),
                    source_info: expr.source_info.clone(),
                });
            }
        };
        Ok(value)
    }

    fn map(self, entries: &[MapEntry], depth: usize) -> Result<MapEntries, ConvertError> {
        let ordered = entries
            .iter()
            .map(|entry| self.entry(entry, depth))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MapEntries::from_ordered(ordered))
    }

    fn entry(self, entry: &MapEntry, depth: usize) -> Result<OrderedEntry, ConvertError> {
        if let (true, Some(key)) = (entry.spread, &entry.key) {
            return Err(ConvertError::KeyedSpread {
                key: key.clone(),
                source_info: entry.source_info.clone(),
            });
        }
        if is_spread(entry) {
            if self.in_source_config {
                return Err(ConvertError::SpreadNotAllowedHere {
                    source_info: entry.source_info.clone(),
                });
            }
            let value = self.entry_value(entry, depth)?;
            return Ok(OrderedEntry::spread(value, entry.source_info.clone()));
        }

        let key = match entry.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(ConvertError::EmptyMapKey {
                    source_info: entry.source_info.clone(),
                });
            }
        };
        let value = self.entry_value(entry, depth).map_err(|e| e.in_key(key))?;
        Ok(OrderedEntry::keyed(key, value, entry.source_info.clone()))
    }

    fn entry_value(self, entry: &MapEntry, depth: usize) -> Result<Value, ConvertError> {
        match &entry.value {
            Some(expr) => self.expr(expr, depth),
            None => Err(ConvertError::NilExpression {
                source_info: entry.source_info.clone(),
            }),
        }
    }

    fn config(self, entries: &[MapEntry]) -> Result<ValueMap, ConvertError> {
        match self.map(entries, 1)? {
            MapEntries::Plain(map) => Ok(map),
            // `entry` rejects spreads while converting a source configuration
            MapEntries::WithSpreads(entries) => Ok(entries
                .into_iter()
                .filter_map(|entry| entry.key.map(|key| (key, entry.value)))
                .collect()),
        }
    }
}

fn is_spread(entry: &MapEntry) -> bool {
    entry.spread
        || (entry.key.is_none()
            && matches!(
                entry.value.as_ref().map(|expr| &expr.kind),
                Some(ExprKind::Reference(reference)) if reference.has_wildcard()
            ))
}

/// `var.a.b` → `var:a.b`, when every segment is non-empty.
fn var_reference<'a>(
    mut segments: impl Iterator<Item = &'a str>,
    source_info: &SourceInfo,
) -> Option<Value> {
    if segments.next() != Some(VAR_ALIAS) {
        return None;
    }
    let path: Vec<String> = segments.map(str::to_string).collect();
    if path.is_empty() || path.iter().any(String::is_empty) {
        return None;
    }
    Some(Value::Reference(Reference::new(VAR_ALIAS, path, source_info.clone())))
}
