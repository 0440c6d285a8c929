//! Core type definitions for the value model.

use std::fmt;

use csl_ast::WILDCARD;
use csl_source_map::SourceInfo;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Key/value map used for plain maps.
///
/// Key order is kept for deterministic output; it carries no meaning for
/// merging.
pub type ValueMap = IndexMap<String, Value>;

/// An atomic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A configuration value.
///
/// Trees of `Value` are produced by the converter, rewritten by the resolver
/// (each [`Value::Reference`] is replaced by what its provider returned) and
/// merged by the composer. A fully resolved tree contains no references and
/// only [`MapEntries::Plain`] maps.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Map(MapEntries),
    /// Unresolved pointer into a provider.
    Reference(Reference),
    /// Sensitive value; transparent to merging and resolution.
    Secret(Box<Value>),
}

/// The body of a map.
///
/// Chosen once at conversion time: only maps that contain a spread pay for
/// keeping their declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEntries {
    Plain(ValueMap),
    WithSpreads(Vec<OrderedEntry>),
}

/// One entry of a map that contains spreads.
///
/// An entry is a spread iff it has no key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntry {
    pub key: Option<String>,
    pub value: Value,
    pub source_info: SourceInfo,
}

/// An unresolved `alias:path` pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub alias: String,
    pub path: Vec<String>,
    pub source_info: SourceInfo,
}

impl Default for MapEntries {
    fn default() -> Self {
        MapEntries::Plain(ValueMap::new())
    }
}

impl MapEntries {
    /// Pick the representation for a list of entries: ordered when at least
    /// one entry is a spread, plain otherwise. Duplicate keys in a plain map
    /// keep the last value.
    pub fn from_ordered(entries: Vec<OrderedEntry>) -> Self {
        if entries.iter().any(OrderedEntry::is_spread) {
            return MapEntries::WithSpreads(entries);
        }
        MapEntries::Plain(
            entries
                .into_iter()
                .filter_map(|entry| entry.key.map(|key| (key, entry.value)))
                .collect(),
        )
    }

    pub fn has_spreads(&self) -> bool {
        matches!(self, MapEntries::WithSpreads(_))
    }

    pub fn len(&self) -> usize {
        match self {
            MapEntries::Plain(map) => map.len(),
            MapEntries::WithSpreads(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every value, spread or keyed.
    pub fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            MapEntries::Plain(map) => Box::new(map.values()),
            MapEntries::WithSpreads(entries) => Box::new(entries.iter().map(|entry| &entry.value)),
        }
    }
}

impl OrderedEntry {
    pub fn keyed(key: impl Into<String>, value: Value, source_info: SourceInfo) -> Self {
        Self {
            key: Some(key.into()),
            value,
            source_info,
        }
    }

    pub fn spread(value: Value, source_info: SourceInfo) -> Self {
        Self {
            key: None,
            value,
            source_info,
        }
    }

    pub fn is_spread(&self) -> bool {
        self.key.is_none()
    }
}

impl Reference {
    pub fn new(alias: impl Into<String>, path: Vec<String>, source_info: SourceInfo) -> Self {
        Self {
            alias: alias.into(),
            path,
            source_info,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.path.iter().any(|segment| segment == WILDCARD)
    }

    /// The part of the path sent to the provider: everything before the
    /// first wildcard.
    pub fn fetch_path(&self) -> &[String] {
        match self.wildcard_position() {
            Some(position) => &self.path[..position],
            None => &self.path,
        }
    }

    /// Segments after the first wildcard, applied to every entry of the
    /// fetched map.
    pub fn projection(&self) -> &[String] {
        match self.wildcard_position() {
            Some(position) => &self.path[position + 1..],
            None => &[],
        }
    }

    fn wildcard_position(&self) -> Option<usize> {
        self.path.iter().position(|segment| segment == WILDCARD)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alias, self.path.join("."))
    }
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    pub fn map(map: ValueMap) -> Self {
        Value::Map(MapEntries::Plain(map))
    }

    pub fn secret(inner: Value) -> Self {
        Value::Secret(Box::new(inner))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Null))
    }

    /// Short name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(Scalar::Null) => "null",
            Value::Scalar(Scalar::Bool(_)) => "boolean",
            Value::Scalar(Scalar::Integer(_) | Scalar::Float(_)) => "number",
            Value::Scalar(Scalar::String(_)) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Reference(_) => "reference",
            Value::Secret(_) => "secret",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The map, if this is a plain map.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(MapEntries::Plain(map)) => Some(map),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<ValueMap> {
        match self {
            Value::Map(MapEntries::Plain(map)) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key in a plain map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow a path of keys (and list indices) through plain maps and lists.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter().try_fold(self, |current, segment| {
            let segment = segment.as_ref();
            match current {
                Value::Map(MapEntries::Plain(map)) => map.get(segment),
                Value::List(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
                Value::Secret(inner) => inner.get_path(&[segment]),
                _ => None,
            }
        })
    }

    /// Whether any reference remains anywhere in the tree.
    pub fn contains_references(&self) -> bool {
        match self {
            Value::Scalar(_) => false,
            Value::Reference(_) => true,
            Value::List(items) => items.iter().any(Value::contains_references),
            Value::Map(entries) => entries.values().any(Value::contains_references),
            Value::Secret(inner) => inner.contains_references(),
        }
    }

    /// Replace every secret with the string `"<redacted>"`.
    pub fn redact_secrets(self) -> Value {
        match self {
            Value::Secret(_) => Value::from("<redacted>"),
            Value::List(items) => Value::List(items.into_iter().map(Value::redact_secrets).collect()),
            Value::Map(MapEntries::Plain(map)) => Value::map(
                map.into_iter()
                    .map(|(key, value)| (key, value.redact_secrets()))
                    .collect(),
            ),
            Value::Map(MapEntries::WithSpreads(entries)) => Value::Map(MapEntries::WithSpreads(
                entries
                    .into_iter()
                    .map(|entry| OrderedEntry {
                        value: entry.value.redact_secrets(),
                        ..entry
                    })
                    .collect(),
            )),
            other => other,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::String(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::from(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(object) => Value::map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

// Snapshot hand-off: secrets serialize as their inner value (call
// `redact_secrets` first when writing somewhere untrusted), references as
// `alias:path` strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Value::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Value::Scalar(Scalar::Integer(i)) => serializer.serialize_i64(*i),
            Value::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            Value::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(MapEntries::Plain(map)) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Map(MapEntries::WithSpreads(entries)) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for entry in entries {
                    seq.serialize_element(&SerializedEntry(entry))?;
                }
                seq.end()
            }
            Value::Reference(reference) => serializer.collect_str(reference),
            Value::Secret(inner) => inner.serialize(serializer),
        }
    }
}

struct SerializedEntry<'a>(&'a OrderedEntry);

impl Serialize for SerializedEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(2))?;
        match &self.0.key {
            Some(key) => out.serialize_entry("key", key)?,
            None => out.serialize_entry("spread", &true)?,
        }
        out.serialize_entry("value", &self.0.value)?;
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(path: &[&str]) -> Reference {
        Reference::new(
            "net",
            path.iter().map(|s| s.to_string()).collect(),
            SourceInfo::default(),
        )
    }

    #[test]
    fn test_from_ordered_without_spreads_is_plain() {
        let entries = vec![
            OrderedEntry::keyed("a", Value::from(1), SourceInfo::default()),
            OrderedEntry::keyed("a", Value::from(2), SourceInfo::default()),
        ];
        let MapEntries::Plain(map) = MapEntries::from_ordered(entries) else {
            panic!("expected a plain map");
        };
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], Value::from(2));
    }

    #[test]
    fn test_from_ordered_with_spread_keeps_order() {
        let entries = vec![
            OrderedEntry::keyed("a", Value::from(1), SourceInfo::default()),
            OrderedEntry::spread(Value::Reference(reference(&["*"])), SourceInfo::default()),
        ];
        let body = MapEntries::from_ordered(entries);
        assert!(body.has_spreads());
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_reference_fetch_path_and_projection() {
        let plain = reference(&["vpc", "id"]);
        assert_eq!(plain.fetch_path(), ["vpc", "id"]);
        assert!(plain.projection().is_empty());

        let wildcard = reference(&["subnets", "*", "cidr"]);
        assert!(wildcard.has_wildcard());
        assert_eq!(wildcard.fetch_path(), ["subnets"]);
        assert_eq!(wildcard.projection(), ["cidr"]);
        assert_eq!(wildcard.to_string(), "net:subnets.*.cidr");
    }

    #[test]
    fn test_contains_references() {
        let mut map = ValueMap::new();
        map.insert("plain".into(), Value::from("x"));
        assert!(!Value::map(map.clone()).contains_references());

        map.insert(
            "hidden".into(),
            Value::secret(Value::List(vec![Value::Reference(reference(&["k"]))])),
        );
        assert!(Value::map(map).contains_references());
    }

    #[test]
    fn test_get_path_through_lists() {
        let json = serde_json::json!({"vpc": {"subnets": [{"id": "a"}, {"id": "b"}]}});
        let value = Value::from(json);
        assert_eq!(value.get_path(&["vpc", "subnets", "1", "id"]), Some(&Value::from("b")));
        assert_eq!(value.get_path(&["vpc", "missing"]), None);
    }

    #[test]
    fn test_serialize_and_redact() {
        let mut map = ValueMap::new();
        map.insert("user".into(), Value::from("admin"));
        map.insert("password".into(), Value::secret(Value::from("hunter2")));
        map.insert("ports".into(), Value::List(vec![Value::from(80), Value::from(443)]));
        let value = Value::map(map);

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["password"], "hunter2");
        assert_eq!(json["ports"][1], 443);

        let redacted = serde_json::to_value(value.redact_secrets()).unwrap();
        assert_eq!(redacted["password"], "<redacted>");
        assert_eq!(redacted["user"], "admin");
    }

    #[test]
    fn test_serialize_reference_as_string() {
        let value = Value::Reference(reference(&["vpc", "id"]));
        assert_eq!(serde_json::to_value(&value).unwrap(), "net:vpc.id");
    }
}
