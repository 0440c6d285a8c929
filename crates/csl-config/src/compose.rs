//! Deep merging and ordered composition of maps.
//!
//! Two operations with one precedence rule: whatever is applied later wins.
//!
//! - [`deep_merge`] layers whole maps (file over file). Plain maps on both
//!   sides merge recursively; anything else is replaced.
//! - [`compose_ordered`] folds the entries of a spread-carrying map in
//!   declaration order. A spread writes every key of its map, overwriting
//!   whatever an earlier entry or spread put there; a later explicit key
//!   overwrites what a spread contributed.

use crate::error::ComposeError;
use crate::types::{MapEntries, OrderedEntry, Reference, Value, ValueMap};
use csl_source_map::SourceInfo;

/// Merge `overlay` into `base`.
///
/// For each key of `overlay`: if both sides hold a plain map the two are
/// merged recursively, otherwise the overlay value replaces the base value.
/// Lists are never merged element-wise. Keys only in `base` are kept.
pub fn deep_merge(mut base: ValueMap, overlay: ValueMap) -> ValueMap {
    for (key, incoming) in overlay {
        let incoming = match (base.get_mut(&key), incoming) {
            (
                Some(Value::Map(MapEntries::Plain(existing))),
                Value::Map(MapEntries::Plain(incoming)),
            ) => {
                let current = std::mem::take(existing);
                *existing = deep_merge(current, incoming);
                continue;
            }
            (_, incoming) => incoming,
        };
        base.insert(key, incoming);
    }
    base
}

/// Left fold of [`deep_merge`]: the first layer has the lowest priority.
pub fn deep_merge_all<I>(layers: I) -> ValueMap
where
    I: IntoIterator<Item = ValueMap>,
{
    layers.into_iter().fold(ValueMap::new(), deep_merge)
}

/// Fold ordered entries into a plain map.
///
/// Keyed entries assign their key. Spread entries contribute every key of
/// their map: a map value is used directly (a nested spread-carrying map is
/// composed first), a secret map contributes secret values, and a reference
/// is handed to `resolve_spread`. Any other spread value is a
/// [`ComposeError::NonMapMergeTarget`].
pub fn compose_ordered<F>(entries: Vec<OrderedEntry>, mut resolve_spread: F) -> Result<ValueMap, ComposeError>
where
    F: FnMut(&Reference) -> Result<ValueMap, ComposeError>,
{
    compose_entries(entries, &mut resolve_spread)
}

/// A `resolve_spread` callback for trees that must already be resolved.
pub fn reject_unresolved_spread(reference: &Reference) -> Result<ValueMap, ComposeError> {
    Err(ComposeError::UnresolvedSpread {
        reference: reference.to_string(),
        source_info: reference.source_info.clone(),
    })
}

type SpreadResolver<'a> = dyn FnMut(&Reference) -> Result<ValueMap, ComposeError> + 'a;

fn compose_entries(
    entries: Vec<OrderedEntry>,
    resolve_spread: &mut SpreadResolver<'_>,
) -> Result<ValueMap, ComposeError> {
    let mut result = ValueMap::new();
    for entry in entries {
        match entry.key {
            Some(key) => {
                // a re-assigned key moves to its latest position
                result.shift_remove(&key);
                result.insert(key, entry.value);
            }
            None => {
                let contributed = spread_map(entry.value, &entry.source_info, resolve_spread)?;
                for (key, value) in contributed {
                    result.shift_remove(&key);
                    result.insert(key, value);
                }
            }
        }
    }
    Ok(result)
}

fn spread_map(
    value: Value,
    source_info: &SourceInfo,
    resolve_spread: &mut SpreadResolver<'_>,
) -> Result<ValueMap, ComposeError> {
    match value {
        Value::Map(MapEntries::Plain(map)) => Ok(map),
        Value::Map(MapEntries::WithSpreads(entries)) => compose_entries(entries, resolve_spread),
        Value::Reference(reference) => resolve_spread(&reference),
        Value::Secret(inner) => Ok(spread_map(*inner, source_info, resolve_spread)?
            .into_iter()
            .map(|(key, value)| (key, Value::secret(value)))
            .collect()),
        other => Err(ComposeError::NonMapMergeTarget {
            found: other.kind_name(),
            source_info: source_info.clone(),
        }),
    }
}
