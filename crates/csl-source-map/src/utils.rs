//! Utility functions for working with source positions

use crate::types::{Location, Range};

/// Convert a byte offset to a Location with line and column info
///
/// Returns None if the offset is out of bounds.
pub fn offset_to_location(source: &str, offset: usize) -> Option<Location> {
    if offset > source.len() {
        return None;
    }

    let mut row = 0;
    let mut column = 0;

    for (index, ch) in source.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }
    }

    Some(Location { offset, row, column })
}

/// Create a fully populated Range for a byte span of `source`.
///
/// Offsets past the end are clamped.
pub(crate) fn range_from_source(source: &str, start: usize, end: usize) -> Range {
    let clamp = |offset: usize| offset.min(source.len());
    let locate = |offset: usize| offset_to_location(source, clamp(offset)).unwrap_or_default();
    Range {
        start: locate(start),
        end: locate(end.max(start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_location_simple() {
        let source = "hello\nworld";

        let loc = offset_to_location(source, 0).unwrap();
        assert_eq!((loc.row, loc.column), (0, 0));

        let loc = offset_to_location(source, 3).unwrap();
        assert_eq!((loc.row, loc.column), (0, 3));

        let loc = offset_to_location(source, 6).unwrap();
        assert_eq!((loc.row, loc.column), (1, 0));

        let loc = offset_to_location(source, 9).unwrap();
        assert_eq!((loc.row, loc.column), (1, 3));
    }

    #[test]
    fn test_offset_to_location_out_of_bounds() {
        assert!(offset_to_location("hello", 100).is_none());
    }

    #[test]
    fn test_offset_to_location_counts_chars() {
        // 'é' is two bytes but one column
        let source = "é = 1";
        let loc = offset_to_location(source, 2).unwrap();
        assert_eq!(loc.column, 1);
    }
}
