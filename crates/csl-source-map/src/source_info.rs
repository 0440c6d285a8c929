//! File-qualified source locations

use std::fmt;
use std::sync::Arc;

use crate::types::Range;
use crate::utils::range_from_source;
use serde::{Deserialize, Serialize};

/// Where a value came from: the document's file name plus a range inside it.
///
/// The file name is shared (`Arc<str>`) because every node of a converted
/// document points at the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    /// File path or identifier (`<anonymous>` for in-memory documents)
    pub filename: Arc<str>,
    /// The range inside that file
    pub range: Range,
}

impl Default for SourceInfo {
    fn default() -> Self {
        SourceInfo::new("<anonymous>", Range::default())
    }
}

impl SourceInfo {
    pub fn new(filename: impl Into<Arc<str>>, range: Range) -> Self {
        SourceInfo {
            filename: filename.into(),
            range,
        }
    }

    /// Build source info for a byte span of `source`, computing rows and columns.
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn from_offsets(filename: impl Into<Arc<str>>, source: &str, start: usize, end: usize) -> Self {
        SourceInfo::new(filename, range_from_source(source, start, end))
    }

    /// A location in the same file with a different range.
    pub fn with_range(&self, range: Range) -> Self {
        SourceInfo {
            filename: Arc::clone(&self.filename),
            range,
        }
    }

    /// 1-based line of the start position.
    pub fn line(&self) -> usize {
        self.range.start.row + 1
    }

    /// 1-based column of the start position.
    pub fn column(&self) -> usize {
        self.range.start.column + 1
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    #[test]
    fn test_display_is_one_based() {
        let info = SourceInfo::new(
            "config.csl",
            Range::new(Location::new(14, 2, 4), Location::new(20, 2, 10)),
        );
        assert_eq!(info.to_string(), "config.csl:3:5");
    }

    #[test]
    fn test_from_offsets_multiline() {
        let source = "a = 1\nb = var.x\n";
        let start = source.find("var.x").unwrap();
        let info = SourceInfo::from_offsets("vars.csl", source, start, start + 5);

        assert_eq!(info.range.start.row, 1);
        assert_eq!(info.range.start.column, 4);
        assert_eq!(info.range.end.column, 9);
        assert_eq!(info.to_string(), "vars.csl:2:5");
    }

    #[test]
    fn test_from_offsets_clamps() {
        let info = SourceInfo::from_offsets("short.csl", "abc", 1, 99);
        assert_eq!(info.range.end.offset, 3);
    }

    #[test]
    fn test_with_range_shares_filename() {
        let info = SourceInfo::new("shared.csl", Range::default());
        let other = info.with_range(Range::new(Location::new(3, 0, 3), Location::new(4, 0, 4)));
        assert!(Arc::ptr_eq(&info.filename, &other.filename));
        assert_eq!(other.column(), 4);
    }
}
