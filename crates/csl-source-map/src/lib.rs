//! Source locations for CSL documents
//!
//! Every value that can fail later in the pipeline (a reference that does not
//! resolve, a spread that is not a map, an entry that cannot be converted)
//! keeps a [`SourceInfo`] pointing back into the document it came from. The
//! engine never renders snippets itself; it only carries the file name and
//! the range so an external formatter can.
//!
//! # Example
//!
//! ```rust
//! use csl_source_map::*;
//!
//! let source = "app {\n  region = var.region\n}";
//! let start = source.find("var.region").unwrap();
//! let info = SourceInfo::from_offsets("main.csl", source, start, start + 10);
//!
//! assert_eq!(info.line(), 2);
//! assert_eq!(info.column(), 12);
//! assert_eq!(info.to_string(), "main.csl:2:12");
//! ```

pub mod source_info;
pub mod types;
pub mod utils;

pub use source_info::SourceInfo;
pub use types::{Location, Range};
pub use utils::offset_to_location;
