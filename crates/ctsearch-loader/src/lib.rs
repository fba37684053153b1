//! # ctsearch-loader
//!
//! Loader for the reference dataset that translates legacy CDR ids into
//! trial-search API concept codes.
//!
//! The table is loaded once at startup and is read-only afterwards.
//!
//! ```no_run
//! use ctsearch_loader::{discover_dataset, CodeMap, CodeMapConfig};
//!
//! let path = discover_dataset("data")?;
//! let (map, stats) = CodeMap::load_from_path(path, CodeMapConfig::default())?;
//! println!("{} legacy ids, {} rows skipped", map.legacy_id_count(), stats.skipped_rows);
//! # Ok::<(), ctsearch_loader::CodeMapError>(())
//! ```

#![warn(missing_docs)]

mod code_map;
mod loader;
mod parser;
mod types;

pub use code_map::CodeMap;
pub use loader::{discover_dataset, format_bytes, DATASET_FILE_NAME};
pub use parser::{parse, CodeMapParser};
pub use types::{CodeMapConfig, CodeMapError, CodeMapResult, LoadStats, RowPolicy};

// Re-export ctsearch-types for convenience
pub use ctsearch_types;
