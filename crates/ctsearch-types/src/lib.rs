//! # ctsearch-types
//!
//! Vocabulary types for legacy clinical-trial search links.
//!
//! This crate provides the identifiers, coded values and fixed lookup
//! tables shared by the loader and the classification engine.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use ctsearch_types::{vocabulary, CdrId, CgovPhase, IdType};
//!
//! let id = CdrId::normalize("456");
//! assert_eq!(id.as_str(), "CDR0000000456");
//!
//! assert_eq!(IdType::from_code("1"), Some(IdType::Drug));
//! assert_eq!(CgovPhase::label_for_code("3"), "Phase IV");
//! assert_eq!(vocabulary::api_phases("Phase IV"), Some(&["iv"][..]));
//! ```

#![warn(missing_docs)]

mod cdr_id;
mod code_map_row;
mod enums;
pub mod vocabulary;

// Re-export all public types at crate root
pub use cdr_id::{CdrId, ConceptCode};
pub use code_map_row::CodeMapRow;
pub use enums::{CgovPhase, CgovTrialType, IdType};
