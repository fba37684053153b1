//! # ctsearch-engine
//!
//! Normalization and capability mapping for legacy clinical-trial search
//! links.
//!
//! A link is decoded into one of two search definition variants
//! ([`CtLinkSearchDef`] from a query string, [`SavedSearchDef`] from a stored
//! record). Both implement [`SearchDefinition`], which translates the legacy
//! vocabulary through a shared [`TranslationContext`] and decides whether the
//! link can become a single trial-search API query.
//!
//! ## Features
//!
//! - `parallel` (default): classifies link collections on rayon.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use ctsearch_engine::{CtLinkSearchDef, SearchDefinition, SearchPattern, TranslationContext};
//! use ctsearch_loader::CodeMap;
//!
//! let (codes, _) = CodeMap::from_pairs([
//!     ("CDR0000000123", "C1647"),
//!     ("CDR0000000456", "C3868"),
//! ]);
//! let ctx = TranslationContext::new(Arc::new(codes));
//!
//! let def = CtLinkSearchDef::from_query_params([
//!     ("id", "123"),
//!     ("idtype", "5"),
//!     ("format", "1"),
//!     ("diagnosis", "456"),
//! ])?;
//!
//! assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(17));
//! assert_eq!(def.search_pattern(&ctx).label(), "Diag_Intr");
//! # Ok::<(), ctsearch_engine::DefinitionError>(())
//! ```

#![warn(missing_docs)]

mod context;
mod ctlink;
mod definition;
mod error;
mod link;
mod link_db;
mod pattern;
mod saved;
mod stats;

pub use context::TranslationContext;
pub use ctlink::{params, CtLinkSearchDef, MISSING_FORMAT_WARNING};
pub use definition::{Facet, ManualReason, SearchDefinition};
pub use error::{
    DefinitionError, DefinitionResult, LinkDbError, LinkDbResult, LinkError, LookupError,
    TranslationError,
};
pub use link::{
    LegacyLink, LinkTarget, SearchDef, SearchUrlType, BASE_URL, CTLINK_PATHS, SAVED_SEARCH_PATHS,
    SEARCH_ID_PARAM,
};
pub use link_db::{LinkDb, LinkRecord};
pub use pattern::{ApiParamValue, ApiParameters, Classification, Dimension, SearchPattern};
pub use saved::{SavedSearchDef, SavedSearchRecord, SavedSearchSource};
pub use stats::{LinkStats, CTLINK_FIELDS};

// Re-export the lower layers for convenience
pub use ctsearch_loader;
pub use ctsearch_types;
