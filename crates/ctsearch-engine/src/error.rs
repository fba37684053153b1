//! Error types for search definition construction, link routing and the
//! persisted link collection.

use thiserror::Error;

/// Error returned by a saved-search lookup collaborator.
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Hard errors that abort construction of a single search definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// `idtype` carried a code outside the known id types.
    #[error("CTLink: Unknown ID type {code}")]
    UnknownIdType {
        /// The unrecognized code.
        code: String,
    },

    /// The saved-search lookup returned no record.
    #[error("Saved search {id} not found")]
    SavedSearchNotFound {
        /// The saved-search identifier.
        id: i64,
    },

    /// The saved-search lookup itself failed.
    #[error("Saved search {id} lookup failed: {source}")]
    Lookup {
        /// The saved-search identifier.
        id: i64,
        /// Underlying collaborator error.
        #[source]
        source: LookupError,
    },

    /// The record could not be read as a saved-search definition.
    #[error("Invalid saved search record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// Result type for search definition construction.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// A legacy vocabulary value with no translation to the API vocabulary.
///
/// These are never raised out of the classification operations; they are
/// collected into missing-mapping verdicts and parameter error lists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Disease id without a concept code.
    #[error("Search Contains Unmappable Disease ({id})")]
    UnmappableDisease {
        /// Canonical legacy id.
        id: String,
    },

    /// Intervention or drug id without a concept code.
    #[error("Search Contains Unmappable Intervention ({id})")]
    UnmappableIntervention {
        /// Canonical legacy id.
        id: String,
    },

    /// Phase label missing from the phase map.
    #[error("Search Contains Unmappable Phase ({label})")]
    UnmappablePhase {
        /// The legacy phase label.
        label: String,
    },

    /// Trial type label missing from the trial type map.
    #[error("Search Contains Unmappable Trial Type ({label})")]
    UnmappableTrialType {
        /// The legacy trial type label.
        label: String,
    },
}

/// Errors routing a raw legacy URL to a search definition variant.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The URL could not be parsed.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// The path is not one of the known legacy search paths.
    #[error("Unknown pathname, {path}")]
    UnknownPath {
        /// The unrecognized path.
        path: String,
    },

    /// A saved-search URL without a usable `protocolsearchid`.
    #[error("Saved search URL has no valid protocolsearchid: {url}")]
    MissingSearchId {
        /// The offending URL.
        url: String,
    },

    /// The link parsed but its definition could not be built.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Errors reading or writing the persisted link collection.
#[derive(Error, Debug)]
pub enum LinkDbError {
    /// I/O error.
    #[error("IO error on link collection: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error in link collection: {0}")]
    Json(#[from] serde_json::Error),

    /// The same URL appears twice.
    #[error("LinkDB already includes url, {url}")]
    DuplicateUrl {
        /// The duplicated URL.
        url: String,
    },

    /// Lookup with an empty URL.
    #[error("Empty URL")]
    EmptyUrl,
}

/// Result type for link collection operations.
pub type LinkDbResult<T> = Result<T, LinkDbError>;
