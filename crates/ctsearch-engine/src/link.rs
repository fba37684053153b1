//! Routing of raw legacy links to search definition variants.
//!
//! Legacy links are case-insensitive, so every URL is lowercased before it
//! is parsed. Site-relative URLs are resolved against [`BASE_URL`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::ctlink::CtLinkSearchDef;
use crate::definition::SearchDefinition;
use crate::error::LinkError;
use crate::saved::{SavedSearchDef, SavedSearchSource};

/// Base for site-relative links.
pub const BASE_URL: &str = "https://www.cancer.gov";

/// Paths served by the CT-Link handler.
pub const CTLINK_PATHS: [&str; 2] = [
    "/search/clinicaltrialslink",
    "/search/clinicaltrialslink.aspx",
];

/// Paths that display a saved search.
pub const SAVED_SEARCH_PATHS: [&str; 3] = [
    "/search/resultsclinicaltrials.aspx",
    "/about-cancer/treatment/clinical-trials/search/results",
    "/clinicaltrials/search/results",
];

/// Query parameter carrying the saved-search identifier.
pub const SEARCH_ID_PARAM: &str = "protocolsearchid";

/// Which kind of legacy link a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SearchUrlType {
    /// Query-string link.
    #[serde(rename = "CTLink")]
    CtLink,
    /// Saved-search link.
    SavedSearch,
}

impl SearchUrlType {
    /// Returns the persisted discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CtLink => "CTLink",
            Self::SavedSearch => "SavedSearch",
        }
    }
}

impl fmt::Display for SearchUrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a routed link points.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// A CT-Link, already decoded.
    CtLink(CtLinkSearchDef),
    /// A saved search that still has to be fetched.
    SavedSearch {
        /// The `protocolsearchid`.
        search_id: i64,
    },
}

/// A legacy link that has been parsed and routed.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyLink {
    /// The URL as supplied.
    pub url: String,
    /// The routing decision.
    pub target: LinkTarget,
}

impl LegacyLink {
    /// Parses and routes a raw URL.
    ///
    /// # Errors
    ///
    /// Fails if the URL does not parse, its path is not a known legacy
    /// search path, a saved-search link has no numeric `protocolsearchid`,
    /// or a CT-Link's parameters cannot be decoded.
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let lowered = raw.trim().to_lowercase();
        let parsed = parse_url(&lowered).map_err(|source| LinkError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;

        let path = parsed.path().trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };

        let target = if CTLINK_PATHS.contains(&path) {
            LinkTarget::CtLink(CtLinkSearchDef::from_query_params(parsed.query_pairs())?)
        } else if SAVED_SEARCH_PATHS.contains(&path) {
            let search_id = parsed
                .query_pairs()
                .filter(|(k, _)| k == SEARCH_ID_PARAM)
                .find_map(|(_, v)| v.trim().parse::<i64>().ok())
                .ok_or_else(|| LinkError::MissingSearchId { url: raw.to_string() })?;
            LinkTarget::SavedSearch { search_id }
        } else {
            return Err(LinkError::UnknownPath {
                path: path.to_string(),
            });
        };

        debug!(url = raw, ?target, "Routed legacy link");
        Ok(Self {
            url: raw.to_string(),
            target,
        })
    }

    /// Returns the link kind.
    pub fn url_type(&self) -> SearchUrlType {
        match self.target {
            LinkTarget::CtLink(_) => SearchUrlType::CtLink,
            LinkTarget::SavedSearch { .. } => SearchUrlType::SavedSearch,
        }
    }

    /// Builds the search definition, fetching saved searches from `source`.
    pub async fn resolve<S: SavedSearchSource>(self, source: &S) -> Result<SearchDef, LinkError> {
        match self.target {
            LinkTarget::CtLink(def) => Ok(SearchDef::CtLink(def)),
            LinkTarget::SavedSearch { search_id } => Ok(SearchDef::SavedSearch(
                SavedSearchDef::from_search_id(source, search_id).await?,
            )),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, url::ParseError> {
    match Url::parse(url) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(BASE_URL)?.join(url),
        other => other,
    }
}

/// A search definition of either variant, tagged for persistence.
///
/// Serialized as `{"search_url_type": ..., "search_def": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "search_url_type", content = "search_def")]
pub enum SearchDef {
    /// From a CT-Link.
    #[serde(rename = "CTLink")]
    CtLink(CtLinkSearchDef),
    /// From a saved search.
    SavedSearch(SavedSearchDef),
}

impl SearchDef {
    /// Returns the link kind.
    pub fn url_type(&self) -> SearchUrlType {
        match self {
            Self::CtLink(_) => SearchUrlType::CtLink,
            Self::SavedSearch(_) => SearchUrlType::SavedSearch,
        }
    }

    /// Returns the definition behind the shared capability.
    pub fn as_definition(&self) -> &dyn SearchDefinition {
        match self {
            Self::CtLink(def) => def,
            Self::SavedSearch(def) => def,
        }
    }
}
