//! Legacy CDR identifier type.
//!
//! This module provides the `CdrId` newtype for identifiers of the legacy
//! content system, together with the canonicalization that every
//! translation-table lookup goes through.

use std::fmt;

/// A concept code in the trial-search API vocabulary (e.g. `C4872`).
pub type ConceptCode = String;

/// A legacy CDR identifier in canonical form.
///
/// Canonical CDR ids are the `CDR` prefix followed by a ten digit,
/// zero-padded number, e.g. `CDR0000038323`. Links frequently carry only
/// the bare number (`38323`), so construction always goes through
/// [`CdrId::normalize`].
///
/// # Examples
///
/// ```
/// use ctsearch_types::CdrId;
///
/// let id = CdrId::normalize("38323");
/// assert_eq!(id.as_str(), "CDR0000038323");
///
/// // Already canonical ids are returned unchanged.
/// assert_eq!(CdrId::normalize("CDR0000038323"), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CdrId(String);

impl CdrId {
    /// Prefix carried by every canonical CDR id.
    pub const PREFIX: &'static str = "CDR";

    /// Width of the zero-padded numeric part.
    pub const DIGITS: usize = 10;

    /// Canonicalizes a raw legacy identifier.
    ///
    /// Values that already start with the `CDR` prefix (in any case) are
    /// kept verbatim. Anything else is left-padded with zeros to ten
    /// characters, truncated to its last ten characters when longer, and
    /// prefixed with `CDR`.
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        if Self::is_canonical(raw) {
            return Self(raw.to_string());
        }

        let padded = format!("{:0>width$}", raw, width = Self::DIGITS);
        let start = padded.len() - Self::DIGITS;
        // Slicing by byte offset is only safe on a char boundary.
        let tail = match padded.get(start..) {
            Some(tail) => tail,
            None => padded.as_str(),
        };
        Self(format!("{}{}", Self::PREFIX, tail))
    }

    /// Returns true if the value already carries the canonical prefix.
    pub fn is_canonical(value: &str) -> bool {
        value
            .get(..Self::PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(Self::PREFIX))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercased lookup key for this identifier.
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Consumes the id and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CdrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CdrId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CdrId {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}
