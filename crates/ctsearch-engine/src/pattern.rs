//! Classification outputs: the search pattern fingerprint and the
//! synthesized API parameter set.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A filter dimension that contributes one bit to a search pattern.
///
/// The declaration order is the bit order and is relied upon by anything
/// that labels stored fingerprints, so new dimensions may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    /// A disease / diagnosis filter.
    Diagnosis,
    /// A trial type filter.
    TrialType,
    /// Clinical center only.
    ClinicalCenter,
    /// New trials only.
    NewTrials,
    /// An intervention filter.
    InterventionType,
    /// A drug filter.
    DrugType,
    /// A phase filter.
    Phase,
}

impl Dimension {
    /// Every dimension in bit order.
    pub const ALL: [Self; 7] = [
        Self::Diagnosis,
        Self::TrialType,
        Self::ClinicalCenter,
        Self::NewTrials,
        Self::InterventionType,
        Self::DrugType,
        Self::Phase,
    ];

    /// Bit index of this dimension.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Bit mask of this dimension.
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Short label used in pattern reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Diagnosis => "Diag",
            Self::TrialType => "TrialType",
            Self::ClinicalCenter => "ClinCtr",
            Self::NewTrials => "IsNew",
            Self::InterventionType => "Intr",
            Self::DrugType => "Drug",
            Self::Phase => "Phase",
        }
    }
}

/// Classification of one search definition.
///
/// Serialized as the sentinel strings `"MISSINGMAPPING"` / `"MANUAL"` or as
/// the bare integer mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPattern {
    /// At least one legacy value has no API translation.
    MissingMapping,
    /// The link cannot be expressed as a single API query.
    Manual,
    /// Bitmask over [`Dimension::ALL`].
    Mask(u8),
}

impl SearchPattern {
    /// Sentinel for [`SearchPattern::MissingMapping`].
    pub const MISSING_MAPPING: &'static str = "MISSINGMAPPING";
    /// Sentinel for [`SearchPattern::Manual`].
    pub const MANUAL: &'static str = "MANUAL";
    /// Label for a mask with no dimensions set.
    pub const NO_FILTERS: &'static str = "NoFilters";

    /// Builds a mask from the dimensions that are present.
    pub fn from_dimensions(dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        Self::Mask(dimensions.into_iter().fold(0, |mask, d| mask | d.bit()))
    }

    /// Returns the mask, `None` for the sentinels.
    pub fn mask(&self) -> Option<u8> {
        match self {
            Self::Mask(mask) => Some(*mask),
            _ => None,
        }
    }

    /// Returns the dimensions set in the mask, in bit order.
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            Self::Mask(mask) => Dimension::ALL
                .into_iter()
                .filter(|d| mask & d.bit() != 0)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Human-readable label, e.g. `Diag_Intr`.
    pub fn label(&self) -> String {
        match self {
            Self::MissingMapping => Self::MISSING_MAPPING.to_string(),
            Self::Manual => Self::MANUAL.to_string(),
            Self::Mask(_) => {
                let labels: Vec<&str> =
                    self.dimensions().into_iter().map(Dimension::label).collect();
                if labels.is_empty() {
                    Self::NO_FILTERS.to_string()
                } else {
                    labels.join("_")
                }
            }
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMapping => f.write_str(Self::MISSING_MAPPING),
            Self::Manual => f.write_str(Self::MANUAL),
            Self::Mask(mask) => write!(f, "{}", mask),
        }
    }
}

impl Serialize for SearchPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::MissingMapping => serializer.serialize_str(Self::MISSING_MAPPING),
            Self::Manual => serializer.serialize_str(Self::MANUAL),
            Self::Mask(mask) => serializer.serialize_u8(*mask),
        }
    }
}

impl<'de> Deserialize<'de> for SearchPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Clone, Copy)]
        struct PatternVisitor;

        impl<'de> Visitor<'de> for PatternVisitor {
            type Value = SearchPattern;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"MISSINGMAPPING\", \"MANUAL\" or an integer below 128")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                match value {
                    SearchPattern::MISSING_MAPPING => Ok(SearchPattern::MissingMapping),
                    SearchPattern::MANUAL => Ok(SearchPattern::Manual),
                    other => other
                        .parse::<u64>()
                        .map_err(|_| E::invalid_value(de::Unexpected::Str(other), &self))
                        .and_then(|mask| self.visit_u64(mask)),
                }
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                if value < 128 {
                    Ok(SearchPattern::Mask(value as u8))
                } else {
                    Err(E::invalid_value(de::Unexpected::Unsigned(value), &self))
                }
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
                    .and_then(|value| self.visit_u64(value))
            }
        }

        deserializer.deserialize_any(PatternVisitor)
    }
}

/// A single API parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiParamValue {
    /// Exactly one term.
    Single(String),
    /// Several terms.
    List(Vec<String>),
}

impl ApiParamValue {
    /// Builds a value, collapsing one-element lists to [`ApiParamValue::Single`].
    ///
    /// Returns `None` for an empty list.
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Single),
            _ => Some(Self::List(values)),
        }
    }

    /// Returns the terms as a slice-like vector.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Synthesized API parameters plus the translation errors that kept
/// categories out of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParameters {
    /// Parameter name to value.
    pub parameters: BTreeMap<String, ApiParamValue>,
    /// One message per category that failed to translate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApiParameters {
    /// Returns true if every category translated.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ApiParamValue> {
        self.parameters.get(name)
    }
}

/// All classification outputs for one search definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The fingerprint.
    pub search_pattern: SearchPattern,
    /// Why the definition needs manual creation, if it does.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual_reasons: Vec<String>,
    /// The synthesized parameter set.
    pub api_params: ApiParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_bits_are_stable() {
        let bits: Vec<u8> = Dimension::ALL.iter().map(|d| d.bit()).collect();
        assert_eq!(bits, vec![1, 2, 4, 8, 16, 32, 64]);
        assert_eq!(Dimension::InterventionType.bit(), 16);
        assert_eq!(Dimension::DrugType.bit(), 32);
    }

    #[test]
    fn test_pattern_from_dimensions() {
        let pattern =
            SearchPattern::from_dimensions([Dimension::Diagnosis, Dimension::InterventionType]);
        assert_eq!(pattern, SearchPattern::Mask(17));
        assert_eq!(pattern.label(), "Diag_Intr");
        assert_eq!(pattern.to_string(), "17");
    }

    #[test]
    fn test_pattern_labels() {
        assert_eq!(SearchPattern::Mask(0).label(), "NoFilters");
        assert_eq!(
            SearchPattern::Mask(127).label(),
            "Diag_TrialType_ClinCtr_IsNew_Intr_Drug_Phase"
        );
        assert_eq!(SearchPattern::Manual.label(), "MANUAL");
        assert_eq!(SearchPattern::MissingMapping.to_string(), "MISSINGMAPPING");
        assert!(SearchPattern::Manual.dimensions().is_empty());
    }

    #[test]
    fn test_pattern_serde() {
        assert_eq!(serde_json::to_string(&SearchPattern::Mask(65)).unwrap(), "65");
        assert_eq!(serde_json::to_string(&SearchPattern::Manual).unwrap(), "\"MANUAL\"");

        let parsed: SearchPattern = serde_json::from_str("\"MISSINGMAPPING\"").unwrap();
        assert_eq!(parsed, SearchPattern::MissingMapping);
        let parsed: SearchPattern = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, SearchPattern::Mask(3));
        assert!(serde_json::from_str::<SearchPattern>("128").is_err());
        assert!(serde_json::from_str::<SearchPattern>("\"OTHER\"").is_err());
    }

    #[test]
    fn test_api_param_value_collapses_single() {
        assert_eq!(ApiParamValue::from_values(vec![]), None);
        assert_eq!(
            ApiParamValue::from_values(vec!["C1".to_string()]),
            Some(ApiParamValue::Single("C1".to_string()))
        );
        let list = ApiParamValue::from_values(vec!["C1".to_string(), "C2".to_string()]).unwrap();
        assert_eq!(list.values(), vec!["C1", "C2"]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[\"C1\",\"C2\"]");
    }
}
