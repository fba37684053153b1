//! Fixed vocabulary maps from legacy labels to trial-search API terms.
//!
//! Both tables are hand-authored. Legacy trial types that have no API
//! equivalent (Genetics, Behavioral study, ...) are deliberately absent, so
//! looking them up reports a missing mapping instead of guessing.
//!
//! # Examples
//!
//! ```
//! use ctsearch_types::vocabulary;
//!
//! assert_eq!(vocabulary::api_trial_type("Supportive Care"), Some("supportive_care"));
//! assert_eq!(vocabulary::api_trial_type("Genetics"), None);
//!
//! // Adjacent phases share the API's combined buckets.
//! assert_eq!(vocabulary::api_phases("Phase II"), Some(&["i_ii", "ii", "ii_iii"][..]));
//! ```

// =============================================================================
// Trial types
// =============================================================================

/// Label meaning "no trial type filter". Never mapped, never an error.
pub const ALL_TRIAL_TYPES: &str = "all";

/// Lowercased legacy trial type label to API primary purpose code.
pub const TRIAL_TYPE_MAP: &[(&str, &str)] = &[
    ("treatment", "treatment"),
    ("supportive care", "supportive_care"),
    ("diagnostic", "diagnostic"),
    ("prevention", "prevention"),
    ("health services research", "health_services_research"),
    ("screening", "screening"),
];

/// Returns true if the label is the "all trial types" wildcard.
pub fn is_all_trial_types(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(ALL_TRIAL_TYPES)
}

/// Looks up the API code for a legacy trial type label (case-insensitive).
///
/// Returns `None` for unmapped labels, including `"all"`.
pub fn api_trial_type(label: &str) -> Option<&'static str> {
    Vocabulary::STANDARD.trial_type(label)
}

// =============================================================================
// Phases
// =============================================================================

/// Legacy phase label to the API phase buckets it matches.
///
/// The API splits combined phases (I/II, II/III) into their own buckets, and
/// a search for a single legacy phase has to match the combined ones as well.
pub const PHASE_MAP: &[(&str, &[&str])] = &[
    ("Phase I", &["i", "i_ii"]),
    ("Phase II", &["i_ii", "ii", "ii_iii"]),
    ("Phase III", &["ii_iii", "iii"]),
    ("Phase IV", &["iv"]),
];

/// Looks up the API phase buckets for a legacy phase label (case-insensitive).
pub fn api_phases(label: &str) -> Option<&'static [&'static str]> {
    Vocabulary::STANDARD.phases(label)
}

// =============================================================================
// Vocabulary
// =============================================================================

/// A pair of fixed lookup tables used to translate legacy labels.
///
/// The tables are `'static` and never change, so a `Vocabulary` is `Copy`
/// and can be handed to every search definition by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    /// Lowercased trial type label to API code.
    pub trial_types: &'static [(&'static str, &'static str)],
    /// Phase label to API phase buckets.
    pub phases: &'static [(&'static str, &'static [&'static str])],
}

impl Vocabulary {
    /// The hand-authored legacy site to API vocabulary.
    pub const STANDARD: Self = Self {
        trial_types: TRIAL_TYPE_MAP,
        phases: PHASE_MAP,
    };

    /// Looks up the API code for a trial type label (case-insensitive).
    pub fn trial_type(&self, label: &str) -> Option<&'static str> {
        let key = label.trim().to_lowercase();
        self.trial_types
            .iter()
            .find(|(cgov, _)| *cgov == key)
            .map(|(_, api)| *api)
    }

    /// Looks up the API phase buckets for a phase label (case-insensitive).
    pub fn phases(&self, label: &str) -> Option<&'static [&'static str]> {
        let label = label.trim();
        self.phases
            .iter()
            .find(|(cgov, _)| cgov.eq_ignore_ascii_case(label))
            .map(|(_, buckets)| *buckets)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::STANDARD
    }
}

// =============================================================================
// API parameter names
// =============================================================================

/// API parameter holding disease concept codes.
pub const PARAM_DISEASES: &str = "diseases.nci_thesaurus_concept_id";

/// API parameter holding intervention concept codes.
pub const PARAM_INTERVENTIONS: &str = "arms.interventions.intervention_code";

/// API parameter holding primary purpose (trial type) codes.
pub const PARAM_TRIAL_TYPES: &str = "primary_purpose.primary_purpose_code";

/// API parameter holding phase buckets.
pub const PARAM_PHASES: &str = "phase.phase";
