//! Search definitions decoded from CT-Link query strings.
//!
//! CT-Link URLs carry their filters directly as query parameters:
//!
//! | param | field |
//! |---|---|
//! | `id`, `idtype` | `id`, `id_type`, `cdr_id` |
//! | `format` | `format` |
//! | `tt` | `trial_type` |
//! | `phase` | `phase` |
//! | `ncc` | `location_clinical_center` |
//! | `cn` | `location_country` |
//! | `new` | `new_trials` |
//! | `closed` | `closed` |
//! | `diagnosis` | `diagnosis` |
//!
//! Identity codes fail hard on unknown values; content codes degrade to
//! `"UNK"`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use ctsearch_types::{CdrId, CgovPhase, CgovTrialType, IdType};

use crate::definition::{filters_trial_type, present, SearchDefinition};
use crate::error::{DefinitionError, DefinitionResult};
use crate::pattern::Dimension;

/// Query parameter names understood on CT-Link URLs.
pub mod params {
    /// Raw legacy id.
    pub const ID: &str = "id";
    /// Id type code.
    pub const ID_TYPE: &str = "idtype";
    /// Output format.
    pub const FORMAT: &str = "format";
    /// Trial type code.
    pub const TRIAL_TYPE: &str = "tt";
    /// Phase code.
    pub const PHASE: &str = "phase";
    /// Clinical center flag.
    pub const CLINICAL_CENTER: &str = "ncc";
    /// Country.
    pub const COUNTRY: &str = "cn";
    /// New trials flag.
    pub const NEW_TRIALS: &str = "new";
    /// Closed trials flag.
    pub const CLOSED: &str = "closed";
    /// Disease id.
    pub const DIAGNOSIS: &str = "diagnosis";
}

/// Warning recorded when a link has no `format` parameter.
pub const MISSING_FORMAT_WARNING: &str = "CTLink: Required format is missing";

/// A search definition built from CT-Link query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtLinkSearchDef {
    /// Raw legacy id as it appeared on the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// What `id` refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type: Option<IdType>,
    /// Canonical form of `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdr_id: Option<CdrId>,
    /// Output format code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Decoded trial type label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_type: Option<String>,
    /// Decoded phase label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Clinical center flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_clinical_center: Option<String>,
    /// Accepted and stored, never used as a filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_country: Option<String>,
    /// New trials flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_trials: Option<String>,
    /// Obsolete closed-trials flag, kept so such links can be found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<String>,
    /// Canonical disease id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<CdrId>,
    /// Soft problems noticed during construction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CtLinkSearchDef {
    /// Decodes a definition from query parameters.
    ///
    /// Parameters with empty values are treated as absent. When a name
    /// repeats, the last value wins.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownIdType`] if `idtype` is present
    /// with a code other than `0..=5`.
    pub fn from_query_params<K, V>(
        params: impl IntoIterator<Item = (K, V)>,
    ) -> DefinitionResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params: HashMap<String, String> = params
            .into_iter()
            .filter(|(_, v)| !v.as_ref().trim().is_empty())
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().trim().to_string()))
            .collect();
        let get = |name: &str| params.get(name).cloned();

        let mut def = Self::default();

        match (get(params::ID), get(params::ID_TYPE)) {
            (Some(id), Some(code)) => {
                if code != IdType::NONE_CODE {
                    let id_type = IdType::from_code(&code)
                        .ok_or(DefinitionError::UnknownIdType { code })?;
                    def.cdr_id = Some(CdrId::normalize(&id));
                    def.id_type = Some(id_type);
                    def.id = Some(id);
                }
            }
            (Some(_), None) => def.warn("CTLink: id without idtype is ignored"),
            (None, Some(code)) => {
                if code != IdType::NONE_CODE && IdType::from_code(&code).is_none() {
                    return Err(DefinitionError::UnknownIdType { code });
                }
                def.warn("CTLink: idtype without id is ignored");
            }
            (None, None) => {}
        }

        match get(params::FORMAT) {
            Some(format) => def.format = Some(format),
            None => def.warn(MISSING_FORMAT_WARNING),
        }

        def.trial_type = get(params::TRIAL_TYPE)
            .map(|code| CgovTrialType::label_for_code(&code).to_string());
        def.phase = get(params::PHASE).map(|code| CgovPhase::label_for_code(&code).to_string());
        def.location_clinical_center = get(params::CLINICAL_CENTER);
        def.location_country = get(params::COUNTRY);
        def.new_trials = get(params::NEW_TRIALS);
        def.closed = get(params::CLOSED);
        def.diagnosis = get(params::DIAGNOSIS).map(|d| CdrId::normalize(&d));

        Ok(def)
    }

    fn warn(&mut self, message: &str) {
        warn!(id = ?self.id, "{}", message);
        self.warnings.push(message.to_string());
    }

    fn has_id_type(&self, id_type: IdType) -> bool {
        self.id_type == Some(id_type) && self.cdr_id.is_some()
    }
}

impl SearchDefinition for CtLinkSearchDef {
    fn raw_diseases(&self) -> Vec<String> {
        self.diagnosis.iter().map(|d| d.as_str().to_string()).collect()
    }

    fn raw_interventions(&self) -> Vec<String> {
        match (&self.cdr_id, self.id_type) {
            (Some(id), Some(id_type)) if id_type.is_intervention_like() => {
                vec![id.as_str().to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn raw_phases(&self) -> Vec<String> {
        present(&self.phase).map(str::to_string).into_iter().collect()
    }

    fn raw_trial_types(&self) -> Vec<String> {
        present(&self.trial_type).map(str::to_string).into_iter().collect()
    }

    fn has_dimension(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Diagnosis => self.diagnosis.is_some(),
            Dimension::TrialType => filters_trial_type(&self.raw_trial_types()),
            Dimension::ClinicalCenter => present(&self.location_clinical_center).is_some(),
            Dimension::NewTrials => present(&self.new_trials).is_some(),
            Dimension::InterventionType => self.has_id_type(IdType::Intervention),
            Dimension::DrugType => self.has_id_type(IdType::Drug),
            Dimension::Phase => present(&self.phase).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ctsearch_loader::CodeMap;

    use crate::context::TranslationContext;
    use crate::pattern::SearchPattern;

    fn make_context() -> TranslationContext {
        let (codes, _) = CodeMap::from_pairs([
            ("CDR0000000123", "C1647"),
            ("CDR0000000456", "C3868"),
            ("CDR0000000789", "C2000"),
        ]);
        TranslationContext::new(Arc::new(codes))
    }

    fn make_def(params: &[(&str, &str)]) -> CtLinkSearchDef {
        CtLinkSearchDef::from_query_params(params.iter().copied()).unwrap()
    }

    #[test]
    fn test_intervention_with_diagnosis() {
        let ctx = make_context();
        let def = make_def(&[
            ("id", "123"),
            ("idtype", "5"),
            ("format", "1"),
            ("diagnosis", "456"),
        ]);

        assert_eq!(def.id_type, Some(IdType::Intervention));
        assert_eq!(def.cdr_id.as_ref().map(CdrId::as_str), Some("CDR0000000123"));
        assert_eq!(def.diagnosis.as_ref().map(CdrId::as_str), Some("CDR0000000456"));
        assert!(def.warnings.is_empty());

        assert!(!def.has_missing_mapping(&ctx));
        assert!(!def.needs_manual_creation(&ctx));
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(17));
    }

    #[test]
    fn test_unknown_id_type_is_an_error() {
        let result = CtLinkSearchDef::from_query_params([("idtype", "99"), ("id", "1")]);
        assert!(matches!(
            result,
            Err(DefinitionError::UnknownIdType { ref code }) if code == "99"
        ));
    }

    #[test]
    fn test_unknown_id_type_without_id_is_an_error() {
        let result = CtLinkSearchDef::from_query_params([("idtype", "7"), ("format", "1")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_id_type_zero_means_no_id_filter() {
        let def = make_def(&[("id", "123"), ("idtype", "0"), ("format", "1")]);
        assert_eq!(def.id_type, None);
        assert_eq!(def.cdr_id, None);
        assert!(def.raw_interventions().is_empty());
    }

    #[test]
    fn test_missing_format_is_a_warning() {
        let def = make_def(&[("diagnosis", "456")]);
        assert_eq!(def.format, None);
        assert_eq!(def.warnings, vec![MISSING_FORMAT_WARNING]);
    }

    #[test]
    fn test_drug_sets_drug_bit() {
        let ctx = make_context();
        let def = make_def(&[("id", "789"), ("idtype", "1"), ("format", "2")]);
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(32));
    }

    #[test]
    fn test_institution_id_is_not_an_intervention() {
        let ctx = make_context();
        let def = make_def(&[("id", "999"), ("idtype", "2"), ("format", "2")]);
        assert_eq!(def.id_type, Some(IdType::Institution));
        assert!(def.raw_interventions().is_empty());
        assert!(!def.has_missing_mapping(&ctx));
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(0));
    }

    #[test]
    fn test_trial_type_decoding() {
        let def = make_def(&[("tt", "1"), ("format", "1")]);
        assert_eq!(def.trial_type.as_deref(), Some("Treatment"));

        let unknown = make_def(&[("tt", "42"), ("format", "1")]);
        assert_eq!(unknown.trial_type.as_deref(), Some("UNK"));
    }

    #[test]
    fn test_unknown_trial_type_is_a_missing_mapping() {
        let ctx = make_context();
        let def = make_def(&[("tt", "42"), ("format", "1")]);
        assert_eq!(def.search_pattern(&ctx), SearchPattern::MissingMapping);
    }

    #[test]
    fn test_all_trial_types_sets_no_bit() {
        let ctx = make_context();
        let def = make_def(&[("tt", "0"), ("format", "1")]);
        assert_eq!(def.trial_type.as_deref(), Some("All"));
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(0));
    }

    #[test]
    fn test_treatment_trial_type() {
        let ctx = make_context();
        let def = make_def(&[("tt", "1"), ("format", "1")]);
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(2));
    }

    #[test]
    fn test_phase_decoding() {
        let ctx = make_context();
        let def = make_def(&[("phase", "3"), ("format", "1")]);
        assert_eq!(def.phase.as_deref(), Some("Phase IV"));
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(64));

        let multi = make_def(&[("phase", "1"), ("format", "1")]);
        assert_eq!(multi.phase.as_deref(), Some("Phase II"));
        assert_eq!(multi.search_pattern(&ctx), SearchPattern::Manual);
    }

    #[test]
    fn test_flags() {
        let ctx = make_context();
        let def = make_def(&[("ncc", "1"), ("new", "1"), ("cn", "US"), ("format", "1")]);
        assert_eq!(def.location_country.as_deref(), Some("US"));
        assert_eq!(def.search_pattern(&ctx), SearchPattern::Mask(4 | 8));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let def = make_def(&[("diagnosis", ""), ("format", "1")]);
        assert_eq!(def.diagnosis, None);
    }

    #[test]
    fn test_serde_round_trip() {
        let ctx = make_context();
        let def = make_def(&[
            ("id", "123"),
            ("idtype", "5"),
            ("diagnosis", "456"),
            ("tt", "1"),
            ("closed", "1"),
        ]);
        let json = serde_json::to_string(&def).unwrap();
        let restored: CtLinkSearchDef = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, def);
        assert_eq!(restored.search_pattern(&ctx), def.search_pattern(&ctx));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_params() -> impl Strategy<Value = Vec<(&'static str, String)>> {
            (
                proptest::option::of(prop_oneof!["123", "789", "999"]),
                proptest::option::of(prop_oneof!["0", "1", "2", "5"]),
                proptest::option::of(prop_oneof!["0", "1", "3", "5", "42"]),
                proptest::option::of(prop_oneof!["0", "1", "3", "9"]),
                proptest::option::of(prop_oneof!["456", "998"]),
                any::<bool>(),
                any::<bool>(),
            )
                .prop_map(|(id, idtype, tt, phase, diagnosis, ncc, new)| {
                    let mut params = vec![("format", "1".to_string())];
                    if let (Some(id), Some(idtype)) = (id, idtype) {
                        params.push(("id", id.to_string()));
                        params.push(("idtype", idtype.to_string()));
                    }
                    if let Some(tt) = tt {
                        params.push(("tt", tt.to_string()));
                    }
                    if let Some(phase) = phase {
                        params.push(("phase", phase.to_string()));
                    }
                    if let Some(diagnosis) = diagnosis {
                        params.push(("diagnosis", diagnosis.to_string()));
                    }
                    if ncc {
                        params.push(("ncc", "1".to_string()));
                    }
                    if new {
                        params.push(("new", "1".to_string()));
                    }
                    params
                })
        }

        proptest! {
            #[test]
            fn test_pattern_precedence(params in arb_params()) {
                let ctx = make_context();
                let def = CtLinkSearchDef::from_query_params(params).unwrap();
                let pattern = def.search_pattern(&ctx);

                if def.has_missing_mapping(&ctx) {
                    prop_assert_eq!(pattern, SearchPattern::MissingMapping);
                } else if def.needs_manual_creation(&ctx) {
                    prop_assert_eq!(pattern, SearchPattern::Manual);
                } else {
                    prop_assert!(matches!(pattern, SearchPattern::Mask(m) if m < 128));
                }
            }

            #[test]
            fn test_all_never_leaks_into_api_params(params in arb_params()) {
                let ctx = make_context();
                let def = CtLinkSearchDef::from_query_params(params).unwrap();
                if let Ok(types) = def.translated_trial_types(&ctx) {
                    prop_assert!(!types.iter().any(|t| t.eq_ignore_ascii_case("all")));
                }
                let params = def.synthesize_api_parameters(&ctx);
                prop_assert_eq!(params.errors.len(), def.translation_errors(&ctx).len());
            }
        }
    }
}
