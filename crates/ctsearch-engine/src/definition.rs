//! The search definition capability.
//!
//! A search definition is anything that can report its filters in legacy
//! vocabulary through four raw-data hooks. Translation to the API
//! vocabulary, the manual-creation and missing-mapping verdicts, the pattern
//! fingerprint and parameter synthesis are implemented once here, as
//! provided methods, and shared by every variant.
//!
//! None of the provided methods perform I/O or touch shared mutable state,
//! so definitions can be classified from any number of threads against one
//! [`TranslationContext`].

use std::fmt;

use ctsearch_types::vocabulary::{
    self, PARAM_DISEASES, PARAM_INTERVENTIONS, PARAM_PHASES, PARAM_TRIAL_TYPES,
};
use ctsearch_types::{CdrId, ConceptCode};

use crate::context::TranslationContext;
use crate::error::TranslationError;
use crate::pattern::{ApiParamValue, ApiParameters, Classification, Dimension, SearchPattern};

/// A filter category that is translated to the API vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Disease ids.
    Diseases,
    /// Intervention and drug ids.
    Interventions,
    /// Trial type labels.
    TrialTypes,
    /// Phase labels.
    Phases,
}

impl Facet {
    /// Returns a short name for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Diseases => "diseases",
            Self::Interventions => "interventions",
            Self::TrialTypes => "trial types",
            Self::Phases => "phases",
        }
    }
}

/// Why a definition cannot become a single API query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualReason {
    /// A raw multi-value field holds more than one value.
    MultiValuedField(&'static str),
    /// A facet translated to more than one distinct API term.
    MultipleApiTerms(Facet),
    /// Free-text keyword search has no API equivalent.
    KeywordSearch,
}

impl fmt::Display for ManualReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultiValuedField(field) => write!(f, "multiple values in {}", field),
            Self::MultipleApiTerms(facet) => {
                write!(f, "more than one API term for {}", facet.label())
            }
            Self::KeywordSearch => f.write_str("keyword search"),
        }
    }
}

/// A legacy search definition.
///
/// Implementors supply the raw-data hooks; everything else is provided.
pub trait SearchDefinition {
    /// Legacy disease ids, in order. Empty if unset.
    fn raw_diseases(&self) -> Vec<String>;

    /// Legacy intervention and drug ids, in order. Empty if unset.
    fn raw_interventions(&self) -> Vec<String>;

    /// Legacy phase labels, in order. Empty if unset.
    fn raw_phases(&self) -> Vec<String>;

    /// Legacy trial type labels, in order. Empty if unset.
    fn raw_trial_types(&self) -> Vec<String>;

    /// Returns true if the definition filters on the given dimension.
    fn has_dimension(&self, dimension: Dimension) -> bool;

    /// Free-text keyword filter, if any.
    fn keyword(&self) -> Option<&str> {
        None
    }

    /// Names of raw fields that hold more than one value.
    ///
    /// The default checks the four raw hooks; variants that store several
    /// fields behind one hook override this to report each field.
    fn multi_valued_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.raw_diseases().len() > 1 {
            fields.push("diseases");
        }
        if self.raw_interventions().len() > 1 {
            fields.push("interventions");
        }
        if self.raw_trial_types().len() > 1 {
            fields.push("trial_type");
        }
        if self.raw_phases().len() > 1 {
            fields.push("phase");
        }
        fields
    }

    /// Translates the disease ids to concept codes.
    ///
    /// Fails on the first id that has no concept code.
    fn translated_diseases(
        &self,
        ctx: &TranslationContext,
    ) -> Result<Vec<ConceptCode>, TranslationError> {
        translate_ids(ctx, self.raw_diseases(), |id| {
            TranslationError::UnmappableDisease { id }
        })
    }

    /// Translates the intervention and drug ids to concept codes.
    fn translated_interventions(
        &self,
        ctx: &TranslationContext,
    ) -> Result<Vec<ConceptCode>, TranslationError> {
        translate_ids(ctx, self.raw_interventions(), |id| {
            TranslationError::UnmappableIntervention { id }
        })
    }

    /// Expands the phase labels to API phase buckets, deduplicated in
    /// first-seen order.
    fn translated_phases(&self, ctx: &TranslationContext) -> Result<Vec<String>, TranslationError> {
        let mut buckets = Vec::new();
        for label in self.raw_phases() {
            let Some(mapped) = ctx.vocabulary().phases(&label) else {
                return Err(TranslationError::UnmappablePhase { label });
            };
            for bucket in mapped {
                push_unique(&mut buckets, bucket.to_string());
            }
        }
        Ok(buckets)
    }

    /// Translates the trial type labels to API codes.
    ///
    /// `"all"` contributes nothing and is never an error.
    fn translated_trial_types(
        &self,
        ctx: &TranslationContext,
    ) -> Result<Vec<String>, TranslationError> {
        let mut codes = Vec::new();
        for label in self.raw_trial_types() {
            if vocabulary::is_all_trial_types(&label) {
                continue;
            }
            match ctx.vocabulary().trial_type(&label) {
                Some(code) => push_unique(&mut codes, code.to_string()),
                None => return Err(TranslationError::UnmappableTrialType { label }),
            }
        }
        Ok(codes)
    }

    /// Attempts all four translations and returns every failure.
    fn translation_errors(&self, ctx: &TranslationContext) -> Vec<TranslationError> {
        [
            self.translated_diseases(ctx).err(),
            self.translated_interventions(ctx).err(),
            self.translated_trial_types(ctx).err(),
            self.translated_phases(ctx).err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Returns true if any legacy value has no API translation.
    fn has_missing_mapping(&self, ctx: &TranslationContext) -> bool {
        !self.translation_errors(ctx).is_empty()
    }

    /// Returns every reason the definition needs manual creation.
    ///
    /// Facets that fail to translate are reported by
    /// [`has_missing_mapping`](Self::has_missing_mapping) and do not count
    /// toward the multiple-terms rule here.
    fn manual_reasons(&self, ctx: &TranslationContext) -> Vec<ManualReason> {
        let mut reasons: Vec<ManualReason> = self
            .multi_valued_fields()
            .into_iter()
            .map(ManualReason::MultiValuedField)
            .collect();

        let translated = [
            (Facet::Diseases, self.translated_diseases(ctx).map(|v| v.len())),
            (Facet::Interventions, self.translated_interventions(ctx).map(|v| v.len())),
            (Facet::TrialTypes, self.translated_trial_types(ctx).map(|v| v.len())),
            (Facet::Phases, self.translated_phases(ctx).map(|v| v.len())),
        ];
        for (facet, count) in translated {
            if matches!(count, Ok(n) if n > 1) {
                reasons.push(ManualReason::MultipleApiTerms(facet));
            }
        }

        if self.keyword().is_some_and(|k| !k.trim().is_empty()) {
            reasons.push(ManualReason::KeywordSearch);
        }

        reasons
    }

    /// Returns true if the definition cannot become a single API query.
    fn needs_manual_creation(&self, ctx: &TranslationContext) -> bool {
        !self.manual_reasons(ctx).is_empty()
    }

    /// Computes the pattern fingerprint.
    ///
    /// Missing mappings take precedence over manual creation, which takes
    /// precedence over the dimension mask.
    fn search_pattern(&self, ctx: &TranslationContext) -> SearchPattern {
        if self.has_missing_mapping(ctx) {
            SearchPattern::MissingMapping
        } else if self.needs_manual_creation(ctx) {
            SearchPattern::Manual
        } else {
            SearchPattern::from_dimensions(
                Dimension::ALL
                    .into_iter()
                    .filter(|d| self.has_dimension(*d)),
            )
        }
    }

    /// Builds the API parameter set.
    ///
    /// Each facet is attempted independently; a failing facet adds an
    /// error message and no parameter, the others still contribute.
    fn synthesize_api_parameters(&self, ctx: &TranslationContext) -> ApiParameters {
        let mut params = ApiParameters::default();

        let attempts = [
            (PARAM_DISEASES, self.translated_diseases(ctx)),
            (PARAM_INTERVENTIONS, self.translated_interventions(ctx)),
            (PARAM_TRIAL_TYPES, self.translated_trial_types(ctx)),
            (PARAM_PHASES, self.translated_phases(ctx)),
        ];

        for (name, attempt) in attempts {
            match attempt {
                Ok(values) => {
                    if let Some(value) = ApiParamValue::from_values(values) {
                        params.parameters.insert(name.to_string(), value);
                    }
                }
                Err(e) => params.errors.push(e.to_string()),
            }
        }

        params
    }

    /// Computes every classification output at once.
    fn classify(&self, ctx: &TranslationContext) -> Classification {
        let search_pattern = self.search_pattern(ctx);
        let manual_reasons = if search_pattern == SearchPattern::Manual {
            self.manual_reasons(ctx)
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            Vec::new()
        };

        Classification {
            search_pattern,
            manual_reasons,
            api_params: self.synthesize_api_parameters(ctx),
        }
    }
}

/// Canonicalizes and translates legacy ids, failing on the first unmapped one.
fn translate_ids(
    ctx: &TranslationContext,
    ids: Vec<String>,
    unmapped: impl Fn(String) -> TranslationError,
) -> Result<Vec<ConceptCode>, TranslationError> {
    let mut codes = Vec::new();
    for raw in ids {
        let id = CdrId::normalize(&raw);
        let mapped = ctx.codes().concept_codes_for_cdr_id(&id);
        if mapped.is_empty() {
            return Err(unmapped(id.into_inner()));
        }
        for code in mapped {
            push_unique(&mut codes, code.clone());
        }
    }
    Ok(codes)
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Splits a comma-joined legacy field into trimmed, non-empty values.
pub(crate) fn split_multi(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the value if it is present and not blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Returns true if the trial type labels filter on anything besides "all".
pub(crate) fn filters_trial_type(labels: &[String]) -> bool {
    labels.iter().any(|label| !vocabulary::is_all_trial_types(label))
}
