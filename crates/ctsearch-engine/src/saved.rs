//! Search definitions restored from saved-search records.
//!
//! The legacy site stored advanced searches as database rows keyed by a
//! numeric `protocolsearchid`. Multi-value fields are comma-joined strings
//! at rest; they are kept that way here and split on demand so the
//! persisted form round-trips byte for byte.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::definition::{filters_trial_type, present, split_multi, SearchDefinition};
use crate::error::{DefinitionError, DefinitionResult, LookupError};
use crate::pattern::Dimension;

/// A raw saved-search row as returned by the lookup collaborator.
pub type SavedSearchRecord = serde_json::Map<String, Value>;

/// Resolves saved-search identifiers to raw records.
///
/// `Ok(None)` means the identifier is unknown. Connection handling,
/// timeouts and retries belong to the implementor.
pub trait SavedSearchSource: Send + Sync {
    /// Fetches one saved-search row.
    fn fetch_saved_search_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<SavedSearchRecord>, LookupError>> + Send;
}

/// A search definition restored from a saved-search record.
///
/// Every field is optional and stored verbatim as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct SavedSearchDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    /// Comma-joined disease ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancer_type: Option<String>,
    /// Comma-joined disease stage ids; take precedence over `cancer_type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancer_type_stage: Option<String>,
    /// Comma-joined trial type labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_protocol_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_zip_proximity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_state: Option<String>,
    /// Accepted and stored, never used as a filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_clinical_center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_trials: Option<String>,
    /// Comma-joined intervention ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drugs: Option<String>,
    /// Comma-joined phase labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_sponsor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_category: Option<String>,
    #[serde(rename = "_abstract_version", skip_serializing_if = "Option::is_none")]
    pub abstract_version: Option<String>,
    #[serde(rename = "_search_type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
    #[serde(rename = "_param_display", skip_serializing_if = "Option::is_none")]
    pub param_display: Option<String>,
    #[serde(rename = "_cancer_type_name", skip_serializing_if = "Option::is_none")]
    pub cancer_type_name: Option<String>,
    #[serde(rename = "_show_detail_report", skip_serializing_if = "Option::is_none")]
    pub show_detail_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_search_formula: Option<String>,
    #[serde(rename = "_state_full_name", skip_serializing_if = "Option::is_none")]
    pub state_full_name: Option<String>,
    /// Comma-joined drug ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_org_id: Option<String>,
    /// Free-text keyword filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(rename = "_treatment_type_name", skip_serializing_if = "Option::is_none")]
    pub treatment_type_name: Option<String>,
}

impl SavedSearchDef {
    /// Record field names copied onto a definition, in storage order.
    pub const FIELDS: [&'static str; 34] = [
        "search_id",
        "cancer_type",
        "cancer_type_stage",
        "trial_type",
        "trial_status",
        "alternate_protocol_id",
        "location_zip",
        "location_zip_proximity",
        "location_city",
        "location_state",
        "location_country",
        "location_institution",
        "investigator",
        "lead_org",
        "location_clinical_center",
        "new_trials",
        "treatment_types",
        "drugs",
        "phase",
        "trial_sponsor",
        "special_category",
        "_abstract_version",
        "_search_type",
        "_param_display",
        "_cancer_type_name",
        "_show_detail_report",
        "drug_search_formula",
        "_state_full_name",
        "drug_id",
        "institution_id",
        "investigator_id",
        "lead_org_id",
        "keyword",
        "_treatment_type_name",
    ];

    /// Builds a definition from a raw record.
    ///
    /// Recognized fields are copied verbatim; numbers and booleans are
    /// kept as their text form, nulls as absent. Unrecognized fields are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidRecord`] if a recognized field holds
    /// an array or object.
    pub fn from_record(record: &SavedSearchRecord) -> DefinitionResult<Self> {
        let mut known = SavedSearchRecord::new();
        for name in Self::FIELDS {
            let value = match record.get(name) {
                None | Some(Value::Null) => continue,
                Some(Value::Number(n)) => Value::String(n.to_string()),
                Some(Value::Bool(b)) => Value::String(b.to_string()),
                Some(other) => other.clone(),
            };
            known.insert(name.to_string(), value);
        }
        Ok(serde_json::from_value(Value::Object(known))?)
    }

    /// Looks up a saved search and builds its definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Lookup`] if the source fails and
    /// [`DefinitionError::SavedSearchNotFound`] if it has no such record.
    pub async fn from_search_id<S: SavedSearchSource>(
        source: &S,
        id: i64,
    ) -> DefinitionResult<Self> {
        let record = source
            .fetch_saved_search_by_id(id)
            .await
            .map_err(|source| DefinitionError::Lookup { id, source })?
            .ok_or(DefinitionError::SavedSearchNotFound { id })?;
        debug!(id, fields = record.len(), "Fetched saved search");
        Self::from_record(&record)
    }

    /// Returns the stored value of a field by its record name.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        let value = match name {
            "search_id" => &self.search_id,
            "cancer_type" => &self.cancer_type,
            "cancer_type_stage" => &self.cancer_type_stage,
            "trial_type" => &self.trial_type,
            "trial_status" => &self.trial_status,
            "alternate_protocol_id" => &self.alternate_protocol_id,
            "location_zip" => &self.location_zip,
            "location_zip_proximity" => &self.location_zip_proximity,
            "location_city" => &self.location_city,
            "location_state" => &self.location_state,
            "location_country" => &self.location_country,
            "location_institution" => &self.location_institution,
            "investigator" => &self.investigator,
            "lead_org" => &self.lead_org,
            "location_clinical_center" => &self.location_clinical_center,
            "new_trials" => &self.new_trials,
            "treatment_types" => &self.treatment_types,
            "drugs" => &self.drugs,
            "phase" => &self.phase,
            "trial_sponsor" => &self.trial_sponsor,
            "special_category" => &self.special_category,
            "_abstract_version" => &self.abstract_version,
            "_search_type" => &self.search_type,
            "_param_display" => &self.param_display,
            "_cancer_type_name" => &self.cancer_type_name,
            "_show_detail_report" => &self.show_detail_report,
            "drug_search_formula" => &self.drug_search_formula,
            "_state_full_name" => &self.state_full_name,
            "drug_id" => &self.drug_id,
            "institution_id" => &self.institution_id,
            "investigator_id" => &self.investigator_id,
            "lead_org_id" => &self.lead_org_id,
            "keyword" => &self.keyword,
            "_treatment_type_name" => &self.treatment_type_name,
            _ => return None,
        };
        value.as_deref()
    }

    /// Names of fields holding a non-blank value.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        Self::FIELDS
            .into_iter()
            .filter(|name| self.field_value(name).is_some_and(|v| !v.trim().is_empty()))
            .collect()
    }
}

impl SearchDefinition for SavedSearchDef {
    fn raw_diseases(&self) -> Vec<String> {
        match present(&self.cancer_type_stage) {
            Some(stage) => split_multi(Some(stage)),
            None => split_multi(present(&self.cancer_type)),
        }
    }

    fn raw_interventions(&self) -> Vec<String> {
        let mut ids = split_multi(present(&self.drug_id));
        ids.extend(split_multi(present(&self.treatment_types)));
        ids
    }

    fn raw_phases(&self) -> Vec<String> {
        split_multi(present(&self.phase))
    }

    fn raw_trial_types(&self) -> Vec<String> {
        split_multi(present(&self.trial_type))
    }

    fn has_dimension(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Diagnosis => {
                present(&self.cancer_type).is_some() || present(&self.cancer_type_stage).is_some()
            }
            Dimension::TrialType => filters_trial_type(&self.raw_trial_types()),
            Dimension::ClinicalCenter => present(&self.location_clinical_center).is_some(),
            Dimension::NewTrials => present(&self.new_trials).is_some(),
            Dimension::InterventionType => present(&self.treatment_types).is_some(),
            Dimension::DrugType => present(&self.drug_id).is_some(),
            Dimension::Phase => present(&self.phase).is_some(),
        }
    }

    fn keyword(&self) -> Option<&str> {
        present(&self.keyword)
    }

    fn multi_valued_fields(&self) -> Vec<&'static str> {
        let multi = [
            ("cancer_type", &self.cancer_type),
            ("cancer_type_stage", &self.cancer_type_stage),
            ("trial_type", &self.trial_type),
            ("phase", &self.phase),
            ("drug_id", &self.drug_id),
            ("treatment_types", &self.treatment_types),
        ];
        multi
            .into_iter()
            .filter(|(_, value)| split_multi(value.as_deref()).len() > 1)
            .map(|(name, _)| name)
            .collect()
    }
}
