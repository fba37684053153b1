//! Coded values carried by legacy clinical-trial search links.
//!
//! CT-Link URLs encode their filters as small decimal integers. This module
//! decodes those codes into the labels the legacy site used.

use std::fmt;

/// What a CT-Link `id` parameter refers to, decoded from `idtype`.
///
/// # Examples
///
/// ```
/// use ctsearch_types::IdType;
///
/// assert_eq!(IdType::from_code("5"), Some(IdType::Intervention));
/// assert_eq!(IdType::from_code("99"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdType {
    /// A drug record.
    Drug,
    /// A participating institution.
    Institution,
    /// A lead organization.
    LeadOrganization,
    /// An investigator.
    Investigator,
    /// An intervention record.
    Intervention,
}

impl IdType {
    /// Code meaning "no id filter" on legacy links.
    pub const NONE_CODE: &'static str = "0";

    /// Decodes an `idtype` parameter value.
    ///
    /// Returns `None` for anything outside `1..=5`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Drug),
            "2" => Some(Self::Institution),
            "3" => Some(Self::LeadOrganization),
            "4" => Some(Self::Investigator),
            "5" => Some(Self::Intervention),
            _ => None,
        }
    }

    /// Returns the `idtype` code for this value.
    pub fn code(self) -> &'static str {
        match self {
            Self::Drug => "1",
            Self::Institution => "2",
            Self::LeadOrganization => "3",
            Self::Investigator => "4",
            Self::Intervention => "5",
        }
    }

    /// Returns the legacy label for this id type.
    pub fn label(self) -> &'static str {
        match self {
            Self::Drug => "Drug",
            Self::Institution => "Institution",
            Self::LeadOrganization => "LeadOrganization",
            Self::Investigator => "Investigator",
            Self::Intervention => "Intervention",
        }
    }

    /// Returns true if the referenced id names an intervention concept
    /// (drug or intervention) and can be translated to an API code.
    pub fn is_intervention_like(self) -> bool {
        matches!(self, Self::Drug | Self::Intervention)
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trial types offered by the legacy search form, decoded from `tt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CgovTrialType {
    /// No trial type filter.
    All,
    /// Treatment trials.
    Treatment,
    /// Supportive care trials.
    SupportiveCare,
    /// Screening trials.
    Screening,
    /// Prevention trials.
    Prevention,
    /// Genetics trials.
    Genetics,
    /// Diagnostic trials.
    Diagnostic,
    /// Biomarker or laboratory analysis trials.
    BiomarkerLaboratoryAnalysis,
    /// Tissue collection or repository trials.
    TissueCollectionRepository,
    /// Educational, counseling or training trials.
    EducationalCounselingTraining,
    /// Behavioral studies.
    BehavioralStudy,
    /// Natural history or epidemiology studies.
    NaturalHistoryEpidemiology,
    /// Health services research.
    HealthServicesResearch,
}

impl CgovTrialType {
    /// Label used when a `tt` code is not recognized.
    pub const UNKNOWN_LABEL: &'static str = "UNK";

    /// Every trial type in `tt` code order.
    pub const ALL: [Self; 13] = [
        Self::All,
        Self::Treatment,
        Self::SupportiveCare,
        Self::Screening,
        Self::Prevention,
        Self::Genetics,
        Self::Diagnostic,
        Self::BiomarkerLaboratoryAnalysis,
        Self::TissueCollectionRepository,
        Self::EducationalCounselingTraining,
        Self::BehavioralStudy,
        Self::NaturalHistoryEpidemiology,
        Self::HealthServicesResearch,
    ];

    /// Decodes a `tt` parameter value.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|tt| tt.code() == code)
    }

    /// Returns the `tt` code for this trial type.
    pub fn code(self) -> &'static str {
        match self {
            Self::All => "0",
            Self::Treatment => "1",
            Self::SupportiveCare => "2",
            Self::Screening => "3",
            Self::Prevention => "4",
            Self::Genetics => "5",
            Self::Diagnostic => "6",
            Self::BiomarkerLaboratoryAnalysis => "7",
            Self::TissueCollectionRepository => "8",
            Self::EducationalCounselingTraining => "60",
            Self::BehavioralStudy => "61",
            Self::NaturalHistoryEpidemiology => "62",
            Self::HealthServicesResearch => "81",
        }
    }

    /// Returns the label the legacy site displayed for this trial type.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Treatment => "Treatment",
            Self::SupportiveCare => "Supportive Care",
            Self::Screening => "Screening",
            Self::Prevention => "Prevention",
            Self::Genetics => "Genetics",
            Self::Diagnostic => "Diagnostic",
            Self::BiomarkerLaboratoryAnalysis => "Biomarker/Laboratory analysis",
            Self::TissueCollectionRepository => "Tissue collection/Repository",
            Self::EducationalCounselingTraining => "Educational/Counseling/Training",
            Self::BehavioralStudy => "Behavioral study",
            Self::NaturalHistoryEpidemiology => "Natural history/Epidemiology",
            Self::HealthServicesResearch => "Health services research",
        }
    }

    /// Decodes a `tt` code straight to its label, `"UNK"` when unrecognized.
    pub fn label_for_code(code: &str) -> &'static str {
        Self::from_code(code).map_or(Self::UNKNOWN_LABEL, Self::label)
    }
}

/// Trial phases offered by the legacy search form, decoded from `phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CgovPhase {
    /// Phase I.
    PhaseI,
    /// Phase II.
    PhaseII,
    /// Phase III.
    PhaseIII,
    /// Phase IV.
    PhaseIV,
}

impl CgovPhase {
    /// Label used when a `phase` code is not recognized.
    pub const UNKNOWN_LABEL: &'static str = "UNK";

    /// Decodes a `phase` parameter value (`0..=3`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::PhaseI),
            "1" => Some(Self::PhaseII),
            "2" => Some(Self::PhaseIII),
            "3" => Some(Self::PhaseIV),
            _ => None,
        }
    }

    /// Returns the label the legacy site displayed for this phase.
    pub fn label(self) -> &'static str {
        match self {
            Self::PhaseI => "Phase I",
            Self::PhaseII => "Phase II",
            Self::PhaseIII => "Phase III",
            Self::PhaseIV => "Phase IV",
        }
    }

    /// Decodes a `phase` code straight to its label, `"UNK"` when unrecognized.
    pub fn label_for_code(code: &str) -> &'static str {
        Self::from_code(code).map_or(Self::UNKNOWN_LABEL, Self::label)
    }
}

impl fmt::Display for CgovPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
