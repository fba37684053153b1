//! Reference dataset row type.

use crate::ConceptCode;

/// One (legacy id, concept code) pair from the reference dataset.
///
/// # Examples
///
/// ```
/// use ctsearch_types::CodeMapRow;
///
/// let row = CodeMapRow::new("CDR0000038323", "C4872");
/// assert!(row.is_complete());
///
/// let broken = CodeMapRow::new("CDR0000038323", " ");
/// assert!(!broken.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeMapRow {
    /// Legacy CDR identifier as written in the dataset.
    pub legacy_id: String,
    /// API concept code as written in the dataset.
    pub concept_code: ConceptCode,
}

impl CodeMapRow {
    /// Creates a row from its two columns.
    pub fn new(legacy_id: impl Into<String>, concept_code: impl Into<ConceptCode>) -> Self {
        Self {
            legacy_id: legacy_id.into(),
            concept_code: concept_code.into(),
        }
    }

    /// Returns true if both columns carry a value.
    pub fn is_complete(&self) -> bool {
        !self.legacy_id.trim().is_empty() && !self.concept_code.trim().is_empty()
    }
}
