//! Pattern and field-usage counts over a link collection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::TranslationContext;
use crate::ctlink::CtLinkSearchDef;
use crate::definition::SearchDefinition;
use crate::link::SearchDef;
use crate::link_db::LinkRecord;
use crate::saved::SavedSearchDef;

/// CT-Link fields whose usage is counted.
pub const CTLINK_FIELDS: [&str; 8] = [
    "trial_type",
    "diagnosis",
    "cdr_id",
    "phase",
    "location_clinical_center",
    "location_country",
    "new_trials",
    "closed",
];

/// Counts gathered over many links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Number of links seen.
    pub total: usize,
    /// Links per `search_url_type`.
    pub url_types: BTreeMap<String, usize>,
    /// Links per pretty pattern label, e.g. `Diag_Intr`.
    pub patterns: BTreeMap<String, usize>,
    /// CT-Links per decoded id type.
    pub id_types: BTreeMap<String, usize>,
    /// CT-Links with each field set.
    pub ctlink_fields: BTreeMap<String, usize>,
    /// Saved searches with each field set.
    pub saved_search_fields: BTreeMap<String, usize>,
}

impl LinkStats {
    /// Creates empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every record.
    ///
    /// Stored classifications are used when present; otherwise the pattern
    /// is computed against `ctx`.
    pub fn collect<'a>(
        records: impl IntoIterator<Item = &'a LinkRecord>,
        ctx: &TranslationContext,
    ) -> Self {
        let mut stats = Self::new();
        for record in records {
            stats.add(record, ctx);
        }
        stats
    }

    /// Counts one record.
    pub fn add(&mut self, record: &LinkRecord, ctx: &TranslationContext) {
        self.total += 1;
        bump(&mut self.url_types, record.url_type().as_str());

        let pattern = match &record.classification {
            Some(classification) => classification.search_pattern,
            None => record.search.as_definition().search_pattern(ctx),
        };
        bump(&mut self.patterns, &pattern.label());

        match &record.search {
            SearchDef::CtLink(def) => self.add_ctlink(def),
            SearchDef::SavedSearch(def) => self.add_saved_search(def),
        }
    }

    fn add_ctlink(&mut self, def: &CtLinkSearchDef) {
        if let Some(id_type) = def.id_type {
            bump(&mut self.id_types, id_type.label());
        }
        let set = [
            def.trial_type.is_some(),
            def.diagnosis.is_some(),
            def.cdr_id.is_some(),
            def.phase.is_some(),
            def.location_clinical_center.is_some(),
            def.location_country.is_some(),
            def.new_trials.is_some(),
            def.closed.is_some(),
        ];
        for (name, is_set) in CTLINK_FIELDS.into_iter().zip(set) {
            if is_set {
                bump(&mut self.ctlink_fields, name);
            }
        }
    }

    fn add_saved_search(&mut self, def: &SavedSearchDef) {
        for name in def.populated_fields() {
            bump(&mut self.saved_search_fields, name);
        }
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ctsearch_loader::CodeMap;
    use serde_json::json;

    fn make_context() -> TranslationContext {
        let (codes, _) =
            CodeMap::from_pairs([("CDR0000000456", "C3868"), ("CDR0000000123", "C1647")]);
        TranslationContext::new(Arc::new(codes))
    }

    fn make_records() -> Vec<LinkRecord> {
        let ctlink = CtLinkSearchDef::from_query_params([
            ("id", "123"),
            ("idtype", "5"),
            ("format", "1"),
            ("diagnosis", "456"),
        ])
        .unwrap();
        let bare = CtLinkSearchDef::from_query_params([("format", "1")]).unwrap();
        let record = json!({ "search_id": 3, "keyword": "lung" });
        let saved = SavedSearchDef::from_record(record.as_object().unwrap()).unwrap();

        vec![
            LinkRecord::new("/a", SearchDef::CtLink(ctlink)),
            LinkRecord::new("/b", SearchDef::CtLink(bare)),
            LinkRecord::new("/c", SearchDef::SavedSearch(saved)),
        ]
    }

    #[test]
    fn test_collect() {
        let ctx = make_context();
        let records = make_records();
        let stats = LinkStats::collect(&records, &ctx);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.url_types["CTLink"], 2);
        assert_eq!(stats.url_types["SavedSearch"], 1);
        assert_eq!(stats.patterns["Diag_Intr"], 1);
        assert_eq!(stats.patterns["NoFilters"], 1);
        assert_eq!(stats.patterns["MANUAL"], 1);
        assert_eq!(stats.id_types["Intervention"], 1);
        assert_eq!(stats.ctlink_fields["diagnosis"], 1);
        assert_eq!(stats.saved_search_fields["keyword"], 1);
        assert_eq!(stats.saved_search_fields["search_id"], 1);
    }

    #[test]
    fn test_stored_classification_is_used() {
        let ctx = make_context();
        let mut records = make_records();
        records[1].classify(&ctx);
        if let Some(classification) = records[1].classification.as_mut() {
            classification.search_pattern = crate::pattern::SearchPattern::MissingMapping;
        }
        let stats = LinkStats::collect(&records, &ctx);
        assert_eq!(stats.patterns["MISSINGMAPPING"], 1);
        assert!(!stats.patterns.contains_key("NoFilters"));
    }
}
