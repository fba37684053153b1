//! The persisted link collection.
//!
//! Links are stored as a JSON array of records, each tagged with its
//! `search_url_type` so the right definition variant is rebuilt on load.
//! Record order is preserved; URLs are unique case-insensitively.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::TranslationContext;
use crate::definition::SearchDefinition;
use crate::error::{LinkDbError, LinkDbResult};
use crate::link::{SearchDef, SearchUrlType};
use crate::pattern::Classification;

/// One legacy link with its definition and, once computed, its
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The link as it was found.
    pub url: String,
    /// The decoded definition.
    #[serde(flatten)]
    pub search: SearchDef,
    /// Classification outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl LinkRecord {
    /// Creates an unclassified record.
    pub fn new(url: impl Into<String>, search: SearchDef) -> Self {
        Self {
            url: url.into(),
            search,
            classification: None,
        }
    }

    /// Returns the link kind.
    pub fn url_type(&self) -> SearchUrlType {
        self.search.url_type()
    }

    /// Computes and stores the classification.
    pub fn classify(&mut self, ctx: &TranslationContext) -> &Classification {
        self.classification
            .insert(self.search.as_definition().classify(ctx))
    }
}

/// An ordered collection of link records keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct LinkDb {
    records: Vec<LinkRecord>,
    index: HashMap<String, usize>,
}

impl LinkDb {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkDbError::DuplicateUrl`] if the URL is already
    /// present in any letter case, or [`LinkDbError::EmptyUrl`] if it is
    /// blank.
    pub fn insert(&mut self, record: LinkRecord) -> LinkDbResult<()> {
        let key = url_key(&record.url)?;
        if self.index.contains_key(&key) {
            return Err(LinkDbError::DuplicateUrl { url: record.url });
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Returns the record for a URL, ignoring letter case.
    pub fn get_link(&self, url: &str) -> LinkDbResult<Option<&LinkRecord>> {
        let key = url_key(url)?;
        Ok(self.index.get(&key).map(|&i| &self.records[i]))
    }

    /// Returns true if the URL is present.
    pub fn contains(&self, url: &str) -> bool {
        matches!(self.get_link(url), Ok(Some(_)))
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classifies every record against one translation context.
    #[cfg(feature = "parallel")]
    pub fn classify_all(&mut self, ctx: &TranslationContext) {
        use rayon::prelude::*;

        self.records.par_iter_mut().for_each(|record| {
            record.classify(ctx);
        });
        info!(links = self.records.len(), "Classified link collection");
    }

    /// Classifies every record against one translation context.
    #[cfg(not(feature = "parallel"))]
    pub fn classify_all(&mut self, ctx: &TranslationContext) {
        for record in &mut self.records {
            record.classify(ctx);
        }
        info!(links = self.records.len(), "Classified link collection");
    }

    /// Reads a collection from a JSON array.
    pub fn load_from_reader<R: Read>(reader: R) -> LinkDbResult<Self> {
        let records: Vec<LinkRecord> = serde_json::from_reader(reader)?;
        let mut db = Self::new();
        for record in records {
            db.insert(record)?;
        }
        Ok(db)
    }

    /// Reads a collection from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> LinkDbResult<Self> {
        let file = File::open(path.as_ref())?;
        let db = Self::load_from_reader(BufReader::new(file))?;
        info!(path = %path.as_ref().display(), links = db.len(), "Loaded link collection");
        Ok(db)
    }

    /// Writes the collection as a pretty-printed JSON array.
    pub fn save_to_writer<W: Write>(&self, writer: W) -> LinkDbResult<()> {
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }

    /// Writes the collection to a JSON file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> LinkDbResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.save_to_writer(&mut writer)?;
        writer.flush()?;
        info!(path = %path.as_ref().display(), links = self.len(), "Saved link collection");
        Ok(())
    }
}

impl<'a> IntoIterator for &'a LinkDb {
    type Item = &'a LinkRecord;
    type IntoIter = std::slice::Iter<'a, LinkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn url_key(url: &str) -> LinkDbResult<String> {
    let key = url.trim().to_lowercase();
    if key.is_empty() {
        return Err(LinkDbError::EmptyUrl);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ctsearch_loader::CodeMap;
    use serde_json::json;

    use crate::ctlink::CtLinkSearchDef;
    use crate::pattern::SearchPattern;
    use crate::saved::SavedSearchDef;

    fn make_context() -> TranslationContext {
        let (codes, _) =
            CodeMap::from_pairs([("CDR0000000456", "C3868"), ("CDR0000000123", "C1647")]);
        TranslationContext::new(Arc::new(codes))
    }

    fn make_ctlink(url: &str, params: &[(&str, &str)]) -> LinkRecord {
        let def = CtLinkSearchDef::from_query_params(params.iter().copied()).unwrap();
        LinkRecord::new(url, SearchDef::CtLink(def))
    }

    fn make_saved(url: &str, record: serde_json::Value) -> LinkRecord {
        let record = record.as_object().cloned().unwrap();
        let def = SavedSearchDef::from_record(&record).unwrap();
        LinkRecord::new(url, SearchDef::SavedSearch(def))
    }

    fn make_db() -> LinkDb {
        let mut db = LinkDb::new();
        db.insert(make_ctlink(
            "/search/clinicaltrialslink?id=123&idtype=5&format=1&diagnosis=456",
            &[("id", "123"), ("idtype", "5"), ("format", "1"), ("diagnosis", "456")],
        ))
        .unwrap();
        db.insert(make_saved(
            "/search/resultsclinicaltrials.aspx?protocolsearchid=9",
            json!({ "search_id": 9, "trial_type": "treatment,screening", "_search_type": "adv" }),
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_duplicate_urls_are_rejected() {
        let mut db = make_db();
        let dup = make_ctlink(
            "/SEARCH/ClinicalTrialsLink?id=123&idtype=5&format=1&diagnosis=456",
            &[("format", "1")],
        );
        assert!(matches!(db.insert(dup), Err(LinkDbError::DuplicateUrl { .. })));
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_get_link_ignores_case() {
        let db = make_db();
        let found = db
            .get_link("/Search/ResultsClinicalTrials.aspx?ProtocolSearchID=9")
            .unwrap()
            .unwrap();
        assert_eq!(found.url_type(), SearchUrlType::SavedSearch);
        assert!(db.get_link("/nope").unwrap().is_none());
        assert!(matches!(db.get_link("  "), Err(LinkDbError::EmptyUrl)));
    }

    #[test]
    fn test_classify_all() {
        let ctx = make_context();
        let mut db = make_db();
        db.classify_all(&ctx);

        let patterns: Vec<SearchPattern> = db
            .records()
            .iter()
            .filter_map(|r| r.classification.as_ref().map(|c| c.search_pattern))
            .collect();
        assert_eq!(patterns, vec![SearchPattern::Mask(17), SearchPattern::Manual]);

        let manual = db.records()[1].classification.as_ref().unwrap();
        assert!(!manual.manual_reasons.is_empty());
    }

    #[test]
    fn test_round_trip_through_file() {
        let ctx = make_context();
        let mut db = make_db();
        db.classify_all(&ctx);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        db.save_to_path(&path).unwrap();

        let restored = LinkDb::load_from_path(&path).unwrap();
        assert_eq!(restored.records(), db.records());

        for (before, after) in db.records().iter().zip(restored.records()) {
            assert_eq!(
                before.search.as_definition().search_pattern(&ctx),
                after.search.as_definition().search_pattern(&ctx)
            );
        }
    }

    #[test]
    fn test_persisted_shape() {
        let db = make_db();
        let mut buf = Vec::new();
        db.save_to_writer(&mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json[0]["search_url_type"], "CTLink");
        assert_eq!(json[0]["search_def"]["cdr_id"], "CDR0000000123");
        assert_eq!(json[1]["search_url_type"], "SavedSearch");
        assert_eq!(json[1]["search_def"]["_search_type"], "adv");
        assert!(json[1].get("classification").is_none());
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let json = r#"[
            {"url": "/a", "search_url_type": "CTLink", "search_def": {}},
            {"url": "/A", "search_url_type": "CTLink", "search_def": {}}
        ]"#;
        assert!(matches!(
            LinkDb::load_from_reader(json.as_bytes()),
            Err(LinkDbError::DuplicateUrl { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_discriminator() {
        let json = r#"[{"url": "/a", "search_url_type": "Other", "search_def": {}}]"#;
        assert!(matches!(
            LinkDb::load_from_reader(json.as_bytes()),
            Err(LinkDbError::Json(_))
        ));
    }
}
