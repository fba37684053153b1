//! In-memory code translation table.
//!
//! Maps legacy CDR ids to API concept codes and back. Both directions are
//! one-to-many and both key spaces are case-insensitive.
//!
//! ```ignore
//! let path = "data/PDQ_TO_NCI_MAP.csv";
//! let (map, stats) = CodeMap::load_from_path(path, CodeMapConfig::default())?;
//! let codes = map.concept_codes_for_legacy_id("38323");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use ctsearch_types::{CdrId, CodeMapRow, ConceptCode};

use crate::parser::CodeMapParser;
use crate::types::{CodeMapConfig, CodeMapError, CodeMapResult, LoadStats, RowPolicy};

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Bidirectional legacy id / concept code lookup table.
///
/// A `CodeMap` is only built by its constructors and has no public
/// mutators, so once loaded it can be shared across threads behind an
/// `Arc` without locking.
///
/// # Example
///
/// ```
/// use ctsearch_loader::CodeMap;
/// use ctsearch_types::CodeMapRow;
///
/// let (map, _) = CodeMap::from_rows([
///     CodeMapRow::new("CDR0000038323", "C4872"),
///     CodeMapRow::new("CDR0000038323", "C2910"),
/// ]);
///
/// let codes = map.concept_codes_for_legacy_id("38323");
/// assert_eq!(codes.len(), 2);
/// assert!(map.concept_codes_for_legacy_id("1").is_empty());
/// ```
#[derive(Default, Clone)]
pub struct CodeMap {
    /// Concept codes keyed by lowercased legacy id.
    legacy_id_to_codes: HashMap<String, BTreeSet<ConceptCode>>,
    /// Legacy ids keyed by lowercased concept code.
    code_to_legacy_ids: HashMap<String, BTreeSet<String>>,
}

impl std::fmt::Debug for CodeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeMap")
            .field("legacy_id_to_codes", &self.legacy_id_to_codes.len())
            .field("code_to_legacy_ids", &self.code_to_legacy_ids.len())
            .finish()
    }
}

impl CodeMap {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from in-memory rows.
    ///
    /// Incomplete rows are skipped and counted.
    pub fn from_rows(rows: impl IntoIterator<Item = CodeMapRow>) -> (Self, LoadStats) {
        let mut map = Self::new();
        let mut stats = LoadStats::default();

        for row in rows {
            stats.total_rows += 1;
            if !row.is_complete() {
                stats.skipped_rows += 1;
                continue;
            }
            map.record_insert(&row, &mut stats);
        }

        (map, stats)
    }

    /// Builds a table from `(legacy_id, concept_code)` pairs.
    pub fn from_pairs<L, C>(pairs: impl IntoIterator<Item = (L, C)>) -> (Self, LoadStats)
    where
        L: Into<String>,
        C: Into<ConceptCode>,
    {
        Self::from_rows(
            pairs
                .into_iter()
                .map(|(legacy_id, code)| CodeMapRow::new(legacy_id, code)),
        )
    }

    /// Loads the table from a reference dataset file.
    pub fn load_from_path<P: AsRef<Path>>(
        path: P,
        config: CodeMapConfig,
    ) -> CodeMapResult<(Self, LoadStats)> {
        let parser = CodeMapParser::from_path(path, config)?;
        Self::load_from_parser(parser)
    }

    /// Loads the table from any reader holding the reference dataset.
    pub fn load_from_reader<R: Read>(
        reader: R,
        config: CodeMapConfig,
    ) -> CodeMapResult<(Self, LoadStats)> {
        let parser = CodeMapParser::from_reader(reader, config)?;
        Self::load_from_parser(parser)
    }

    fn load_from_parser<R: Read>(mut parser: CodeMapParser<R>) -> CodeMapResult<(Self, LoadStats)> {
        let start = Instant::now();
        let policy = parser.config().row_policy;
        let mut map = Self::new();
        let mut stats = LoadStats::default();

        for item in parser.by_ref() {
            match item {
                Ok(row) => {
                    stats.total_rows += 1;
                    map.record_insert(&row, &mut stats);
                }
                Err(CodeMapError::MalformedRow { line, reason }) => {
                    stats.total_rows += 1;
                    if policy == RowPolicy::Strict {
                        return Err(CodeMapError::MalformedRow { line, reason });
                    }
                    tracing::debug!(line, %reason, "skipping malformed reference row");
                    stats.skipped_rows += 1;
                }
                Err(e) => return Err(e),
            }
        }

        stats.load_time_ms = start.elapsed().as_millis() as u64;

        if stats.skipped_rows > 0 {
            tracing::warn!(
                skipped = stats.skipped_rows,
                total = stats.total_rows,
                "reference dataset contains malformed rows"
            );
        }

        Ok((map, stats))
    }

    fn record_insert(&mut self, row: &CodeMapRow, stats: &mut LoadStats) {
        if self.insert(row) {
            stats.loaded_pairs += 1;
        } else {
            stats.duplicate_pairs += 1;
        }
    }

    /// Inserts one pair, returning false if it was already present.
    fn insert(&mut self, row: &CodeMapRow) -> bool {
        let legacy_id = row.legacy_id.trim();
        let code = row.concept_code.trim();

        let added = self
            .legacy_id_to_codes
            .entry(legacy_id.to_lowercase())
            .or_default()
            .insert(code.to_string());

        self.code_to_legacy_ids
            .entry(code.to_lowercase())
            .or_default()
            .insert(legacy_id.to_string());

        added
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOOKUPS
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns the concept codes for a legacy id, empty when unmapped.
    ///
    /// The id is canonicalized first, so `"38323"` and `"CDR0000038323"`
    /// resolve to the same entry.
    pub fn concept_codes_for_legacy_id(&self, id: &str) -> &BTreeSet<ConceptCode> {
        self.concept_codes_for_cdr_id(&CdrId::normalize(id))
    }

    /// Returns the concept codes for an already canonical id.
    pub fn concept_codes_for_cdr_id(&self, id: &CdrId) -> &BTreeSet<ConceptCode> {
        self.legacy_id_to_codes
            .get(&id.lookup_key())
            .unwrap_or(&EMPTY)
    }

    /// Returns the legacy ids for a concept code, empty when unmapped.
    pub fn legacy_ids_for_concept_code(&self, code: &str) -> &BTreeSet<String> {
        self.code_to_legacy_ids
            .get(&code.trim().to_lowercase())
            .unwrap_or(&EMPTY)
    }

    /// Returns true if the legacy id has at least one concept code.
    pub fn has_legacy_id(&self, id: &str) -> bool {
        !self.concept_codes_for_legacy_id(id).is_empty()
    }

    /// Returns the number of distinct legacy ids.
    pub fn legacy_id_count(&self) -> usize {
        self.legacy_id_to_codes.len()
    }

    /// Returns the number of distinct concept codes.
    pub fn concept_code_count(&self) -> usize {
        self.code_to_legacy_ids.len()
    }

    /// Returns true if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.legacy_id_to_codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_test_map() -> CodeMap {
        let (map, _) = CodeMap::from_pairs([
            ("CDR0000038323", "C4872"),
            ("CDR0000038323", "C2910"),
            ("CDR0000040113", "C4872"),
            ("CDR0000000456", "C3868"),
        ]);
        map
    }

    #[test]
    fn test_one_to_many_both_directions() {
        let map = make_test_map();

        let codes: Vec<&str> = map
            .concept_codes_for_legacy_id("CDR0000038323")
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(codes, vec!["C2910", "C4872"]);

        let ids: Vec<&str> = map
            .legacy_ids_for_concept_code("C4872")
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(ids, vec!["CDR0000038323", "CDR0000040113"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = make_test_map();
        assert_eq!(map.concept_codes_for_legacy_id("cdr0000038323").len(), 2);
        assert_eq!(map.legacy_ids_for_concept_code("c4872").len(), 2);
    }

    #[test]
    fn test_lookup_canonicalizes_short_ids() {
        let map = make_test_map();
        assert!(map.concept_codes_for_legacy_id("456").contains("C3868"));
        assert!(map.has_legacy_id("38323"));
    }

    #[test]
    fn test_unmapped_lookup_is_empty() {
        let map = make_test_map();
        assert!(map.concept_codes_for_legacy_id("999").is_empty());
        assert!(map.legacy_ids_for_concept_code("C0").is_empty());
    }

    #[test]
    fn test_duplicate_pairs_are_idempotent() {
        let (map, stats) = CodeMap::from_pairs([
            ("CDR0000000001", "C1"),
            ("CDR0000000001", "C1"),
            ("cdr0000000001", "C2"),
        ]);
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.loaded_pairs, 2);
        assert_eq!(stats.duplicate_pairs, 1);
        assert_eq!(map.concept_codes_for_legacy_id("1").len(), 2);
        assert_eq!(map.legacy_id_count(), 1);
        assert_eq!(map.concept_code_count(), 2);
    }

    #[test]
    fn test_incomplete_pairs_are_skipped_and_counted() {
        let (map, stats) = CodeMap::from_pairs([
            ("CDR0000000001", "C1"),
            ("", "C2"),
            ("CDR0000000003", "  "),
        ]);
        assert_eq!(stats.skipped_rows, 2);
        assert_eq!(stats.loaded_pairs, 1);
        assert!(map.legacy_ids_for_concept_code("C2").is_empty());
        assert!(!map.has_legacy_id("3"));
    }

    #[test]
    fn test_load_from_reader_skips_malformed_rows() {
        let data = "CDR0000000001,C1\n,C2\nCDR0000000003,\nCDR0000000004,C4\n";
        let (map, stats) =
            CodeMap::load_from_reader(data.as_bytes(), CodeMapConfig::two_column()).unwrap();

        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.loaded_pairs, 2);
        assert_eq!(stats.skipped_rows, 2);
        assert!(map.has_legacy_id("1"));
        assert!(map.has_legacy_id("4"));
        assert!(!map.has_legacy_id("3"));
        assert!(map.legacy_ids_for_concept_code("C2").is_empty());
    }

    #[test]
    fn test_load_skips_invalid_utf8_row() {
        let data: &[u8] = b"CDR0000000001,C1\nCDR0000000002,Sj\xF6gren\nCDR0000000003,C3\n";
        let (map, stats) = CodeMap::load_from_reader(data, CodeMapConfig::two_column()).unwrap();

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.loaded_pairs, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert!(map.has_legacy_id("1"));
        assert!(!map.has_legacy_id("2"));
        assert!(map.has_legacy_id("3"));
    }

    #[test]
    fn test_strict_policy_fails_on_malformed_row() {
        let data = "CDR0000000001,C1\nCDR0000000002,\n";
        let config = CodeMapConfig {
            row_policy: RowPolicy::Strict,
            ..CodeMapConfig::two_column()
        };
        let result = CodeMap::load_from_reader(data.as_bytes(), config);
        assert!(matches!(
            result,
            Err(CodeMapError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CDR0000038323,Breast cancer,,,,,,,C4872").unwrap();
        writeln!(file, "CDR0000040113,Lung cancer,,,,,,,C4878").unwrap();
        writeln!(file, "CDR0000040114,Orphan row").unwrap();

        let (map, stats) = CodeMap::load_from_path(file.path(), CodeMapConfig::default()).unwrap();
        assert_eq!(stats.loaded_pairs, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert!(map.concept_codes_for_legacy_id("40113").contains("C4878"));
    }
}
