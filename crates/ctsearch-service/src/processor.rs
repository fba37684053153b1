//! Concurrent processing of a legacy link list into a link collection.
//!
//! Each link is an independent unit of work: route, fetch (saved searches
//! only), build the definition, classify. Lookups run concurrently on
//! tokio, bounded by [`ProcessorConfig::concurrency`]. A failing link is
//! recorded against its URL and never stops the run.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use ctsearch_engine::{
    LegacyLink, LinkDb, LinkError, LinkRecord, SavedSearchSource, SearchUrlType,
    TranslationContext,
};

use crate::error::{ServiceError, ServiceResult};

/// Default number of links processed at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Name of the link list column holding the URLs.
pub const URL_COLUMN: &str = "URL";

/// Configuration for the link processor.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum number of links in flight.
    pub concurrency: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// A link that could not be turned into a search definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFailure {
    /// The link as supplied.
    pub url: String,
    /// Why it failed.
    pub error: String,
}

/// Outcome of one processing run.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Successfully decoded and classified links, in input order.
    pub links: LinkDb,
    /// Failed links, in input order.
    pub failures: Vec<LinkFailure>,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u128,
}

impl ProcessReport {
    /// Number of links of one kind.
    pub fn count(&self, url_type: SearchUrlType) -> usize {
        self.links
            .records()
            .iter()
            .filter(|r| r.url_type() == url_type)
            .count()
    }

    /// Writes the link collection and, if a path is given, the failures.
    ///
    /// # Errors
    ///
    /// Fails with [`ServiceError::LinkDb`] if the collection cannot be
    /// written, or with an I/O or JSON error for the failure list.
    pub fn save(&self, output: &Path, failures: Option<&Path>) -> ServiceResult<()> {
        self.links.save_to_path(output)?;

        if let Some(path) = failures {
            std::fs::write(path, serde_json::to_vec_pretty(&self.failures)?)?;
            info!(failures = self.failures.len(), path = %path.display(), "Wrote failed links");
        }

        Ok(())
    }
}

/// Reads the `URL` column of a link list CSV file.
pub fn read_link_urls<P: AsRef<Path>>(path: P) -> ServiceResult<Vec<String>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_link_urls_from_reader(file).map_err(|e| match e {
        ServiceError::MissingUrlColumn { .. } => ServiceError::MissingUrlColumn {
            path: path.as_ref().display().to_string(),
        },
        other => other,
    })
}

/// Reads the `URL` column of a link list.
///
/// The column name matches in any letter case. Blank cells are skipped and
/// URLs are deduplicated case-insensitively, keeping the first occurrence.
pub fn read_link_urls_from_reader<R: Read>(reader: R) -> ServiceResult<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let column = csv_reader
        .headers()?
        .iter()
        .position(|h| h.eq_ignore_ascii_case(URL_COLUMN))
        .ok_or_else(|| ServiceError::MissingUrlColumn {
            path: "<reader>".to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut duplicates = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        let Some(url) = record.get(column).filter(|u| !u.is_empty()) else {
            continue;
        };
        if seen.insert(url.to_lowercase()) {
            urls.push(url.to_string());
        } else {
            duplicates += 1;
        }
    }

    debug!(urls = urls.len(), duplicates, "Read link list");
    Ok(urls)
}

/// Turns legacy URLs into a classified link collection.
pub struct LinkProcessor<S> {
    source: Arc<S>,
    ctx: TranslationContext,
    config: ProcessorConfig,
}

impl<S: SavedSearchSource + 'static> LinkProcessor<S> {
    /// Creates a processor.
    pub fn new(source: Arc<S>, ctx: TranslationContext, config: ProcessorConfig) -> Self {
        Self {
            source,
            ctx,
            config,
        }
    }

    /// Processes every URL.
    ///
    /// # Errors
    ///
    /// Only fails if a link task panics; per-link problems land in
    /// [`ProcessReport::failures`].
    pub async fn process(&self, urls: Vec<String>) -> ServiceResult<ProcessReport> {
        let start = Instant::now();
        let total = urls.len();
        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.into_iter().enumerate() {
            let permits = Arc::clone(&permits);
            let source = Arc::clone(&self.source);
            let ctx = self.ctx.clone();

            tasks.spawn(async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = process_link(&url, source.as_ref(), &ctx).await;
                (index, url, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = ProcessReport::default();
        for (_, url, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    if let Err(e) = report.links.insert(record) {
                        warn!(url = %url, error = %e, "Dropping link");
                        report.failures.push(LinkFailure {
                            url,
                            error: e.to_string(),
                        });
                    }
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Could not process link");
                    report.failures.push(LinkFailure {
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis();
        info!(
            ctlinks = report.count(SearchUrlType::CtLink),
            saved_searches = report.count(SearchUrlType::SavedSearch),
            failed = report.failures.len(),
            elapsed_ms = report.elapsed_ms as u64,
            "Processed {} links",
            total
        );
        Ok(report)
    }
}

async fn process_link<S: SavedSearchSource>(
    url: &str,
    source: &S,
    ctx: &TranslationContext,
) -> Result<LinkRecord, LinkError> {
    let search = LegacyLink::parse(url)?.resolve(source).await?;
    let mut record = LinkRecord::new(url, search);
    record.classify(ctx);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use ctsearch_engine::SearchPattern;
    use ctsearch_loader::CodeMap;

    use crate::source::JsonSavedSearchSource;

    fn make_context() -> TranslationContext {
        let (codes, _) =
            CodeMap::from_pairs([("CDR0000000123", "C1647"), ("CDR0000000456", "C3868")]);
        TranslationContext::new(Arc::new(codes))
    }

    fn make_processor(concurrency: usize) -> LinkProcessor<JsonSavedSearchSource> {
        let source = JsonSavedSearchSource::from_rows(vec![
            json!({ "search_id": 1, "trial_type": "treatment,screening" }),
            json!({ "search_id": 2, "cancer_type": "456" }),
        ])
        .unwrap();
        LinkProcessor::new(Arc::new(source), make_context(), ProcessorConfig { concurrency })
    }

    #[test]
    fn test_read_link_urls() {
        let csv = "Page,url,Count\n\
                   a,/search/clinicaltrialslink?diagnosis=456,1\n\
                   b,/Search/ClinicalTrialsLink?Diagnosis=456,2\n\
                   c,,3\n\
                   d,/search/resultsclinicaltrials.aspx?protocolsearchid=1,4\n";
        let urls = read_link_urls_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            urls,
            vec![
                "/search/clinicaltrialslink?diagnosis=456",
                "/search/resultsclinicaltrials.aspx?protocolsearchid=1",
            ]
        );
    }

    #[test]
    fn test_read_link_urls_without_column() {
        let result = read_link_urls_from_reader("Page,Count\na,1\n".as_bytes());
        assert!(matches!(result, Err(ServiceError::MissingUrlColumn { .. })));
    }

    #[tokio::test]
    async fn test_process_collects_failures() {
        let processor = make_processor(2);
        let urls = vec![
            "/search/clinicaltrialslink?id=123&idtype=5&format=1&diagnosis=456".to_string(),
            "/search/clinicaltrialslink?id=1&idtype=99".to_string(),
            "/search/resultsclinicaltrials.aspx?protocolsearchid=1".to_string(),
            "/search/resultsclinicaltrials.aspx?protocolsearchid=2".to_string(),
            "/search/resultsclinicaltrials.aspx?protocolsearchid=3".to_string(),
            "/types/breast".to_string(),
        ];

        let report = processor.process(urls).await.unwrap();

        assert_eq!(report.count(SearchUrlType::CtLink), 1);
        assert_eq!(report.count(SearchUrlType::SavedSearch), 2);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.failures[0].url, "/search/clinicaltrialslink?id=1&idtype=99");
        assert!(report.failures[0].error.contains("Unknown ID type"));
        assert!(report.failures[1].error.contains("not found"));
        assert_eq!(report.failures[2].url, "/types/breast");

        let patterns: Vec<SearchPattern> = report
            .links
            .records()
            .iter()
            .filter_map(|r| r.classification.as_ref().map(|c| c.search_pattern))
            .collect();
        assert_eq!(
            patterns,
            vec![SearchPattern::Mask(17), SearchPattern::Manual, SearchPattern::Mask(1)]
        );
    }

    #[tokio::test]
    async fn test_save_report() {
        let processor = make_processor(4);
        let report = processor
            .process(vec![
                "/search/clinicaltrialslink?diagnosis=456&format=1".to_string(),
                "/types/breast".to_string(),
            ])
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("links.json");
        let failures = dir.path().join("failures.json");
        report.save(&output, Some(failures.as_path())).unwrap();

        let restored = LinkDb::load_from_path(&output).unwrap();
        assert_eq!(restored.len(), 1);
        let written: Vec<LinkFailure> =
            serde_json::from_slice(&std::fs::read(&failures).unwrap()).unwrap();
        assert_eq!(written, report.failures);
    }

    #[test]
    fn test_save_into_missing_directory_is_a_link_db_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("links.json");
        let result = ProcessReport::default().save(&output, None);
        assert!(matches!(result, Err(ServiceError::LinkDb(_))));
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let processor = make_processor(0);
        let report = processor
            .process(vec!["/search/clinicaltrialslink?format=1".to_string()])
            .await
            .unwrap();
        assert_eq!(report.links.len(), 1);
        assert!(report.failures.is_empty());
    }
}
