//! Startup loading of the translation context.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use ctsearch_engine::TranslationContext;
use ctsearch_loader::{discover_dataset, format_bytes, CodeMap, CodeMapConfig, RowPolicy};

use crate::error::ServiceResult;

/// Finds the reference dataset under `path` and builds the translation
/// context from it.
///
/// # Errors
///
/// Fails with [`ServiceError::CodeMap`](crate::ServiceError::CodeMap) if the
/// dataset cannot be found or read, or if `policy` is strict and a row is
/// malformed.
pub fn load_translation_context(
    path: &Path,
    policy: RowPolicy,
) -> ServiceResult<TranslationContext> {
    let dataset = discover_dataset(path)?;
    let size = std::fs::metadata(&dataset).map(|m| m.len()).unwrap_or(0);
    info!(
        "Loading code translation table from: {} ({})",
        dataset.display(),
        format_bytes(size)
    );

    let config = CodeMapConfig {
        row_policy: policy,
        ..CodeMapConfig::default()
    };
    let (codes, stats) = CodeMap::load_from_path(&dataset, config)?;

    info!(
        "Loaded {} legacy ids and {} concept codes ({} rows skipped) in {}ms",
        codes.legacy_id_count(),
        codes.concept_code_count(),
        stats.skipped_rows,
        stats.load_time_ms
    );

    Ok(TranslationContext::new(Arc::new(codes)))
}
