//! Loader-specific types for reference dataset processing.

use thiserror::Error;

/// Errors that can occur while loading the code translation table.
#[derive(Error, Debug)]
pub enum CodeMapError {
    /// I/O error reading the dataset.
    #[error("IO error reading reference dataset: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// No dataset file in the given directory.
    #[error("Reference dataset not found in {directory}")]
    DatasetMissing {
        /// The directory that was searched.
        directory: String,
    },

    /// Invalid header - not enough columns for the configured positions.
    #[error("Invalid header: expected at least {expected} columns, found {found}")]
    InvalidHeader {
        /// Minimum column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// A row is missing its legacy id or concept code.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow {
        /// 1-based line number in the dataset.
        line: u64,
        /// What was wrong with the row.
        reason: String,
    },
}

/// Result type for code map operations.
pub type CodeMapResult<T> = Result<T, CodeMapError>;

/// What to do with a dataset row that lacks a legacy id or concept code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Skip the row, count it in [`LoadStats::skipped_rows`] and keep going.
    #[default]
    SkipAndCount,
    /// Abort the load with [`CodeMapError::MalformedRow`].
    Strict,
}

/// Configuration for reading the reference dataset.
#[derive(Debug, Clone)]
pub struct CodeMapConfig {
    /// Zero-based column holding the legacy CDR id.
    pub legacy_id_column: usize,
    /// Zero-based column holding the API concept code.
    pub concept_code_column: usize,
    /// Whether the first row is a header.
    pub has_headers: bool,
    /// Field delimiter.
    pub delimiter: u8,
    /// Handling of incomplete rows.
    pub row_policy: RowPolicy,
}

impl Default for CodeMapConfig {
    fn default() -> Self {
        Self {
            legacy_id_column: 0,
            concept_code_column: 8,
            has_headers: false,
            delimiter: b',',
            row_policy: RowPolicy::default(),
        }
    }
}

impl CodeMapConfig {
    /// Creates a config for a two column `legacy_id,concept_code` file.
    pub fn two_column() -> Self {
        Self {
            legacy_id_column: 0,
            concept_code_column: 1,
            ..Default::default()
        }
    }

    /// Returns the number of columns a row needs to be usable.
    pub fn required_columns(&self) -> usize {
        self.legacy_id_column.max(self.concept_code_column) + 1
    }
}

/// Statistics from loading the reference dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Total data rows read.
    pub total_rows: usize,
    /// Distinct pairs added to the table.
    pub loaded_pairs: usize,
    /// Rows repeating a pair that was already loaded.
    pub duplicate_pairs: usize,
    /// Incomplete rows skipped under [`RowPolicy::SkipAndCount`].
    pub skipped_rows: usize,
    /// Time taken to load in milliseconds.
    pub load_time_ms: u64,
}

impl LoadStats {
    /// Returns the percentage of rows that were skipped.
    pub fn skip_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.skipped_rows as f64 / self.total_rows as f64) * 100.0
        }
    }
}
