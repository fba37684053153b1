//! Streaming parser for the reference dataset.
//!
//! The dataset is a delimited file in which one column holds a legacy CDR id
//! and another the matching API concept code. Other columns are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder};
use ctsearch_types::CodeMapRow;

use crate::types::{CodeMapConfig, CodeMapError, CodeMapResult};

/// A streaming parser over reference dataset rows.
///
/// Yields one item per data row. Incomplete rows come back as
/// [`CodeMapError::MalformedRow`] so the caller can apply its row policy;
/// the parser itself never stops on them. Rows are read as raw bytes and
/// only the two configured columns are decoded, so text in other columns
/// never has to be valid UTF-8.
pub struct CodeMapParser<R: Read> {
    reader: Reader<R>,
    config: CodeMapConfig,
    records_read: usize,
}

impl CodeMapParser<BufReader<File>> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or has an invalid header.
    pub fn from_path<P: AsRef<Path>>(path: P, config: CodeMapConfig) -> CodeMapResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CodeMapError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Read> CodeMapParser<R> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: CodeMapConfig) -> CodeMapResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(config.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        if config.has_headers {
            Self::validate_headers(&mut csv_reader, &config)?;
        }

        Ok(Self {
            reader: csv_reader,
            config,
            records_read: 0,
        })
    }

    /// Validates that the header row is wide enough for the configured columns.
    fn validate_headers(reader: &mut Reader<R>, config: &CodeMapConfig) -> CodeMapResult<()> {
        let headers = reader.byte_headers()?;
        let expected = config.required_columns();

        if headers.len() < expected {
            return Err(CodeMapError::InvalidHeader {
                expected,
                found: headers.len(),
            });
        }

        Ok(())
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Returns the parser configuration.
    pub fn config(&self) -> &CodeMapConfig {
        &self.config
    }

    fn row_from_record(&self, record: &ByteRecord) -> CodeMapResult<CodeMapRow> {
        let line = record.position().map_or(0, |pos| pos.line());
        let required = self.config.required_columns();

        if record.len() < required {
            return Err(CodeMapError::MalformedRow {
                line,
                reason: format!("expected at least {} columns, found {}", required, record.len()),
            });
        }

        let decode = |index: usize| {
            parse::column(record, index).map_err(|_| CodeMapError::MalformedRow {
                line,
                reason: format!("invalid UTF-8 in column {}", index),
            })
        };
        let legacy_id = decode(self.config.legacy_id_column)?;
        let concept_code = decode(self.config.concept_code_column)?;

        match (legacy_id, concept_code) {
            (Some(legacy_id), Some(concept_code)) => Ok(CodeMapRow::new(legacy_id, concept_code)),
            (None, _) => Err(CodeMapError::MalformedRow {
                line,
                reason: "empty legacy id".to_string(),
            }),
            (_, None) => Err(CodeMapError::MalformedRow {
                line,
                reason: "empty concept code".to_string(),
            }),
        }
    }
}

impl<R: Read> Iterator for CodeMapParser<R> {
    type Item = CodeMapResult<CodeMapRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = ByteRecord::new();
            match self.reader.read_byte_record(&mut record) {
                Ok(true) => {
                    // Blank lines carry no pair and are not counted as rows
                    if record.iter().all(|f| f.is_empty()) {
                        continue;
                    }
                    self.records_read += 1;
                    return Some(self.row_from_record(&record));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for reading dataset fields.
pub mod parse {
    use std::str::Utf8Error;

    use csv::ByteRecord;

    /// Returns the trimmed value of a column, `None` if absent or blank.
    ///
    /// # Errors
    /// Returns an error if the column is not valid UTF-8.
    pub fn column(record: &ByteRecord, index: usize) -> Result<Option<&str>, Utf8Error> {
        match record.get(index) {
            Some(bytes) => {
                let value = std::str::from_utf8(bytes)?.trim();
                Ok((!value.is_empty()).then_some(value))
            }
            None => Ok(None),
        }
    }
}
