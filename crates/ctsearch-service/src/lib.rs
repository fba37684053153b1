//! # ctsearch-service
//!
//! Batch driver for classifying legacy clinical-trial search links.
//!
//! This crate wires the code translation table and the search definition
//! engine to file inputs: a link list CSV, an optional JSON export of the
//! saved-search table, and the persisted link collection.

#![warn(missing_docs)]

mod context;
mod error;
mod processor;
mod source;

pub use context::load_translation_context;
pub use error::{ServiceError, ServiceResult};
pub use processor::{
    read_link_urls, read_link_urls_from_reader, LinkFailure, LinkProcessor, ProcessReport,
    ProcessorConfig, DEFAULT_CONCURRENCY, URL_COLUMN,
};
pub use source::JsonSavedSearchSource;
