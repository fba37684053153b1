//! Saved-search lookup backed by a JSON export of the saved-search table.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use ctsearch_engine::{LookupError, SavedSearchRecord, SavedSearchSource};

use crate::error::{ServiceError, ServiceResult};

/// Saved-search rows held in memory, keyed by `search_id`.
#[derive(Debug, Clone, Default)]
pub struct JsonSavedSearchSource {
    records: HashMap<i64, SavedSearchRecord>,
}

impl JsonSavedSearchSource {
    /// Creates a source with no records; every lookup is "not found".
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a source from exported rows.
    ///
    /// # Errors
    ///
    /// Fails if a row is not an object or has no integer `search_id`
    /// (a numeric string is accepted).
    pub fn from_rows(rows: Vec<Value>) -> ServiceResult<Self> {
        let mut records = HashMap::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let Value::Object(record) = row else {
                return Err(ServiceError::InvalidSavedSearch { index });
            };
            let id = record
                .get("search_id")
                .and_then(search_id)
                .ok_or(ServiceError::InvalidSavedSearch { index })?;
            records.insert(id, record);
        }
        Ok(Self { records })
    }

    /// Reads an export file holding a JSON array of rows.
    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let rows: Vec<Value> = serde_json::from_slice(&bytes)?;
        let source = Self::from_rows(rows)?;
        info!(
            path = %path.as_ref().display(),
            searches = source.len(),
            "Loaded saved searches"
        );
        Ok(source)
    }

    /// Returns the number of saved searches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no saved searches.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn search_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl SavedSearchSource for JsonSavedSearchSource {
    fn fetch_saved_search_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<SavedSearchRecord>, LookupError>> + Send {
        let record = self.records.get(&id).cloned();
        async move { Ok(record) }
    }
}
