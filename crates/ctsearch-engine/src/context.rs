//! Shared read-only lookup state for classification.

use std::sync::Arc;

use ctsearch_loader::CodeMap;
use ctsearch_types::vocabulary::Vocabulary;

/// The code translation table and vocabulary maps every search definition
/// is classified against.
///
/// Built once per process and passed by reference; cloning only bumps the
/// table's reference count.
///
/// ```
/// use std::sync::Arc;
/// use ctsearch_engine::TranslationContext;
/// use ctsearch_loader::CodeMap;
///
/// let (codes, _) = CodeMap::from_pairs([("CDR0000000456", "C3868")]);
/// let ctx = TranslationContext::new(Arc::new(codes));
/// assert_eq!(ctx.codes().legacy_id_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TranslationContext {
    codes: Arc<CodeMap>,
    vocabulary: Vocabulary,
}

impl TranslationContext {
    /// Creates a context with the standard vocabulary.
    pub fn new(codes: Arc<CodeMap>) -> Self {
        Self::with_vocabulary(codes, Vocabulary::STANDARD)
    }

    /// Creates a context with a custom vocabulary.
    pub fn with_vocabulary(codes: Arc<CodeMap>, vocabulary: Vocabulary) -> Self {
        Self { codes, vocabulary }
    }

    /// Returns the code translation table.
    pub fn codes(&self) -> &CodeMap {
        &self.codes
    }

    /// Returns the vocabulary maps.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}
