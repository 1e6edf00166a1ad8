use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};
use crate::analysis::analyzer::query_words;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::index::blob::IndexBlob;
use crate::index::positional::PositionalIndex;
use crate::search::results::SearchResults;
use crate::search::snippet::SnippetRenderer;
use crate::search::trie::Trie;

/// The index, trie and label of the document currently open for querying.
#[derive(Default)]
struct ActiveDocument {
    index: PositionalIndex,
    trie: Trie,
    label: Option<String>,
    activated_at: Option<DateTime<Utc>>,
}

/// Status report for the request layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatus {
    pub indexed_file: String,
    pub active: bool,
    pub token_count: usize,
    pub vocabulary_size: usize,
    pub activated_at: Option<DateTime<Utc>>,
}

/// Process-wide holder of the active document.
///
/// One lock guards the whole triple, so readers always see an index, trie and
/// label that belong together. Replacement state is built before the write lock
/// is taken.
pub struct ActiveDocumentState {
    inner: RwLock<ActiveDocument>,
    renderer: SnippetRenderer,
    no_document_label: String,
}

impl Default for ActiveDocumentState {
    fn default() -> Self {
        ActiveDocumentState::from_config(&Config::default())
    }
}

impl ActiveDocumentState {
    pub fn new(renderer: SnippetRenderer, no_document_label: impl Into<String>) -> Self {
        ActiveDocumentState {
            inner: RwLock::new(ActiveDocument::default()),
            renderer,
            no_document_label: no_document_label.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        ActiveDocumentState::new(SnippetRenderer::from_config(config), config.no_document_label.clone())
    }

    /// Makes the document behind `blob` the active one.
    ///
    /// Nothing changes if the blob is rejected.
    pub fn switch(&self, blob: IndexBlob, label: impl Into<String>) -> Result<DocumentStatus> {
        let label = label.into();
        let index = PositionalIndex::from_blob(blob)?;
        let trie = Trie::build(index.vocabulary());

        let next = ActiveDocument {
            index,
            trie,
            label: Some(label),
            activated_at: Some(Utc::now()),
        };
        let status = self.describe(&next);

        let previous = {
            let mut active = self.inner.write();
            std::mem::replace(&mut *active, next)
        };
        drop(previous);

        info!(
            label = %status.indexed_file,
            tokens = status.token_count,
            vocabulary = status.vocabulary_size,
            "switched active document"
        );
        Ok(status)
    }

    pub fn clear(&self) {
        let previous = {
            let mut active = self.inner.write();
            std::mem::take(&mut *active)
        };
        if let Some(label) = previous.label {
            info!(label = %label, "cleared active document");
        }
    }

    /// Clears the state only if `label` is the active document. Returns whether it did.
    pub fn clear_if_active(&self, label: &str) -> bool {
        let previous = {
            let mut active = self.inner.write();
            if active.label.as_deref() != Some(label) {
                return false;
            }
            std::mem::take(&mut *active)
        };
        drop(previous);
        info!(label = %label, "active document removed from catalog, state cleared");
        true
    }

    pub fn current_label(&self) -> String {
        self.inner.read()
            .label
            .clone()
            .unwrap_or_else(|| self.no_document_label.clone())
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().label.is_some()
    }

    pub fn status(&self) -> DocumentStatus {
        self.describe(&self.inner.read())
    }

    /// Phrase search over the active document. Empty queries and an empty
    /// state both give `(0, [])`.
    pub fn search_phrase(&self, query: &str) -> SearchResults {
        let words = query_words(query);
        if words.is_empty() {
            return SearchResults::empty();
        }

        let active = self.inner.read();
        if active.label.is_none() {
            return SearchResults::empty();
        }

        let positions = active.index.search_words(&words);
        debug!(query = %query, matches = positions.len(), "phrase search");
        self.renderer.render(active.index.document(), &positions, &words)
    }

    pub fn autocomplete_prefix(&self, prefix: &str) -> Vec<String> {
        if prefix.trim().is_empty() {
            return Vec::new();
        }

        let active = self.inner.read();
        if active.label.is_none() {
            return Vec::new();
        }
        active.trie.get_words_with_prefix(prefix)
    }

    fn describe(&self, doc: &ActiveDocument) -> DocumentStatus {
        DocumentStatus {
            indexed_file: doc.label.clone().unwrap_or_else(|| self.no_document_label.clone()),
            active: doc.label.is_some(),
            token_count: doc.index.len(),
            vocabulary_size: doc.index.vocabulary_size(),
            activated_at: doc.activated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::normalize;

    fn blob(text: &str) -> IndexBlob {
        PositionalIndex::build(normalize(text)).to_blob()
    }

    #[test]
    fn starts_empty() {
        let state = ActiveDocumentState::default();
        assert!(!state.is_active());
        assert_eq!(state.current_label(), "No document selected.");
        assert_eq!(state.search_phrase("anything"), SearchResults::empty());
        assert!(state.autocomplete_prefix("a").is_empty());
    }

    #[test]
    fn switch_then_query() {
        let state = ActiveDocumentState::default();
        let status = state.switch(blob("Cats chase cars. Cats nap."), "pets.txt").unwrap();

        assert_eq!(status.indexed_file, "pets.txt");
        assert_eq!(status.token_count, 5);
        assert_eq!(status.vocabulary_size, 4);
        assert_eq!(state.current_label(), "pets.txt");
        assert_eq!(state.search_phrase("cats").match_count, 2);
        assert_eq!(state.autocomplete_prefix("ca"), vec!["cars", "cats"]);
    }

    #[test]
    fn rejected_blob_leaves_state_untouched() {
        let state = ActiveDocumentState::default();
        state.switch(blob("alpha beta"), "first.txt").unwrap();

        let mut bad = blob("gamma delta");
        bad.index.as_mut().unwrap().insert("gamma".into(), vec![1, 0]);
        assert!(state.switch(bad, "second.txt").is_err());

        assert_eq!(state.current_label(), "first.txt");
        assert_eq!(state.search_phrase("alpha beta").match_count, 1);
    }

    #[test]
    fn clear_resets_everything() {
        let state = ActiveDocumentState::default();
        state.switch(blob("alpha beta"), "first.txt").unwrap();
        state.clear();

        assert_eq!(state.search_phrase("alpha"), SearchResults::empty());
        assert!(state.autocomplete_prefix("a").is_empty());
        assert_eq!(state.status().token_count, 0);
        assert!(state.status().activated_at.is_none());
    }

    #[test]
    fn removal_of_other_document_keeps_state() {
        let state = ActiveDocumentState::default();
        state.switch(blob("alpha beta"), "first.txt").unwrap();

        assert!(!state.clear_if_active("other.txt"));
        assert!(state.is_active());
        assert!(state.clear_if_active("first.txt"));
        assert!(!state.is_active());
    }

    #[test]
    fn empty_query_and_prefix_give_empty_results() {
        let state = ActiveDocumentState::default();
        state.switch(blob("alpha beta"), "first.txt").unwrap();
        assert_eq!(state.search_phrase("   "), SearchResults::empty());
        assert!(state.autocomplete_prefix("").is_empty());
    }
}
