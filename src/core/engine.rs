use std::sync::Arc;
use tracing::{info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::state::{ActiveDocumentState, DocumentStatus};
use crate::core::types::DocumentFormat;
use crate::extract::Extractor;
use crate::index::blob::IndexBlob;
use crate::index::positional::PositionalIndex;
use crate::search::results::SearchResults;

/// Notifications from the document catalog.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    DocumentActivated { label: String, blob: IndexBlob },
    DocumentRemoved { label: String },
}

pub struct Engine {
    config: Config,
    extractor: Arc<Extractor>,
    state: Arc<ActiveDocumentState>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let extractor = Extractor::new(&config);
        Engine::with_extractor(config, extractor)
    }

    pub fn with_extractor(config: Config, extractor: Extractor) -> Self {
        let state = Arc::new(ActiveDocumentState::from_config(&config));
        Engine {
            config,
            extractor: Arc::new(extractor),
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> Arc<ActiveDocumentState> {
        self.state.clone()
    }

    // 1. Extract raw text for the declared format (PDF may fall back to OCR)
    // 2. Normalize into tokens; no tokens is a failure
    // 3. Build the positional index
    // 4. Hand back the blob for the metadata store
    // Nothing is returned for a failed extraction, so no partial index can be persisted.
    pub fn index_document(&self, bytes: &[u8], format: DocumentFormat) -> Result<IndexBlob> {
        build_blob(&self.extractor, bytes, format)
    }

    /// [`Engine::index_document`] on the blocking pool, bounded by the configured timeout.
    ///
    /// On timeout the worker is left to finish in the background and its result
    /// is discarded.
    pub async fn index_document_async(&self, bytes: Vec<u8>, format: DocumentFormat) -> Result<IndexBlob> {
        let extractor = self.extractor.clone();
        let timeout = self.config.extraction_timeout();

        let task = tokio::task::spawn_blocking(move || build_blob(&extractor, &bytes, format));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(Error::new(
                ErrorKind::Internal,
                format!("extraction worker failed: {}", join_error),
            )),
            Err(_) => {
                warn!(format = %format, timeout_secs = timeout.as_secs(), "extraction timed out");
                Err(Error::new(
                    ErrorKind::Timeout,
                    format!("{} extraction exceeded {}s", format, timeout.as_secs()),
                ))
            }
        }
    }

    pub fn handle_event(&self, event: CatalogEvent) -> Result<()> {
        match event {
            CatalogEvent::DocumentActivated { label, blob } => {
                self.on_document_activated(blob, label)?;
            }
            CatalogEvent::DocumentRemoved { label } => {
                self.on_document_removed(&label);
            }
        }
        Ok(())
    }

    pub fn on_document_activated(&self, blob: IndexBlob, label: impl Into<String>) -> Result<DocumentStatus> {
        self.state.switch(blob, label)
    }

    /// Activation from the JSON form the metadata store keeps.
    pub fn on_document_activated_json(&self, json: &str, label: impl Into<String>) -> Result<DocumentStatus> {
        let blob = IndexBlob::from_json(json)?;
        self.state.switch(blob, label)
    }

    /// Clears the active state if `label` is the active document.
    pub fn on_document_removed(&self, label: &str) -> bool {
        self.state.clear_if_active(label)
    }

    pub fn search_phrase(&self, query: &str) -> SearchResults {
        self.state.search_phrase(query)
    }

    pub fn autocomplete_prefix(&self, prefix: &str) -> Vec<String> {
        self.state.autocomplete_prefix(prefix)
    }

    pub fn status(&self) -> DocumentStatus {
        self.state.status()
    }
}

fn build_blob(extractor: &Extractor, bytes: &[u8], format: DocumentFormat) -> Result<IndexBlob> {
    let tokens = extractor.extract_tokens(bytes, format)?;
    let index = PositionalIndex::build(tokens);
    info!(
        format = %format,
        tokens = index.len(),
        vocabulary = index.vocabulary_size(),
        "document indexed"
    );
    Ok(index.to_blob())
}
