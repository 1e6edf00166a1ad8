//! Raw bytes + declared format → normalized token sequence.

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod plain;
pub mod xlsx;
mod xml;

use std::sync::Arc;
use tracing::info;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{DocumentFormat, Token};
use crate::extract::pdf::{PdfTextSource, PdfToolchain};

#[derive(Clone)]
pub struct Extractor {
    analyzer: Analyzer,
    pdf: Arc<dyn PdfTextSource>,
    min_text_layer_chars: usize,
}

impl Extractor {
    pub fn new(config: &Config) -> Self {
        Extractor {
            analyzer: Analyzer::document(),
            pdf: Arc::new(PdfToolchain::from_config(config)),
            min_text_layer_chars: config.min_text_layer_chars,
        }
    }

    /// Swaps the PDF text/OCR strategy.
    pub fn with_pdf_source(mut self, source: Arc<dyn PdfTextSource>) -> Self {
        self.pdf = source;
        self
    }

    /// Raw text before normalization.
    pub fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::PlainText => Ok(plain::extract(bytes)),
            DocumentFormat::Docx => docx::extract(bytes),
            DocumentFormat::Xlsx => xlsx::extract(bytes),
            DocumentFormat::Pdf => pdf::extract(self.pdf.as_ref(), bytes, self.min_text_layer_chars),
        }
    }

    /// Normalized tokens. An extraction that leaves no tokens is a failure.
    pub fn extract_tokens(&self, bytes: &[u8], format: DocumentFormat) -> Result<Vec<Token>> {
        let text = self.extract_text(bytes, format).map_err(|e| {
            Error::extraction(format!("{} extraction failed: {}", format, e.context))
        })?;

        let tokens = self.analyzer.analyze(&text);
        if tokens.is_empty() {
            return Err(Error::extraction(format!("{} document has no indexable text", format)));
        }

        info!(
            format = %format,
            analyzer = %self.analyzer.pipeline(),
            tokens = tokens.len(),
            "extracted document text"
        );
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn plain_text_is_normalized() {
        let extractor = Extractor::new(&Config::default());
        let tokens = extractor
            .extract_tokens(b"Hello, World! Hello again.", DocumentFormat::PlainText)
            .unwrap();
        assert_eq!(tokens, vec!["hello", "world", "hello", "again"]);
    }

    #[test]
    fn punctuation_only_text_fails() {
        let extractor = Extractor::new(&Config::default());
        let err = extractor.extract_tokens(b" ... --- !!! ", DocumentFormat::PlainText).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }

    #[test]
    fn corrupt_office_files_fail() {
        let extractor = Extractor::new(&Config::default());
        for format in [DocumentFormat::Docx, DocumentFormat::Xlsx] {
            let err = extractor.extract_tokens(b"garbage", format).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Extraction);
            assert!(err.context.starts_with(format.extension()));
        }
    }
}
