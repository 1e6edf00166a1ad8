use lopdf::Document;
use tracing::{info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::extract::ocr::TesseractOcr;

/// The two ways text can be pulled out of a PDF.
pub trait PdfTextSource: Send + Sync {
    /// Text layer of every page, concatenated in page order.
    fn extract_direct(&self, bytes: &[u8]) -> Result<String>;

    /// Rasterize each page and run OCR on it, concatenated in page order.
    fn extract_via_ocr(&self, bytes: &[u8]) -> Result<String>;
}

/// `lopdf` for the text layer, external rasterizer + OCR engine for scans.
pub struct PdfToolchain {
    ocr: TesseractOcr,
}

impl PdfToolchain {
    pub fn new(ocr: TesseractOcr) -> Self {
        PdfToolchain { ocr }
    }

    pub fn from_config(config: &Config) -> Self {
        PdfToolchain::new(TesseractOcr::from_config(config))
    }
}

impl PdfTextSource for PdfToolchain {
    fn extract_direct(&self, bytes: &[u8]) -> Result<String> {
        let document = Document::load_mem(bytes)?;
        let mut text = String::new();
        for page_number in document.get_pages().keys() {
            text.push_str(&document.extract_text(&[*page_number])?);
        }
        Ok(text)
    }

    fn extract_via_ocr(&self, bytes: &[u8]) -> Result<String> {
        self.ocr.recognize_pdf(bytes)
    }
}

/// Text layer first; OCR when the layer is unreadable or has fewer than
/// `min_text_layer_chars` non-blank characters (a heuristic for scanned input).
pub fn extract(source: &dyn PdfTextSource, bytes: &[u8], min_text_layer_chars: usize) -> Result<String> {
    let direct_error = match source.extract_direct(bytes) {
        Ok(text) => {
            let chars = text.trim().chars().count();
            if chars >= min_text_layer_chars {
                return Ok(text);
            }
            warn!(chars, threshold = min_text_layer_chars, "PDF text layer too short, treating as scanned");
            None
        }
        Err(e) => {
            warn!(error = %e, "PDF text layer unreadable, falling back to OCR");
            Some(e)
        }
    };

    match source.extract_via_ocr(bytes) {
        Ok(text) => {
            info!(chars = text.len(), "PDF text recovered by OCR");
            Ok(text)
        }
        Err(ocr_error) => Err(match direct_error {
            Some(direct) => Error::extraction(format!(
                "text layer failed ({}) and OCR failed ({})",
                direct.context, ocr_error.context
            )),
            None => Error::extraction(format!("OCR fallback failed: {}", ocr_error.context)),
        }),
    }
}
