use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Snippet rendering
    pub max_snippets: usize,
    pub context_window: usize,

    // PDF text layer / OCR fallback
    pub min_text_layer_chars: usize,    // OCR runs when the trimmed text layer has fewer chars
    pub ocr_languages: String,
    pub ocr_dpi: u32,
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,

    pub extraction_timeout_secs: u64,

    pub no_document_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_snippets: 5,
            context_window: 15,

            min_text_layer_chars: 50,
            ocr_languages: "ind+eng".to_string(),
            ocr_dpi: 200,
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),

            extraction_timeout_secs: 120,

            no_document_label: "No document selected.".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with any `DOCDEX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        overlay(&lookup, "DOCDEX_MAX_SNIPPETS", &mut config.max_snippets)?;
        overlay(&lookup, "DOCDEX_CONTEXT_WINDOW", &mut config.context_window)?;
        overlay(&lookup, "DOCDEX_MIN_TEXT_LAYER_CHARS", &mut config.min_text_layer_chars)?;
        overlay(&lookup, "DOCDEX_OCR_DPI", &mut config.ocr_dpi)?;
        overlay(&lookup, "DOCDEX_EXTRACTION_TIMEOUT_SECS", &mut config.extraction_timeout_secs)?;

        if let Some(languages) = lookup("DOCDEX_OCR_LANGUAGES") {
            config.ocr_languages = languages;
        }
        if let Some(bin) = lookup("DOCDEX_PDFTOPPM_BIN") {
            config.pdftoppm_bin = bin;
        }
        if let Some(bin) = lookup("DOCDEX_TESSERACT_BIN") {
            config.tesseract_bin = bin;
        }
        if let Some(label) = lookup("DOCDEX_NO_DOCUMENT_LABEL") {
            config.no_document_label = label;
        }

        Ok(config)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

fn overlay<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|_| {
            Error::new(ErrorKind::InvalidInput, format!("{} has invalid value '{}'", key, raw))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = Config::default();
        assert_eq!(config.max_snippets, 5);
        assert_eq!(config.context_window, 15);
        assert_eq!(config.min_text_layer_chars, 50);
        assert_eq!(config.ocr_languages, "ind+eng");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DOCDEX_MAX_SNIPPETS", "3"),
            ("DOCDEX_OCR_LANGUAGES", "eng"),
        ]))
        .unwrap();

        assert_eq!(config.max_snippets, 3);
        assert_eq!(config.ocr_languages, "eng");
        assert_eq!(config.context_window, 15);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DOCDEX_OCR_DPI", "high")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(err.context.contains("DOCDEX_OCR_DPI"));
    }
}
