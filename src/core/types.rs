use serde::{Serialize, Deserialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use crate::core::error::{Error, ErrorKind};

/// A normalized word. Equality is plain string equality.
pub type Token = String;

/// Zero-based index into a document's token sequence.
pub type Position = u32;

/// Declared format of the raw bytes handed to the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    PlainText,
    Docx,
    Xlsx,
    Pdf,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Some(DocumentFormat::PlainText),
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

/// Parses an extension (`"pdf"`, `".PDF"`) or a file name (`"report.pdf"`).
impl FromStr for DocumentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentFormat::from_extension(s)
            .or_else(|| DocumentFormat::from_filename(s))
            .ok_or_else(|| Error::new(ErrorKind::UnsupportedFormat, format!("unsupported file type '{}'", s)))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_reports_unsupported_types() {
        assert_eq!("report.PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!(".xlsx".parse::<DocumentFormat>().unwrap(), DocumentFormat::Xlsx);

        let err = "slides.pptx".parse::<DocumentFormat>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedFormat);
        assert!(err.is_extraction_failure());
    }

    #[test]
    fn recognises_supported_extensions() {
        assert_eq!(DocumentFormat::from_filename("report.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("notes.txt"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension(".xlsx"), Some(DocumentFormat::Xlsx));
        assert_eq!(DocumentFormat::from_extension("docx"), Some(DocumentFormat::Docx));
    }

    #[test]
    fn rejects_unknown_or_missing_extensions() {
        assert_eq!(DocumentFormat::from_filename("archive.tar.gz"), None);
        assert_eq!(DocumentFormat::from_filename("README"), None);
    }
}
