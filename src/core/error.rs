use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Extraction,
    UnsupportedFormat,
    MalformedIndex,
    InvalidInput,
    Timeout,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn extraction(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Extraction, context.into())
    }

    pub fn malformed_index(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedIndex, context.into())
    }

    pub fn is_extraction_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::Extraction | ErrorKind::UnsupportedFormat | ErrorKind::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::MalformedIndex,
            context: format!("JSON index blob: {}", err),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::MalformedIndex,
            context: format!("binary index blob: {}", err),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error {
            kind: ErrorKind::Extraction,
            context: format!("archive error: {}", err),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error {
            kind: ErrorKind::Extraction,
            context: format!("XML error: {}", err),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error {
            kind: ErrorKind::Extraction,
            context: format!("PDF error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
