use std::fmt;

use thiserror::Error;

/// Why an upstream quote call produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    NotConfigured,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotConfigured => write!(f, "quoting service not configured"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidBody => write!(f, "invalid response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct QuoteFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl QuoteFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The input table could not be turned into records.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("unsupported input format {0:?} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),
    #[error("input table has no header row")]
    MissingHeader,
    #[error("workbook has no worksheet")]
    NoWorksheet,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx read error: {0}")]
    ReadXlsx(#[from] calamine::XlsxError),
    #[error("xlsx write error: {0}")]
    WriteXlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("input file is empty")]
    EmptyInput,
    #[error("no result file available")]
    NoArtifact,
}
