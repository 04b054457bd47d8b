// Typed failures surfaced at the I/O and collaborator boundaries.
// Windowing, metrics and aggregation never fail; they return zero-valued structures.

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by an injected linguistic collaborator (annotator, scorer, phonemizer)
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotator backend failed: {0}")]
    Backend(String),

    #[error("annotator rejected input: {0}")]
    Rejected(String),
}

/// Errors the pipeline hands back to the top-level caller
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("cannot extract text from {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source {path} is not valid UTF-8 text")]
    InvalidEncoding { path: PathBuf },

    #[error("annotation failed for segment '{segment}': {source}")]
    Annotation {
        segment: String,
        #[source]
        source: AnnotationError,
    },

    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("cannot write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CadenceError {
    /// True for failures that must abort the run before any report is written
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::InvalidEncoding { .. })
    }

    pub fn annotation(segment: impl Into<String>, source: AnnotationError) -> Self {
        Self::Annotation {
            segment: segment.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CadenceError>;
