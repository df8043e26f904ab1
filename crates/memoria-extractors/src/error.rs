//! Acquisition error types.

use std::time::Duration;

use memoria_core::{ErrorCode, MemoriaError};
use thiserror::Error;

/// Errors that can occur while obtaining the text of a document.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The PDF could not be parsed.
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// Optical recognition ran but failed.
    #[error("Optical recognition failed: {0}")]
    Recognition(String),

    /// Tesseract or pdfium is not installed.
    #[error("Optical recognition unavailable: {0}")]
    RecognizerUnavailable(String),

    /// Optical recognition exceeded the caller's time limit.
    #[error("Optical recognition timed out after {0:?}")]
    Timeout(Duration),

    /// IO error reading the document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type for acquisition operations.
pub type AcquireResult<T> = Result<T, AcquireError>;

impl AcquireError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Recognition(_) | Self::RecognizerUnavailable(_) => ErrorCode::AcqRecognitionFailed,
            Self::Timeout(_) => ErrorCode::AcqTimeout,
            _ => ErrorCode::AcqUnreadableDocument,
        }
    }
}

impl From<AcquireError> for MemoriaError {
    fn from(err: AcquireError) -> Self {
        MemoriaError::Acquisition {
            message: err.to_string(),
            code: err.code(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_into_acquisition_error() {
        let err: MemoriaError = AcquireError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(err.code(), ErrorCode::AcqTimeout);
        assert!(err.to_string().contains("timed out"));

        let err: MemoriaError = AcquireError::RecognizerUnavailable("tesseract".into()).into();
        assert_eq!(err.code(), ErrorCode::AcqRecognitionFailed);
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_pdf_error_is_unreadable_document() {
        assert_eq!(
            AcquireError::Pdf("bad xref".into()).code(),
            ErrorCode::AcqUnreadableDocument
        );
    }
}
