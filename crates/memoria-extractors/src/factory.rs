//! Factory for creating acquirers.

use std::sync::Arc;

use memoria_core::{AcquisitionConfig, MemoriaResult};
use tracing::warn;

use crate::{PageRecognizer, TextAcquirer};

#[cfg(feature = "pdf")]
use crate::PdfTextAcquirer;

#[cfg(feature = "ocr")]
use crate::TesseractRecognizer;

/// Factory for creating text acquirers.
pub struct AcquirerFactory;

impl AcquirerFactory {
    /// Create a PDF acquirer that only reads embedded text.
    #[cfg(feature = "pdf")]
    pub fn pdf(config: &AcquisitionConfig) -> Arc<dyn TextAcquirer> {
        Arc::new(PdfTextAcquirer::new(config.clone()))
    }

    /// Create the OCR page recognizer.
    #[cfg(feature = "ocr")]
    pub fn recognizer(config: &AcquisitionConfig) -> MemoriaResult<Arc<dyn PageRecognizer>> {
        Ok(Arc::new(TesseractRecognizer::new(config)?))
    }

    /// OCR support was not compiled in.
    #[cfg(not(feature = "ocr"))]
    pub fn recognizer(_config: &AcquisitionConfig) -> MemoriaResult<Arc<dyn PageRecognizer>> {
        Err(memoria_core::MemoriaError::from(
            crate::AcquireError::RecognizerUnavailable(
                "built without the `ocr` feature".to_string(),
            ),
        ))
    }

    /// Create a PDF acquirer with OCR fallback when enabled and available.
    ///
    /// A missing Tesseract or pdfium installation is logged and the
    /// acquirer falls back to embedded text only.
    #[cfg(feature = "pdf")]
    pub fn from_config(config: &AcquisitionConfig) -> Arc<dyn TextAcquirer> {
        let mut acquirer = PdfTextAcquirer::new(config.clone());
        if config.ocr_enabled {
            match Self::recognizer(config) {
                Ok(recognizer) => acquirer = acquirer.with_recognizer(recognizer),
                Err(e) => warn!(error = %e, "optical recognition disabled"),
            }
        }
        Arc::new(acquirer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoria_core::ErrorCode;

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn test_recognizer_unavailable_without_feature() {
        let err = AcquirerFactory::recognizer(&AcquisitionConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::AcqRecognitionFailed);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_from_config_without_ocr() {
        let config = AcquisitionConfig {
            ocr_enabled: false,
            ..Default::default()
        };
        let acquirer = AcquirerFactory::from_config(&config);
        assert_eq!(acquirer.name(), "pdf-extract");
        let acq = acquirer.acquire(b"%PDF-broken").await;
        assert!(acq.status.is_failed());
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_missing_file_is_failed_acquisition() {
        let acquirer = AcquirerFactory::pdf(&AcquisitionConfig::default());
        let acq = acquirer
            .acquire_path(std::path::Path::new("/nonexistent/plano.pdf"))
            .await;
        assert!(acq.status.is_failed());
        assert!(acq.status.reason().unwrap().contains("IO error"));
    }
}
