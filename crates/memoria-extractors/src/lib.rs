//! memoria-extractors - Text acquisition for survey-plan PDFs.
//!
//! Embedded text is preferred; when it is missing or shorter than the
//! configured threshold the pages are rendered and run through OCR.
//! Acquisition never aborts a pipeline: failures are reported through
//! [`AcquisitionStatus`](memoria_core::AcquisitionStatus).
//!
//! # Features
//!
//! - `pdf` (default) - embedded text extraction via pdf-extract
//! - `ocr` - page rendering via pdfium and OCR via tesseract (requires both installed)
//! - `full` - all acquisition features
//!
//! # Example
//!
//! ```ignore
//! use memoria_extractors::AcquirerFactory;
//!
//! let acquirer = AcquirerFactory::from_config(&config.acquisition);
//! let acquisition = acquirer.acquire_path(Path::new("plano.pdf")).await;
//! ```

mod error;
mod factory;
pub mod layout;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "ocr")]
mod ocr;

pub use error::{AcquireError, AcquireResult};
pub use factory::AcquirerFactory;

#[cfg(feature = "pdf")]
pub use pdf::PdfTextAcquirer;

#[cfg(feature = "ocr")]
pub use ocr::TesseractRecognizer;

use std::path::Path;

use async_trait::async_trait;
use memoria_core::Acquisition;
use tracing::warn;

/// Core acquisition trait - obtains the flat text of one document.
#[async_trait]
pub trait TextAcquirer: Send + Sync {
    /// Acquire text from document bytes. Failures are carried in the status.
    async fn acquire(&self, content: &[u8]) -> Acquisition;

    /// Read a document from disk and acquire its text.
    async fn acquire_path(&self, path: &Path) -> Acquisition {
        match tokio::fs::read(path).await {
            Ok(content) => self.acquire(&content).await,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document could not be read");
                Acquisition::failed(AcquireError::Io(e).to_string())
            }
        }
    }

    /// Human-readable name for this acquirer.
    fn name(&self) -> &str;
}

/// Renders pages and recognizes their text.
#[async_trait]
pub trait PageRecognizer: Send + Sync {
    /// Recognized text per page, in page order.
    async fn recognize(&self, content: &[u8]) -> AcquireResult<Vec<String>>;

    /// Human-readable name for this recognizer.
    fn name(&self) -> &str;
}
