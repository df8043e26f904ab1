//! PDF text acquisition using pdf-extract, with an optional OCR fallback.

use std::sync::Arc;

use async_trait::async_trait;
use memoria_core::{Acquisition, AcquisitionConfig, AcquisitionMethod, AcquisitionStatus, SourceText};
use tracing::{debug, info, warn};

use crate::error::{AcquireError, AcquireResult};
use crate::layout::{join_pages, visible_len};
use crate::{PageRecognizer, TextAcquirer};

/// PDF acquirer using the pdf-extract library.
///
/// Extracts embedded text per page, wrapping synchronous pdf-extract calls
/// in spawn_blocking. When the text is shorter than
/// `min_text_length` the document is treated as scanned and handed to the
/// page recognizer, if one is configured.
pub struct PdfTextAcquirer {
    config: AcquisitionConfig,
    recognizer: Option<Arc<dyn PageRecognizer>>,
}

impl PdfTextAcquirer {
    /// Create an acquirer without optical recognition.
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            recognizer: None,
        }
    }

    /// Attach a page recognizer for scanned documents.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn PageRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    async fn embedded_pages(content: &[u8]) -> AcquireResult<Vec<String>> {
        let content = content.to_vec();
        // pdf-extract panics on some malformed files; the join error catches it.
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&content)
                .map_err(|e| AcquireError::Pdf(e.to_string()))
        })
        .await?
    }

    async fn recognize(&self, recognizer: &dyn PageRecognizer, content: &[u8]) -> AcquireResult<Vec<String>> {
        match self.config.ocr_timeout() {
            // On expiry the blocking recognition task is detached, not killed.
            Some(limit) => tokio::time::timeout(limit, recognizer.recognize(content))
                .await
                .map_err(|_| AcquireError::Timeout(limit))?,
            None => recognizer.recognize(content).await,
        }
    }

    /// Decide the acquisition outcome from the embedded extraction result.
    pub(crate) async fn resolve(
        &self,
        content: &[u8],
        embedded: AcquireResult<Vec<String>>,
    ) -> Acquisition {
        let (embedded_text, page_count, embedded_error) = match embedded {
            Ok(pages) => (join_pages(&pages), Some(pages.len()), None),
            Err(e) => {
                warn!(error = %e, "embedded text extraction failed");
                (String::new(), None, Some(e))
            }
        };

        let embedded_len = visible_len(&embedded_text);
        if embedded_error.is_none() && embedded_len >= self.config.min_text_length {
            debug!(chars = embedded_len, "using embedded text");
            return finish(
                SourceText::new(embedded_text, AcquisitionMethod::Embedded),
                AcquisitionStatus::Extracted,
                page_count,
            );
        }

        let recognizer = match (&self.recognizer, self.config.ocr_enabled) {
            (Some(recognizer), true) => recognizer,
            _ => {
                let status = match embedded_error {
                    Some(e) => AcquisitionStatus::Failed {
                        reason: e.to_string(),
                    },
                    None => AcquisitionStatus::Degraded {
                        reason: format!(
                            "embedded text below {} characters and optical recognition unavailable",
                            self.config.min_text_length
                        ),
                    },
                };
                return finish(
                    SourceText::new(embedded_text, AcquisitionMethod::Embedded),
                    status,
                    page_count,
                );
            }
        };

        info!(
            chars = embedded_len,
            threshold = self.config.min_text_length,
            recognizer = recognizer.name(),
            "embedded text insufficient, running optical recognition"
        );

        match self.recognize(recognizer.as_ref(), content).await {
            Ok(pages) => {
                let recognized = join_pages(&pages);
                let page_count = page_count.or(Some(pages.len()));
                let recognized_len = visible_len(&recognized);
                debug!(chars = recognized_len, pages = pages.len(), "optical recognition finished");

                if recognized_len > 0 && recognized_len >= embedded_len {
                    finish(
                        SourceText::new(recognized, AcquisitionMethod::OpticalRecognition),
                        AcquisitionStatus::Extracted,
                        page_count,
                    )
                } else if embedded_len > 0 {
                    finish(
                        SourceText::new(embedded_text, AcquisitionMethod::Embedded),
                        AcquisitionStatus::Extracted,
                        page_count,
                    )
                } else {
                    finish(
                        SourceText::new(String::new(), AcquisitionMethod::OpticalRecognition),
                        AcquisitionStatus::Empty,
                        page_count,
                    )
                }
            }
            Err(e) => {
                warn!(error = %e, "optical recognition failed");
                if embedded_len > 0 {
                    finish(
                        SourceText::new(embedded_text, AcquisitionMethod::Embedded),
                        AcquisitionStatus::Degraded {
                            reason: e.to_string(),
                        },
                        page_count,
                    )
                } else {
                    let reason = match embedded_error {
                        Some(embedded) => format!("{embedded}; {e}"),
                        None => e.to_string(),
                    };
                    finish(
                        SourceText::empty(),
                        AcquisitionStatus::Failed { reason },
                        page_count,
                    )
                }
            }
        }
    }
}

fn finish(text: SourceText, status: AcquisitionStatus, page_count: Option<usize>) -> Acquisition {
    let acquisition = Acquisition::new(text, status);
    match page_count {
        Some(n) => acquisition.with_page_count(n),
        None => acquisition,
    }
}

#[async_trait]
impl TextAcquirer for PdfTextAcquirer {
    async fn acquire(&self, content: &[u8]) -> Acquisition {
        let embedded = Self::embedded_pages(content).await;
        self.resolve(content, embedded).await
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct StubRecognizer {
        pages: Option<Vec<&'static str>>,
        delay: Duration,
    }

    #[async_trait]
    impl PageRecognizer for StubRecognizer {
        async fn recognize(&self, _content: &[u8]) -> AcquireResult<Vec<String>> {
            tokio::time::sleep(self.delay).await;
            match &self.pages {
                Some(pages) => Ok(pages.iter().map(|p| p.to_string()).collect()),
                None => Err(AcquireError::Recognition("tesseract exited with 1".into())),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn recognizer(pages: Option<Vec<&'static str>>) -> Arc<dyn PageRecognizer> {
        Arc::new(StubRecognizer {
            pages,
            delay: Duration::ZERO,
        })
    }

    fn config(min_text_length: usize) -> AcquisitionConfig {
        AcquisitionConfig {
            min_text_length,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_long_embedded_text_skips_recognition() {
        let acquirer = PdfTextAcquirer::new(config(10)).with_recognizer(recognizer(None));
        let acq = acquirer
            .resolve(b"", Ok(vec!["OBJETO:  Mensura y división".to_string()]))
            .await;
        assert_eq!(acq.status, AcquisitionStatus::Extracted);
        assert_eq!(acq.text.method(), AcquisitionMethod::Embedded);
        assert_eq!(acq.text.as_str(), "OBJETO: Mensura y división");
        assert_eq!(acq.page_count, Some(1));
    }

    #[tokio::test]
    async fn test_short_text_falls_back_to_recognition() {
        let acquirer = PdfTextAcquirer::new(config(100))
            .with_recognizer(recognizer(Some(vec!["LUGAR: Campo  Norte", "OBJETO: Mensura"])));
        let acq = acquirer.resolve(b"", Ok(vec!["  ".to_string(), String::new()])).await;
        assert_eq!(acq.status, AcquisitionStatus::Extracted);
        assert_eq!(acq.text.method(), AcquisitionMethod::OpticalRecognition);
        assert_eq!(acq.text.as_str(), "LUGAR: Campo Norte\nOBJETO: Mensura");
        assert_eq!(acq.page_count, Some(2));
    }

    #[tokio::test]
    async fn test_unreadable_without_recognizer_fails() {
        let acquirer = PdfTextAcquirer::new(config(100));
        let acq = acquirer
            .resolve(b"", Err(AcquireError::Pdf("invalid header".into())))
            .await;
        assert!(acq.status.is_failed());
        assert!(acq.text.is_empty());
        assert!(acq.status.reason().unwrap().contains("invalid header"));
    }

    #[tokio::test]
    async fn test_short_text_without_recognizer_is_degraded() {
        let acquirer = PdfTextAcquirer::new(config(100));
        let acq = acquirer.resolve(b"", Ok(vec!["LUGAR: X".to_string()])).await;
        assert!(acq.status.is_degraded());
        assert_eq!(acq.text.as_str(), "LUGAR: X");
    }

    #[tokio::test]
    async fn test_recognition_failure_keeps_short_embedded_text() {
        let acquirer = PdfTextAcquirer::new(config(100)).with_recognizer(recognizer(None));
        let acq = acquirer.resolve(b"", Ok(vec!["LUGAR: X".to_string()])).await;
        assert!(acq.status.is_degraded());
        assert_eq!(acq.text.as_str(), "LUGAR: X");
    }

    #[tokio::test]
    async fn test_total_failure() {
        let acquirer = PdfTextAcquirer::new(config(100)).with_recognizer(recognizer(None));
        let acq = acquirer
            .resolve(b"", Err(AcquireError::Pdf("truncated".into())))
            .await;
        assert!(acq.status.is_failed());
        let reason = acq.status.reason().unwrap();
        assert!(reason.contains("truncated"));
        assert!(reason.contains("tesseract"));
    }

    #[tokio::test]
    async fn test_recognition_timeout() {
        let slow = Arc::new(StubRecognizer {
            pages: Some(vec!["never"]),
            delay: Duration::from_secs(5),
        });
        let acquirer = PdfTextAcquirer::new(AcquisitionConfig {
            ocr_timeout_secs: Some(0),
            ..Default::default()
        })
        .with_recognizer(slow);
        let acq = acquirer.resolve(b"", Ok(vec![String::new()])).await;
        assert!(acq.status.is_failed());
        assert!(acq.status.reason().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_blank_scan_is_empty() {
        let acquirer =
            PdfTextAcquirer::new(config(100)).with_recognizer(recognizer(Some(vec!["", " \n"])));
        let acq = acquirer.resolve(b"", Ok(vec![String::new(), String::new()])).await;
        assert_eq!(acq.status, AcquisitionStatus::Empty);
        assert!(acq.text.is_empty());
    }

    #[tokio::test]
    async fn test_ocr_disabled_by_config() {
        let acquirer = PdfTextAcquirer::new(AcquisitionConfig {
            ocr_enabled: false,
            ..Default::default()
        })
        .with_recognizer(recognizer(Some(vec!["texto"])));
        let acq = acquirer.resolve(b"", Ok(vec!["corto".to_string()])).await;
        assert!(acq.status.is_degraded());
        assert_eq!(acq.text.method(), AcquisitionMethod::Embedded);
    }

    #[tokio::test]
    async fn test_garbage_bytes_do_not_panic() {
        let acq = PdfTextAcquirer::new(config(100))
            .acquire(b"definitely not a pdf")
            .await;
        assert!(acq.status.is_failed());
    }
}
