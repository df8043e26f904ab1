//! OCR of scanned survey plans.
//!
//! Pages are rendered with pdfium and recognized with Tesseract. Both are
//! native dependencies that must be installed on the host.

use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use memoria_core::AcquisitionConfig;
use pdfium_render::prelude::*;
use rusty_tesseract::{Args, Image};
use tracing::{debug, trace, warn};

use crate::error::{AcquireError, AcquireResult};
use crate::PageRecognizer;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Page recognizer backed by pdfium and Tesseract.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
    dpi: u32,
}

impl TesseractRecognizer {
    /// Create a recognizer, checking that Tesseract and pdfium can be loaded.
    pub fn new(config: &AcquisitionConfig) -> AcquireResult<Self> {
        rusty_tesseract::get_tesseract_version()
            .map_err(|e| AcquireError::RecognizerUnavailable(format!("tesseract: {e}")))?;
        bind_pdfium()?;
        Ok(Self {
            language: config.ocr_language.clone(),
            dpi: config.ocr_dpi,
        })
    }
}

fn bind_pdfium() -> AcquireResult<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| AcquireError::RecognizerUnavailable(format!("pdfium: {e}")))?;
    Ok(Pdfium::new(bindings))
}

fn render_page(page: &PdfPage, dpi: u32) -> AcquireResult<DynamicImage> {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let width = (page.width().value * scale) as i32;

    let bitmap = page
        .render_with_config(&PdfRenderConfig::new().set_target_width(width))
        .map_err(|e| AcquireError::Recognition(format!("render failed: {e}")))?;

    let rgba = RgbaImage::from_raw(
        bitmap.width() as u32,
        bitmap.height() as u32,
        bitmap.as_rgba_bytes(),
    )
    .ok_or_else(|| AcquireError::Recognition("rendered bitmap has unexpected size".into()))?;

    // Tesseract does best on grayscale.
    Ok(DynamicImage::ImageLuma8(DynamicImage::ImageRgba8(rgba).to_luma8()))
}

fn recognize_blocking(content: &[u8], language: &str, dpi: u32) -> AcquireResult<Vec<String>> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(content, None)
        .map_err(|e| AcquireError::Pdf(e.to_string()))?;

    let args = Args {
        lang: language.to_string(),
        dpi: Some(dpi as i32),
        ..Args::default()
    };

    let page_count = document.pages().len() as usize;
    debug!(pages = page_count, language, dpi, "rendering pages for OCR");

    let mut texts = Vec::with_capacity(page_count);
    let mut failures = 0usize;
    for (index, page) in document.pages().iter().enumerate() {
        let recognized = render_page(&page, dpi).and_then(|image| {
            let image = Image::from_dynamic_image(&image)
                .map_err(|e| AcquireError::Recognition(e.to_string()))?;
            rusty_tesseract::image_to_string(&image, &args)
                .map_err(|e| AcquireError::Recognition(e.to_string()))
        });
        match recognized {
            Ok(text) => {
                trace!(page = index + 1, chars = text.len(), "page recognized");
                texts.push(text);
            }
            Err(e) => {
                warn!(page = index + 1, error = %e, "OCR failed for page");
                failures += 1;
                texts.push(String::new());
            }
        }
    }

    if page_count > 0 && failures == page_count {
        return Err(AcquireError::Recognition(format!(
            "all {page_count} pages failed"
        )));
    }
    Ok(texts)
}

#[async_trait]
impl PageRecognizer for TesseractRecognizer {
    async fn recognize(&self, content: &[u8]) -> AcquireResult<Vec<String>> {
        let content = content.to_vec();
        let language = self.language.clone();
        let dpi = self.dpi;

        // Run pdfium and Tesseract in a blocking task to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || recognize_blocking(&content, &language, dpi)).await?
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
