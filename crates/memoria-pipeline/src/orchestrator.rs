//! Per-document pipeline: acquire, extract, normalize, correct, render, store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use memoria_core::{
    Acquisition, Corrector, ExtractionResult, FieldExtractor, MemoriaConfig, MemoriaError,
    MemoriaResult, Normalizer, PipelineConfig,
};
use memoria_docx::{DocumentAssembler, DocxWriter};
use memoria_extractors::TextAcquirer;
use tracing::{debug, info, warn};

use crate::state::{AcquisitionSummary, PipelineState, RunReport};
use crate::storage::{file_stem, OutputStore};

/// Where a document's bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// One input document.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub source: DocumentSource,
}

impl Document {
    pub fn new(id: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    /// A file on disk, identified by its file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(id, DocumentSource::Path(path.to_path_buf()))
    }

    pub fn from_bytes(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(id, DocumentSource::Bytes(bytes))
    }
}

/// Result of the acquisition and extraction stages.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub acquisition: Acquisition,
    pub result: ExtractionResult,
    pub corrected: bool,
}

/// Runs documents through every stage.
///
/// Holds only read-only state, so one instance can be shared across
/// concurrent runs behind an `Arc`.
pub struct Pipeline {
    acquirer: Arc<dyn TextAcquirer>,
    extractor: FieldExtractor,
    normalizer: Normalizer,
    corrector: Option<Arc<dyn Corrector>>,
    assembler: DocumentAssembler,
    writer: DocxWriter,
    store: Arc<dyn OutputStore>,
    config: PipelineConfig,
    write_data: bool,
}

impl Pipeline {
    /// Create a pipeline. Fails only if a built-in pattern does not compile.
    pub fn new(
        config: &MemoriaConfig,
        acquirer: Arc<dyn TextAcquirer>,
        store: Arc<dyn OutputStore>,
    ) -> MemoriaResult<Self> {
        Ok(Self {
            acquirer,
            extractor: FieldExtractor::new(&config.extraction)?,
            normalizer: Normalizer::new(),
            corrector: None,
            assembler: DocumentAssembler::new(config.rendering.clone()),
            writer: DocxWriter::new(&config.rendering),
            store,
            config: config.pipeline.clone(),
            write_data: config.output.write_data,
        })
    }

    /// Attach the optional correction post-pass.
    pub fn with_corrector(mut self, corrector: Arc<dyn Corrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn has_corrector(&self) -> bool {
        self.corrector.is_some()
    }

    async fn acquire(&self, document: &Document) -> Acquisition {
        match &document.source {
            DocumentSource::Path(path) => self.acquirer.acquire_path(path).await,
            DocumentSource::Bytes(bytes) => self.acquirer.acquire(bytes).await,
        }
    }

    /// Acquire, extract, normalize and optionally correct one document.
    ///
    /// Missing fields are never an error. The only failure is an
    /// acquisition that produced nothing while
    /// `fail_on_empty_acquisition` is set.
    pub async fn extract(&self, document: &Document) -> MemoriaResult<Extraction> {
        let acquisition = self.acquire(document).await;
        info!(
            document_id = %document.id,
            method = %acquisition.text.method(),
            characters = acquisition.text.len(),
            degraded = acquisition.status.is_degraded(),
            "text acquired"
        );

        if acquisition.status.is_failed() {
            let reason = acquisition.status.reason().unwrap_or("unknown");
            if self.config.fail_on_empty_acquisition && acquisition.text.is_empty() {
                return Err(MemoriaError::acquisition(reason));
            }
            warn!(document_id = %document.id, reason, "acquisition failed, continuing with empty text");
        }

        let raw = self.extractor.extract(&acquisition.text);
        let mut result = self.normalizer.normalize(raw);
        debug!(
            document_id = %document.id,
            populated = ?result.populated_fields(),
            "fields extracted"
        );

        let mut corrected = false;
        if let Some(corrector) = &self.corrector {
            let outcome = corrector.correct(&result).await;
            corrected = outcome.is_corrected();
            info!(document_id = %document.id, corrected, "correction pass finished");
            result = outcome.into_result(result);
        }

        Ok(Extraction {
            acquisition,
            result,
            corrected,
        })
    }

    async fn render(
        &self,
        document_id: &str,
        result: &ExtractionResult,
        generated_at: NaiveDateTime,
        report: &mut RunReport,
    ) -> MemoriaResult<()> {
        let rendered = self.assembler.assemble(result, document_id, generated_at);

        let writer = self.writer.clone();
        let bytes = tokio::task::spawn_blocking(move || writer.write(&rendered))
            .await
            .map_err(|e| {
                MemoriaError::rendering(format!("docx task failed: {e}"), "docx package")
            })??;

        let data = if self.write_data {
            Some(serde_json::to_vec_pretty(result)?)
        } else {
            None
        };

        let artifact = format!("{}.docx", file_stem(document_id, generated_at));
        let stored = self
            .store
            .store(document_id, generated_at, bytes, data)
            .await
            .map_err(|e| MemoriaError::write_failed(artifact, e))?;
        report.output_path = Some(stored.document);
        report.data_path = stored.data;
        Ok(())
    }

    async fn execute(&self, document: &Document, report: &mut RunReport) -> MemoriaResult<()> {
        report.enter(PipelineState::Extracting)?;
        let extraction = self.extract(document).await?;
        report.acquisition = Some(AcquisitionSummary::from(&extraction.acquisition));
        report.corrected = extraction.corrected;

        report.enter(PipelineState::Rendering)?;
        let generated_at = Local::now().naive_local();
        let result = extraction.result;
        let rendered = self.render(&document.id, &result, generated_at, report).await;
        report.extraction = Some(result);
        rendered?;

        report.enter(PipelineState::Completed)?;
        Ok(())
    }

    /// Run one document to a terminal state.
    ///
    /// Never retries; reprocessing is calling `run` again.
    pub async fn run(&self, document: &Document) -> RunReport {
        let mut report = RunReport::new(document.id.clone());
        if let Err(e) = self.execute(document, &mut report).await {
            report.fail(&e);
        }
        report
    }
}
