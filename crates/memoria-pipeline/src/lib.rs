//! memoria-pipeline - Orchestration of the memoria pipeline.
//!
//! A [`Pipeline`] takes one survey plan through
//! `pending → extracting → rendering → completed` (or `error`), writing the
//! rendered memoria and its extraction JSON through an [`OutputStore`].
//! [`BatchRunner`] runs many documents with bounded concurrency.
//!
//! # Example
//!
//! ```ignore
//! use memoria_pipeline::{create_pipeline, Document};
//!
//! let pipeline = create_pipeline(&MemoriaConfig::from_env(), false)?;
//! let report = pipeline.run(&Document::from_path("plano_17.pdf")).await;
//! println!("{} -> {}", report.document_id, report.state);
//! ```

mod batch;
mod factory;
mod orchestrator;
mod state;
pub mod storage;

pub use batch::BatchRunner;
pub use factory::{create_corrector, create_pipeline};
pub use orchestrator::{Document, DocumentSource, Extraction, Pipeline};
pub use state::{AcquisitionSummary, PipelineState, RunReport};
pub use storage::{FsOutputStore, OutputStore, StoredOutput};
