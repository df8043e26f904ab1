//! memoria-core - Core library for memoria.
//!
//! This crate provides the data model, field extraction registry,
//! normalization and correction contract used to turn the text of a survey
//! plan into the fields of a memoria descriptiva.
//!
//! # Example
//!
//! ```ignore
//! use memoria_core::{ExtractionConfig, FieldExtractor, Normalizer, SourceText, AcquisitionMethod};
//!
//! let extractor = FieldExtractor::new(&ExtractionConfig::default())?;
//! let text = SourceText::new("OBJETO: Mensura y división\n", AcquisitionMethod::Embedded);
//! let result = Normalizer::new().normalize(extractor.extract(&text));
//! assert_eq!(result.object, "Mensura y división");
//! ```

pub mod config;
pub mod corrector;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{
    AcquisitionConfig, ExtractionConfig, GeneratorProvider, GeneratorProviderConfig,
    MemoriaConfig, OutputConfig, PipelineConfig, RenderingConfig,
};
pub use corrector::{CorrectionOutcome, Corrector, LlmCorrector};
pub use error::{ErrorCode, MemoriaError, MemoriaResult};
pub use extract::FieldExtractor;
pub use normalize::Normalizer;
pub use traits::{GenerationOptions, GeneratorConfig, TextGenerator};
pub use types::{
    Acquisition, AcquisitionMethod, AcquisitionStatus, BoundarySegment, DomainRecord,
    ExtractionResult, FieldRecord, FieldValue, GeodeticPoint, Owner, ParcelArea, SourceText,
    FIELD_KEYS, UNSPECIFIED,
};
