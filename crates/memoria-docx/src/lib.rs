//! memoria-docx - Assembly and DOCX rendering of a memoria descriptiva.
//!
//! [`DocumentAssembler`] lays out an [`ExtractionResult`](memoria_core::ExtractionResult)
//! as an ordered list of sections ([`RenderedDocument`]); [`DocxWriter`]
//! turns that into the bytes of a Word document.
//!
//! # Example
//!
//! ```ignore
//! use memoria_docx::{DocumentAssembler, DocxWriter};
//!
//! let assembler = DocumentAssembler::new(config.rendering.clone());
//! let document = assembler.assemble(&result, "42", chrono::Local::now().naive_local());
//! let bytes = DocxWriter::new(&config.rendering).write(&document)?;
//! ```

mod assembler;
pub mod document;
mod writer;

pub use assembler::DocumentAssembler;
pub use document::{Alignment, Block, RenderedDocument, TableBlock, EMPTY_CELL};
pub use writer::DocxWriter;
