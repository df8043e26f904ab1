//! DOCX serialization using docx-rs.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Footer, Paragraph, Run, RunFonts, Table, TableCell, TableRow,
};
use memoria_core::{MemoriaError, MemoriaResult, RenderingConfig};
use tracing::debug;

use crate::document::{Alignment, Block, RenderedDocument, TableBlock};

/// Writes a [`RenderedDocument`] as a `.docx` package.
#[derive(Debug, Clone)]
pub struct DocxWriter {
    font_family: String,
    /// docx sizes are in half-points.
    half_points: usize,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new(&RenderingConfig::default())
    }
}

impl DocxWriter {
    pub fn new(config: &RenderingConfig) -> Self {
        Self {
            font_family: config.font_family.clone(),
            half_points: config.font_size_pt as usize * 2,
        }
    }

    fn run(&self, text: &str, bold: bool) -> Run {
        let mut run = Run::new()
            .fonts(
                RunFonts::new()
                    .ascii(&self.font_family)
                    .hi_ansi(&self.font_family)
                    .cs(&self.font_family),
            )
            .size(self.half_points);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                run = run.add_break(BreakType::TextWrapping);
            }
            run = run.add_text(line);
        }
        if bold {
            run = run.bold();
        }
        run
    }

    fn paragraph(&self, text: &str, align: Alignment, bold: bool) -> Paragraph {
        let paragraph = Paragraph::new().add_run(self.run(text, bold));
        match align {
            Alignment::Left => paragraph,
            Alignment::Center => paragraph.align(AlignmentType::Center),
            Alignment::Right => paragraph.align(AlignmentType::Right),
        }
    }

    fn table(&self, block: &TableBlock) -> Table {
        let header = TableRow::new(
            block
                .headers
                .iter()
                .map(|h| TableCell::new().add_paragraph(self.paragraph(h, Alignment::Left, true)))
                .collect(),
        );
        let rows = block.rows.iter().map(|row| {
            TableRow::new(
                row.iter()
                    .map(|c| {
                        TableCell::new().add_paragraph(self.paragraph(c, Alignment::Left, false))
                    })
                    .collect(),
            )
        });
        Table::new(std::iter::once(header).chain(rows).collect())
    }

    /// Build the docx object model without packing it.
    pub fn build(&self, document: &RenderedDocument) -> Docx {
        let mut docx = Docx::new()
            .add_paragraph(self.paragraph(&document.title, Alignment::Center, true))
            .add_paragraph(self.paragraph(&document.generation_line(), Alignment::Left, false));

        for block in &document.blocks {
            docx = match block {
                Block::Heading(text) => docx.add_paragraph(self.paragraph(text, Alignment::Left, true)),
                Block::KeyValue { label, value } => docx.add_paragraph(
                    Paragraph::new()
                        .add_run(self.run(&format!("{label}: "), true))
                        .add_run(self.run(value, false)),
                ),
                Block::Paragraph { text, align, bold } => {
                    docx.add_paragraph(self.paragraph(text, *align, *bold))
                }
                Block::Bullet(text) => {
                    docx.add_paragraph(self.paragraph(&format!("• {text}"), Alignment::Left, false))
                }
                Block::Table(table) => docx.add_table(self.table(table)),
            };
        }

        docx.footer(Footer::new().add_paragraph(self.paragraph(
            &document.footer,
            Alignment::Center,
            false,
        )))
    }

    /// Serialize to the bytes of a `.docx` file.
    pub fn write(&self, document: &RenderedDocument) -> MemoriaResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.build(document)
            .build()
            .pack(&mut buffer)
            .map_err(|e| {
                MemoriaError::serialization(
                    format!("failed to pack docx: {e}"),
                    format!("memoria {}", document.document_id),
                )
            })?;
        let bytes = buffer.into_inner();
        debug!(document_id = %document.document_id, bytes = bytes.len(), "docx packed");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentAssembler;
    use chrono::NaiveDate;
    use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};
    use memoria_core::{BoundarySegment, ExtractionResult};

    fn paragraph_text(p: &docx_rs::Paragraph) -> String {
        let mut text = String::new();
        for child in &p.children {
            if let ParagraphChild::Run(r) = child {
                for run_child in &r.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
        }
        text
    }

    /// Paragraph texts and table rows, in document order.
    fn read_back(bytes: &[u8]) -> Vec<String> {
        let docx = docx_rs::read_docx(bytes).unwrap();
        let mut lines = Vec::new();
        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => lines.push(paragraph_text(&p)),
                DocumentChild::Table(t) => {
                    for row in &t.rows {
                        let TableChild::TableRow(r) = row;
                        let cells: Vec<String> = r
                            .cells
                            .iter()
                            .map(|cell| {
                                let TableRowChild::TableCell(c) = cell;
                                c.children
                                    .iter()
                                    .filter_map(|content| match content {
                                        TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                                        _ => None,
                                    })
                                    .collect::<Vec<_>>()
                                    .join(" ")
                            })
                            .collect();
                        lines.push(cells.join(" | "));
                    }
                }
                _ => {}
            }
        }
        lines
    }

    fn squash(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn rendered() -> RenderedDocument {
        let result = ExtractionResult {
            object: "Mensura y división".into(),
            boundary_segments: vec![BoundarySegment::compact("4-5", "2117.00")],
            full_text: "OBJETO: Mensura y división\nLADO 4-5=2117.00".into(),
            ..Default::default()
        };
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        DocumentAssembler::default().assemble(&result, "3", at)
    }

    #[test]
    fn test_written_docx_reads_back() {
        let bytes = DocxWriter::default().write(&rendered()).unwrap();
        assert!(bytes.starts_with(b"PK"));

        // Whitespace at run edges is not guaranteed to survive a round trip.
        let lines: Vec<String> = read_back(&bytes).iter().map(|l| squash(l)).collect();
        assert_eq!(lines[0], "MEMORIADESCRIPTIVA");
        assert_eq!(lines[1], squash("Documento generado el 01/06/2024 08:30:00"));
        for expected in [
            "OBJETO: Mensura y división",
            "Vértice | Rumbo | Lado | Medida (m) | Ángulo | Linderos",
            "— | — | 4-5 | 2117.00 | — | —",
            "OBJETO: Mensura y división\nLADO 4-5=2117.00",
        ] {
            assert!(lines.contains(&squash(expected)), "missing {expected:?}");
        }
    }

    #[test]
    fn test_same_document_same_text() {
        let writer = DocxWriter::default();
        let first = read_back(&writer.write(&rendered()).unwrap());
        let second = read_back(&writer.write(&rendered()).unwrap());
        assert_eq!(first, second);
    }
}
