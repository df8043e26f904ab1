//! Builds the fixed section layout of a memoria from an extraction result.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use memoria_core::types::{is_unspecified, or_unspecified};
use memoria_core::{ExtractionResult, RenderingConfig, UNSPECIFIED};
use tracing::debug;

use crate::document::{Alignment, Block, RenderedDocument, TableBlock, EMPTY_CELL};

const AREA_HEADERS: [&str; 3] = ["Designación", "Superficie", "Observaciones"];
const BOUNDARY_HEADERS: [&str; 6] = [
    "Vértice",
    "Rumbo",
    "Lado",
    "Medida (m)",
    "Ángulo",
    "Linderos",
];
const COORDINATE_HEADERS: [&str; 5] = ["Punto", "Latitud", "Longitud", "Norte GK", "Este GK"];

const AREA_CAPTION: &str = "(Nota: Los valores exactos de cada superficie deben transcribirse \
     de la Planilla de Superficies del plano)";
const DEFAULT_BOUNDARY_STATEMENT: &str = "Según plano de mensura.";

/// Cell text, or the em-dash placeholder for unknown values.
fn cell(value: &str) -> String {
    if is_unspecified(value) {
        EMPTY_CELL.to_string()
    } else {
        value.trim().to_string()
    }
}

/// Reference lines in order, without blanks or repeats.
fn reference_lines(references: &str) -> Vec<String> {
    if is_unspecified(references) {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    references
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

/// Assembles [`RenderedDocument`]s.
///
/// Section order and text are fixed; only the generation timestamp varies
/// between two assemblies of the same result.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    config: RenderingConfig,
}

impl DocumentAssembler {
    pub fn new(config: RenderingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderingConfig {
        &self.config
    }

    /// Lay out one memoria.
    pub fn assemble(
        &self,
        result: &ExtractionResult,
        document_id: &str,
        generated_at: NaiveDateTime,
    ) -> RenderedDocument {
        let mut blocks = Vec::new();

        self.header(result, &mut blocks);
        self.title_extract(result, &mut blocks);
        self.operations(result, &mut blocks);
        self.area_table(result, &mut blocks);
        self.boundary_table(result, &mut blocks);
        self.sketch_and_references(result, &mut blocks);
        self.appendix(result, &mut blocks);
        self.coordinate_table(result, &mut blocks);
        self.closing(result, &mut blocks);

        debug!(
            document_id,
            blocks = blocks.len(),
            coordinates = !result.geodetic_points.is_empty(),
            "memoria assembled"
        );

        RenderedDocument {
            document_id: document_id.to_string(),
            title: self.config.title.clone(),
            generated_at,
            blocks,
            footer: self.config.footer.clone(),
        }
    }

    fn header(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        blocks.push(Block::key_value("DEPARTAMENTO", or_unspecified(&result.department)));
        blocks.push(Block::key_value("PADRON", result.cadastral_summary()));
        blocks.push(Block::key_value("LUGAR", or_unspecified(&result.place)));
        blocks.push(Block::key_value("DOMINIO", result.domain_summary()));
        if !is_unspecified(&result.centroid) {
            blocks.push(Block::key_value(
                "BARICENTRO GEOGRÁFICO",
                result.centroid.trim(),
            ));
        }
        blocks.push(Block::key_value("OBJETO", or_unspecified(&result.object)));
        blocks.push(Block::key_value("INMUEBLE", or_unspecified(&result.property)));
        blocks.push(Block::key_value("TITULAR", result.owner_summary()));
        blocks.push(Block::key_value(
            "FECHA DE OPERACIÓN",
            or_unspecified(&result.operation_date),
        ));
    }

    fn title_extract(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        let statement = if is_unspecified(&result.boundary_statement) {
            DEFAULT_BOUNDARY_STATEMENT
        } else {
            result.boundary_statement.trim()
        };
        blocks.push(Block::Heading("1. EXTRACTO DE TÍTULO".into()));
        blocks.push(Block::paragraph(format!("Dominio: {}", result.domain_summary())));
        blocks.push(Block::paragraph(format!(
            "Inmueble: {}",
            or_unspecified(&result.property)
        )));
        blocks.push(Block::paragraph(format!("Medidas y Linderos: {statement}")));
    }

    fn operations(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        blocks.push(Block::Heading("2. DESCRIPCIÓN DE LAS OPERACIONES".into()));
        blocks.push(Block::paragraph(or_unspecified(&result.description)));
        for (n, note) in [(1, &result.note1), (2, &result.note2)] {
            if !is_unspecified(note) {
                blocks.push(Block::paragraph(format!("Nota {n}: {}", note.trim())));
            }
        }
    }

    fn area_table(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        blocks.push(Block::Heading("3. PLANILLA DE SUPERFICIES".into()));
        let mut table = TableBlock::new(AREA_HEADERS);
        for area in &result.parcel_areas {
            table.push_row(vec![
                or_unspecified(&area.label),
                area.surface(),
                cell(&area.notes),
            ]);
        }
        let empty = table.rows.is_empty();
        if empty {
            table.push_row(vec![UNSPECIFIED.to_string(); AREA_HEADERS.len()]);
        }
        blocks.push(Block::Table(table));
        if empty {
            blocks.push(Block::paragraph(AREA_CAPTION));
        }
    }

    fn boundary_table(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        blocks.push(Block::Heading("4. PLANILLA DE LADOS".into()));
        let mut table = TableBlock::new(BOUNDARY_HEADERS);
        for segment in &result.boundary_segments {
            table.push_row(vec![
                cell(&segment.vertex),
                cell(&segment.bearing),
                cell(&segment.segment_label),
                cell(&segment.length_meters),
                cell(&segment.angle),
                cell(&segment.neighboring_parcels),
            ]);
        }
        if table.rows.is_empty() {
            table.push_row(vec![UNSPECIFIED.to_string(); BOUNDARY_HEADERS.len()]);
        }
        blocks.push(Block::Table(table));
    }

    fn sketch_and_references(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        let references = reference_lines(&result.references);
        let sketch = !is_unspecified(&result.sketch_text);
        if references.is_empty() && !sketch {
            return;
        }
        blocks.push(Block::Heading("5. CROQUIS Y REFERENCIAS".into()));
        if !references.is_empty() {
            blocks.push(Block::paragraph("Referencias:"));
            blocks.extend(references.into_iter().map(Block::Bullet));
        }
        if sketch {
            blocks.push(Block::paragraph(result.sketch_text.trim()));
        }
    }

    fn appendix(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        if result.full_text.trim().is_empty() {
            return;
        }
        blocks.push(Block::Heading("6. TEXTO COMPLETO (EXTRAÍDO DEL PDF)".into()));
        blocks.push(Block::paragraph(result.full_text.clone()));
    }

    fn coordinate_table(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        if result.geodetic_points.is_empty() {
            return;
        }
        blocks.push(Block::Heading("7. COORDENADAS GEODÉSICAS".into()));
        let mut table = TableBlock::new(COORDINATE_HEADERS);
        for point in &result.geodetic_points {
            table.push_row(vec![
                cell(&point.label),
                cell(&point.latitude_dms),
                cell(&point.longitude_dms),
                cell(&point.northing),
                cell(&point.easting),
            ]);
        }
        blocks.push(Block::Table(table));
    }

    fn closing(&self, result: &ExtractionResult, blocks: &mut Vec<Block>) {
        let place = if is_unspecified(&result.place) {
            self.config.default_locality.trim()
        } else {
            result.place.trim()
        };
        blocks.push(Block::paragraph(self.config.closing_statement.clone()));
        blocks.push(Block::aligned(
            format!("{place}, {}", or_unspecified(&result.operation_date)),
            Alignment::Right,
        ));
    }
}
