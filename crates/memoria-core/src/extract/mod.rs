//! Field extraction registry.
//!
//! [`FieldExtractor`] compiles every pattern once and is then read-only, so
//! one instance can be shared behind an `Arc` by concurrent pipeline runs.

mod clean;
mod coordinates;
mod records;
mod scalar;
mod sections;
mod strategy;

pub use clean::StopKeywords;
pub use coordinates::{canonical_dms, Axis};
pub use strategy::{CaptureAll, CapturePattern, CollectStrategy, Concat, FirstMatch, MatchStrategy};

use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::MemoriaResult;
use crate::normalize::{canonical_number, dedupe_by_key};
use crate::types::{
    BoundarySegment, DomainRecord, ExtractionResult, GeodeticPoint, Owner, ParcelArea,
    SourceText, UNSPECIFIED,
};

/// Registry of extraction rules, one per field.
pub struct FieldExtractor {
    // Label-anchored, stop-keyword cleaned.
    object: FirstMatch<String>,
    place: FirstMatch<String>,
    department: FirstMatch<String>,
    property: FirstMatch<String>,
    centroid: FirstMatch<String>,
    boundary_statement: FirstMatch<String>,

    operation_date: FirstMatch<String>,
    description: FirstMatch<String>,
    note1: FirstMatch<String>,
    note2: FirstMatch<String>,
    references: FirstMatch<String>,
    sketch_text: FirstMatch<String>,

    cadastral_numbers: Concat<String>,
    owners: Concat<Owner>,
    domain_records: Concat<DomainRecord>,
    parcel_areas: Concat<ParcelArea>,
    boundary_segments: Concat<BoundarySegment>,
    geodetic_points: Concat<GeodeticPoint>,

    stop_keywords: StopKeywords,
    config: ExtractionConfig,
}

impl FieldExtractor {
    /// Compile the registry.
    pub fn new(config: &ExtractionConfig) -> MemoriaResult<Self> {
        Ok(Self {
            object: scalar::label("object", scalar::OBJECT)?,
            place: scalar::label("place", scalar::PLACE)?,
            department: scalar::label("department", scalar::DEPARTMENT)?,
            property: scalar::label("property", scalar::PROPERTY)?,
            centroid: scalar::label("centroid", scalar::CENTROID)?,
            boundary_statement: scalar::label("boundary_statement", scalar::BOUNDARY_STATEMENT)?,
            operation_date: scalar::operation_date()?,
            description: scalar::label("description", scalar::DESCRIPTION)?,
            note1: sections::note(1)?,
            note2: sections::note(2)?,
            references: sections::references()?,
            sketch_text: sections::sketch()?,
            cadastral_numbers: records::cadastral_numbers()?,
            owners: records::owners()?,
            domain_records: records::domain_records()?,
            parcel_areas: records::parcel_areas()?,
            boundary_segments: records::boundary_segments()?,
            geodetic_points: coordinates::geodetic_points()?,
            stop_keywords: StopKeywords::new(&config.stop_keywords)?,
            config: config.clone(),
        })
    }

    /// Extract every field. Never fails: missing data is the sentinel or an
    /// empty list.
    pub fn extract(&self, source: &SourceText) -> ExtractionResult {
        let text = source.as_str();

        let boundary_segments = self.boundary_segments.collect(text);
        let description = self
            .description
            .attempt(text)
            .or_else(|| self.compose_description(text, &boundary_segments));

        let result = ExtractionResult {
            department: self.cleaned(&self.department, text),
            cadastral_numbers: self.cadastral_numbers.collect(text),
            place: self.cleaned(&self.place, text),
            domain_records: self.domain_records.collect(text),
            centroid: self.cleaned(&self.centroid, text),
            object: self.cleaned(&self.object, text),
            property: self.cleaned(&self.property, text),
            owners: self.owners.collect(text),
            operation_date: self.plain(&self.operation_date, text),
            boundary_statement: self.cleaned(&self.boundary_statement, text),
            description: description.unwrap_or_else(|| UNSPECIFIED.to_string()),
            note1: self.plain(&self.note1, text),
            note2: self.plain(&self.note2, text),
            parcel_areas: self.parcel_areas.collect(text),
            boundary_segments,
            references: self.plain(&self.references, text),
            sketch_text: self.plain(&self.sketch_text, text),
            geodetic_points: self.geodetic_points.collect(text),
            full_text: text.trim().to_string(),
        };

        debug!(
            method = %source.method(),
            chars = source.len(),
            populated = result.populated_fields().len(),
            segments = result.boundary_segments.len(),
            points = result.geodetic_points.len(),
            "fields extracted"
        );
        result
    }

    fn plain(&self, chain: &FirstMatch<String>, text: &str) -> String {
        chain.attempt(text).unwrap_or_else(|| UNSPECIFIED.to_string())
    }

    fn cleaned(&self, chain: &FirstMatch<String>, text: &str) -> String {
        chain
            .attempt(text)
            .map(|value| self.stop_keywords.clean(&value).to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNSPECIFIED.to_string())
    }

    /// Narrative built from the first segments, or the leading source text.
    fn compose_description(&self, text: &str, segments: &[BoundarySegment]) -> Option<String> {
        if !segments.is_empty() {
            let summaries: Vec<BoundarySegment> = segments
                .iter()
                .map(|s| BoundarySegment::compact(s.segment_label.clone(), canonical_number(&s.length_meters)))
                .collect();
            let summaries = dedupe_by_key(summaries, |s| (s.segment_label.clone(), s.length_meters.clone()));
            let joined = summaries
                .iter()
                .take(self.config.description_segment_limit)
                .map(BoundarySegment::summary)
                .collect::<Vec<_>>()
                .join(&self.config.description_separator);
            return Some(joined);
        }

        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.description_fallback_min_chars {
            return None;
        }
        let leading: String = trimmed.chars().take(self.config.description_char_limit).collect();
        Some(leading.trim_end().to_string())
    }
}
