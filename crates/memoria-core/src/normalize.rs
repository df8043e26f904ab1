//! Numeric canonicalization and record deduplication.
//!
//! Pure and deterministic: the same input always yields the same output,
//! and normalizing an already normalized result is a no-op.

use std::collections::HashSet;
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{is_unspecified, ExtractionResult};

// Digit groups separated by '.' or ',', possibly with spaces around the separator.
static NUMBER_RUN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\d+(?:[ \t]*[.,][ \t]*\d+)*").ok());

/// Canonical form of a numeric-looking value.
///
/// Decimal commas become points and internal whitespace is removed. Values
/// with anything besides digits, separators and whitespace are returned
/// unchanged, as is the sentinel.
pub fn canonical_number(value: &str) -> String {
    let trimmed = value.trim();
    let numeric = trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',' || c.is_whitespace());
    if !numeric {
        return value.to_string();
    }
    trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Canonicalize every number inside an area string such as `5 Has 43 As 30,94 Cas`.
pub fn canonical_area(value: &str) -> String {
    if is_unspecified(value) {
        return value.to_string();
    }
    match NUMBER_RUN.as_ref() {
        Some(regex) => regex
            .replace_all(value, |caps: &regex::Captures<'_>| canonical_number(&caps[0]))
            .into_owned(),
        None => value.to_string(),
    }
}

/// Keep the first item for each key, preserving order.
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Canonicalizes numbers and removes duplicate records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Return a normalized copy of the result.
    ///
    /// Segments are keyed by (label, length), points by (label, latitude,
    /// longitude) and areas by (label, title, survey, difference). Owners
    /// are left as extracted.
    pub fn normalize(&self, mut result: ExtractionResult) -> ExtractionResult {
        for segment in &mut result.boundary_segments {
            segment.length_meters = canonical_number(&segment.length_meters);
        }
        for point in &mut result.geodetic_points {
            point.northing = canonical_number(&point.northing);
            point.easting = canonical_number(&point.easting);
        }
        for area in &mut result.parcel_areas {
            area.title_area = canonical_area(&area.title_area);
            area.survey_area = canonical_area(&area.survey_area);
            area.difference = canonical_area(&area.difference);
        }

        result.boundary_segments = dedupe_by_key(result.boundary_segments, |s| {
            (s.segment_label.clone(), s.length_meters.clone())
        });
        result.geodetic_points = dedupe_by_key(result.geodetic_points, |p| {
            (p.label.clone(), p.latitude_dms.clone(), p.longitude_dms.clone())
        });
        result.parcel_areas = dedupe_by_key(result.parcel_areas, |a| {
            (
                a.label.clone(),
                a.title_area.clone(),
                a.survey_area.clone(),
                a.difference.clone(),
            )
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundarySegment, ParcelArea, UNSPECIFIED};

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number("2117,00"), "2117.00");
        assert_eq!(canonical_number(" 6 963 100,12 "), "6963100.12");
        assert_eq!(canonical_number("1.234,56"), "1.234.56");
        assert_eq!(canonical_number("1.234.56"), "1.234.56");
    }

    #[test]
    fn test_non_numeric_untouched() {
        assert_eq!(canonical_number(UNSPECIFIED), UNSPECIFIED);
        assert_eq!(canonical_number("12 m, aprox"), "12 m, aprox");
        assert_eq!(canonical_number(""), "");
    }

    #[test]
    fn test_canonical_area() {
        assert_eq!(canonical_area("5 Has 43 As 30,94 Cas"), "5 Has 43 As 30.94 Cas");
        assert_eq!(canonical_area("5 Has 43 As 30 , 94 Cas"), "5 Has 43 As 30.94 Cas");
        assert_eq!(canonical_area(UNSPECIFIED), UNSPECIFIED);
    }

    #[test]
    fn test_dedupe_keeps_first_and_order() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let out = dedupe_by_key(items, |(k, _)| *k);
        assert_eq!(out, vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_normalize_segments_and_areas() {
        let mut result = ExtractionResult::default();
        result.boundary_segments = vec![
            BoundarySegment::compact("4-5", "2117.00"),
            BoundarySegment::compact("4-5", "2117,00"),
            BoundarySegment::compact("5-6", "2117,00"),
        ];
        result.parcel_areas = vec![
            ParcelArea::from_title("LOTE 1", "5 Has 43 As 30,94 Cas"),
            ParcelArea::from_title("LOTE 1", "5 Has 43 As 30.94 Cas"),
        ];

        let normalized = Normalizer::new().normalize(result);
        assert_eq!(normalized.boundary_segments.len(), 2);
        assert_eq!(normalized.boundary_segments[0].length_meters, "2117.00");
        assert_eq!(normalized.boundary_segments[1].segment_label, "5-6");
        assert_eq!(normalized.parcel_areas.len(), 1);

        let again = Normalizer::new().normalize(normalized.clone());
        assert_eq!(again, normalized);
    }
}
