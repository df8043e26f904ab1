//! Geodetic point dialects.
//!
//! Three independent layouts are recognized and their results concatenated:
//! a columnar table with signed D M S sub-fields followed by Gauss-Krüger
//! northing and easting, a symbolic `27°27'48.99"S` form, and a
//! whitespace-separated `27 27 48.99 S` form. The last two may carry inline
//! `NORTE GK=` / `ESTE GK=` tags. Latitude and longitude are rewritten to one
//! symbolic DMS format so duplicates across dialects share a key.

use regex::{Captures, Regex};

use crate::error::MemoriaResult;
use crate::extract::strategy::{compile, CollectStrategy, Concat};
use crate::normalize::canonical_number;
use crate::types::{or_unspecified, GeodeticPoint, UNSPECIFIED};

const LABEL: &str = r"(?:[A-Z]{1,3}\d{1,3}[A-Z]?|\d{1,3}[A-Z]?|[A-Z])";
const GK_TAGS: &str = r"(?:[ \t,;]*NORTE[ \t]*GK[ \t]*[=:][ \t]*(\d[\d.,]*))?(?:[ \t,;]*ESTE[ \t]*GK[ \t]*[=:][ \t]*(\d[\d.,]*))?";

fn columnar_pattern() -> String {
    let dms = r"(-?\d{1,3})[ \t]+(\d{1,2})[ \t]+(\d{1,2}(?:[.,]\d+)?)";
    let grid = r"(\d{5,8}(?:[.,]\d+)?)";
    format!(
        r"(?m)^[ \t]*(?:PUNTO[ \t]+)?({LABEL})[ \t]+{dms}[ \t]+{dms}[ \t]+{grid}[ \t]+{grid}[ \t]*([^\n]*)"
    )
}

fn symbolic_pattern() -> String {
    let dms = r#"(\d{1,3})[ \t]*[°º][ \t]*(\d{1,2})[ \t]*['’][ \t]*(\d{1,2}(?:[.,]\d+)?)[ \t]*(?:"|”|'')"#;
    format!(
        r"(?:\b({LABEL})[ \t]*[:\-]?[ \t]+)?{dms}[ \t]*([NS])[ \t,;]+{dms}[ \t]*([EOW])(?:[ \t]*\(({LABEL})\))?{GK_TAGS}"
    )
}

fn spaced_pattern() -> String {
    let dms = r"(\d{1,3})[ \t]+(\d{1,2})[ \t]+(\d{1,2}[.,]\d+)";
    format!(
        r"(?:\b({LABEL})[ \t]*[:\-]?[ \t]+)?{dms}[ \t]*([NS])\b[ \t,;]+{dms}[ \t]*([EOW])\b(?:[ \t]*\(({LABEL})\))?{GK_TAGS}"
    )
}

/// Latitude or longitude axis, for picking the hemisphere letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Render degrees, minutes and seconds as `D°MM'SS.ss"H`.
///
/// Negative degrees or a southern/western letter select the negative
/// hemisphere. Seconds keep their decimals with a decimal point.
pub fn canonical_dms(degrees: &str, minutes: &str, seconds: &str, cardinal: Option<&str>, axis: Axis) -> String {
    let degrees = degrees.trim();
    let negative = degrees.starts_with('-');
    let deg: u32 = degrees.trim_start_matches('-').parse().unwrap_or(0);
    let min: u32 = minutes.trim().parse().unwrap_or(0);

    let seconds = canonical_number(seconds);
    let (whole, fraction) = match seconds.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (seconds.as_str(), None),
    };
    let whole: u32 = whole.parse().unwrap_or(0);
    let sec = match fraction {
        Some(f) if !f.is_empty() => format!("{whole:02}.{f}"),
        _ => format!("{whole:02}"),
    };

    let cardinal = cardinal.map(|c| c.trim().to_ascii_uppercase());
    let hemisphere = match axis {
        Axis::Latitude => {
            if negative || cardinal.as_deref() == Some("S") {
                'S'
            } else {
                'N'
            }
        }
        Axis::Longitude => {
            if negative || matches!(cardinal.as_deref(), Some("O") | Some("W")) {
                'O'
            } else {
                'E'
            }
        }
    };

    format!("{deg}°{min:02}'{sec}\"{hemisphere}")
}

fn group<'t>(caps: &Captures<'t>, i: usize) -> Option<&'t str> {
    caps.get(i).map(|m| m.as_str())
}

fn grid_value(caps: &Captures<'_>, i: usize) -> String {
    group(caps, i)
        .map(canonical_number)
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}

/// Columnar table rows: label, signed lat D M S, signed lon D M S, N, E.
struct ColumnarTable {
    regex: Regex,
}

impl CollectStrategy<GeodeticPoint> for ColumnarTable {
    fn name(&self) -> &str {
        "coordinates_columnar"
    }

    fn collect(&self, text: &str) -> Vec<GeodeticPoint> {
        self.regex
            .captures_iter(text)
            .map(|caps| GeodeticPoint {
                label: or_unspecified(&caps[1]),
                latitude_dms: canonical_dms(&caps[2], &caps[3], &caps[4], None, Axis::Latitude),
                longitude_dms: canonical_dms(&caps[5], &caps[6], &caps[7], None, Axis::Longitude),
                northing: grid_value(&caps, 8),
                easting: grid_value(&caps, 9),
                remark: or_unspecified(&caps[10]),
            })
            .collect()
    }
}

/// Symbolic and spaced dialects share one capture layout:
/// label, lat D M S H, lon D M S H, suffix label, north tag, east tag.
struct CardinalDms {
    name: &'static str,
    regex: Regex,
}

impl CollectStrategy<GeodeticPoint> for CardinalDms {
    fn name(&self) -> &str {
        self.name
    }

    fn collect(&self, text: &str) -> Vec<GeodeticPoint> {
        self.regex
            .captures_iter(text)
            .map(|caps| {
                let label = group(&caps, 1)
                    .or_else(|| group(&caps, 10))
                    .map(or_unspecified)
                    .unwrap_or_else(|| UNSPECIFIED.to_string());
                GeodeticPoint {
                    label,
                    latitude_dms: canonical_dms(
                        &caps[2],
                        &caps[3],
                        &caps[4],
                        group(&caps, 5),
                        Axis::Latitude,
                    ),
                    longitude_dms: canonical_dms(
                        &caps[6],
                        &caps[7],
                        &caps[8],
                        group(&caps, 9),
                        Axis::Longitude,
                    ),
                    northing: grid_value(&caps, 11),
                    easting: grid_value(&caps, 12),
                    remark: UNSPECIFIED.to_string(),
                }
            })
            .collect()
    }
}

pub(crate) fn geodetic_points() -> MemoriaResult<Concat<GeodeticPoint>> {
    Ok(Concat::new()
        .with(ColumnarTable {
            regex: compile("coordinates_columnar", &columnar_pattern())?,
        })
        .with(CardinalDms {
            name: "coordinates_symbolic",
            regex: compile("coordinates_symbolic", &symbolic_pattern())?,
        })
        .with(CardinalDms {
            name: "coordinates_spaced",
            regex: compile("coordinates_spaced", &spaced_pattern())?,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_dms_variants() {
        assert_eq!(
            canonical_dms("-27", "27", "48,99", None, Axis::Latitude),
            "27°27'48.99\"S"
        );
        assert_eq!(
            canonical_dms("64", "5", "3.1", Some("W"), Axis::Longitude),
            "64°05'03.1\"O"
        );
        assert_eq!(
            canonical_dms("027", "27", "48", Some("N"), Axis::Latitude),
            "27°27'48\"N"
        );
    }

    #[test]
    fn test_canonical_dms_is_stable() {
        let once = canonical_dms("-64", "15", "30.12", None, Axis::Longitude);
        assert_eq!(once, "64°15'30.12\"O");
        assert_eq!(
            canonical_dms("64", "15", "30.12", Some("O"), Axis::Longitude),
            once
        );
    }

    #[test]
    fn test_columnar_row() {
        let points = geodetic_points()
            .unwrap()
            .collect("PUNTO PF1 -27 27 48.99 -64 15 30.12 6963100,12 4560200.33 Mojón de hierro\n");
        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.label, "PF1");
        assert_eq!(p.latitude_dms, "27°27'48.99\"S");
        assert_eq!(p.longitude_dms, "64°15'30.12\"O");
        assert_eq!(p.northing, "6963100.12");
        assert_eq!(p.easting, "4560200.33");
        assert_eq!(p.remark, "Mojón de hierro");
    }

    #[test]
    fn test_symbolic_with_tags_and_suffix_label() {
        let text = "27°27'48.99\"S 64°15'30.12\"O (V2) NORTE GK=6963100.12 ESTE GK=4560200.33";
        let points = geodetic_points().unwrap().collect(text);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "V2");
        assert_eq!(points[0].northing, "6963100.12");
        assert_eq!(points[0].easting, "4560200.33");
    }

    #[test]
    fn test_spaced_requires_cardinals() {
        let concat = geodetic_points().unwrap();
        let points = concat.collect("A 27 27 48,99 S 64 15 30,12 O");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "A");
        assert_eq!(points[0].latitude_dms, "27°27'48.99\"S");
        assert_eq!(points[0].northing, UNSPECIFIED);

        assert!(concat.collect("27 27 48,99 64 15 30,12").is_empty());
    }
}
