//! Structured records extracted from a survey plan.

use serde::{Deserialize, Serialize};

/// Sentinel for any value the document did not provide.
pub const UNSPECIFIED: &str = "No especificado";

/// True for empty strings and the sentinel.
pub fn is_unspecified(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == UNSPECIFIED
}

/// Trimmed value, or the sentinel when nothing is left.
pub fn or_unspecified(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNSPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

fn unspecified() -> String {
    UNSPECIFIED.to_string()
}

/// Title holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    /// D.N.I.
    #[serde(default = "unspecified")]
    pub national_id: String,
    /// C.U.I.L. / C.U.I.T.
    #[serde(default = "unspecified")]
    pub tax_id: String,
}

/// Property title registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainRecord {
    pub registry_code: String,
}

/// One row of the area schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParcelArea {
    #[serde(default = "unspecified")]
    pub label: String,
    #[serde(default = "unspecified")]
    pub title_area: String,
    #[serde(default = "unspecified")]
    pub survey_area: String,
    #[serde(default = "unspecified")]
    pub difference: String,
    #[serde(default)]
    pub notes: String,
}

impl ParcelArea {
    /// Area known only from the title, as in the compact "Has/As/Cas" dialect.
    pub fn from_title(label: impl Into<String>, title_area: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            title_area: title_area.into(),
            survey_area: unspecified(),
            difference: unspecified(),
            notes: String::new(),
        }
    }

    /// Slash-joined title / survey / difference, skipping unknown parts.
    pub fn surface(&self) -> String {
        let parts: Vec<&str> = [&self.title_area, &self.survey_area, &self.difference]
            .into_iter()
            .map(|p| p.trim())
            .filter(|p| !is_unspecified(p))
            .collect();
        if parts.is_empty() {
            unspecified()
        } else {
            parts.join(" / ")
        }
    }
}

/// One edge of the surveyed polygon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundarySegment {
    #[serde(default = "unspecified")]
    pub vertex: String,
    #[serde(default = "unspecified")]
    pub bearing: String,
    pub segment_label: String,
    pub length_meters: String,
    #[serde(default = "unspecified")]
    pub angle: String,
    #[serde(default = "unspecified")]
    pub neighboring_parcels: String,
}

impl BoundarySegment {
    /// Segment known only by label and length, as in the "4-5=2117.00" dialect.
    pub fn compact(segment_label: impl Into<String>, length_meters: impl Into<String>) -> Self {
        Self {
            vertex: unspecified(),
            bearing: unspecified(),
            segment_label: segment_label.into(),
            length_meters: length_meters.into(),
            angle: unspecified(),
            neighboring_parcels: unspecified(),
        }
    }

    /// "label = length" form used by the narrative fallback.
    pub fn summary(&self) -> String {
        format!("{} = {}", self.segment_label, self.length_meters)
    }
}

/// Geodetic control point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeodeticPoint {
    #[serde(default = "unspecified")]
    pub label: String,
    /// Symbolic DMS, e.g. `27°27'48.99"S`.
    pub latitude_dms: String,
    pub longitude_dms: String,
    /// Gauss-Krüger north coordinate.
    #[serde(default = "unspecified")]
    pub northing: String,
    /// Gauss-Krüger east coordinate.
    #[serde(default = "unspecified")]
    pub easting: String,
    #[serde(default = "unspecified")]
    pub remark: String,
}

/// Any repeated record, tagged by field kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRecord {
    Owner(Owner),
    DomainRecord(DomainRecord),
    CadastralNumber { value: String },
    ParcelArea(ParcelArea),
    BoundarySegment(BoundarySegment),
    GeodeticPoint(GeodeticPoint),
}
