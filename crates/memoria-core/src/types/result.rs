//! The extraction result: every recognized field, always present.

use serde::{Deserialize, Deserializer, Serialize};

use super::record::{
    is_unspecified, BoundarySegment, DomainRecord, FieldRecord, GeodeticPoint, Owner, ParcelArea,
    UNSPECIFIED,
};

/// Every field key of an [`ExtractionResult`], in serialization order.
pub const FIELD_KEYS: [&str; 19] = [
    "department",
    "cadastral_numbers",
    "place",
    "domain_records",
    "centroid",
    "object",
    "property",
    "owners",
    "operation_date",
    "boundary_statement",
    "description",
    "note1",
    "note2",
    "parcel_areas",
    "boundary_segments",
    "references",
    "sketch_text",
    "geodetic_points",
    "full_text",
];

/// Scalar fields accept nulls and numbers from the corrector and fall back
/// to the sentinel.
fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => UNSPECIFIED.to_string(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => UNSPECIFIED.to_string(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn unspecified() -> String {
    UNSPECIFIED.to_string()
}

/// Structured fields of one survey plan.
///
/// Missing data is the sentinel or an empty list, never an absent key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub department: String,
    #[serde(default)]
    pub cadastral_numbers: Vec<String>,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub place: String,
    #[serde(default)]
    pub domain_records: Vec<DomainRecord>,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub centroid: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub object: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub property: String,
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub operation_date: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub boundary_statement: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub description: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub note1: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub note2: String,
    #[serde(default)]
    pub parcel_areas: Vec<ParcelArea>,
    #[serde(default)]
    pub boundary_segments: Vec<BoundarySegment>,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub references: String,
    #[serde(default = "unspecified", deserialize_with = "scalar")]
    pub sketch_text: String,
    #[serde(default)]
    pub geodetic_points: Vec<GeodeticPoint>,
    /// Verbatim source text; empty rather than the sentinel when absent.
    #[serde(default)]
    pub full_text: String,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self {
            department: unspecified(),
            cadastral_numbers: Vec::new(),
            place: unspecified(),
            domain_records: Vec::new(),
            centroid: unspecified(),
            object: unspecified(),
            property: unspecified(),
            owners: Vec::new(),
            operation_date: unspecified(),
            boundary_statement: unspecified(),
            description: unspecified(),
            note1: unspecified(),
            note2: unspecified(),
            parcel_areas: Vec::new(),
            boundary_segments: Vec::new(),
            references: unspecified(),
            sketch_text: unspecified(),
            geodetic_points: Vec::new(),
            full_text: String::new(),
        }
    }
}

/// Borrowed view of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Scalar(&'a str),
    Records(Vec<FieldRecord>),
}

impl FieldValue<'_> {
    /// True when the field carries data.
    pub fn is_specified(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => !is_unspecified(s),
            FieldValue::Records(r) => !r.is_empty(),
        }
    }
}

impl ExtractionResult {
    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        let value = match key {
            "department" => FieldValue::Scalar(&self.department),
            "cadastral_numbers" => FieldValue::Records(
                self.cadastral_numbers
                    .iter()
                    .map(|v| FieldRecord::CadastralNumber { value: v.clone() })
                    .collect(),
            ),
            "place" => FieldValue::Scalar(&self.place),
            "domain_records" => FieldValue::Records(
                self.domain_records
                    .iter()
                    .cloned()
                    .map(FieldRecord::DomainRecord)
                    .collect(),
            ),
            "centroid" => FieldValue::Scalar(&self.centroid),
            "object" => FieldValue::Scalar(&self.object),
            "property" => FieldValue::Scalar(&self.property),
            "owners" => {
                FieldValue::Records(self.owners.iter().cloned().map(FieldRecord::Owner).collect())
            }
            "operation_date" => FieldValue::Scalar(&self.operation_date),
            "boundary_statement" => FieldValue::Scalar(&self.boundary_statement),
            "description" => FieldValue::Scalar(&self.description),
            "note1" => FieldValue::Scalar(&self.note1),
            "note2" => FieldValue::Scalar(&self.note2),
            "parcel_areas" => FieldValue::Records(
                self.parcel_areas
                    .iter()
                    .cloned()
                    .map(FieldRecord::ParcelArea)
                    .collect(),
            ),
            "boundary_segments" => FieldValue::Records(
                self.boundary_segments
                    .iter()
                    .cloned()
                    .map(FieldRecord::BoundarySegment)
                    .collect(),
            ),
            "references" => FieldValue::Scalar(&self.references),
            "sketch_text" => FieldValue::Scalar(&self.sketch_text),
            "geodetic_points" => FieldValue::Records(
                self.geodetic_points
                    .iter()
                    .cloned()
                    .map(FieldRecord::GeodeticPoint)
                    .collect(),
            ),
            "full_text" => FieldValue::Scalar(&self.full_text),
            _ => return None,
        };
        Some(value)
    }

    /// Keys of the fields that carry data (excluding the full text).
    pub fn populated_fields(&self) -> Vec<&'static str> {
        FIELD_KEYS
            .iter()
            .copied()
            .filter(|k| *k != "full_text")
            .filter(|k| self.field(k).map(|v| v.is_specified()).unwrap_or(false))
            .collect()
    }

    /// Owner names, first three, with an "entre otros" suffix beyond that.
    pub fn owner_summary(&self) -> String {
        let names: Vec<&str> = self
            .owners
            .iter()
            .map(|o| o.name.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return UNSPECIFIED.to_string();
        }
        let mut summary = names.iter().take(3).copied().collect::<Vec<_>>().join(", ");
        if names.len() > 3 {
            summary.push_str(" entre otros");
        }
        summary
    }

    /// Registry codes joined by comma, or the sentinel.
    pub fn domain_summary(&self) -> String {
        let codes: Vec<&str> = self
            .domain_records
            .iter()
            .map(|d| d.registry_code.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if codes.is_empty() {
            UNSPECIFIED.to_string()
        } else {
            codes.join(", ")
        }
    }

    /// Cadastral numbers joined by comma, or the sentinel.
    pub fn cadastral_summary(&self) -> String {
        let joined = self.cadastral_numbers.join(", ");
        if joined.trim().is_empty() {
            UNSPECIFIED.to_string()
        } else {
            joined.trim().to_string()
        }
    }
}
