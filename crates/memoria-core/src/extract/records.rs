//! Repeated-record fields: owners, domains, padrones, areas and segments.

use regex::Regex;

use crate::error::MemoriaResult;
use crate::extract::strategy::{compile, CaptureAll, CollectStrategy, Concat};
use crate::types::{or_unspecified, BoundarySegment, DomainRecord, Owner, ParcelArea, UNSPECIFIED};

const OWNER: &str = r"([A-Za-zÁÉÍÓÚÑÜáéíóúñü ,.]+?)\s+D\.?\s?N\.?\s?I\.?[:\s]*(?:N[°º]\.?\s*)?([\d.]+)\s*[,;]?\s*C\.?\s?U\.?\s?I\.?\s?[LT]\.?[:\s]*(?:N[°º]\.?\s*)?([\d\-]+)";
const OWNER_LABEL: &str = r"^(?i:TITULAR(?:ES)?)\s*[:\-]?\s*";
const DOMAIN: &str = r"(?i)\b(M\.?\s*F\.?\s*R\.?\s*(?:N[°º]\.?\s*)?\d[\d\-/]*|Matr[íi]cula\s*(?:N[°º]\.?\s*)?\d[\d\-/]*)";
const PADRON: &str = r"(?i)PADR[ÓO]N(?:\s*N[°º]\.?)?[:\s]+(\d[\d\-]*)";
const AREA: &str = r"(?:\b((?i:LOTE)\s+[A-Z0-9][A-Z0-9\-]*|Fracc\.?\s*\d+)\s+)?(\d+)\s*Has\s*(\d+)\s*As\s*([\d.,]+)\s*Cas";
const SEGMENT_TABLE: &str = r#"(\d+|[A-Z])\s+([NS][.\s][EO])\s+(\d+-\d+|[A-Z]-[A-Z])\s+([\d.,]+)\s*m?\s+(\d+[º°]\d+['’]\d+['”"])\s+([^\n]+)"#;
const SEGMENT_COMPACT: &str = r"\b(\d+-\d+|[A-Z]-[A-Z])\s*=\s*(\d+(?:[.,]\d+)?)";

/// Name, D.N.I. and C.U.I.L./C.U.I.T. triples.
struct OwnerTriples {
    regex: Regex,
    label: Regex,
}

impl CollectStrategy<Owner> for OwnerTriples {
    fn name(&self) -> &str {
        "owner_triples"
    }

    fn collect(&self, text: &str) -> Vec<Owner> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let raw = caps[1].trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace());
                let name = self.label.replace(raw, "");
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Owner {
                    name: name.to_string(),
                    national_id: or_unspecified(&caps[2]),
                    tax_id: or_unspecified(&caps[3]),
                })
            })
            .collect()
    }
}

pub(crate) fn owners() -> MemoriaResult<Concat<Owner>> {
    Ok(Concat::new().with(OwnerTriples {
        regex: compile("owner_triples", OWNER)?,
        label: compile("owner_label", OWNER_LABEL)?,
    }))
}

struct DomainCodes {
    regex: Regex,
}

impl CollectStrategy<DomainRecord> for DomainCodes {
    fn name(&self) -> &str {
        "domain_codes"
    }

    fn collect(&self, text: &str) -> Vec<DomainRecord> {
        self.regex
            .captures_iter(text)
            .map(|caps| DomainRecord {
                registry_code: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
            })
            .collect()
    }
}

pub(crate) fn domain_records() -> MemoriaResult<Concat<DomainRecord>> {
    Ok(Concat::new().with(DomainCodes {
        regex: compile("domain_codes", DOMAIN)?,
    }))
}

pub(crate) fn cadastral_numbers() -> MemoriaResult<Concat<String>> {
    Ok(Concat::new().with(CaptureAll::new("padron", PADRON)?))
}

/// "H Has A As C Cas" with an optional LOTE/Fracc designation.
struct HectareTriples {
    regex: Regex,
}

impl CollectStrategy<ParcelArea> for HectareTriples {
    fn name(&self) -> &str {
        "hectare_triples"
    }

    fn collect(&self, text: &str) -> Vec<ParcelArea> {
        self.regex
            .captures_iter(text)
            .map(|caps| {
                let label = caps
                    .get(1)
                    .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
                    .unwrap_or_else(|| UNSPECIFIED.to_string());
                let title = format!("{} Has {} As {} Cas", &caps[2], &caps[3], &caps[4]);
                ParcelArea::from_title(label, title)
            })
            .collect()
    }
}

pub(crate) fn parcel_areas() -> MemoriaResult<Concat<ParcelArea>> {
    Ok(Concat::new().with(HectareTriples {
        regex: compile("hectare_triples", AREA)?,
    }))
}

/// Full tabular rows: vertex, bearing, segment, length, angle, neighbors.
struct SegmentTable {
    regex: Regex,
}

impl CollectStrategy<BoundarySegment> for SegmentTable {
    fn name(&self) -> &str {
        "segment_table"
    }

    fn collect(&self, text: &str) -> Vec<BoundarySegment> {
        self.regex
            .captures_iter(text)
            .map(|caps| BoundarySegment {
                vertex: caps[1].to_string(),
                bearing: caps[2].to_string(),
                segment_label: caps[3].to_string(),
                length_meters: caps[4].to_string(),
                angle: caps[5].to_string(),
                neighboring_parcels: or_unspecified(&caps[6]),
            })
            .collect()
    }
}

/// "4-5=2117.00" pairs.
struct SegmentCompact {
    regex: Regex,
}

impl CollectStrategy<BoundarySegment> for SegmentCompact {
    fn name(&self) -> &str {
        "segment_compact"
    }

    fn collect(&self, text: &str) -> Vec<BoundarySegment> {
        self.regex
            .captures_iter(text)
            .map(|caps| BoundarySegment::compact(&caps[1], &caps[2]))
            .collect()
    }
}

pub(crate) fn boundary_segments() -> MemoriaResult<Concat<BoundarySegment>> {
    Ok(Concat::new()
        .with(SegmentTable {
            regex: compile("segment_table", SEGMENT_TABLE)?,
        })
        .with(SegmentCompact {
            regex: compile("segment_compact", SEGMENT_COMPACT)?,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owners_with_cuil_and_cuit() {
        let text = "TITULAR: GOMEZ JUAN CARLOS D.N.I. 12.345.678 C.U.I.L. 20-12345678-3\n\
                    SUCESORES DE PEREZ S.A. D.N.I.: 30.111.222 C.U.I.T.: 30-11122233-9";
        let owners = owners().unwrap().collect(text);
        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0].name, "GOMEZ JUAN CARLOS");
        assert_eq!(owners[0].national_id, "12.345.678");
        assert_eq!(owners[0].tax_id, "20-12345678-3");
        assert_eq!(owners[1].name, "SUCESORES DE PEREZ S.A");
        assert_eq!(owners[1].tax_id, "30-11122233-9");
    }

    #[test]
    fn test_domain_dialects() {
        let text = "DOMINIO: M.F.R. 1234-5 y Matrícula N° 45/6; MFR 77";
        let codes: Vec<String> = domain_records()
            .unwrap()
            .collect(text)
            .into_iter()
            .map(|d| d.registry_code)
            .collect();
        assert_eq!(codes, vec!["M.F.R. 1234-5", "Matrícula N° 45/6", "MFR 77"]);
    }

    #[test]
    fn test_padrones() {
        let found = cadastral_numbers()
            .unwrap()
            .collect("PADRÓN: 12-345\nPadron 678 PADRON: sin dato");
        assert_eq!(found, vec!["12-345", "678"]);
    }

    #[test]
    fn test_area_label_is_optional() {
        let areas = parcel_areas()
            .unwrap()
            .collect("LOTE U-2 5 Has 43 As 30,94 Cas\nSup. 12 Has 0 As 0 Cas");
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].label, "LOTE U-2");
        assert_eq!(areas[0].title_area, "5 Has 43 As 30,94 Cas");
        assert_eq!(areas[0].survey_area, UNSPECIFIED);
        assert_eq!(areas[1].label, UNSPECIFIED);
    }

    #[test]
    fn test_tabular_then_compact_segments() {
        let text = "1 N.E 1-2 125,40 m 90º00'00\" Lote 3 de Juan Perez\n4-5=2117.00";
        let segments = boundary_segments().unwrap().collect(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].vertex, "1");
        assert_eq!(segments[0].bearing, "N.E");
        assert_eq!(segments[0].segment_label, "1-2");
        assert_eq!(segments[0].length_meters, "125,40");
        assert_eq!(segments[0].neighboring_parcels, "Lote 3 de Juan Perez");
        assert_eq!(segments[1].segment_label, "4-5");
        assert_eq!(segments[1].bearing, UNSPECIFIED);
    }
}
