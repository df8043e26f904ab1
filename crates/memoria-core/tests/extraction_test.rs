//! Integration tests for field extraction and normalization.
//!
//! Exercises the registry and normalizer together on document-like text.

use memoria_core::{
    AcquisitionMethod, ExtractionConfig, ExtractionResult, FieldExtractor, Normalizer,
    SourceText, FIELD_KEYS, UNSPECIFIED,
};

fn run(text: &str) -> ExtractionResult {
    let extractor = FieldExtractor::new(&ExtractionConfig::default()).unwrap();
    let source = SourceText::new(text, AcquisitionMethod::Embedded);
    Normalizer::new().normalize(extractor.extract(&source))
}

const SCALARS: [&str; 12] = [
    "department",
    "place",
    "centroid",
    "object",
    "property",
    "operation_date",
    "boundary_statement",
    "description",
    "note1",
    "note2",
    "references",
    "sketch_text",
];

const PLANO: &str = "\
MINISTERIO DE OBRAS PUBLICAS
DEPARTAMENTO: BANDA
PADRÓN: 12-3456
LUGAR: Colonia El Simbolar
DOMINIO: M.F.R. 1234/5
OBJETO: Mensura y división
Inmueble: Fracción de campo ubicada en Colonia El Simbolar
TITULAR: GOMEZ JUAN CARLOS D.N.I. 12.345.678 C.U.I.L. 20-12345678-3
MEDIDAS Y LINDEROS: Según título
LOTE A 5 Has 43 As 30,94 Cas
1 N.E 1-2 125,40 m 90º00'00\" Lote 3 de Juan Perez
2 S.E 2-3 98.10 m 89º59'30\" Camino vecinal
PUNTO PF1 -27 27 48.99 -64 15 30.12 6963100.12 4560200.33 Mojón
NOTA 1: Las medidas angulares son aproximadas.
REFERENCIAS
A: alambrado
Santiago del Estero, 15 de marzo de 2021
";

#[test]
fn test_every_key_present_for_any_input() {
    for text in ["", "   \n", "OBJETO: x", PLANO, "°°°''' 1-=2 Has As Cas"] {
        let json = serde_json::to_value(run(text)).unwrap();
        let obj = json.as_object().unwrap();
        for key in FIELD_KEYS {
            assert!(obj.contains_key(key), "missing {key} for input {text:?}");
        }
    }
}

/// Scenario A: only object and place are matchable.
#[test]
fn test_scenario_a_object_and_place_only() {
    let result = run("OBJETO: Mensura y división\nLUGAR: Campo Norte\n");

    assert_eq!(result.object, "Mensura y división");
    assert_eq!(result.place, "Campo Norte");

    let json = serde_json::to_value(&result).unwrap();
    for key in SCALARS {
        if key == "object" || key == "place" {
            continue;
        }
        assert_eq!(json[key], UNSPECIFIED, "scalar {key}");
    }
    assert!(result.owners.is_empty());
    assert!(result.domain_records.is_empty());
    assert!(result.cadastral_numbers.is_empty());
    assert!(result.parcel_areas.is_empty());
    assert!(result.boundary_segments.is_empty());
    assert!(result.geodetic_points.is_empty());
}

/// Scenario B: decimal comma and point variants collapse into one segment.
#[test]
fn test_scenario_b_segment_dedup() {
    let result = run("4-5=2117.00\n4-5=2117,00\n");
    assert_eq!(result.boundary_segments.len(), 1);
    assert_eq!(result.boundary_segments[0].segment_label, "4-5");
    assert_eq!(result.boundary_segments[0].length_meters, "2117.00");
}

/// Scenario C: the same point in all three coordinate dialects.
#[test]
fn test_scenario_c_point_dedup_across_dialects() {
    let text = "\
PF1 -27 27 48.99 -64 15 30.12 6963100.12 4560200.33
PF1 27°27'48.99\"S 64°15'30.12\"O NORTE GK=6963100.12 ESTE GK=4560200.33
PF1 27 27 48,99 S 64 15 30,12 O
";
    let extractor = FieldExtractor::new(&ExtractionConfig::default()).unwrap();
    let raw = extractor.extract(&SourceText::new(text, AcquisitionMethod::Embedded));
    assert_eq!(raw.geodetic_points.len(), 3);

    let result = Normalizer::new().normalize(raw);
    assert_eq!(result.geodetic_points.len(), 1);
    let point = &result.geodetic_points[0];
    assert_eq!(point.label, "PF1");
    assert_eq!(point.latitude_dms, "27°27'48.99\"S");
    assert_eq!(point.longitude_dms, "64°15'30.12\"O");
    assert_eq!(point.northing, "6963100.12");
}

#[test]
fn test_full_plan() {
    let result = run(PLANO);

    assert_eq!(result.department, "BANDA");
    assert_eq!(result.cadastral_numbers, vec!["12-3456"]);
    assert_eq!(result.place, "Colonia El Simbolar");
    assert_eq!(result.domain_summary(), "M.F.R. 1234/5");
    assert_eq!(result.object, "Mensura y división");
    assert_eq!(
        result.property,
        "Fracción de campo ubicada en Colonia El Simbolar"
    );
    assert_eq!(result.owner_summary(), "GOMEZ JUAN CARLOS");
    assert_eq!(result.boundary_statement, "Según título");
    assert_eq!(result.operation_date, "15 de marzo de 2021");

    assert_eq!(result.parcel_areas.len(), 1);
    assert_eq!(result.parcel_areas[0].label, "LOTE A");
    assert_eq!(result.parcel_areas[0].title_area, "5 Has 43 As 30.94 Cas");

    assert_eq!(result.boundary_segments.len(), 2);
    assert_eq!(result.boundary_segments[0].length_meters, "125.40");
    assert_eq!(result.boundary_segments[1].neighboring_parcels, "Camino vecinal");
    assert_eq!(result.description, "1-2 = 125.40; 2-3 = 98.10");

    assert_eq!(result.geodetic_points.len(), 1);
    assert_eq!(result.geodetic_points[0].remark, "Mojón");

    assert_eq!(result.note1, "Las medidas angulares son aproximadas.");
    assert_eq!(result.note2, UNSPECIFIED);
    assert_eq!(result.references, "A: alambrado");
    assert_eq!(result.full_text, PLANO.trim());
}

#[test]
fn test_normalize_is_idempotent_and_order_preserving() {
    let text = "3-4=10,0\n1-2=5.5\n3-4=10.0\n2-3=7\n1-2 = 5,5\n\
                LOTE 1 2 Has 3 As 4,5 Cas\nLOTE 1 2 Has 3 As 4.5 Cas\nLOTE 2 2 Has 3 As 4.5 Cas";
    let once = run(text);
    let labels: Vec<&str> = once
        .boundary_segments
        .iter()
        .map(|s| s.segment_label.as_str())
        .collect();
    assert_eq!(labels, vec!["3-4", "1-2", "2-3"]);
    assert_eq!(once.parcel_areas.len(), 2);

    let twice = Normalizer::new().normalize(once.clone());
    assert_eq!(twice, once);
}

#[test]
fn test_distinct_keys_are_not_merged() {
    let result = run("1-2=10.00\n1-2=10.01\n2-1=10.00");
    assert_eq!(result.boundary_segments.len(), 3);
}

#[test]
fn test_extraction_is_deterministic() {
    assert_eq!(run(PLANO), run(PLANO));
}
