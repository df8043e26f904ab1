//! Label-anchored scalar fields and dates.

use regex::Regex;

use crate::error::MemoriaResult;
use crate::extract::strategy::{compile, CapturePattern, FirstMatch, MatchStrategy};

pub(crate) const OBJECT: &str = r"(?i)OBJETO[:\s]+([^\n]+)";
pub(crate) const PLACE: &str = r"(?i)LUGAR[:\s]+([^\n]+)";
pub(crate) const DEPARTMENT: &str = r"(?i)DEPARTAMENTO[:\s]+([A-ZÁÉÍÓÚÑ \t]+)";
pub(crate) const PROPERTY: &str = r"(?i)Inmueble[:\s]+([^\n]+)";
pub(crate) const CENTROID: &str = r"(?i)BARICENTRO(?:\s+GEOGR[ÁA]FICO)?[:\s]+([^\n]+)";
pub(crate) const BOUNDARY_STATEMENT: &str = r"(?i)MEDIDAS\s+Y\s+LINDEROS[:\s]+([^\n]+)";
pub(crate) const DESCRIPTION: &str = r"(?i)(DESCRIPCI[ÓO]N[\s\-:]+[^\n]+)";

const LONG_DATE: &str = r"(\d{1,2}\s+de\s+[A-Za-zÁÉÍÓÚáéíóú]+)\s+de\s+(\d{4})";
const SHORT_DATE: &str = r"(\d{2}/\d{2}/\d{4})";

/// Single-pattern chain for a label-anchored field.
pub(crate) fn label(name: &str, pattern: &str) -> MemoriaResult<FirstMatch<String>> {
    Ok(FirstMatch::new().with(CapturePattern::new(name, pattern)?))
}

/// "15 de marzo de 2021" style dates, whitespace collapsed.
struct LongDate {
    regex: Regex,
}

impl MatchStrategy<String> for LongDate {
    fn name(&self) -> &str {
        "long_date"
    }

    fn attempt(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let day_month = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
        Some(format!("{} de {}", day_month, &caps[2]))
    }
}

/// Long form first, then `DD/MM/YYYY`.
pub(crate) fn operation_date() -> MemoriaResult<FirstMatch<String>> {
    Ok(FirstMatch::new()
        .with(LongDate {
            regex: compile("long_date", LONG_DATE)?,
        })
        .with(CapturePattern::new("short_date", SHORT_DATE)?))
}
