//! Section-bounded free-text blocks: notes, references and sketch text.

use regex::Regex;

use crate::error::MemoriaResult;
use crate::extract::strategy::{compile, FirstMatch, MatchStrategy};

/// What ends a block: an uppercase section heading, a title-block label at
/// the start of a line, or the closing `<locality>, <d> de <month> de <yyyy>`.
const BOUNDARY: &str = concat!(
    r"(?m)\b(?:NOTA\s*(?:N[°º]\.?\s*)?\d|REFERENCIAS?|CROQUIS|DESCRIPCI[ÓO]N|OBSERVACIONES|PLANILLA|COORDENADAS)\b",
    r"|^[ \t]*(?:LUGAR|TITULAR(?:ES)?|PADR[ÓO]N(?:ES)?|DEPARTAMENTO|DOMINIO|OBJETO)[ \t]*:",
    r"|^[^\n,]+,[ \t]*\d{1,2}[ \t]+(?i:de)[ \t]+\p{L}+[ \t]+(?:(?i:de)[ \t]+)?\d{4}",
);

/// Block from a line-anchored heading up to the next known heading.
struct HeadingBlock {
    name: String,
    heading: Regex,
    boundary: Regex,
}

impl MatchStrategy<String> for HeadingBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, text: &str) -> Option<String> {
        self.heading.find_iter(text).find_map(|heading| {
            let rest = &text[heading.end()..];
            let end = self.boundary.find(rest).map(|m| m.start()).unwrap_or(rest.len());
            let body = tidy_lines(rest[..end].lines());
            (!body.is_empty()).then_some(body)
        })
    }
}

/// Every line mentioning the section keyword.
struct KeywordLines {
    name: String,
    keyword: Regex,
}

impl MatchStrategy<String> for KeywordLines {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, text: &str) -> Option<String> {
        let body = tidy_lines(text.lines().filter(|line| self.keyword.is_match(line)));
        (!body.is_empty()).then_some(body)
    }
}

fn tidy_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn block(name: &str, heading: &str, keyword: &str) -> MemoriaResult<FirstMatch<String>> {
    Ok(FirstMatch::new()
        .with(HeadingBlock {
            name: format!("{name}_block"),
            heading: compile(name, heading)?,
            boundary: compile("section_boundary", BOUNDARY)?,
        })
        .with(KeywordLines {
            name: format!("{name}_lines"),
            keyword: compile(name, keyword)?,
        }))
}

pub(crate) fn note(number: u8) -> MemoriaResult<FirstMatch<String>> {
    let name = format!("note{number}");
    let heading = format!(r"(?im)^[ \t]*NOTA\s*(?:N[°º]\.?\s*)?{number}\b[ \t]*[:.\-]?");
    let keyword = format!(r"(?i)\bNOTA\s*(?:N[°º]\.?\s*)?{number}\b");
    block(&name, &heading, &keyword)
}

pub(crate) fn references() -> MemoriaResult<FirstMatch<String>> {
    block(
        "references",
        r"(?im)^[ \t]*REFERENCIAS?\b[ \t]*[:.\-]?",
        r"(?i)REFERENCIA",
    )
}

pub(crate) fn sketch() -> MemoriaResult<FirstMatch<String>> {
    block("sketch", r"(?im)^[ \t]*CROQUIS\b[ \t]*[:.\-]?", r"(?i)CROQUIS")
}
