//! Stop-keyword cleaning of label-anchored values.

use regex::Regex;

use crate::error::MemoriaResult;
use crate::extract::strategy::compile;

/// Truncates a captured value at the first stop keyword.
///
/// Matching is case-insensitive and by substring, so a value that merely
/// contains a keyword (e.g. "objeto" inside a property description) is also
/// cut there.
pub struct StopKeywords {
    regex: Option<Regex>,
}

impl StopKeywords {
    pub fn new(keywords: &[String]) -> MemoriaResult<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }
        let pattern = format!("(?i)(?:{})", alternatives.join("|"));
        Ok(Self {
            regex: Some(compile("stop_keywords", &pattern)?),
        })
    }

    /// Text before the earliest keyword occurrence, trimmed.
    pub fn clean<'a>(&self, value: &'a str) -> &'a str {
        let cut = match &self.regex {
            Some(regex) => regex.find(value).map(|m| &value[..m.start()]).unwrap_or(value),
            None => value,
        };
        cut.trim()
    }
}
