//! Strategy traits and the two ways of combining them.
//!
//! A field is extracted either by the first strategy that matches
//! ([`FirstMatch`]) or by concatenating what every strategy collects
//! ([`Concat`]). Strategies hold compiled patterns and are read-only once
//! built, so a registry can be shared across concurrent runs.

use regex::Regex;
use tracing::trace;

use crate::error::{MemoriaError, MemoriaResult};

/// A strategy that yields at most one value.
pub trait MatchStrategy<T>: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Try to match against the whole text.
    fn attempt(&self, text: &str) -> Option<T>;
}

/// A strategy that yields every non-overlapping match.
pub trait CollectStrategy<T>: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Collect all matches in text order.
    fn collect(&self, text: &str) -> Vec<T>;
}

/// Ordered strategies; the first success wins.
pub struct FirstMatch<T> {
    strategies: Vec<Box<dyn MatchStrategy<T>>>,
}

impl<T> Default for FirstMatch<T> {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }
}

impl<T> FirstMatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy with lower priority than those already added.
    pub fn with(mut self, strategy: impl MatchStrategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn attempt(&self, text: &str) -> Option<T> {
        self.strategies.iter().find_map(|strategy| {
            let value = strategy.attempt(text);
            if value.is_some() {
                trace!(strategy = strategy.name(), "strategy matched");
            }
            value
        })
    }
}

/// Independent strategies whose results are concatenated in order.
pub struct Concat<T> {
    strategies: Vec<Box<dyn CollectStrategy<T>>>,
}

impl<T> Default for Concat<T> {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }
}

impl<T> Concat<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl CollectStrategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn collect(&self, text: &str) -> Vec<T> {
        let mut out = Vec::new();
        for strategy in &self.strategies {
            let found = strategy.collect(text);
            trace!(strategy = strategy.name(), count = found.len(), "strategy collected");
            out.extend(found);
        }
        out
    }
}

/// Compile a built-in pattern, naming it in the error.
pub(crate) fn compile(name: &str, pattern: &str) -> MemoriaResult<Regex> {
    Regex::new(pattern).map_err(|source| MemoriaError::Pattern {
        name: name.to_string(),
        source,
    })
}

/// Label-anchored pattern whose first capture group is the value.
pub struct CapturePattern {
    name: String,
    regex: Regex,
}

impl CapturePattern {
    pub fn new(name: &str, pattern: &str) -> MemoriaResult<Self> {
        Ok(Self {
            name: name.to_string(),
            regex: compile(name, pattern)?,
        })
    }
}

impl MatchStrategy<String> for CapturePattern {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let value = caps.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Every first capture group in the text.
pub struct CaptureAll {
    name: String,
    regex: Regex,
}

impl CaptureAll {
    pub fn new(name: &str, pattern: &str) -> MemoriaResult<Self> {
        Ok(Self {
            name: name.to_string(),
            regex: compile(name, pattern)?,
        })
    }
}

impl CollectStrategy<String> for CaptureAll {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Option<&'static str>);

    impl MatchStrategy<String> for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn attempt(&self, _text: &str) -> Option<String> {
            self.1.map(String::from)
        }
    }

    struct Repeat(usize);

    impl CollectStrategy<usize> for Repeat {
        fn name(&self) -> &str {
            "repeat"
        }

        fn collect(&self, _text: &str) -> Vec<usize> {
            vec![self.0; self.0]
        }
    }

    #[test]
    fn test_first_match_respects_priority() {
        let chain = FirstMatch::new()
            .with(Fixed("none", None))
            .with(Fixed("long", Some("long form")))
            .with(Fixed("short", Some("short form")));
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.attempt("").as_deref(), Some("long form"));
    }

    #[test]
    fn test_first_match_empty_chain() {
        let chain: FirstMatch<String> = FirstMatch::new();
        assert!(chain.is_empty());
        assert!(chain.attempt("anything").is_none());
    }

    #[test]
    fn test_concat_keeps_strategy_order() {
        let concat = Concat::new().with(Repeat(1)).with(Repeat(2));
        assert_eq!(concat.collect(""), vec![1, 2, 2]);
    }

    #[test]
    fn test_capture_pattern_trims_and_rejects_blank() {
        let p = CapturePattern::new("lugar", r"(?i)LUGAR[:\s]+([^\n]+)").unwrap();
        assert_eq!(p.attempt("lugar:  Campo Norte \n").as_deref(), Some("Campo Norte"));
        assert!(p.attempt("OBJETO: x").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_named() {
        let err = CapturePattern::new("broken", r"(unclosed").err().unwrap();
        match err {
            MemoriaError::Pattern { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
