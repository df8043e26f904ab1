//! Whitespace normalization that keeps line structure.

/// Collapse horizontal whitespace runs to one space, keep line breaks.
///
/// Non-breaking and other Unicode spaces count as horizontal whitespace.
/// Trailing spaces are removed from every line and `\r\n` becomes `\n`.
pub fn normalize_layout(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut pending_space = false;
        for c in line.trim_end_matches('\r').chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Normalize every page and concatenate them in page order.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| normalize_layout(p.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Character count ignoring surrounding whitespace.
pub(crate) fn visible_len(text: &str) -> usize {
    text.trim().chars().count()
}
