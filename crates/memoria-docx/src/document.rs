//! Section model of a rendered memoria.

use chrono::NaiveDateTime;

/// Placeholder for an empty table cell.
pub const EMPTY_CELL: &str = "—";

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Table with a fixed column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells are padded, extra cells dropped.
    pub fn push_row(&mut self, cells: Vec<String>) {
        let mut cells = cells;
        cells.resize(self.headers.len(), EMPTY_CELL.to_string());
        self.rows.push(cells);
    }

    pub fn columns(&self) -> usize {
        self.headers.len()
    }
}

/// One block of the document body, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Numbered section heading, rendered bold.
    Heading(String),
    /// Bold label followed by its value.
    KeyValue { label: String, value: String },
    /// Free text. Line breaks are kept.
    Paragraph {
        text: String,
        align: Alignment,
        bold: bool,
    },
    /// Bulleted list item.
    Bullet(String),
    Table(TableBlock),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            text: text.into(),
            align: Alignment::Left,
            bold: false,
        }
    }

    pub fn aligned(text: impl Into<String>, align: Alignment) -> Self {
        Self::Paragraph {
            text: text.into(),
            align,
            bold: false,
        }
    }

    pub fn key_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::KeyValue {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Plain-text projection of this block.
    fn write_text(&self, out: &mut Vec<String>) {
        match self {
            Block::Heading(text) => out.push(text.clone()),
            Block::KeyValue { label, value } => out.push(format!("{label}: {value}")),
            Block::Paragraph { text, .. } => out.push(text.clone()),
            Block::Bullet(text) => out.push(format!("• {text}")),
            Block::Table(table) => {
                out.push(table.headers.join(" | "));
                out.extend(table.rows.iter().map(|row| row.join(" | ")));
            }
        }
    }
}

/// An assembled memoria descriptiva, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub document_id: String,
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub blocks: Vec<Block>,
    /// Repeated on every page.
    pub footer: String,
}

impl RenderedDocument {
    /// "Documento generado el DD/MM/YYYY HH:MM:SS".
    pub fn generation_line(&self) -> String {
        format!(
            "Documento generado el {}",
            self.generated_at.format("%d/%m/%Y %H:%M:%S")
        )
    }

    /// Section headings in order.
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_heading(&self, prefix: &str) -> bool {
        self.headings().iter().any(|h| h.starts_with(prefix))
    }

    /// Tables in order.
    pub fn tables(&self) -> Vec<&TableBlock> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Textual content of the document, one line per block or table row.
    ///
    /// The generation line is left out, so two renders of the same
    /// extraction compare equal.
    pub fn content_text(&self) -> String {
        let mut lines = vec![self.title.clone()];
        for block in &self.blocks {
            block.write_text(&mut lines);
        }
        lines.push(self.footer.clone());
        lines.join("\n")
    }
}
