//! Source text and acquisition outcome types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AcquisitionMethod {
    /// Text layer embedded in the PDF.
    #[default]
    Embedded,
    /// Optical recognition of rendered page images.
    OpticalRecognition,
}

/// Full text of one document. Immutable once created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    content: String,
    method: AcquisitionMethod,
}

impl SourceText {
    /// Create source text obtained with the given method.
    pub fn new(content: impl Into<String>, method: AcquisitionMethod) -> Self {
        Self {
            content: content.into(),
            method,
        }
    }

    /// Empty source text, used when acquisition produced nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn method(&self) -> AcquisitionMethod {
        self.method
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    /// True when the text has no visible content.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.content
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

/// Typed outcome of text acquisition.
///
/// Distinguishes a genuinely empty document from one whose acquisition
/// degraded or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcquisitionStatus {
    /// Text obtained without faults.
    Extracted,
    /// No faults, but the document carries no text.
    Empty,
    /// Some step failed; the text kept is whatever survived.
    Degraded { reason: String },
    /// Nothing could be obtained at all.
    Failed { reason: String },
}

impl AcquisitionStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason } | Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Text plus the way it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acquisition {
    pub text: SourceText,
    pub status: AcquisitionStatus,
    /// Number of pages seen, when the document could be opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

impl Acquisition {
    pub fn new(text: SourceText, status: AcquisitionStatus) -> Self {
        Self {
            text,
            status,
            page_count: None,
        }
    }

    /// Acquisition that obtained nothing because of `reason`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(
            SourceText::empty(),
            AcquisitionStatus::Failed {
                reason: reason.into(),
            },
        )
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_text_len_counts_chars() {
        let text = SourceText::new("LUGAR: Añatuya", AcquisitionMethod::Embedded);
        assert_eq!(text.len(), 14);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let text = SourceText::new(" \n\t ", AcquisitionMethod::OpticalRecognition);
        assert!(text.is_empty());
        assert_eq!(text.method(), AcquisitionMethod::OpticalRecognition);
    }

    #[test]
    fn test_failed_acquisition() {
        let acq = Acquisition::failed("corrupt xref table");
        assert!(acq.status.is_failed());
        assert_eq!(acq.status.reason(), Some("corrupt xref table"));
        assert!(acq.text.is_empty());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(
            AcquisitionMethod::OpticalRecognition.to_string(),
            "optical_recognition"
        );
    }
}
