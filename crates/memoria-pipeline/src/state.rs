//! Per-document run state and the report handed back to callers.

use std::path::PathBuf;

use memoria_core::{
    Acquisition, AcquisitionMethod, AcquisitionStatus, ExtractionResult, MemoriaError,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, warn};

/// Stage of one document run.
///
/// `pending → extracting → rendering → completed`, with `error` reachable
/// from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Extracting,
    Rendering,
    Completed,
    Error,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether `next` may follow this state.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Pending, Extracting) | (Extracting, Rendering) | (Rendering, Completed) => true,
            (from, Error) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// What the acquisition step produced, without the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionSummary {
    pub method: AcquisitionMethod,
    #[serde(flatten)]
    pub status: AcquisitionStatus,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

impl From<&Acquisition> for AcquisitionSummary {
    fn from(acquisition: &Acquisition) -> Self {
        Self {
            method: acquisition.text.method(),
            status: acquisition.status.clone(),
            characters: acquisition.text.len(),
            page_count: acquisition.page_count,
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub document_id: String,
    pub state: PipelineState,
    /// Every state entered, in order.
    pub history: Vec<PipelineState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition: Option<AcquisitionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    /// Whether the corrector replaced the extraction.
    #[serde(default)]
    pub corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl RunReport {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            state: PipelineState::Pending,
            history: vec![PipelineState::Pending],
            acquisition: None,
            extraction: None,
            corrected: false,
            output_path: None,
            data_path: None,
            error: None,
            error_code: None,
        }
    }

    /// Report for a run that never got to execute.
    pub fn aborted(document_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new(document_id);
        report.state = PipelineState::Error;
        report.history.push(PipelineState::Error);
        report.error = Some(reason.into());
        report
    }

    /// Move to `next`, recording it in the history.
    pub(crate) fn enter(&mut self, next: PipelineState) -> Result<(), MemoriaError> {
        if !self.state.can_transition_to(next) {
            return Err(MemoriaError::Internal(format!(
                "invalid transition {} -> {}",
                self.state, next
            )));
        }
        info!(document_id = %self.document_id, from = %self.state, to = %next, "state transition");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Terminate in `error`, keeping whatever was produced so far.
    pub(crate) fn fail(&mut self, error: &MemoriaError) {
        warn!(
            document_id = %self.document_id,
            state = %self.state,
            code = error.code().as_str(),
            error = %error,
            "run failed"
        );
        if !self.state.is_terminal() {
            self.history.push(PipelineState::Error);
        }
        self.state = PipelineState::Error;
        let message = match error.rendering_context() {
            Some(context) => format!("{error} (while rendering {context})"),
            None => error.to_string(),
        };
        self.error = Some(message);
        self.error_code = Some(error.code().as_str().to_string());
    }

    pub fn is_completed(&self) -> bool {
        self.state == PipelineState::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.state == PipelineState::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transitions() {
        use PipelineState::*;
        assert!(Pending.can_transition_to(Extracting));
        assert!(Extracting.can_transition_to(Rendering));
        assert!(Rendering.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Error));
        assert!(Rendering.can_transition_to(Error));
        assert!(!Pending.can_transition_to(Rendering));
        assert!(!Completed.can_transition_to(Error));
        assert!(!Error.can_transition_to(Extracting));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(PipelineState::Extracting.to_string(), "extracting");
        assert_eq!(PipelineState::from_str("completed").unwrap(), PipelineState::Completed);
        assert_eq!(
            serde_json::to_string(&PipelineState::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn test_history_and_failure() {
        let mut report = RunReport::new("p-1");
        report.enter(PipelineState::Extracting).unwrap();
        assert!(report.enter(PipelineState::Completed).is_err());

        report.fail(&MemoriaError::rendering("disk full", "planilla de lados"));
        assert!(report.is_failed());
        assert_eq!(
            report.history,
            vec![PipelineState::Pending, PipelineState::Extracting, PipelineState::Error]
        );
        let error = report.error.unwrap();
        assert!(error.contains("disk full"));
        assert!(error.contains("planilla de lados"));
        assert_eq!(report.error_code.as_deref(), Some("RND_001"));
    }

    #[test]
    fn test_aborted_report() {
        let report = RunReport::aborted("p-2", "task panicked");
        assert_eq!(report.history, vec![PipelineState::Pending, PipelineState::Error]);
        assert_eq!(report.error.as_deref(), Some("task panicked"));
    }
}
