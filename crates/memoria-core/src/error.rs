//! Error types for memoria operations.
//!
//! Missing fields are not errors: a pattern that finds nothing yields the
//! `No especificado` sentinel or an empty list. Only the failures below can
//! end a pipeline run, and of those only rendering and total acquisition
//! failures are surfaced as failed runs.

use thiserror::Error;

/// Result type alias for memoria operations.
pub type MemoriaResult<T> = Result<T, MemoriaError>;

/// Main error type for all memoria operations.
#[derive(Error, Debug)]
pub enum MemoriaError {
    /// No text could be obtained from the source document.
    #[error("Acquisition error: {message}")]
    Acquisition {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document assembly or artifact write failed.
    #[error("Rendering error: {message}")]
    Rendering {
        message: String,
        code: ErrorCode,
        /// Section or artifact being produced when the fault happened.
        context: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// External corrector returned nothing usable.
    #[error("Correction unavailable: {message}")]
    Correction { message: String, code: ErrorCode },

    /// Text generation provider failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Output storage failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A built-in extraction pattern failed to compile.
    #[error("Invalid pattern '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Acquisition (ACQ_xxx)
    AcqUnreadableDocument,
    AcqRecognitionFailed,
    AcqTimeout,

    // Rendering (RND_xxx)
    RndAssemblyFailed,
    RndSerializationFailed,
    RndWriteFailed,

    // Correction (COR_xxx)
    CorErrorPayload,
    CorInvalidJson,
    CorProviderFailed,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Storage (STO_xxx)
    StoWriteFailed,
    StoCollision,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AcqUnreadableDocument => "ACQ_001",
            ErrorCode::AcqRecognitionFailed => "ACQ_002",
            ErrorCode::AcqTimeout => "ACQ_003",
            ErrorCode::RndAssemblyFailed => "RND_001",
            ErrorCode::RndSerializationFailed => "RND_002",
            ErrorCode::RndWriteFailed => "RND_003",
            ErrorCode::CorErrorPayload => "COR_001",
            ErrorCode::CorInvalidJson => "COR_002",
            ErrorCode::CorProviderFailed => "COR_003",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::StoWriteFailed => "STO_001",
            ErrorCode::StoCollision => "STO_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl MemoriaError {
    /// Create an acquisition error.
    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::Acquisition {
            message: message.into(),
            code: ErrorCode::AcqUnreadableDocument,
            source: None,
        }
    }

    /// Create a rendering error, keeping the section that was being rendered.
    pub fn rendering(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Rendering {
            message: message.into(),
            code: ErrorCode::RndAssemblyFailed,
            context: Some(context.into()),
            source: None,
        }
    }

    /// Create a rendering error for a failed artifact serialization.
    pub fn serialization(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Rendering {
            message: message.into(),
            code: ErrorCode::RndSerializationFailed,
            context: Some(context.into()),
            source: None,
        }
    }

    /// Create a rendering error for an artifact that could not be written.
    pub fn write_failed(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Rendering {
            message: source.to_string(),
            code: ErrorCode::RndWriteFailed,
            context: Some(context.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a correction error.
    pub fn correction(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Correction {
            message: message.into(),
            code,
        }
    }

    /// Create an LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            code: ErrorCode::StoWriteFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Acquisition { code, .. } => *code,
            Self::Rendering { code, .. } => *code,
            Self::Correction { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::Storage { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Serialization(_) => ErrorCode::ParseInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Section or artifact that was being rendered, if any.
    pub fn rendering_context(&self) -> Option<&str> {
        match self {
            Self::Rendering { context, .. } => context.as_deref(),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Acquisition {
                code: ErrorCode::AcqRecognitionFailed,
                ..
            } => Some("Check that tesseract and the pdfium library are installed"),
            Self::Acquisition { .. } => Some("Check that the file is a readable PDF"),
            Self::Rendering { .. } => Some("Check the output directory permissions and free space"),
            Self::Llm { .. } => Some("Please check your corrector provider configuration"),
            Self::Storage { .. } => Some("Check the output root configured for memorias"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_error_keeps_context() {
        let err = MemoriaError::rendering("table build failed", "4. PLANILLA DE LADOS");
        assert_eq!(err.code(), ErrorCode::RndAssemblyFailed);
        assert_eq!(err.rendering_context(), Some("4. PLANILLA DE LADOS"));
        assert!(err.to_string().contains("table build failed"));
    }

    #[test]
    fn test_write_failure_wraps_storage_error() {
        let err = MemoriaError::write_failed(
            "outputs/memorias/p17_20240101_120000.docx",
            MemoriaError::storage("disk full"),
        );
        assert_eq!(err.code().as_str(), "RND_003");
        assert_eq!(
            err.rendering_context(),
            Some("outputs/memorias/p17_20240101_120000.docx")
        );
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_correction_error_code() {
        let err = MemoriaError::correction("bad json", ErrorCode::CorInvalidJson);
        assert_eq!(err.code().as_str(), "COR_002");
        assert!(err.suggestion().is_none());
    }

    #[test]
    fn test_parse_error_code() {
        let err = MemoriaError::parse("expected value at line 1 column 1");
        assert_eq!(err.code().as_str(), "PARSE_001");
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::AcqUnreadableDocument.as_str(), "ACQ_001");
        assert_eq!(ErrorCode::StoCollision.as_str(), "STO_002");
    }
}
