//! Error types for the DocChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The set of kinds is
//! closed so callers can branch on variants instead of matching on messages.

use thiserror::Error;

use crate::document::DocumentFormat;

/// The top-level error type for all DocChat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Per-document extraction ---
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    // --- Batch extraction ---
    #[error("No content could be extracted from the uploaded files ({attempted} attempted)")]
    AllDocumentsFailed {
        attempted: usize,
        failures: Vec<(String, ExtractionError)>,
    },

    #[error("No documents loaded; upload documents before asking questions")]
    NoDocumentContext,

    // --- Model service ---
    #[error("Error generating {operation}: {message}")]
    ModelRequestFailed {
        operation: ModelOperation,
        message: String,
    },

    // --- Configuration ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single document produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("{}", .format.no_content_message())]
    NoExtractableContent { format: DocumentFormat },

    #[error("{} processing error: {message}", .format.label())]
    Processing {
        format: DocumentFormat,
        message: String,
    },
}

impl ExtractionError {
    /// Wrap an underlying library failure for the given format.
    pub fn processing(format: DocumentFormat, err: impl std::fmt::Display) -> Self {
        Self::Processing {
            format,
            message: err.to_string(),
        }
    }
}

/// Which model call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOperation {
    /// A chat turn answering a user question.
    Response,
    /// A free-form document summary.
    Summary,
}

impl std::fmt::Display for ModelOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response => write!(f, "response"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Collapse any provider failure into the single model-failure kind.
    pub fn into_model_error(self, operation: ModelOperation) -> Error {
        Error::ModelRequestFailed {
            operation,
            message: self.to_string(),
        }
    }
}
