//! Error types module
//!
//! All failures that can happen while a file travels through the ingestion
//! pipeline are unified under [`IngestError`]. The orchestrator never propagates
//! these to the host: they are folded into per-file failure reasons or into the
//! batch error state, using [`ErrorMetadata::client_message`] as the text shown
//! to the user.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a flaky connection
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error reporting - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "TRANSPORT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same file can succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty file: {0}")]
    EmptyFile(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upload rejected with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for pipeline operations
pub type IngestResult<T> = Result<T, IngestError>;

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::InvalidResponse(format!("JSON parsing error: {}", err))
    }
}

impl From<anyhow::Error> for IngestError {
    fn from(err: anyhow::Error) -> Self {
        IngestError::Internal(format!("{:#}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn ingest_error_static_metadata(
    err: &IngestError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        IngestError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the selected file and try again"),
            LogLevel::Debug,
        ),
        IngestError::EmptyFile(_) => (
            "EMPTY_FILE",
            false,
            Some("Select a file with content"),
            LogLevel::Debug,
        ),
        IngestError::PayloadTooLarge { .. } => (
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            LogLevel::Debug,
        ),
        IngestError::UnsupportedType(_) => (
            "UNSUPPORTED_TYPE",
            false,
            Some("Use an image, video or source file"),
            LogLevel::Debug,
        ),
        IngestError::Transport(_) => (
            "TRANSPORT_ERROR",
            true,
            Some("Check your connection and retry"),
            LogLevel::Warn,
        ),
        IngestError::Remote { status, .. } if *status >= 500 => (
            "REMOTE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Warn,
        ),
        IngestError::Remote { .. } => (
            "UPLOAD_REJECTED",
            false,
            Some("Check the file and try again"),
            LogLevel::Warn,
        ),
        IngestError::InvalidResponse(_) => (
            "INVALID_RESPONSE",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        IngestError::Io(_) => (
            "IO_ERROR",
            false,
            Some("Check that the file is readable"),
            LogLevel::Error,
        ),
        IngestError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Fix the configuration and restart"),
            LogLevel::Error,
        ),
        IngestError::Internal(_) => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl IngestError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for IngestError {
    fn error_code(&self) -> &'static str {
        ingest_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        ingest_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        ingest_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        ingest_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            IngestError::InvalidInput(msg) => msg.clone(),
            IngestError::EmptyFile(name) => format!("{} is empty", name),
            IngestError::PayloadTooLarge { size, max } => {
                format!("File too large: {} bytes (max {} bytes)", size, max)
            }
            IngestError::UnsupportedType(content_type) => {
                format!("File type {} is not allowed", content_type)
            }
            IngestError::Transport(msg) => msg.clone(),
            IngestError::Remote { message, .. } => message.clone(),
            IngestError::InvalidResponse(_) => "Unexpected response from upload server".to_string(),
            IngestError::Io(err) => format!("Failed to read file: {}", err),
            IngestError::Config(msg) => msg.clone(),
            IngestError::Internal(msg) => msg.clone(),
        }
    }
}
