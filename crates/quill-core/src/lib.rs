//! Quill Core Library
//!
//! This crate provides the domain models, error types, configuration and the shared
//! investigation context used by every Quill component.

pub mod config;
pub mod error;
pub mod investigation;
pub mod models;

// Re-export commonly used types
pub use config::{AuthScheme, IngestConfig};
pub use error::{ErrorMetadata, IngestError, IngestResult, LogLevel};
pub use investigation::{InvestigationContext, InvestigationSnapshot, StartHandler};
pub use models::{FileCategory, RawFile, UploadErrorBody, UploadResponse, UploadState};
