use quill_core::{IngestConfig, IngestError, IngestResult, RawFile};

use crate::classifier::normalize_content_type;

/// Client-side checks run before a file is sent.
///
/// A file rejected here fails on its own; its siblings are still uploaded.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
    reject_empty_files: bool,
}

impl UploadValidator {
    /// An empty allow-list accepts any content type.
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
            reject_empty_files: false,
        }
    }

    /// Fail 0-byte files with [`IngestError::EmptyFile`]. Off by default:
    /// the upload endpoint stores empty files.
    pub fn reject_empty_files(mut self, reject: bool) -> Self {
        self.reject_empty_files = reject;
        self
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
        )
        .reject_empty_files(config.reject_empty_files)
    }

    /// Validate a file name
    pub fn validate_filename(&self, filename: &str) -> IngestResult<()> {
        if filename.trim().is_empty() {
            return Err(IngestError::InvalidInput(
                "File name must not be empty".to_string(),
            ));
        }
        if filename.contains('/') || filename.contains('\\') || filename == ".." {
            return Err(IngestError::InvalidInput(format!(
                "Invalid file name: {}",
                filename
            )));
        }
        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(&self, filename: &str, size: usize) -> IngestResult<()> {
        if size == 0 && self.reject_empty_files {
            return Err(IngestError::EmptyFile(filename.to_string()));
        }

        if size > self.max_file_size {
            return Err(IngestError::PayloadTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> IngestResult<()> {
        if self.allowed_content_types.is_empty() {
            return Ok(());
        }

        let normalized = normalize_content_type(content_type);

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            let shown = if normalized.is_empty() {
                "(unknown)".to_string()
            } else {
                normalized
            };
            return Err(IngestError::UnsupportedType(shown));
        }

        Ok(())
    }

    pub fn validate(&self, file: &RawFile) -> IngestResult<()> {
        self.validate_filename(&file.name)?;
        self.validate_file_size(&file.name, file.size())?;
        self.validate_content_type(&file.content_type)?;
        Ok(())
    }
}
