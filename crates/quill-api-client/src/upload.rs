//! Network uploader: one multipart `POST` per file.

use async_trait::async_trait;
use quill_core::{IngestConfig, IngestError, IngestResult, RawFile, UploadResponse};
use quill_ingest::{UploadValidator, Uploader};
use reqwest::multipart::{Form, Part};

use crate::ApiClient;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploads files to `{base_url}{upload_path}` as the multipart field `file`.
///
/// Files are checked with an [`UploadValidator`] first, so oversized or
/// disallowed files fail locally without a request.
#[derive(Clone, Debug)]
pub struct HttpUploader {
    client: ApiClient,
    upload_path: String,
    validator: UploadValidator,
}

impl HttpUploader {
    pub fn new(client: ApiClient, upload_path: impl Into<String>, validator: UploadValidator) -> Self {
        Self {
            client,
            upload_path: upload_path.into(),
            validator,
        }
    }

    pub fn from_config(config: &IngestConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            ApiClient::from_config(config)?,
            config.upload_path.clone(),
            UploadValidator::from_config(config),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Multipart form for one file. A declared content type that does not
    /// parse is sent as `application/octet-stream`.
    fn form_for(file: &RawFile) -> IngestResult<Form> {
        let build = || Part::bytes(file.data.to_vec()).file_name(file.name.clone());
        let declared = file.content_type.trim();

        let part = if declared.is_empty() {
            build().mime_str(FALLBACK_CONTENT_TYPE)
        } else {
            build().mime_str(declared).or_else(|e| {
                tracing::debug!(
                    file = %file.name,
                    content_type = %declared,
                    error = %e,
                    "Unparseable content type, sending as octet-stream"
                );
                build().mime_str(FALLBACK_CONTENT_TYPE)
            })
        }
        .map_err(|e| IngestError::Internal(format!("Failed to build upload form: {}", e)))?;

        Ok(Form::new().part("file", part))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload_file(&self, file: &RawFile) -> IngestResult<String> {
        self.validator.validate(file)?;
        let form = Self::form_for(file)?;

        tracing::debug!(
            file = %file.name,
            size = file.size(),
            content_type = %file.content_type,
            "Uploading file"
        );

        let response: UploadResponse = self.client.post_multipart(&self.upload_path, form).await?;

        if response.success == Some(false) {
            return Err(IngestError::InvalidResponse(format!(
                "Server reported failure for {}",
                file.name
            )));
        }
        if response.file_url.trim().is_empty() {
            return Err(IngestError::InvalidResponse(format!(
                "No file URL returned for {}",
                file.name
            )));
        }

        tracing::info!(
            file = %file.name,
            url = %response.file_url,
            stored_as = response.file_name.as_deref().unwrap_or(""),
            "File uploaded"
        );
        Ok(response.file_url)
    }
}
