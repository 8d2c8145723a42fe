//! HTTP client for the upload endpoint.
//!
//! Provides a minimal client with configurable auth (Bearer token or X-API-Key)
//! and [`HttpUploader`], the network implementation of
//! [`quill_ingest::Uploader`]. The CLI uses both directly.

pub mod upload;

use anyhow::{Context, Result};
use quill_core::{AuthScheme, IngestConfig, IngestError, IngestResult, UploadErrorBody};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use upload::HttpUploader;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

impl Auth {
    /// Auth from configuration, or `None` when no key is configured.
    pub fn from_config(config: &IngestConfig) -> Option<Self> {
        let key = config.api_key.clone()?;
        Some(match config.auth_scheme {
            AuthScheme::Bearer => Auth::Bearer(key),
            AuthScheme::ApiKey => Auth::XApiKey(key),
        })
    }
}

/// HTTP client for the upload API with optional auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Option<Auth>,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Option<Auth>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            Auth::from_config(config),
            config.upload_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(Auth::Bearer(token)) => {
                request.header("Authorization", format!("Bearer {}", token))
            }
            Some(Auth::XApiKey(key)) => request.header("X-API-Key", key.as_str()),
            None => request,
        }
    }

    /// POST multipart form and deserialize the JSON response.
    ///
    /// A non-2xx status becomes [`IngestError::Remote`], using the `error`
    /// field of the body when the server sent one.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> IngestResult<T> {
        let url = self.build_url(path);
        let request = self.client.post(&url).multipart(form);
        let request = self.apply_auth(request);

        let response = request
            .send()
            .await
            .map_err(|e| IngestError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IngestError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(IngestError::Remote {
                status: status.as_u16(),
                message: remote_message(status, &body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Longest raw (non-JSON) error body shown to the user.
const MAX_REASON_CHARS: usize = 200;

fn remote_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<UploadErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    // markup error pages are never shown verbatim
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return truncate_reason(trimmed, MAX_REASON_CHARS);
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn truncate_reason(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
