//! Configuration module
//!
//! Settings for talking to the upload endpoint and for the client-side checks
//! run before a file is sent.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
const MAX_FILE_SIZE_MB: usize = 50;
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// How the configured credential is sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer {key}`
    Bearer,
    /// `X-API-Key: {key}`
    ApiKey,
}

impl FromStr for AuthScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearer" => Ok(AuthScheme::Bearer),
            "api-key" | "api_key" | "apikey" | "x-api-key" => Ok(AuthScheme::ApiKey),
            _ => Err(anyhow::anyhow!("Invalid auth scheme: {}", s)),
        }
    }
}

impl Display for AuthScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::ApiKey => write!(f, "api-key"),
        }
    }
}

/// Ingestion pipeline configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub auth_scheme: AuthScheme,
    pub upload_path: String,
    pub max_file_size_bytes: usize,
    pub upload_timeout_secs: u64,
    /// Empty means any content type is accepted.
    pub allowed_content_types: Vec<String>,
    /// Fail 0-byte files locally instead of sending them.
    pub reject_empty_files: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            auth_scheme: AuthScheme::Bearer,
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
            allowed_content_types: Vec::new(),
            reject_empty_files: false,
        }
    }
}

impl IngestConfig {
    /// Load configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("QUILL_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = lookup("QUILL_API_KEY").filter(|k| !k.trim().is_empty());

        let auth_scheme = match lookup("QUILL_AUTH_SCHEME") {
            Some(raw) => raw.parse()?,
            None => AuthScheme::Bearer,
        };

        let upload_path = lookup("QUILL_UPLOAD_PATH")
            .unwrap_or_else(|| DEFAULT_UPLOAD_PATH.to_string());
        let upload_path = if upload_path.starts_with('/') {
            upload_path
        } else {
            format!("/{}", upload_path)
        };

        let max_file_size_mb = match lookup("QUILL_MAX_FILE_SIZE_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("QUILL_MAX_FILE_SIZE_MB must be a valid number"))?,
            None => MAX_FILE_SIZE_MB,
        };
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("QUILL_MAX_FILE_SIZE_MB is too large"))?;

        let upload_timeout_secs = match lookup("QUILL_UPLOAD_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("QUILL_UPLOAD_TIMEOUT_SECS must be a valid number")
            })?,
            None => UPLOAD_TIMEOUT_SECS,
        };

        let allowed_content_types = lookup("QUILL_ALLOWED_CONTENT_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let reject_empty_files = lookup("QUILL_REJECT_EMPTY_FILES")
            .unwrap_or_else(|| "false".to_string())
            .trim()
            .to_lowercase()
            .parse()
            .unwrap_or(false);

        Ok(Self {
            api_url,
            api_key,
            auth_scheme,
            upload_path,
            max_file_size_bytes,
            upload_timeout_secs,
            allowed_content_types,
            reject_empty_files,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "QUILL_API_URL must be an http:// or https:// URL"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "QUILL_MAX_FILE_SIZE_MB must be greater than zero"
            ));
        }

        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "QUILL_UPLOAD_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Full URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_url, self.upload_path)
    }
}
