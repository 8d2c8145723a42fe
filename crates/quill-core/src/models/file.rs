use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::error::{IngestError, IngestResult};

/// Category assigned to a file by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Code,
    Other,
}

impl Display for FileCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileCategory::Image => write!(f, "image"),
            FileCategory::Video => write!(f, "video"),
            FileCategory::Code => write!(f, "code"),
            FileCategory::Other => write!(f, "other"),
        }
    }
}

/// A user-selected file as handed to the pipeline by the host.
///
/// `data` is reference counted, so clones are cheap and the pending-retry set
/// can hold files without copying them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    /// Declared MIME type. May be empty when the host could not tell.
    pub content_type: String,
    pub data: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> IngestResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IngestError::InvalidInput(format!("Invalid path: {}", path.display())))?
            .to_string();

        let data = tokio::fs::read(path).await?;
        let content_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        Ok(Self::new(name, content_type, data))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercase extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Upload progress of a single record.
///
/// A remote URL exists exactly when the upload succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Pending,
    Uploading,
    Succeeded {
        url: String,
    },
    Failed {
        reason: String,
    },
}

impl UploadState {
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            UploadState::Succeeded { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Succeeded { .. } | UploadState::Failed { .. }
        )
    }
}
