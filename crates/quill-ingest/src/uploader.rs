//! Uploader abstraction
//!
//! One file per request; every request of a batch is in flight at the same time
//! and each one succeeds or fails on its own.

use async_trait::async_trait;
use futures::future::join_all;
use quill_core::{ErrorMetadata, IngestError, IngestResult, LogLevel, RawFile};

/// A file that reached the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Position in the submitted batch.
    pub index: usize,
    pub url: String,
}

/// A file that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    /// Position in the submitted batch.
    pub index: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// Per-file outcomes of one batch, each list ordered by input index.
///
/// Every input index appears in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: Vec<UploadedFile>,
    pub failures: Vec<UploadFailure>,
}

impl BatchResult {
    /// Split per-file results (in input order) into successes and failures.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        let mut batch = BatchResult::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(url) => batch.succeeded.push(UploadedFile { index, url }),
                Err(reason) => batch.failures.push(UploadFailure { index, reason }),
            }
        }
        batch
    }

    /// Every file of a batch of `len` failed for the same reason.
    pub fn all_failed(len: usize, reason: &str) -> Self {
        Self {
            succeeded: Vec::new(),
            failures: (0..len)
                .map(|index| UploadFailure {
                    index,
                    reason: reason.to_string(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sends files to the remote store.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a single file and return its remote URL.
    async fn upload_file(&self, file: &RawFile) -> IngestResult<String>;

    /// Upload every file concurrently and collect per-file outcomes.
    ///
    /// Per-file errors never escape this call. An `Err` means the batch as a
    /// whole could not be attempted; callers treat it as every file failing.
    async fn upload_batch(&self, files: &[RawFile]) -> IngestResult<BatchResult> {
        let results = join_all(files.iter().map(|file| async move {
            match self.upload_file(file).await {
                Ok(url) => Ok(url),
                Err(e) => {
                    log_upload_failure(&file.name, &e);
                    Err(e.client_message())
                }
            }
        }))
        .await;

        Ok(BatchResult::from_results(results))
    }
}

/// Log a per-file failure at the level its metadata asks for.
fn log_upload_failure(file: &str, error: &IngestError) {
    let code = error.error_code();
    let recoverable = error.is_recoverable();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(file, error = %error, code, recoverable, "File upload failed");
        }
        LogLevel::Warn => {
            tracing::warn!(file, error = %error, code, recoverable, "File upload failed");
        }
        LogLevel::Error => {
            tracing::error!(file, error = %error, code, recoverable, "File upload failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::IngestError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails files whose name starts with "bad", slower for earlier indexes.
    struct NameUploader {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Uploader for NameUploader {
        async fn upload_file(&self, file: &RawFile) -> IngestResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let delay = 30u64.saturating_sub(file.size() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if file.name.starts_with("bad") {
                Err(IngestError::Transport(format!("{} refused", file.name)))
            } else {
                Ok(format!("/uploads/{}", file.name))
            }
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order_and_isolates_failures() {
        let uploader = NameUploader {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        };
        let files = vec![
            RawFile::new("a.png", "image/png", vec![0]),
            RawFile::new("bad.py", "", vec![0; 1]),
            RawFile::new("c.md", "", vec![0; 2]),
        ];

        let result = uploader.upload_batch(&files).await.unwrap();

        assert_eq!(
            result.succeeded,
            vec![
                UploadedFile {
                    index: 0,
                    url: "/uploads/a.png".to_string()
                },
                UploadedFile {
                    index: 2,
                    url: "/uploads/c.md".to_string()
                },
            ]
        );
        assert_eq!(
            result.failures,
            vec![UploadFailure {
                index: 1,
                reason: "bad.py refused".to_string()
            }]
        );
        assert_eq!(result.len(), 3);
        // all requests were issued before any finished
        assert_eq!(uploader.max_in_flight.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_all_failed_covers_every_index() {
        let result = BatchResult::all_failed(3, "offline");
        assert!(result.succeeded.is_empty());
        let indexes: Vec<usize> = result.failures.iter().map(|f| f.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(result.failures.iter().all(|f| f.reason == "offline"));
    }

    #[test]
    fn test_from_results_empty() {
        let result = BatchResult::from_results(Vec::new());
        assert!(result.is_empty());
    }
}
