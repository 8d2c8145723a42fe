//! Test helpers: scriptable uploader, recording notifier and file fixtures.

pub mod fixtures;

use async_trait::async_trait;
use quill_core::{ErrorMetadata, IngestError, IngestResult, RawFile};
use quill_ingest::{BatchResult, Notice, Notifier, Uploader};
use std::collections::HashMap;
use std::sync::Mutex;

/// Uploader whose per-file results are scripted by file name.
///
/// Unscripted files succeed with `https://cdn.test/<name>`.
#[derive(Default)]
pub struct MockUploader {
    failures: Mutex<HashMap<String, String>>,
    abort_with: Mutex<Option<String>>,
    submitted: Mutex<Vec<Vec<String>>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_file(&self, name: &str, reason: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), reason.to_string());
    }

    /// Make the next batch calls fail as a whole.
    pub fn abort_batches(&self, reason: &str) {
        *self.abort_with.lock().unwrap() = Some(reason.to_string());
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
        *self.abort_with.lock().unwrap() = None;
    }

    /// File names of every batch submitted so far.
    pub fn submitted(&self) -> Vec<Vec<String>> {
        self.submitted.lock().unwrap().clone()
    }
}

pub fn url_for(name: &str) -> String {
    format!("https://cdn.test/{}", name)
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload_file(&self, file: &RawFile) -> IngestResult<String> {
        let failure = self.failures.lock().unwrap().get(&file.name).cloned();
        match failure {
            Some(reason) => Err(IngestError::Remote {
                status: 500,
                message: reason,
            }),
            None => Ok(url_for(&file.name)),
        }
    }

    async fn upload_batch(&self, files: &[RawFile]) -> IngestResult<BatchResult> {
        self.submitted
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());

        let abort = self.abort_with.lock().unwrap().clone();
        if let Some(reason) = abort {
            return Err(IngestError::Transport(reason));
        }

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(
                self.upload_file(file)
                    .await
                    .map_err(|e| e.client_message()),
            );
        }
        Ok(BatchResult::from_results(results))
    }
}

/// Keeps every notice it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
