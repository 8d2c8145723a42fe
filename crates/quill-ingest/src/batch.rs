use quill_core::{ErrorMetadata, IngestError, LogLevel, RawFile, UploadState};
use uuid::Uuid;

use crate::preview::PreviewManager;
use crate::record::FileRecord;
use crate::uploader::{BatchResult, Uploader};

/// Aggregate outcome of a resolved batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

impl BatchOutcome {
    /// Outcome of a set of record states, or `None` while any is unresolved
    /// (or the set is empty).
    pub fn from_states<'a, I>(states: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a UploadState>,
    {
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for state in states {
            match state {
                UploadState::Succeeded { .. } => succeeded += 1,
                UploadState::Failed { .. } => failed += 1,
                UploadState::Pending | UploadState::Uploading => return None,
            }
        }

        match (succeeded, failed) {
            (0, 0) => None,
            (_, 0) => Some(BatchOutcome::AllSucceeded),
            (0, _) => Some(BatchOutcome::AllFailed),
            _ => Some(BatchOutcome::PartialFailure),
        }
    }
}

/// How the uploader call for a batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSettlement {
    /// The uploader reported per-file results.
    Completed(BatchResult),
    /// The uploader call itself failed; every file counts as failed.
    Aborted {
        reason: String,
        suggested_action: Option<String>,
    },
}

/// Files submitted together in one user action.
///
/// Records keep the submission order, which is also the order their markup is
/// inserted in. Dropping a batch releases any preview its records still hold.
pub struct UploadBatch {
    id: Uuid,
    records: Vec<FileRecord>,
    previews: PreviewManager,
}

impl UploadBatch {
    /// Classify and preview `files`, marking every record as uploading.
    pub fn new(files: Vec<RawFile>, previews: PreviewManager) -> Self {
        let records = files
            .into_iter()
            .map(|file| {
                let mut record = FileRecord::new(file);
                previews.acquire(&mut record);
                record.mark_uploading();
                record
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            records,
            previews,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn files(&self) -> Vec<RawFile> {
        self.records.iter().map(|r| r.file().clone()).collect()
    }

    /// Run the uploader for every file in the batch.
    ///
    /// Never fails: an error from the uploader call becomes
    /// [`BatchSettlement::Aborted`].
    pub async fn upload<U>(&self, uploader: &U) -> BatchSettlement
    where
        U: Uploader + ?Sized,
    {
        let files = self.files();
        match uploader.upload_batch(&files).await {
            Ok(result) => BatchSettlement::Completed(result),
            Err(e) => {
                log_batch_failure(self.id, files.len(), &e);
                BatchSettlement::Aborted {
                    reason: e.client_message(),
                    suggested_action: e.suggested_action().map(String::from),
                }
            }
        }
    }

    /// Move every record to its terminal state.
    pub fn apply(&mut self, settlement: &BatchSettlement) {
        match settlement {
            BatchSettlement::Completed(result) => {
                for uploaded in &result.succeeded {
                    if let Some(record) = self.records.get_mut(uploaded.index) {
                        record.mark_succeeded(uploaded.url.clone());
                    }
                }
                for failure in &result.failures {
                    if let Some(record) = self.records.get_mut(failure.index) {
                        record.mark_failed(failure.reason.clone());
                    }
                }
                for record in self.records.iter_mut() {
                    if !record.state().is_terminal() {
                        tracing::warn!(
                            batch_id = %self.id,
                            file = %record.name(),
                            "Uploader reported no result for file"
                        );
                        record.mark_failed("No upload result reported");
                    }
                }
            }
            BatchSettlement::Aborted { reason, .. } => {
                for record in self.records.iter_mut() {
                    record.mark_failed(reason.clone());
                }
            }
        }
    }

    pub fn outcome(&self) -> Option<BatchOutcome> {
        BatchOutcome::from_states(self.records.iter().map(|r| r.state()))
    }

    /// Files whose upload failed, in submission order.
    pub fn failed_files(&self) -> Vec<RawFile> {
        self.records
            .iter()
            .filter(|r| matches!(r.state(), UploadState::Failed { .. }))
            .map(|r| r.file().clone())
            .collect()
    }

    pub fn release_previews(&mut self) {
        self.previews.release_all(&mut self.records);
    }
}

fn log_batch_failure(batch_id: Uuid, file_count: usize, error: &IngestError) {
    let details = error.detailed_message();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(%batch_id, file_count, error = %details, code, "Batch upload aborted");
        }
        LogLevel::Warn => {
            tracing::warn!(%batch_id, file_count, error = %details, code, "Batch upload aborted");
        }
        LogLevel::Error => {
            tracing::error!(%batch_id, file_count, error = %details, code, "Batch upload aborted");
        }
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        self.release_previews();
    }
}
