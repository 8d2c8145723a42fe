//! Ingestion orchestrator
//!
//! Drives a batch from "files received" to "markup inserted". Each user action
//! becomes its own [`UploadBatch`]; the orchestrator keeps the state that
//! outlives a batch: the pending-retry set, the error state and the attached
//! text surface.

use quill_core::RawFile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use uuid::Uuid;

use crate::batch::{BatchOutcome, BatchSettlement, UploadBatch};
use crate::markup::markup_for_records;
use crate::notify::{count_files, Notice, Notifier};
use crate::preview::PreviewManager;
use crate::surface::TextSurface;
use crate::uploader::Uploader;

pub const DEFAULT_FAILURE_MESSAGE: &str =
    "Failed to upload files. Please check your connection and try again.";

/// Error shown to the user after a batch with failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadErrorState {
    pub message: String,
    /// Nothing from the batch was inserted; the host should show a panel
    /// offering retry or dismiss rather than a transient notice.
    pub blocking: bool,
    /// Hint from the failing error, when the uploader call failed as a whole.
    pub suggested_action: Option<String>,
}

/// Orchestrator-level view of upload activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Idle,
    Uploading,
    Retrying,
    Resolved(BatchOutcome),
}

/// What happened to one resolved batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub outcome: BatchOutcome,
    /// Markup built from the succeeded records, in input order.
    pub markup: String,
    pub succeeded: usize,
    pub failed: usize,
    /// Whether `markup` reached a text surface.
    pub inserted: bool,
    /// The orchestrator was torn down before the batch resolved.
    pub discarded: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    files: usize,
    retry: bool,
}

pub struct IngestionOrchestrator {
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn Notifier>,
    previews: PreviewManager,
    surface: Option<Weak<Mutex<dyn TextSurface>>>,
    pending_retry: Vec<RawFile>,
    error: Option<UploadErrorState>,
    in_flight: HashMap<Uuid, InFlight>,
    last_outcome: Option<BatchOutcome>,
    closed: bool,
}

impl IngestionOrchestrator {
    pub fn new(uploader: Arc<dyn Uploader>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            uploader,
            notifier,
            previews: PreviewManager::new(),
            surface: None,
            pending_retry: Vec::new(),
            error: None,
            in_flight: HashMap::new(),
            last_outcome: None,
            closed: false,
        }
    }

    /// Use a shared preview registry instead of a private one.
    pub fn with_previews(mut self, previews: PreviewManager) -> Self {
        self.previews = previews;
        self
    }

    pub fn previews(&self) -> &PreviewManager {
        &self.previews
    }

    /// Attach the document that receives inserted markup.
    ///
    /// Only a weak reference is kept: once the host drops the surface,
    /// insertions become no-ops.
    pub fn attach_surface<S>(&mut self, surface: &Arc<Mutex<S>>)
    where
        S: TextSurface + 'static,
    {
        let surface: Arc<Mutex<dyn TextSurface>> = surface.clone();
        self.surface = Some(Arc::downgrade(&surface));
    }

    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    /// Files dropped onto the document.
    pub async fn on_files_drop(&mut self, files: Vec<RawFile>) -> Option<BatchReport> {
        self.run(files, false).await
    }

    /// Files chosen through a picker. Same flow as a drop.
    pub async fn on_file_select(&mut self, files: Vec<RawFile>) -> Option<BatchReport> {
        self.run(files, false).await
    }

    /// Re-submit the pending-retry set.
    ///
    /// Returns `None` when nothing is pending.
    pub async fn retry(&mut self) -> Option<BatchReport> {
        if self.closed || self.pending_retry.is_empty() {
            return None;
        }
        self.error = None;
        let files = std::mem::take(&mut self.pending_retry);
        tracing::info!(file_count = files.len(), "Retrying failed uploads");
        self.run(files, true).await
    }

    async fn run(&mut self, files: Vec<RawFile>, retry: bool) -> Option<BatchReport> {
        let batch = self.start_batch(files, retry)?;
        let uploader = Arc::clone(&self.uploader);
        let settlement = batch.upload(uploader.as_ref()).await;
        Some(self.resolve(batch, settlement))
    }

    /// Classify and preview `files` and register them as in flight.
    ///
    /// Returns `None` for an empty collection or after teardown. The caller
    /// runs [`UploadBatch::upload`] and hands the settlement to
    /// [`resolve`](Self::resolve); batches started this way are independent of
    /// each other.
    pub fn begin_batch(&mut self, files: Vec<RawFile>) -> Option<UploadBatch> {
        self.start_batch(files, false)
    }

    fn start_batch(&mut self, files: Vec<RawFile>, retry: bool) -> Option<UploadBatch> {
        if self.closed || files.is_empty() {
            return None;
        }

        let batch = UploadBatch::new(files, self.previews.clone());
        self.in_flight.insert(
            batch.id(),
            InFlight {
                files: batch.len(),
                retry,
            },
        );

        tracing::info!(
            batch_id = %batch.id(),
            file_count = batch.len(),
            retry,
            "Upload batch started"
        );
        self.notifier
            .notify(Notice::info(format!("Uploading {}...", count_files(batch.len()))));

        Some(batch)
    }

    /// Apply a settlement to its batch: insert markup, update the retry set
    /// and error state, notify, and release the batch's previews.
    pub fn resolve(&mut self, mut batch: UploadBatch, settlement: BatchSettlement) -> BatchReport {
        self.in_flight.remove(&batch.id());
        batch.apply(&settlement);
        batch.release_previews();

        let outcome = batch.outcome().unwrap_or(BatchOutcome::AllFailed);
        let failed_files = batch.failed_files();
        let markup = markup_for_records(batch.records());
        let mut report = BatchReport {
            batch_id: batch.id(),
            outcome,
            markup,
            succeeded: batch.len() - failed_files.len(),
            failed: failed_files.len(),
            inserted: false,
            discarded: false,
        };

        if self.closed {
            tracing::debug!(batch_id = %report.batch_id, "Ignoring batch resolved after teardown");
            report.discarded = true;
            return report;
        }

        tracing::info!(
            batch_id = %report.batch_id,
            outcome = ?outcome,
            succeeded = report.succeeded,
            failed = report.failed,
            "Upload batch resolved"
        );
        self.last_outcome = Some(outcome);

        match outcome {
            BatchOutcome::AllSucceeded => {
                report.inserted = self.insert_markdown(&report.markup);
                self.notifier.notify(Notice::success(format!(
                    "{} uploaded and inserted",
                    count_files(report.succeeded)
                )));
            }
            BatchOutcome::PartialFailure => {
                report.inserted = self.insert_markdown(&report.markup);
                let message = format!(
                    "{} failed to upload. You can retry the upload.",
                    count_files(report.failed)
                );
                self.pending_retry.extend(failed_files);
                self.notifier.notify(Notice::error(message.clone()));
                self.error = Some(UploadErrorState {
                    message,
                    blocking: false,
                    suggested_action: None,
                });
            }
            BatchOutcome::AllFailed => {
                let (message, suggested_action) = match &settlement {
                    BatchSettlement::Aborted {
                        reason,
                        suggested_action,
                    } if !reason.is_empty() => (reason.clone(), suggested_action.clone()),
                    _ => (DEFAULT_FAILURE_MESSAGE.to_string(), None),
                };
                self.pending_retry.extend(failed_files);
                self.error = Some(UploadErrorState {
                    message,
                    blocking: true,
                    suggested_action,
                });
            }
        }

        report
    }

    /// Clear the error state and forget the pending-retry set.
    pub fn dismiss_error(&mut self) {
        self.error = None;
        self.pending_retry.clear();
    }

    /// Splice `text` into the attached surface at its selection.
    ///
    /// Returns `false` without touching anything when there is no live surface.
    pub fn insert_markdown(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(surface) = self.surface.as_ref().and_then(Weak::upgrade) else {
            tracing::warn!(bytes = text.len(), "No text surface attached, markup not inserted");
            return false;
        };
        let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
        surface.insert_at_cursor(text);
        true
    }

    /// Stop writing anywhere. Batches still in flight are resolved silently.
    pub fn teardown(&mut self) {
        self.closed = true;
        self.surface = None;
        self.error = None;
        self.pending_retry.clear();
        tracing::debug!(in_flight = self.in_flight.len(), "Orchestrator torn down");
    }

    pub fn error_state(&self) -> Option<&UploadErrorState> {
        self.error.as_ref()
    }

    pub fn pending_retry(&self) -> &[RawFile] {
        &self.pending_retry
    }

    pub fn is_uploading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Files across every batch still in flight.
    pub fn uploading_files(&self) -> usize {
        self.in_flight.values().map(|b| b.files).sum()
    }

    pub fn last_outcome(&self) -> Option<BatchOutcome> {
        self.last_outcome
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn phase(&self) -> IngestPhase {
        if self.in_flight.values().any(|b| b.retry) {
            IngestPhase::Retrying
        } else if !self.in_flight.is_empty() {
            IngestPhase::Uploading
        } else {
            self.last_outcome
                .map(IngestPhase::Resolved)
                .unwrap_or(IngestPhase::Idle)
        }
    }
}
