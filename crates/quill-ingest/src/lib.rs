//! Batch file ingestion for a markdown editor.
//!
//! Files dropped or picked by the user are classified, previewed, uploaded
//! concurrently and turned into markup that is spliced into the document at
//! the caret. Failed files are kept for a user-triggered retry.

pub mod batch;
pub mod classifier;
pub mod markup;
pub mod notify;
pub mod orchestrator;
pub mod preview;
pub mod record;
pub mod selection;
pub mod surface;
pub mod uploader;
pub mod validator;

pub use batch::{BatchOutcome, BatchSettlement, UploadBatch};
pub use classifier::{classify, classify_parts, code_language};
pub use markup::{
    contains_placeholder, markup_for_records, render, to_markup, MarkupTarget, PLACEHOLDER_URL,
};
pub use notify::{Notice, Notifier, Severity, TracingNotifier};
pub use orchestrator::{
    BatchReport, IngestPhase, IngestionOrchestrator, UploadErrorState, DEFAULT_FAILURE_MESSAGE,
};
pub use preview::{PreviewHandle, PreviewManager, PreviewStats};
pub use record::FileRecord;
pub use selection::SelectionSet;
pub use surface::{TextBuffer, TextSurface};
pub use uploader::{BatchResult, UploadFailure, UploadedFile, Uploader};
pub use validator::UploadValidator;
