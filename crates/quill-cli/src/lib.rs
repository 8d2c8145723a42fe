use anyhow::{Context, Result};
use quill_core::{FileCategory, RawFile};
use quill_ingest::{
    classify, contains_placeholder, render, BatchOutcome, IngestionOrchestrator, MarkupTarget,
    Notifier, TextBuffer, TextSurface, Uploader,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read every path into memory, in argument order.
pub async fn load_files(paths: &[PathBuf]) -> Result<Vec<RawFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = RawFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

/// Classification of one local file, as printed by `quill classify`.
#[derive(Debug, Serialize)]
pub struct ClassifiedFile {
    pub name: String,
    pub content_type: String,
    pub category: FileCategory,
    pub size: usize,
    pub markup: String,
}

pub fn classify_files(files: &[RawFile]) -> Vec<ClassifiedFile> {
    files
        .iter()
        .map(|file| {
            let category = classify(file);
            ClassifiedFile {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
                category,
                size: file.size(),
                markup: render(
                    category,
                    &file.name,
                    &file.content_type,
                    MarkupTarget::Placeholder,
                ),
            }
        })
        .collect()
}

/// Result of `quill insert`.
#[derive(Debug, Serialize)]
pub struct InsertSummary {
    pub inserted: usize,
    pub failed: Vec<String>,
    pub attempts: usize,
    pub error: Option<String>,
}

/// Upload `files`, retrying failures up to `retries` times, and splice the
/// markup into `text` at `cursor` (end of text when `None`).
///
/// Returns the updated text and a summary.
pub async fn insert_files(
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn Notifier>,
    text: &str,
    cursor: Option<usize>,
    files: Vec<RawFile>,
    retries: usize,
) -> (String, InsertSummary) {
    let mut buffer = TextBuffer::new(text);
    if let Some(cursor) = cursor {
        buffer.set_caret(cursor);
    }
    let document = Arc::new(Mutex::new(buffer));

    let mut orchestrator = IngestionOrchestrator::new(uploader, notifier);
    orchestrator.attach_surface(&document);

    let mut inserted = 0;
    let mut attempts = 0;
    let mut report = orchestrator.on_files_drop(files).await;
    while let Some(current) = report {
        attempts += 1;
        inserted += current.succeeded;
        if current.outcome == BatchOutcome::AllSucceeded || attempts > retries {
            break;
        }
        tracing::info!(attempt = attempts, pending = orchestrator.pending_retry().len(), "Retrying");
        report = orchestrator.retry().await;
    }

    let summary = InsertSummary {
        inserted,
        failed: orchestrator
            .pending_retry()
            .iter()
            .map(|f| f.name.clone())
            .collect(),
        attempts,
        error: orchestrator.error_state().map(|e| e.message.clone()),
    };
    orchestrator.teardown();

    let text = match Arc::try_unwrap(document) {
        Ok(mutex) => mutex
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_text(),
        Err(shared) => {
            let guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            guard.text().to_string()
        }
    };
    (text, summary)
}

/// Write `text` to `path`, refusing text that still holds placeholder URLs.
pub async fn write_document(path: &Path, text: &str) -> Result<()> {
    if contains_placeholder(text) {
        anyhow::bail!(
            "Refusing to write {}: document contains placeholder URLs",
            path.display()
        );
    }
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write document: {}", path.display()))
}

/// Document contents, or an empty document if the file does not exist yet.
pub async fn read_document(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read document: {}", path.display()))
        }
    }
}
