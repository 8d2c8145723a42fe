use quill_core::{FileCategory, RawFile, UploadState};
use uuid::Uuid;

use crate::classifier::classify;
use crate::preview::PreviewHandle;

/// Per-file tracking structure from selection until insertion or removal.
///
/// The preview handle is only ever set by the
/// [`PreviewManager`](crate::preview::PreviewManager) and leaves the record
/// when it is released.
#[derive(Debug)]
pub struct FileRecord {
    id: Uuid,
    file: RawFile,
    category: FileCategory,
    preview: Option<PreviewHandle>,
    state: UploadState,
}

impl FileRecord {
    /// Create a pending record, classifying the file.
    pub fn new(file: RawFile) -> Self {
        let category = classify(&file);
        Self {
            id: Uuid::new_v4(),
            file,
            category,
            preview: None,
            state: UploadState::Pending,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file(&self) -> &RawFile {
        &self.file
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn category(&self) -> FileCategory {
        self.category
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.state.remote_url()
    }

    pub(crate) fn set_preview(&mut self, handle: PreviewHandle) {
        self.preview = Some(handle);
    }

    pub(crate) fn take_preview(&mut self) -> Option<PreviewHandle> {
        self.preview.take()
    }

    pub fn mark_uploading(&mut self) {
        self.state = UploadState::Uploading;
    }

    pub fn mark_succeeded(&mut self, url: impl Into<String>) {
        self.state = UploadState::Succeeded { url: url.into() };
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.state = UploadState::Failed {
            reason: reason.into(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_classified_and_pending() {
        let record = FileRecord::new(RawFile::new("cat.png", "image/png", vec![1, 2, 3]));
        assert_eq!(record.category(), FileCategory::Image);
        assert_eq!(record.state(), &UploadState::Pending);
        assert!(record.preview().is_none());
        assert!(record.remote_url().is_none());
    }

    #[test]
    fn ids_are_unique() {
        let a = FileRecord::new(RawFile::new("a.txt", "", Vec::new()));
        let b = FileRecord::new(RawFile::new("a.txt", "", Vec::new()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn state_transitions_keep_url_consistent() {
        let mut record = FileRecord::new(RawFile::new("main.py", "", Vec::new()));
        record.mark_uploading();
        assert!(record.remote_url().is_none());

        record.mark_succeeded("/uploads/main.py");
        assert_eq!(record.remote_url(), Some("/uploads/main.py"));

        record.mark_failed("timeout");
        assert!(record.remote_url().is_none());
    }
}
