//! Picker staging area.
//!
//! Files chosen in the picker wait here (classified, image previews acquired)
//! until the user submits them or removes them. Whatever way the selection
//! ends, each preview is released exactly once.

use quill_core::RawFile;
use uuid::Uuid;

use crate::markup::{to_markup, MarkupTarget};
use crate::preview::PreviewManager;
use crate::record::FileRecord;

pub struct SelectionSet {
    records: Vec<FileRecord>,
    previews: PreviewManager,
}

impl SelectionSet {
    pub fn new(previews: PreviewManager) -> Self {
        Self {
            records: Vec::new(),
            previews,
        }
    }

    /// Append files, returning the ids of the new records.
    pub fn add(&mut self, files: Vec<RawFile>) -> Vec<Uuid> {
        files
            .into_iter()
            .map(|file| {
                let mut record = FileRecord::new(file);
                self.previews.acquire(&mut record);
                let id = record.id();
                self.records.push(record);
                id
            })
            .collect()
    }

    /// Remove one file before upload. Returns `false` for an unknown id.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let Some(position) = self.records.iter().position(|r| r.id() == id) else {
            return false;
        };
        let mut record = self.records.remove(position);
        self.previews.release_record(&mut record);
        true
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

    /// Placeholder markup for the current selection, for display only.
    pub fn preview_markup(&self) -> String {
        self.records
            .iter()
            .map(|record| to_markup(record, MarkupTarget::Placeholder))
            .collect()
    }

    /// Hand the selected files over for upload and empty the selection.
    pub fn take_files(&mut self) -> Vec<RawFile> {
        self.previews.release_all(&mut self.records);
        self.records
            .drain(..)
            .map(|record| record.file().clone())
            .collect()
    }

    /// Discard the selection without uploading.
    pub fn clear(&mut self) {
        self.previews.release_all(&mut self.records);
        self.records.clear();
    }
}

impl Drop for SelectionSet {
    fn drop(&mut self) {
        self.previews.release_all(&mut self.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::PLACEHOLDER_URL;
    use crate::preview::PreviewStats;

    fn picked() -> Vec<RawFile> {
        vec![
            RawFile::new("a.png", "image/png", vec![1]),
            RawFile::new("main.py", "", vec![2]),
            RawFile::new("b.gif", "image/gif", vec![3]),
        ]
    }

    #[test]
    fn test_remove_releases_only_that_preview() {
        let previews = PreviewManager::new();
        let mut selection = SelectionSet::new(previews.clone());
        let ids = selection.add(picked());
        assert_eq!(previews.live_count(), 2);

        assert!(selection.remove(ids[0]));
        assert!(!selection.remove(ids[0]));
        assert_eq!(selection.len(), 2);
        assert_eq!(previews.live_count(), 1);
    }

    #[test]
    fn test_take_files_keeps_order_and_releases() {
        let previews = PreviewManager::new();
        let mut selection = SelectionSet::new(previews.clone());
        selection.add(picked());

        let files = selection.take_files();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "main.py", "b.gif"]);
        assert!(selection.is_empty());
        assert_eq!(
            previews.stats(),
            PreviewStats {
                acquired: 2,
                released: 2
            }
        );
    }

    #[test]
    fn test_drop_releases_everything() {
        let previews = PreviewManager::new();
        {
            let mut selection = SelectionSet::new(previews.clone());
            selection.add(picked());
        }
        assert_eq!(previews.live_count(), 0);
        assert_eq!(previews.stats().released, 2);
    }

    #[test]
    fn test_clear_then_drop_does_not_double_release() {
        let previews = PreviewManager::new();
        {
            let mut selection = SelectionSet::new(previews.clone());
            selection.add(picked());
            selection.clear();
        }
        assert_eq!(previews.stats().released, 2);
    }

    #[test]
    fn test_preview_markup_uses_placeholders() {
        let mut selection = SelectionSet::new(PreviewManager::new());
        selection.add(picked());
        let text = selection.preview_markup();
        assert!(text.starts_with(&format!("![a.png]({})", PLACEHOLDER_URL)));
        assert!(text.contains("```py\n"));
    }
}
