//! Preview handle lifecycle.
//!
//! Image records get a local, revocable reference to their bytes so a host can
//! render a thumbnail before the upload finishes. Handles live in a shared
//! registry until released; release is idempotent and never fails.

use bytes::Bytes;
use quill_core::FileCategory;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::record::FileRecord;

const PREVIEW_SCHEME: &str = "preview";

/// Reference to a live preview registered with a [`PreviewManager`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: Uuid,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Opaque local URL suitable for an `<img src>`.
    pub fn url(&self) -> String {
        format!("{}://{}", PREVIEW_SCHEME, self.id)
    }
}

/// Acquire/release counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub acquired: u64,
    pub released: u64,
}

#[derive(Default)]
struct PreviewRegistry {
    live: HashMap<Uuid, Bytes>,
    stats: PreviewStats,
}

/// Shared preview registry. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct PreviewManager {
    inner: Arc<Mutex<PreviewRegistry>>,
}

impl PreviewManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Registry updates cannot leave it inconsistent, so a poisoned lock is still usable.
    fn registry(&self) -> MutexGuard<'_, PreviewRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a preview for an image record and attach it to the record.
    ///
    /// Returns `None` for non-image records. A record that already holds a
    /// handle keeps it and gets it back.
    pub fn acquire(&self, record: &mut FileRecord) -> Option<PreviewHandle> {
        if record.category() != FileCategory::Image {
            return None;
        }
        if let Some(existing) = record.preview() {
            return Some(existing.clone());
        }

        let handle = PreviewHandle { id: Uuid::new_v4() };
        {
            let mut registry = self.registry();
            registry.live.insert(handle.id, record.file().data.clone());
            registry.stats.acquired += 1;
        }

        tracing::debug!(
            record_id = %record.id(),
            preview_id = %handle.id,
            "Preview acquired"
        );

        record.set_preview(handle.clone());
        Some(handle)
    }

    /// Release a handle. Unknown or already released handles are ignored.
    pub fn release(&self, handle: PreviewHandle) {
        let removed = {
            let mut registry = self.registry();
            let removed = registry.live.remove(&handle.id).is_some();
            if removed {
                registry.stats.released += 1;
            }
            removed
        };

        if !removed {
            tracing::debug!(preview_id = %handle.id, "Preview already released");
        }
    }

    /// Release the handle held by a record, if any.
    pub fn release_record(&self, record: &mut FileRecord) {
        if let Some(handle) = record.take_preview() {
            self.release(handle);
        }
    }

    /// Release every live handle among the given records.
    pub fn release_all(&self, records: &mut [FileRecord]) {
        for record in records.iter_mut() {
            self.release_record(record);
        }
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<Bytes> {
        self.registry().live.get(&handle.id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.registry().live.len()
    }

    pub fn stats(&self) -> PreviewStats {
        self.registry().stats
    }
}
