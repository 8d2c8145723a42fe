//! File classification.
//!
//! The declared MIME type decides `image` and `video`. MIME sniffing is not
//! reliable for text and source files, so the extension is consulted only to
//! decide `code`. Anything unresolved is `other`.

use quill_core::{FileCategory, RawFile};
use std::path::Path;

pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/svg+xml",
    "image/webp",
];

pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg"];

pub const CODE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "py", "java", "html", "css", "json", "md",
];

/// Classify a file from its declared content type and name.
pub fn classify(file: &RawFile) -> FileCategory {
    classify_parts(&file.content_type, &file.name)
}

/// Classify from raw metadata.
pub fn classify_parts(content_type: &str, filename: &str) -> FileCategory {
    let essence = normalize_content_type(content_type);

    if IMAGE_CONTENT_TYPES.contains(&essence.as_str()) {
        return FileCategory::Image;
    }
    if VIDEO_CONTENT_TYPES.contains(&essence.as_str()) {
        return FileCategory::Video;
    }

    match extension(filename) {
        Some(ext) if CODE_EXTENSIONS.contains(&ext.as_str()) => FileCategory::Code,
        _ => FileCategory::Other,
    }
}

/// Fence tag for a code file: its lowercase extension.
pub fn code_language(filename: &str) -> String {
    extension(filename).unwrap_or_default()
}

/// `"Image/PNG; charset=binary"` -> `"image/png"`
pub(crate) fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
