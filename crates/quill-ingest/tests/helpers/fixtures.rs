//! File fixtures.

use quill_core::RawFile;

/// Minimal valid 1x1 PNG bytes.
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

pub fn png(name: &str) -> RawFile {
    RawFile::new(name, "image/png", minimal_png())
}

pub fn python(name: &str) -> RawFile {
    RawFile::new(name, "text/x-python", b"print('hello')\n".to_vec())
}

pub fn video(name: &str) -> RawFile {
    RawFile::new(name, "video/mp4", vec![0u8; 32])
}

pub fn binary(name: &str) -> RawFile {
    RawFile::new(name, "application/octet-stream", vec![0xFF; 8])
}
