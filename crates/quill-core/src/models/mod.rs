pub mod file;
pub mod upload;

pub use file::{FileCategory, RawFile, UploadState};
pub use upload::{UploadErrorBody, UploadResponse};
