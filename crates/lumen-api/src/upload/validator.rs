//! Upload validation rules
//!
//! The gateway asks an `UploadValidator` for the byte limit and whether a declared
//! MIME type is acceptable. `ImageOnlyValidator` is the production rule set.

use lumen_core::constants::MAX_UPLOAD_SIZE_MB;

use super::error::UploadError;

pub const TYPE_REJECTED_MESSAGE: &str = "Only image files are allowed";

/// Rules applied to every uploaded file.
pub trait UploadValidator: Send + Sync {
    /// Maximum allowed file size in bytes (inclusive).
    fn max_file_size(&self) -> usize;

    /// Accept or refuse a declared MIME type.
    fn check_content_type(&self, content_type: &str) -> Result<(), UploadError>;
}

/// Accepts any `image/*` MIME type up to a byte limit.
#[derive(Debug, Clone)]
pub struct ImageOnlyValidator {
    max_file_size: usize,
}

impl ImageOnlyValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }
}

impl Default for ImageOnlyValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_SIZE_MB * 1024 * 1024)
    }
}

impl UploadValidator for ImageOnlyValidator {
    fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn check_content_type(&self, content_type: &str) -> Result<(), UploadError> {
        // Declared type taken verbatim: no trimming or case folding
        if content_type.starts_with("image/") {
            return Ok(());
        }
        Err(UploadError::TypeRejected {
            mime_type: content_type.to_string(),
            reason: TYPE_REJECTED_MESSAGE.to_string(),
        })
    }
}
