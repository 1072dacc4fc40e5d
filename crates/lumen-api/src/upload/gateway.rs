//! Single-image upload gateway
//!
//! Buffers the one file expected under the upload field fully in memory, then checks
//! its size and declared MIME type. The accepted bytes are handed back unmodified.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use lumen_core::constants::UPLOAD_FIELD_NAME;

use super::error::UploadError;
use super::multipart::{MultipartSource, PartBody, PartLimits, DEFAULT_FILE_CONTENT_TYPE};
use super::validator::{ImageOnlyValidator, UploadValidator};

/// Byte limit for non-file form fields.
pub const MAX_FIELD_SIZE: usize = 1024 * 1024;

/// A file accepted by the gateway, held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub fieldname: String,
    pub originalname: String,
    pub mimetype: String,
    pub size: usize,
    pub buffer: Bytes,
}

/// Result of a successful pass over the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUpload {
    /// Plain text fields sent alongside the file.
    pub fields: HashMap<String, String>,
    /// The accepted file, if the form carried one.
    pub file: Option<UploadedFile>,
}

/// Stateless gate in front of upload handlers. Safe to share across requests.
#[derive(Clone)]
pub struct UploadGateway {
    validator: Arc<dyn UploadValidator>,
    field_name: String,
}

impl std::fmt::Debug for UploadGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadGateway")
            .field("field_name", &self.field_name)
            .field("max_file_size", &self.validator.max_file_size())
            .finish()
    }
}

impl Default for UploadGateway {
    fn default() -> Self {
        Self::new(Arc::new(ImageOnlyValidator::default()))
    }
}

impl UploadGateway {
    pub fn new(validator: Arc<dyn UploadValidator>) -> Self {
        Self {
            validator,
            field_name: UPLOAD_FIELD_NAME.to_string(),
        }
    }

    /// Image gateway with the given byte limit.
    pub fn images(max_file_size: usize) -> Self {
        Self::new(Arc::new(ImageOnlyValidator::new(max_file_size)))
    }

    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn max_file_size(&self) -> usize {
        self.validator.max_file_size()
    }

    /// Read the whole form and validate its file.
    ///
    /// A form without a file is not an error here; the handler decides whether a file
    /// is mandatory. A file that is too large is reported as `SizeExceeded` whatever its
    /// declared type.
    pub async fn accept<S>(&self, source: &mut S) -> Result<ParsedUpload, UploadError>
    where
        S: MultipartSource + ?Sized,
    {
        let limits = PartLimits {
            file_bytes: self.validator.max_file_size(),
            field_bytes: MAX_FIELD_SIZE,
        };
        let mut parsed = ParsedUpload::default();

        while let Some(part) = source.next_part(limits).await? {
            let name = part.name.clone().unwrap_or_default();

            if !part.is_file() {
                let value = match part.body {
                    PartBody::Complete(data) => String::from_utf8(data.to_vec()).map_err(|_| {
                        UploadError::Transport(format!("Field '{}' is not valid UTF-8", name))
                    })?,
                    PartBody::Overflow => {
                        return Err(UploadError::Transport(format!(
                            "Field '{}' value too long",
                            name
                        )))
                    }
                };
                parsed.fields.insert(name, value);
                continue;
            }

            if name != self.field_name || parsed.file.is_some() {
                return Err(UploadError::Transport(format!("Unexpected field '{}'", name)));
            }

            let data = match part.body {
                PartBody::Complete(data) => data,
                PartBody::Overflow => {
                    return Err(UploadError::SizeExceeded {
                        limit: self.validator.max_file_size(),
                    })
                }
            };

            let mimetype = part
                .content_type
                .unwrap_or_else(|| DEFAULT_FILE_CONTENT_TYPE.to_string());
            self.validator.check_content_type(&mimetype)?;

            let originalname = part.file_name.unwrap_or_default();
            tracing::debug!(
                field = %name,
                original_name = %originalname,
                mimetype = %mimetype,
                size = data.len(),
                "Upload accepted"
            );

            parsed.file = Some(UploadedFile {
                fieldname: name,
                originalname,
                mimetype,
                size: data.len(),
                buffer: data,
            });
        }

        Ok(parsed)
    }
}
