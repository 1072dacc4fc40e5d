//! Multipart decoding seam
//!
//! The gateway reads parts through `MultipartSource`, so it works the same over the
//! axum extractor and over an in-memory list of parts.

use std::collections::VecDeque;

use async_trait::async_trait;
use axum::extract::Multipart;
use bytes::{Bytes, BytesMut};

use super::error::UploadError;

/// Content type assumed for a file part that declares none.
pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Per-part read limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartLimits {
    /// Bytes buffered for a file part before giving up.
    pub file_bytes: usize,
    /// Bytes buffered for a plain text field.
    pub field_bytes: usize,
}

/// Buffered content of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Complete(Bytes),
    /// The part was longer than its limit; reading stopped at the limit.
    Overflow,
}

/// One decoded multipart part.
#[derive(Debug, Clone)]
pub struct RawPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: PartBody,
}

impl RawPart {
    /// Parts that carry a filename are files; everything else is a text field.
    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }
}

#[async_trait]
pub trait MultipartSource: Send {
    /// Read the next part, buffering at most the applicable limit plus one chunk.
    async fn next_part(&mut self, limits: PartLimits) -> Result<Option<RawPart>, UploadError>;
}

#[async_trait]
impl MultipartSource for Multipart {
    async fn next_part(&mut self, limits: PartLimits) -> Result<Option<RawPart>, UploadError> {
        let Some(mut field) = self
            .next_field()
            .await
            .map_err(|e| UploadError::Transport(e.body_text()))?
        else {
            return Ok(None);
        };

        let name = field.name().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let limit = if file_name.is_some() {
            limits.file_bytes
        } else {
            limits.field_bytes
        };

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::Transport(e.body_text()))?
        {
            if buffer.len() + chunk.len() > limit {
                return Ok(Some(RawPart {
                    name,
                    file_name,
                    content_type,
                    body: PartBody::Overflow,
                }));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(Some(RawPart {
            name,
            file_name,
            content_type,
            body: PartBody::Complete(buffer.freeze()),
        }))
    }
}

enum MemoryEntry {
    Part {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    },
    Failure(String),
}

/// Multipart source backed by a list of prepared parts.
///
/// ```
/// use lumen_api::upload::InMemoryMultipart;
///
/// let form = InMemoryMultipart::new()
///     .text("caption", "Our tower")
///     .file("image", "tower.png", "image/png", vec![0x89, b'P', b'N', b'G']);
/// ```
#[derive(Default)]
pub struct InMemoryMultipart {
    entries: VecDeque<MemoryEntry>,
}

impl InMemoryMultipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.entries.push_back(MemoryEntry::Part {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        });
        self
    }

    /// A file part without a Content-Type header.
    pub fn untyped_file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.entries.push_back(MemoryEntry::Part {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: None,
            data: data.into(),
        });
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push_back(MemoryEntry::Part {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Make the source fail with a transport error at this position.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.entries.push_back(MemoryEntry::Failure(message.into()));
        self
    }
}

#[async_trait]
impl MultipartSource for InMemoryMultipart {
    async fn next_part(&mut self, limits: PartLimits) -> Result<Option<RawPart>, UploadError> {
        match self.entries.pop_front() {
            None => Ok(None),
            Some(MemoryEntry::Failure(message)) => Err(UploadError::Transport(message)),
            Some(MemoryEntry::Part {
                name,
                file_name,
                content_type,
                data,
            }) => {
                let limit = if file_name.is_some() {
                    limits.file_bytes
                } else {
                    limits.field_bytes
                };
                let body = if data.len() > limit {
                    PartBody::Overflow
                } else {
                    PartBody::Complete(data)
                };
                Ok(Some(RawPart {
                    name: Some(name),
                    file_name,
                    content_type,
                    body,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: PartLimits = PartLimits {
        file_bytes: 4,
        field_bytes: 2,
    };

    #[tokio::test]
    async fn in_memory_source_yields_parts_in_order() {
        let mut source = InMemoryMultipart::new()
            .text("a", "x")
            .file("image", "f.png", "image/png", vec![1u8, 2, 3]);

        let first = source.next_part(LIMITS).await.unwrap().unwrap();
        assert_eq!(first.name.as_deref(), Some("a"));
        assert!(!first.is_file());

        let second = source.next_part(LIMITS).await.unwrap().unwrap();
        assert!(second.is_file());
        assert_eq!(second.body, PartBody::Complete(Bytes::from_static(&[1, 2, 3])));

        assert!(source.next_part(LIMITS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn limits_depend_on_part_kind() {
        let mut source = InMemoryMultipart::new()
            .text("long", "xyz")
            .file("image", "f.png", "image/png", vec![0u8; 5]);

        let text = source.next_part(LIMITS).await.unwrap().unwrap();
        assert_eq!(text.body, PartBody::Overflow);
        let file = source.next_part(LIMITS).await.unwrap().unwrap();
        assert_eq!(file.body, PartBody::Overflow);
    }

    #[tokio::test]
    async fn failure_surfaces_as_transport_error() {
        let mut source = InMemoryMultipart::new().fail("Unexpected end of form");
        let err = source.next_part(LIMITS).await.unwrap_err();
        assert_eq!(err, UploadError::Transport("Unexpected end of form".to_string()));
    }
}
