//! Upload gateway
//!
//! Accepts a single image per request, buffered in memory, and turns every upload
//! failure into a `400 {"message": ...}` response.

pub mod error;
pub mod gateway;
pub mod multipart;
pub mod validator;

pub use error::{translate_failure, GatewayError, UploadError, UploadErrorBody};
pub use gateway::{ParsedUpload, UploadGateway, UploadedFile, MAX_FIELD_SIZE};
pub use multipart::{InMemoryMultipart, MultipartSource, PartBody, PartLimits, RawPart};
pub use validator::{ImageOnlyValidator, UploadValidator, TYPE_REJECTED_MESSAGE};
