//! Shared constants

/// Prefix for every JSON API route.
pub const API_PREFIX: &str = "/api";

/// Default listening port of the site backend.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default upload size cap in mebibytes.
pub const MAX_UPLOAD_SIZE_MB: usize = 10;

/// Highest accepted `MAX_UPLOAD_SIZE_MB`.
pub const MAX_UPLOAD_SIZE_CEILING_MB: usize = 1024;

/// Multipart field that carries the uploaded image.
pub const UPLOAD_FIELD_NAME: &str = "image";
