//! Shared key generation for storage backends.

use uuid::Uuid;

const IMAGE_PREFIX: &str = "images";

/// File extension for an image MIME type. Parameters (`; charset=...`) are ignored.
pub fn extension_for_mime(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/heic" => "heic",
        _ => "bin",
    }
}

/// Generate a fresh storage key for an image of the given MIME type.
pub fn generate_image_key(content_type: &str) -> String {
    format!(
        "{}/{}.{}",
        IMAGE_PREFIX,
        Uuid::new_v4(),
        extension_for_mime(content_type)
    )
}

/// Reject keys that could escape the storage root.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}
