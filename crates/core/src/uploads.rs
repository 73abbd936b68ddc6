//! Profile image upload checks.
//!
//! The declared mimetype must be an allowed image type and the bytes must
//! actually sniff as that format; the declared type alone is not trusted.

use image::ImageFormat;

use crate::error::CoreError;

/// Default per-image size cap (5 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image mimetypes.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

fn expected_format(content_type: &str) -> Option<(ImageFormat, &'static str)> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some((ImageFormat::Jpeg, "jpg")),
        "image/png" => Some((ImageFormat::Png, "png")),
        "image/webp" => Some((ImageFormat::WebP, "webp")),
        _ => None,
    }
}

/// Validate an uploaded image and return the file extension to store it with.
pub fn validate_image_upload(
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<&'static str, CoreError> {
    if data.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "Image exceeds maximum size of {max_bytes} bytes"
        )));
    }

    let content_type = content_type.unwrap_or_default();
    let (format, extension) = expected_format(content_type).ok_or_else(|| {
        CoreError::Validation(format!(
            "Unsupported file type '{content_type}'. Allowed: {}",
            ALLOWED_IMAGE_TYPES.join(", ")
        ))
    })?;

    match image::guess_format(data) {
        Ok(actual) if actual == format => Ok(extension),
        _ => Err(CoreError::Validation(format!(
            "File content does not match declared type '{content_type}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

    #[test]
    fn accepts_matching_png() {
        assert_eq!(
            validate_image_upload(Some("image/png"), PNG_MAGIC, 1024).unwrap(),
            "png"
        );
    }

    #[test]
    fn rejects_mismatched_content() {
        assert!(validate_image_upload(Some("image/png"), JPEG_MAGIC, 1024).is_err());
    }

    #[test]
    fn rejects_disallowed_type() {
        assert!(validate_image_upload(Some("application/pdf"), PNG_MAGIC, 1024).is_err());
        assert!(validate_image_upload(None, PNG_MAGIC, 1024).is_err());
    }

    #[test]
    fn rejects_oversized_and_empty() {
        assert!(validate_image_upload(Some("image/png"), PNG_MAGIC, 4).is_err());
        assert!(validate_image_upload(Some("image/png"), &[], 1024).is_err());
    }
}
