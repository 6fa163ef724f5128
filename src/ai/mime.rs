/// Identify an image format from its magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        _ => None,
    }
}

/// Pick the MIME type sent to the model for an uploaded file.
///
/// A declared `image/*` type from the upload wins. Otherwise the bytes are
/// sniffed, falling back to `image/png`.
pub fn resolve_image_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared.map(str::trim) {
        if declared.starts_with("image/") {
            return declared.to_string();
        }
    }

    match sniff_image_mime(bytes) {
        Some(mime) => mime.to_string(),
        None => {
            tracing::warn!(
                "Unrecognized upload (declared {:?}, first 4 bytes: {:02X?}), falling back to image/png",
                declared,
                &bytes[..bytes.len().min(4)]
            );
            "image/png".to_string()
        }
    }
}
