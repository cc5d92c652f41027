use bytes::Bytes;

use crate::error::ValidationError;

pub const MAX_IMAGE_SIZE: usize = 4 * 1024 * 1024; // 4MB

const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
];

/// A single uploaded file as handed over by the multipart layer.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: String,
}

impl UploadedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Resolve the MIME type to send upstream.
///
/// The declared type wins when it is already `image/*`; otherwise the lowercased
/// filename extension is looked up. `None` when neither yields an image type.
pub fn resolve_mime_type(content_type: &str, file_name: &str) -> Option<String> {
    if content_type.starts_with("image/") {
        return Some(content_type.to_string());
    }

    let file_name = file_name.to_lowercase();
    let extension = &file_name[file_name.rfind('.')?..];

    EXTENSION_MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| mime.to_string())
}

/// Check size and type; returns the resolved MIME type.
pub fn validate_upload(file: &UploadedImage) -> Result<String, ValidationError> {
    if file.size() > MAX_IMAGE_SIZE {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            limit: MAX_IMAGE_SIZE,
        });
    }

    if file.bytes.is_empty() {
        return Err(ValidationError::Empty);
    }

    resolve_mime_type(&file.content_type, &file.file_name).ok_or_else(|| {
        ValidationError::UnsupportedType {
            declared: file.content_type.clone(),
        }
    })
}
