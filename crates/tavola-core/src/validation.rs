//! Upload validation
//!
//! Pre-flight checks that run before any network call: declared MIME type,
//! byte size against the target limit, and filename extension. All failures
//! are Validation-kind classified errors with user-safe, corrective messages.

use crate::error::ClassifiedError;
use crate::models::UploadRequest;
use crate::policy::StorageTarget;

const MAX_FILENAME_LENGTH: usize = 255;

/// Recognized image extensions and their canonical MIME types.
const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Format a byte count in human units for validation messages.
pub fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Canonical MIME type for a recognized image extension, if any.
fn extension_mime(extension: &str) -> Option<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Validate an upload request against its resolved storage target.
///
/// Checks run in order: content type, size, filename extension. The first
/// failure wins. Side-effect free; must run before any network call.
pub fn validate(request: &UploadRequest, target: &StorageTarget) -> Result<(), ClassifiedError> {
    let declared = normalize_mime_type(&request.content_type).to_lowercase();
    if !target
        .accepted_mime_types
        .iter()
        .any(|ct| declared == ct.to_lowercase())
    {
        return Err(ClassifiedError::validation(format!(
            "File type {} is not accepted here. Accepted types: {}",
            declared,
            target.accepted_mime_types.join(", ")
        )));
    }

    let size = request.size_bytes();
    if size > target.max_bytes {
        return Err(ClassifiedError::validation(format!(
            "File size {} exceeds the {} limit",
            format_size(size),
            format_size(target.max_bytes)
        )));
    }

    let extension = file_extension(&request.file_name);
    if extension.is_empty() {
        return Err(ClassifiedError::validation(
            "The filename has no extension; expected an image file",
        ));
    }
    match extension_mime(&extension) {
        Some(mime)
            if target
                .accepted_mime_types
                .iter()
                .any(|ct| ct.eq_ignore_ascii_case(mime)) => {}
        _ => {
            return Err(ClassifiedError::validation(format!(
                "File extension .{} does not match an accepted image format",
                extension
            )));
        }
    }

    Ok(())
}

/// Lower-cased extension of a filename, or empty when there is none.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Sanitize a filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(file_name: &str) -> Result<String, ClassifiedError> {
    if file_name.contains("..") {
        return Err(ClassifiedError::validation(
            "Filename contains invalid path traversal",
        ));
    }

    let path = std::path::Path::new(file_name);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::policy::resolve;

    fn request(name: &str, mime: &str, size: usize, tag: &str) -> UploadRequest {
        UploadRequest::new(vec![0u8; size], name, mime, tag)
    }

    #[test]
    fn accepts_valid_png() {
        let req = request("dish.png", "image/png", 1024, "gallery");
        assert!(validate(&req, &resolve("gallery")).is_ok());
    }

    #[test]
    fn rejects_wrong_content_type() {
        let req = request("notes.pdf", "application/pdf", 1024, "gallery");
        let err = validate(&req, &resolve("gallery")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(!err.retryable);
    }

    #[test]
    fn mime_parameters_do_not_bypass_the_allowlist() {
        let req = request("dish.jpg", "image/jpeg; charset=utf-8", 1024, "gallery");
        assert!(validate(&req, &resolve("gallery")).is_ok());
    }

    #[test]
    fn oversize_message_states_both_sizes() {
        let req = request("logo.png", "image/png", 10 * 1024 * 1024, "logo");
        let err = validate(&req, &resolve("logo")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("10.0 MB"));
        assert!(err.message.contains("2.0 MB"));
    }

    #[test]
    fn rejects_missing_extension() {
        let req = request("photo", "image/png", 1024, "gallery");
        let err = validate(&req, &resolve("gallery")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn rejects_extension_outside_accepted_formats() {
        // gif is recognized but the product target does not accept it
        let req = request("anim.gif", "image/png", 1024, "product");
        assert!(validate(&req, &resolve("product")).is_err());
    }

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("image.png").unwrap(), "image.png");
        assert_eq!(sanitize_filename("my-dish_1.jpg").unwrap(), "my-dish_1.jpg");
    }

    #[test]
    fn sanitize_filename_replaces_invalid_characters() {
        assert_eq!(sanitize_filename("la carte.png").unwrap(), "la_carte.png");
    }

    #[test]
    fn format_size_uses_human_units() {
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(100), "100 bytes");
    }
}
