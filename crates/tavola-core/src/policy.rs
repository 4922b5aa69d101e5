//! Storage policy resolution
//!
//! Maps an upload-type tag (e.g. "gallery", "logo") to the storage target
//! that uploads of that kind must land in: bucket, folder prefix, accepted
//! MIME types and size limit. Resolution is a pure table lookup and is
//! total: unknown tags fall back to a conservative default target.

/// Resolved storage destination and constraints for one upload type.
///
/// Always fully populated; no field is ever empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    pub bucket: String,
    pub folder: String,
    pub accepted_mime_types: Vec<String>,
    pub max_bytes: u64,
}

const MB: u64 = 1024 * 1024;

const IMAGE_STANDARD: &[&str] = &["image/jpeg", "image/png", "image/webp"];
const IMAGE_EXTENDED: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

fn target(bucket: &str, folder: &str, mime_types: &[&str], max_bytes: u64) -> StorageTarget {
    StorageTarget {
        bucket: bucket.to_string(),
        folder: folder.to_string(),
        accepted_mime_types: mime_types.iter().map(|s| s.to_string()).collect(),
        max_bytes,
    }
}

/// The documented fallback target for unrecognized upload types: a generic
/// uploads bucket with a conservative allow-list and size limit.
fn default_target() -> StorageTarget {
    target("uploads", "general", IMAGE_STANDARD, 5 * MB)
}

/// Resolve an upload-type tag to its storage target.
///
/// The tag is trimmed and lower-cased before lookup; several tags alias the
/// same target. This function never fails: unknown or empty tags resolve to
/// the default target, and the fallback is logged as a side effect.
pub fn resolve(upload_type: &str) -> StorageTarget {
    let tag = upload_type.trim().to_lowercase();
    match tag.as_str() {
        "gallery" | "gallery-image" => target("gallery", "photos", IMAGE_EXTENDED, 10 * MB),
        "product" | "product-image" | "menu-item" => {
            target("products", "images", IMAGE_STANDARD, 5 * MB)
        }
        "logo" => target("branding", "logos", IMAGE_STANDARD, 2 * MB),
        "banner" | "hero" => target("branding", "banners", IMAGE_EXTENDED, 8 * MB),
        _ => {
            tracing::warn!(
                upload_type = %upload_type,
                "Unrecognized upload type, falling back to default storage target"
            );
            default_target()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_deterministic() {
        for tag in ["gallery", "logo", "product-image", "banner", "bogus", ""] {
            assert_eq!(resolve(tag), resolve(tag));
        }
    }

    #[test]
    fn unknown_tags_fall_back_fully_populated() {
        for tag in ["", "   ", "no-such-tag", "GALLERY!!"] {
            let t = resolve(tag);
            assert!(!t.bucket.is_empty());
            assert!(!t.folder.is_empty());
            assert!(!t.accepted_mime_types.is_empty());
            assert!(t.max_bytes > 0);
        }
    }

    #[test]
    fn lookup_normalizes_case_and_whitespace() {
        assert_eq!(resolve("  Gallery "), resolve("gallery"));
        assert_eq!(resolve("LOGO"), resolve("logo"));
    }

    #[test]
    fn aliases_share_a_target() {
        assert_eq!(resolve("product"), resolve("product-image"));
        assert_eq!(resolve("banner"), resolve("hero"));
    }

    #[test]
    fn logo_limit_is_conservative() {
        assert_eq!(resolve("logo").max_bytes, 2 * MB);
        assert_eq!(resolve("gallery").max_bytes, 10 * MB);
    }
}
