//! Unique object path generation
//!
//! Every upload gets its own path: sanitized filename stem, UTC timestamp,
//! and a random suffix. Two uploads of identically-named files therefore
//! never collide, and no locking is needed across concurrent uploads.

use chrono::Utc;
use tavola_core::validation::{file_extension, sanitize_filename};
use tavola_core::ClassifiedError;
use uuid::Uuid;

/// Build a unique object path under `folder` for the given original
/// filename. Fails only when the filename itself is invalid (path
/// traversal).
pub fn object_path(folder: &str, file_name: &str) -> Result<String, ClassifiedError> {
    let safe = sanitize_filename(file_name)?;
    let extension = file_extension(&safe);
    let stem = match safe.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => safe.clone(),
    };

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let folder = folder.trim_matches('/');

    let name = if extension.is_empty() {
        format!("{}-{}-{}", stem, timestamp, suffix)
    } else {
        format!("{}-{}-{}.{}", stem, timestamp, suffix, extension)
    };

    if folder.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{}/{}", folder, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_produce_distinct_paths() {
        let a = object_path("photos", "dish.png").unwrap();
        let b = object_path("photos", "dish.png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn path_keeps_folder_stem_and_extension() {
        let path = object_path("photos", "Tarte Tatin.png").unwrap();
        assert!(path.starts_with("photos/Tarte_Tatin-"));
        assert!(path.ends_with(".png"));
        assert!(!path.contains(".."));
    }

    #[test]
    fn traversal_filenames_are_rejected() {
        assert!(object_path("photos", "../etc/passwd").is_err());
    }

    #[test]
    fn folder_slashes_are_normalized() {
        let path = object_path("/photos/", "dish.png").unwrap();
        assert!(path.starts_with("photos/dish-"));
    }
}
