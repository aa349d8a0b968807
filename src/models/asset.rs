//! Relocatable asset model.

use serde::{Deserialize, Serialize};

use super::ArchiveEntry;

/// Fallback content type for unrecognized extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One static asset selected for relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Normalized archive path; key of the mapping document
    pub original_path: String,
    /// Literal text expected in the document; key used for rewriting
    pub reference_path: String,
    /// Path used to build job-scoped storage keys
    pub relative_path: String,
    pub entry: ArchiveEntry,
    pub content_type: &'static str,
    /// MD5 hex digest, set once bytes are read
    pub content_hash: Option<String>,
    /// Public location, set after upload
    pub published_url: Option<String>,
}

impl AssetRecord {
    pub fn new(entry: ArchiveEntry, relative_path: impl Into<String>, reference_path: impl Into<String>) -> Self {
        let content_type = content_type_for(entry.extension().as_deref());
        Self {
            original_path: entry.normalized_name.clone(),
            reference_path: reference_path.into(),
            relative_path: relative_path.into(),
            entry,
            content_type,
            content_hash: None,
            published_url: None,
        }
    }

    /// Lowercase extension including the leading dot, or empty.
    pub fn dotted_extension(&self) -> String {
        self.entry
            .extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Infer a content type from a lowercase extension.
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg",
        Some("webp") => "image/webp",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// An asset that could not be relocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFailure {
    pub path: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for(Some("css")), "text/css");
        assert_eq!(content_type_for(Some("js")), "application/javascript");
        assert_eq!(content_type_for(Some("jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Some("svg")), "image/svg");
        assert_eq!(content_type_for(Some("woff2")), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(None), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_record_uses_lowercase_extension() {
        let entry = ArchiveEntry::new("img/Photo.JPG", "img/Photo.JPG", 2);
        let record = AssetRecord::new(entry, "img/Photo.JPG", "img/Photo.JPG");
        assert_eq!(record.content_type, "image/jpg");
        assert_eq!(record.dotted_extension(), ".jpg");
        assert_eq!(record.original_path, "img/Photo.JPG");
        assert!(record.content_hash.is_none());
    }
}
