//! Archive entry and anchor document models.

/// A usable file inside the uploaded archive.
///
/// Only entries that survived normalization are represented; directories,
/// platform metadata and undecodable names never become an `ArchiveEntry`.
/// Bytes are read on demand through [`SiteArchive::read_entry`].
///
/// [`SiteArchive::read_entry`]: crate::pipeline::SiteArchive::read_entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name as stored in the archive
    pub raw_name: String,
    /// Canonical name: no leading `./`, percent-escapes decoded
    pub normalized_name: String,
    /// Position of the entry in archive iteration order
    pub index: usize,
}

impl ArchiveEntry {
    pub fn new(raw_name: impl Into<String>, normalized_name: impl Into<String>, index: usize) -> Self {
        Self {
            raw_name: raw_name.into(),
            normalized_name: normalized_name.into(),
            index,
        }
    }

    /// Final path segment of the normalized name.
    pub fn file_name(&self) -> &str {
        self.normalized_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.normalized_name)
    }

    /// Lowercase extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) if pos + 1 < name.len() => Some(name[pos + 1..].to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Whether the entry is an HTML document (case-insensitive `.html`).
    pub fn is_html(&self) -> bool {
        self.normalized_name.to_ascii_lowercase().ends_with(".html")
    }
}

/// The single HTML document chosen as the site entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorDocument {
    pub entry: ArchiveEntry,
    /// Directory holding the document, with a trailing `/`; empty for the archive root
    pub anchor_directory: String,
}

impl AnchorDocument {
    pub fn new(entry: ArchiveEntry) -> Self {
        let anchor_directory = match entry.normalized_name.rfind('/') {
            Some(pos) => entry.normalized_name[..=pos].to_string(),
            None => String::new(),
        };
        Self {
            entry,
            anchor_directory,
        }
    }

    /// File name used when publishing under a job-scoped key.
    pub fn file_name(&self) -> &str {
        self.entry.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_file_name() {
        let entry = ArchiveEntry::new("./site/img/Logo.PNG", "site/img/Logo.PNG", 3);
        assert_eq!(entry.file_name(), "Logo.PNG");
        assert_eq!(entry.extension().as_deref(), Some("png"));

        let bare = ArchiveEntry::new("LICENSE", "LICENSE", 0);
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn test_is_html_case_insensitive() {
        assert!(ArchiveEntry::new("INDEX.HTML", "INDEX.HTML", 0).is_html());
        assert!(!ArchiveEntry::new("index.htm", "index.htm", 0).is_html());
    }

    #[test]
    fn test_anchor_directory() {
        let root = AnchorDocument::new(ArchiveEntry::new("index.html", "index.html", 0));
        assert_eq!(root.anchor_directory, "");

        let nested = AnchorDocument::new(ArchiveEntry::new("site/pages/home.html", "site/pages/home.html", 1));
        assert_eq!(nested.anchor_directory, "site/pages/");
        assert_eq!(nested.file_name(), "home.html");
    }
}
