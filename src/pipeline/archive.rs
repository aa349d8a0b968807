// src/pipeline/archive.rs

//! ZIP archive access.

use std::io::{Cursor, Read};
use std::sync::Arc;

use zip::ZipArchive;

use crate::error::{AppError, Result};
use crate::models::ArchiveEntry;

use super::normalize::normalize_entry_name;

/// Result of scanning the archive's central directory.
#[derive(Debug, Default)]
pub struct ArchiveScan {
    /// Usable entries in archive iteration order
    pub entries: Vec<ArchiveEntry>,
    /// Raw names of directories and platform metadata
    pub ignored: Vec<String>,
    /// Entries whose names could not be normalized
    pub malformed: Vec<AppError>,
}

/// An uploaded site bundle.
///
/// The archive buffer is shared, so cloning the reader for each entry read
/// is cheap and reads can happen from several tasks.
#[derive(Clone)]
pub struct SiteArchive {
    zip: ZipArchive<Cursor<Arc<[u8]>>>,
}

impl SiteArchive {
    /// Parse a ZIP archive from memory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(bytes.into()))?;
        Ok(Self { zip })
    }

    /// Number of raw entries, including directories.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Normalize every entry name, in archive order.
    pub fn scan(&self) -> ArchiveScan {
        let mut zip = self.zip.clone();
        let mut scan = ArchiveScan::default();

        for index in 0..zip.len() {
            let (raw_name, is_directory) = match zip.by_index_raw(index) {
                Ok(file) => (file.name().to_string(), file.is_dir()),
                Err(e) => {
                    scan.malformed
                        .push(AppError::malformed(format!("#{index}"), e));
                    continue;
                }
            };

            match normalize_entry_name(&raw_name, is_directory) {
                Ok(Some(normalized)) => scan
                    .entries
                    .push(ArchiveEntry::new(raw_name, normalized, index)),
                Ok(None) => scan.ignored.push(raw_name),
                Err(e) => scan.malformed.push(e),
            }
        }

        scan
    }

    /// Read and decompress an entry's bytes.
    pub fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        let mut zip = self.zip.clone();
        let mut file = zip.by_index(entry.index)?;
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    /// Build an in-memory ZIP with the given entries; names ending in `/` are directories.
    pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_scan_filters_and_normalizes() {
        let bytes = build_zip(&[
            ("site/", ""),
            ("__MACOSX/._index.html", "junk"),
            ("./site/index.html", "<html></html>"),
            ("site/img/my%20logo.png", "png"),
            ("site/bad%zz.css", "css"),
        ]);
        let archive = SiteArchive::from_bytes(bytes).unwrap();
        assert_eq!(archive.len(), 5);

        let scan = archive.scan();
        let names: Vec<_> = scan.entries.iter().map(|e| e.normalized_name.as_str()).collect();
        assert_eq!(names, ["site/index.html", "site/img/my logo.png"]);
        assert_eq!(scan.entries[0].raw_name, "./site/index.html");
        assert_eq!(scan.ignored.len(), 2);
        assert_eq!(scan.malformed.len(), 1);
    }

    #[test]
    fn test_read_entry() {
        let bytes = build_zip(&[("index.html", "<p>hi</p>"), ("a.css", "body{}")]);
        let archive = SiteArchive::from_bytes(bytes).unwrap();
        let scan = archive.scan();

        assert_eq!(archive.read_entry(&scan.entries[1]).unwrap(), b"body{}");
        assert_eq!(archive.read_entry(&scan.entries[0]).unwrap(), b"<p>hi</p>");
    }

    #[test]
    fn test_rejects_non_zip() {
        let err = SiteArchive::from_bytes(b"not a zip".to_vec()).err().unwrap();
        assert!(matches!(err, AppError::Archive(_)));
    }
}
