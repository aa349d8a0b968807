// src/pipeline/anchor.rs

//! Anchor document detection.

use crate::error::{AppError, Result};
use crate::models::{AnchorDocument, ArchiveEntry};

/// The chosen anchor plus every HTML document passed over.
#[derive(Debug, Clone)]
pub struct AnchorResolution {
    pub anchor: AnchorDocument,
    /// Later HTML entries; never anchors, never assets
    pub ignored_documents: Vec<ArchiveEntry>,
}

impl AnchorResolution {
    /// Whether an entry is the anchor or one of the ignored documents.
    pub fn is_document(&self, entry: &ArchiveEntry) -> bool {
        entry.index == self.anchor.entry.index
            || self.ignored_documents.iter().any(|d| d.index == entry.index)
    }
}

/// Pick the first HTML entry in archive order as the anchor.
pub fn resolve_anchor(entries: &[ArchiveEntry]) -> Result<AnchorResolution> {
    let mut documents = entries.iter().filter(|e| e.is_html());

    let anchor = documents
        .next()
        .cloned()
        .map(AnchorDocument::new)
        .ok_or(AppError::NoAnchorDocument)?;
    let ignored_documents = documents.cloned().collect();

    Ok(AnchorResolution {
        anchor,
        ignored_documents,
    })
}
