//! Mapping document and pipeline result models.
//!
//! Field names of the serialized mapping (`caminho_original`,
//! `caminho_bucket`, `hash_md5`) are part of the public API contract and
//! must not change.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::AssetFailure;

/// Published location of one relocated asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "caminho_original")]
    pub original_path: String,

    #[serde(rename = "caminho_bucket")]
    pub published_url: String,

    #[serde(rename = "hash_md5")]
    pub content_hash: String,

    /// Literal path rewritten in the document
    #[serde(skip)]
    pub reference_path: String,
}

/// Ordered mapping from original archive path to published location.
///
/// Inserting a path that is already present replaces its entry and moves it
/// to the end, so the last processed asset wins in both the mapping and the
/// rewrite order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingDocument {
    entries: IndexMap<String, MappingEntry>,
}

impl MappingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: MappingEntry) {
        self.entries.shift_remove(&entry.original_path);
        self.entries.insert(entry.original_path.clone(), entry);
    }

    pub fn get(&self, original_path: &str) -> Option<&MappingEntry> {
        self.entries.get(original_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Terminal output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    #[serde(rename = "htmlContent")]
    pub final_html: String,

    #[serde(rename = "mappingJson")]
    pub mapping: MappingDocument,

    #[serde(rename = "processedFileCount")]
    pub processed_count: usize,

    #[serde(rename = "finalHtmlUrl")]
    pub final_document_url: String,

    /// Non-fatal conditions noticed during the run
    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default, rename = "failedAssets")]
    pub failures: Vec<AssetFailure>,
}
