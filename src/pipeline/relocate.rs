// src/pipeline/relocate.rs

//! Content relocation: hash, classify and upload each selected asset.

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{AssetFailure, AssetRecord, KeyDerivationPolicy, MappingDocument, MappingEntry};
use crate::storage::ObjectStore;
use crate::utils::{JobLogger, md5_hex};

use super::archive::SiteArchive;

/// Gathered results of relocating every asset of one job.
#[derive(Debug, Default)]
pub struct RelocationOutcome {
    /// Successfully uploaded assets, in processing order
    pub relocated: Vec<AssetRecord>,
    pub failures: Vec<AssetFailure>,
}

impl RelocationOutcome {
    /// Mapping document over every relocated asset.
    pub fn mapping(&self) -> MappingDocument {
        let mut mapping = MappingDocument::new();
        for asset in &self.relocated {
            if let (Some(url), Some(hash)) = (&asset.published_url, &asset.content_hash) {
                mapping.insert(MappingEntry {
                    original_path: asset.original_path.clone(),
                    published_url: url.clone(),
                    content_hash: hash.clone(),
                    reference_path: asset.reference_path.clone(),
                });
            }
        }
        mapping
    }
}

/// Uploads assets with bounded concurrency.
pub struct Relocator<'a> {
    archive: &'a SiteArchive,
    store: &'a dyn ObjectStore,
    key_scheme: KeyDerivationPolicy,
    concurrency: usize,
}

impl<'a> Relocator<'a> {
    pub fn new(
        archive: &'a SiteArchive,
        store: &'a dyn ObjectStore,
        key_scheme: KeyDerivationPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            archive,
            store,
            key_scheme,
            concurrency: concurrency.max(1),
        }
    }

    /// Relocate every asset and wait for all uploads to finish.
    ///
    /// A failing asset is logged and reported in `failures`; it never
    /// aborts the remaining uploads.
    pub async fn relocate_all(&self, assets: Vec<AssetRecord>, logger: &JobLogger) -> RelocationOutcome {
        let results: Vec<(String, Result<AssetRecord>)> = stream::iter(assets)
            .map(|asset| async move {
                let path = asset.original_path.clone();
                (path, self.relocate(asset, logger).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = RelocationOutcome::default();
        for (path, result) in results {
            match result {
                Ok(asset) => outcome.relocated.push(asset),
                Err(e) => {
                    let reason = e.to_string();
                    logger.error(&reason).await;
                    outcome.failures.push(AssetFailure { path, reason });
                }
            }
        }
        outcome
    }

    async fn relocate(&self, mut asset: AssetRecord, logger: &JobLogger) -> Result<AssetRecord> {
        let bytes = self
            .archive
            .read_entry(&asset.entry)
            .map_err(|e| AppError::asset(&asset.original_path, e))?;

        let hash = md5_hex(&bytes);
        let key = storage_key(&asset, &hash, logger.job_id(), self.key_scheme);

        let url = self
            .store
            .put(&key, bytes, asset.content_type)
            .await
            .map_err(|e| AppError::asset(&asset.original_path, e))?;

        logger
            .info(&format!(
                "Uploaded {} to {} (Key: {})",
                asset.original_path, url, key
            ))
            .await;

        asset.content_hash = Some(hash);
        asset.published_url = Some(url);
        Ok(asset)
    }
}

/// Derive the storage key of an asset.
pub fn storage_key(asset: &AssetRecord, hash: &str, job_id: &str, scheme: KeyDerivationPolicy) -> String {
    match scheme {
        KeyDerivationPolicy::JobScoped => format!("{}/{}", job_id, asset.relative_path),
        KeyDerivationPolicy::ContentAddressed => format!("{}{}", hash, asset.dotted_extension()),
    }
}
