// src/pipeline/pipeline.rs

//! Pipeline orchestration: archive in, published page out.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{PipelineConfig, PipelineResult};
use crate::storage::{JobSink, ObjectStore};
use crate::utils::JobLogger;

use super::anchor::resolve_anchor;
use super::archive::SiteArchive;
use super::footer::{BuildInfo, inject_footer};
use super::publish::{publish_document, publish_key};
use super::relocate::Relocator;
use super::rewrite::{PatternRewriter, ReferenceRewriter};
use super::select::select_assets;

/// Sequences every stage of one job.
///
/// Capabilities are injected, so one pipeline can serve any number of jobs
/// concurrently; nothing is shared between runs.
pub struct SitePipeline {
    config: PipelineConfig,
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn JobSink>,
    rewriter: Box<dyn ReferenceRewriter>,
}

impl SitePipeline {
    pub fn new(config: PipelineConfig, store: Arc<dyn ObjectStore>, sink: Arc<dyn JobSink>) -> Self {
        Self {
            config,
            store,
            sink,
            rewriter: Box::new(PatternRewriter),
        }
    }

    /// Replace the default pattern-based rewriter.
    pub fn with_rewriter(mut self, rewriter: impl ReferenceRewriter + 'static) -> Self {
        self.rewriter = Box::new(rewriter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline stamped with the current time.
    pub async fn run(&self, job_id: &str, archive_bytes: Vec<u8>) -> Result<PipelineResult> {
        let build = BuildInfo::now(&self.config.version);
        self.run_with_build(job_id, archive_bytes, &build).await
    }

    /// Run the full pipeline for one archive.
    ///
    /// Fails only on fatal conditions: unreadable archive, no HTML document,
    /// or a failed publish. Per-entry and per-asset problems are logged and
    /// reported in the result.
    pub async fn run_with_build(
        &self,
        job_id: &str,
        archive_bytes: Vec<u8>,
        build: &BuildInfo,
    ) -> Result<PipelineResult> {
        let logger = JobLogger::new(job_id, Arc::clone(&self.sink));
        let mut warnings = Vec::new();

        logger.info("Starting ZIP file processing.").await;

        let archive = match SiteArchive::from_bytes(archive_bytes) {
            Ok(archive) => archive,
            Err(e) => {
                logger.error(&format!("Invalid ZIP archive: {e}")).await;
                return Err(e);
            }
        };

        // Normalize
        let scan = archive.scan();
        for name in &scan.ignored {
            log::debug!("[Job {}] Ignoring entry {}", job_id, name);
        }
        for error in &scan.malformed {
            let message = format!("Skipping entry: {error}");
            logger.warn(&message).await;
            warnings.push(message);
        }

        // Anchor
        let resolution = match resolve_anchor(&scan.entries) {
            Ok(resolution) => resolution,
            Err(e) => {
                logger.error(&e.to_string()).await;
                return Err(e);
            }
        };
        let anchor = &resolution.anchor;
        for ignored in &resolution.ignored_documents {
            let message = format!(
                "Multiple HTML files found. Using '{}'. Ignoring '{}'.",
                anchor.entry.raw_name, ignored.normalized_name
            );
            logger.warn(&message).await;
            warnings.push(message);
        }
        logger
            .info(&format!(
                "Identified HTML file: {} (Original base directory: '{}')",
                anchor.entry.raw_name, anchor.anchor_directory
            ))
            .await;

        // Select
        let assets = select_assets(&scan.entries, &resolution, &self.config.selection);
        logger
            .info(&format!("Found {} static assets relative to HTML.", assets.len()))
            .await;

        // Relocate; every upload is joined before rewriting starts
        let relocator = Relocator::new(
            &archive,
            self.store.as_ref(),
            self.config.key_scheme,
            self.config.max_concurrent_uploads,
        );
        let outcome = relocator.relocate_all(assets, &logger).await;
        let mapping = outcome.mapping();

        // Rewrite
        let html_bytes = match archive.read_entry(&anchor.entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                logger.error(&format!("Failed to read HTML file: {e}")).await;
                return Err(e);
            }
        };
        let html = String::from_utf8_lossy(&html_bytes);
        let rewrite = self.rewriter.rewrite(&html, &mapping)?;
        for sub in rewrite.substitutions.iter().filter(|s| s.occurrences > 0) {
            logger
                .info(&format!(
                    "HTML Path Update: Replaced '{}' with '{}' ({} occurrences)",
                    sub.path, sub.url, sub.occurrences
                ))
                .await;
        }

        // Footer
        let footer = inject_footer(&rewrite.html, build);
        if !footer.body_tag_found {
            let message = "No </body> tag found. Appended footer to the end of HTML.";
            logger.warn(message).await;
            warnings.push(message.to_string());
        }
        logger
            .info("HTML content updated with storage paths and footer.")
            .await;

        // Publish
        let key = publish_key(&self.config.publish_key, job_id, anchor);
        let url = match publish_document(self.store.as_ref(), &key, &footer.html).await {
            Ok(url) => url,
            Err(e) => {
                logger
                    .error(&format!("Failed to publish modified HTML: {e}"))
                    .await;
                return Err(e);
            }
        };
        logger
            .info(&format!("Uploaded modified HTML to {url}"))
            .await;

        Ok(PipelineResult {
            final_html: footer.html,
            processed_count: outcome.relocated.len(),
            mapping,
            final_document_url: url,
            warnings,
            failures: outcome.failures,
        })
    }
}
