// src/services/jobs.rs

//! Upload job lifecycle.
//!
//! Drives one archive through `PENDING → PROCESSING → COMPLETED | FAILED`
//! and keeps the job record in sync with what happened.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{JobStatus, PipelineConfig, PipelineResult};
use crate::pipeline::SitePipeline;
use crate::storage::{JobStore, ObjectStore};
use crate::utils::JobLogger;

/// What the caller gets back for a submitted archive.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,

    #[serde(flatten)]
    pub result: Option<PipelineResult>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// Runs pipeline jobs and records their status.
pub struct JobRunner<J: JobStore + 'static> {
    pipeline: SitePipeline,
    jobs: Arc<J>,
    max_archive_bytes: usize,
    timeout: Duration,
}

impl<J: JobStore + 'static> JobRunner<J> {
    pub fn new(config: PipelineConfig, store: Arc<dyn ObjectStore>, jobs: Arc<J>) -> Self {
        let max_archive_bytes = config.max_archive_bytes;
        let timeout = Duration::from_secs(config.job_timeout_secs);
        let pipeline = SitePipeline::new(config, store, jobs.clone());
        Self {
            pipeline,
            jobs,
            max_archive_bytes,
            timeout,
        }
    }

    /// Process an uploaded archive as a new job.
    ///
    /// Returns `Err` only when the job itself cannot be created; pipeline
    /// failures are reported through a `FAILED` report.
    pub async fn submit(&self, archive_name: &str, archive_bytes: Vec<u8>) -> Result<JobReport> {
        let job = self.jobs.create_job(archive_name).await?;
        let logger = JobLogger::new(&job.id, self.jobs.clone());
        logger
            .info(&format!("Starting processing for file: {archive_name}"))
            .await;

        match self.process(&job.id, archive_bytes).await {
            Ok(result) => {
                if let Err(e) = self.jobs.complete_job(&job.id, &result).await {
                    log::error!("[Job {}] Failed to store job result: {}", job.id, e);
                }
                logger
                    .info(&format!("Processing completed successfully for: {archive_name}"))
                    .await;
                Ok(JobReport {
                    job_id: job.id,
                    status: JobStatus::Completed,
                    message: "ZIP file processed successfully.".to_string(),
                    result: Some(result),
                })
            }
            Err(e) => {
                let reason = e.to_string();
                if let Err(store_err) = self.jobs.fail_job(&job.id, &reason).await {
                    log::error!(
                        "[Job {}] Failed to update job status to FAILED: {}",
                        job.id,
                        store_err
                    );
                }
                logger.error(&format!("Processing failed: {reason}")).await;
                Ok(JobReport {
                    job_id: job.id,
                    status: JobStatus::Failed,
                    message: reason,
                    result: None,
                })
            }
        }
    }

    async fn process(&self, job_id: &str, archive_bytes: Vec<u8>) -> Result<PipelineResult> {
        if archive_bytes.len() > self.max_archive_bytes {
            return Err(AppError::validation(format!(
                "Archive is {} bytes; the limit is {} bytes",
                archive_bytes.len(),
                self.max_archive_bytes
            )));
        }

        self.jobs.update_status(job_id, JobStatus::Processing).await?;

        tokio::time::timeout(self.timeout, self.pipeline.run(job_id, archive_bytes))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::pipeline::archive::tests::build_zip;
    use crate::storage::MemoryStorage;

    /// Object store whose uploads never finish in time.
    struct StalledStore;

    #[async_trait]
    impl ObjectStore for StalledStore {
        async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(format!("memory://stalled/{key}"))
        }
    }

    fn runner(storage: &Arc<MemoryStorage>, config: PipelineConfig) -> JobRunner<MemoryStorage> {
        JobRunner::new(config, storage.clone(), storage.clone())
    }

    #[tokio::test]
    async fn test_completed_job() {
        let storage = Arc::new(MemoryStorage::default());
        let zip = build_zip(&[("index.html", r#"<body><img src="a.png"></body>"#), ("a.png", "x")]);

        let report = runner(&storage, PipelineConfig::default())
            .submit("site.zip", zip)
            .await
            .unwrap();
        assert!(report.is_success());

        let job = storage.load_job(&report.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.mapping.unwrap().len(), 1);
        assert!(job.logs.iter().any(|l| l.message.contains("completed successfully")));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "COMPLETED");
        assert!(json["mappingJson"]["a.png"]["caminho_bucket"].is_string());
        assert!(json["jobId"].is_string());
    }

    #[tokio::test]
    async fn test_failed_job_records_reason() {
        let storage = Arc::new(MemoryStorage::default());
        let zip = build_zip(&[("style.css", "body{}")]);

        let report = runner(&storage, PipelineConfig::default())
            .submit("site.zip", zip)
            .await
            .unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert!(report.result.is_none());

        let job = storage.load_job(&report.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("No HTML file found in the ZIP."));
        assert!(job.mapping.is_none());
    }

    #[tokio::test]
    async fn test_oversized_archive_rejected() {
        let storage = Arc::new(MemoryStorage::default());
        let config = PipelineConfig {
            max_archive_bytes: 16,
            ..PipelineConfig::default()
        };
        let zip = build_zip(&[("index.html", "<body></body>")]);

        let report = runner(&storage, config).submit("site.zip", zip).await.unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert!(storage.keys().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fails_job() {
        let jobs = Arc::new(MemoryStorage::default());
        let config = PipelineConfig {
            job_timeout_secs: 5,
            ..PipelineConfig::default()
        };
        let runner = JobRunner::new(config, Arc::new(StalledStore), jobs.clone());
        let zip = build_zip(&[("index.html", r#"<body><img src="a.png"></body>"#), ("a.png", "x")]);

        let report = runner.submit("site.zip", zip).await.unwrap();
        assert_eq!(report.status, JobStatus::Failed);
        assert!(report.message.contains("timed out"));

        let job = jobs.load_job(&report.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Job timed out after 5s"));
        assert!(job.mapping.is_none());
    }
}
