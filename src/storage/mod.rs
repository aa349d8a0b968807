//! Storage capabilities consumed by the pipeline.
//!
//! - [`ObjectStore`]: durable object storage returning public URLs
//! - [`JobSink`]: fire-and-forget processing log per job
//! - [`JobStore`]: job status records (extends [`JobSink`])
//!
//! ## Local Layout
//!
//! ```text
//! {root}/
//! ├── objects/              # Published assets and documents
//! │   └── {jobId}/
//! │       ├── index.html
//! │       └── img/logo.png
//! └── jobs/                 # Job records with processing logs
//!     └── {jobId}.json
//! ```

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{JobRecord, JobStatus, LogLevel, PipelineResult};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Durable object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    ///
    /// Fails with `AppError::Storage` on transport or auth failure.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Per-job processing log.
#[async_trait]
pub trait JobSink: Send + Sync {
    async fn record(&self, job_id: &str, message: &str, level: LogLevel) -> Result<()>;
}

/// Job status persistence.
#[async_trait]
pub trait JobStore: JobSink {
    /// Create a new `PENDING` job for an uploaded archive.
    async fn create_job(&self, archive_name: &str) -> Result<JobRecord>;

    async fn update_status(&self, job_id: &str, status: JobStatus) -> Result<()>;

    /// Mark the job `COMPLETED` and store its result.
    async fn complete_job(&self, job_id: &str, result: &PipelineResult) -> Result<()>;

    /// Mark the job `FAILED` with a human-readable reason.
    async fn fail_job(&self, job_id: &str, reason: &str) -> Result<()>;

    async fn load_job(&self, job_id: &str) -> Result<Option<JobRecord>>;
}

/// Join a public base URL and an object key.
pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Build a job ID from the creation time and a sequence number.
pub(crate) fn job_id(sequence: u64) -> String {
    format!("job_{}_{:04}", chrono::Utc::now().format("%Y%m%d%H%M%S"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_join() {
        assert_eq!(public_url("https://cdn.example.com/", "/job/a.css"), "https://cdn.example.com/job/a.css");
        assert_eq!(public_url("https://cdn.example.com", "a.css"), "https://cdn.example.com/a.css");
    }

    #[test]
    fn test_job_id_format() {
        let id = job_id(7);
        assert!(id.starts_with("job_"));
        assert!(id.ends_with("_0007"));
    }
}
