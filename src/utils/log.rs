// src/utils/log.rs

//! Job-scoped logging.
//!
//! Every message goes to the `log` facade prefixed with the job ID and is
//! forwarded to the job's [`JobSink`]. Sink failures never propagate; they
//! are only logged locally.

use std::sync::Arc;

use crate::models::LogLevel;
use crate::storage::JobSink;

/// Logger bound to a single job.
#[derive(Clone)]
pub struct JobLogger {
    job_id: String,
    sink: Arc<dyn JobSink>,
}

impl JobLogger {
    pub fn new(job_id: impl Into<String>, sink: Arc<dyn JobSink>) -> Self {
        Self {
            job_id: job_id.into(),
            sink,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Log a message and forward it to the sink.
    pub async fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => log::info!("[Job {}] {}: {}", self.job_id, level, message),
            LogLevel::Warning => log::warn!("[Job {}] {}: {}", self.job_id, level, message),
            LogLevel::Error => log::error!("[Job {}] {}: {}", self.job_id, level, message),
        }

        if let Err(e) = self.sink.record(&self.job_id, message, level).await {
            log::error!(
                "[Job {}] Failed to write log to sink: {}: {}",
                self.job_id,
                message,
                e
            );
        }
    }

    pub async fn info(&self, message: &str) {
        self.log(LogLevel::Info, message).await
    }

    pub async fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message).await
    }

    pub async fn error(&self, message: &str) {
        self.log(LogLevel::Error, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_forwards_to_sink() {
        let storage = Arc::new(MemoryStorage::default());
        let logger = JobLogger::new("job_1", storage.clone());

        logger.info("Starting ZIP file processing.").await;
        logger.warn("No </body> tag found.").await;

        let logs = storage.logs("job_1").await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].level, LogLevel::Warning);
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let storage = Arc::new(MemoryStorage::default().with_failing_sink());
        let logger = JobLogger::new("job_1", storage.clone());

        logger.error("Error processing asset img/a.png").await;
        assert!(storage.logs("job_1").await.is_empty());
    }
}
