//! In-memory storage backend for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{JobRecord, JobStatus, LogEntry, LogLevel, PipelineResult};
use crate::storage::{JobSink, JobStore, ObjectStore, job_id, public_url};

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory object and job store.
///
/// Objects and jobs are kept in `HashMap`s behind [`RwLock`]s, so every
/// trait method works on `&self`. Failures can be injected per key to
/// exercise the pipeline's soft-failure paths.
pub struct MemoryStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    jobs: RwLock<HashMap<String, JobRecord>>,
    logs: RwLock<HashMap<String, Vec<LogEntry>>>,
    failing_keys: HashSet<String>,
    failing_sink: AtomicBool,
    sequence: AtomicU64,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
            logs: RwLock::new(HashMap::new()),
            failing_keys: HashSet::new(),
            failing_sink: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    /// Make every `put` whose key ends with `suffix` fail.
    pub fn fail_on(mut self, suffix: impl Into<String>) -> Self {
        self.failing_keys.insert(suffix.into());
        self
    }

    /// Make every `record` call fail.
    pub fn with_failing_sink(self) -> Self {
        self.failing_sink.store(true, Ordering::Relaxed);
        self
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn logs(&self, job_id: &str) -> Vec<LogEntry> {
        self.logs.read().await.get(job_id).cloned().unwrap_or_default()
    }

    async fn modify_job(&self, job_id: &str, update: impl FnOnce(&mut JobRecord)) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::validation(format!("Unknown job: {job_id}")))?;
        update(job);
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://bucket")
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        if self.failing_keys.iter().any(|suffix| key.ends_with(suffix.as_str())) {
            return Err(AppError::storage(key, "simulated storage failure"));
        }
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(public_url(&self.base_url, key))
    }
}

#[async_trait]
impl JobSink for MemoryStorage {
    async fn record(&self, job_id: &str, message: &str, level: LogLevel) -> Result<()> {
        if self.failing_sink.load(Ordering::Relaxed) {
            return Err(AppError::Io(std::io::Error::other("simulated sink failure")));
        }
        self.logs
            .write()
            .await
            .entry(job_id.to_string())
            .or_default()
            .push(LogEntry {
                level,
                message: message.to_string(),
                timestamp: Utc::now(),
            });
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStorage {
    async fn create_job(&self, archive_name: &str) -> Result<JobRecord> {
        let id = job_id(self.sequence.fetch_add(1, Ordering::Relaxed));
        let record = JobRecord::new(id, archive_name);
        self.jobs
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        self.modify_job(job_id, |job| job.status = status).await
    }

    async fn complete_job(&self, job_id: &str, result: &PipelineResult) -> Result<()> {
        self.modify_job(job_id, |job| {
            job.status = JobStatus::Completed;
            job.completed_at = Some(Utc::now());
            job.html_content = Some(result.final_html.clone());
            job.mapping = Some(result.mapping.clone());
            job.final_html_url = Some(result.final_document_url.clone());
        })
        .await
    }

    async fn fail_job(&self, job_id: &str, reason: &str) -> Result<()> {
        self.modify_job(job_id, |job| {
            job.status = JobStatus::Failed;
            job.completed_at = Some(Utc::now());
            job.error = Some(reason.to_string());
        })
        .await
    }

    async fn load_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        let mut record = self.jobs.read().await.get(job_id).cloned();
        if let Some(job) = record.as_mut() {
            job.logs = self.logs(job_id).await;
        }
        Ok(record)
    }
}
