//! Local filesystem storage implementation.
//!
//! Serves both as an object store and as a job store for development and
//! single-host deployments. Production deployments should use `S3Storage`
//! for objects.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{JobRecord, JobStatus, LogLevel, PipelineResult};
use crate::storage::{JobSink, JobStore, ObjectStore, job_id, public_url};

/// Local filesystem storage backend.
pub struct LocalStorage {
    root_dir: PathBuf,
    public_base_url: Option<String>,
    sequence: AtomicU64,
    /// Serializes read-modify-write cycles on job records
    jobs_lock: Mutex<()>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base_url: None,
            sequence: AtomicU64::new(0),
            jobs_lock: Mutex::new(()),
        }
    }

    /// Serve objects from `base_url` instead of `file://` URLs.
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Filesystem path of a stored object.
    pub fn object_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root_dir.join("objects").join(validate_key(key)?))
    }

    fn job_path(&self, job_id: &str) -> Result<PathBuf> {
        let file = validate_key(&format!("{job_id}.json"))?;
        Ok(self.root_dir.join("jobs").join(file))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_file_name(format!(".{name}.{seq}.tmp"));

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Read JSON data, returning None if the file doesn't exist.
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Apply `update` to a stored job record.
    async fn modify_job(&self, job_id: &str, update: impl FnOnce(&mut JobRecord)) -> Result<()> {
        let _guard = self.jobs_lock.lock().await;
        let path = self.job_path(job_id)?;
        let mut record: JobRecord = self
            .read_json(&path)
            .await?
            .ok_or_else(|| AppError::validation(format!("Unknown job: {job_id}")))?;
        update(&mut record);
        self.write_json(&path, &record).await
    }

    fn url_for(&self, key: &str, path: &Path) -> Result<String> {
        if let Some(base) = &self.public_base_url {
            return Ok(public_url(base, key));
        }
        let absolute = std::path::absolute(path)?;
        Url::from_file_path(&absolute)
            .map(|u| u.to_string())
            .map_err(|_| AppError::storage(key, "cannot express object path as a file URL"))
    }
}

/// Reject keys that would escape the storage root.
fn validate_key(key: &str) -> Result<PathBuf> {
    let path = Path::new(key);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(AppError::storage(key, "key escapes the storage root")),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(AppError::storage(key, "empty key"));
    }
    Ok(clean)
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let path = self.object_path(key)?;
        self.write_bytes(&path, &bytes)
            .await
            .map_err(|e| AppError::storage(key, e))?;
        log::debug!("Stored {} ({}, {} bytes)", key, content_type, bytes.len());
        self.url_for(key, &path)
    }
}

#[async_trait]
impl JobSink for LocalStorage {
    async fn record(&self, job_id: &str, message: &str, level: LogLevel) -> Result<()> {
        self.modify_job(job_id, |job| job.push_log(level, message))
            .await
    }
}

#[async_trait]
impl JobStore for LocalStorage {
    async fn create_job(&self, archive_name: &str) -> Result<JobRecord> {
        let _guard = self.jobs_lock.lock().await;
        loop {
            let id = job_id(self.sequence.fetch_add(1, Ordering::Relaxed));
            let path = self.job_path(&id)?;
            if tokio::fs::try_exists(&path).await? {
                continue;
            }
            let record = JobRecord::new(id, archive_name);
            self.write_json(&path, &record).await?;
            log::info!("Created job {} for {}", record.id, archive_name);
            return Ok(record);
        }
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
        let path = self.job_path(job_id)?;
        self.read_json(&path).await
    }
}
