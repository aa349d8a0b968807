//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Asset selection, key derivation and publishing behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Object storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.version.trim().is_empty() {
            return Err(AppError::validation("pipeline.version is empty"));
        }
        if self.pipeline.max_concurrent_uploads == 0 {
            return Err(AppError::validation(
                "pipeline.max_concurrent_uploads must be > 0",
            ));
        }
        if self.pipeline.max_archive_bytes == 0 {
            return Err(AppError::validation("pipeline.max_archive_bytes must be > 0"));
        }
        if self.pipeline.job_timeout_secs == 0 {
            return Err(AppError::validation("pipeline.job_timeout_secs must be > 0"));
        }
        if let AssetSelectionPolicy::FixedFolders { folders } = &self.pipeline.selection {
            if folders.iter().all(|f| f.trim_matches('/').is_empty()) {
                return Err(AppError::validation(
                    "pipeline.selection.folders must name at least one folder",
                ));
            }
        }
        if let PublishKeyPolicy::Fixed { key } = &self.pipeline.publish_key {
            if key.trim().is_empty() {
                return Err(AppError::validation("pipeline.publish_key.key is empty"));
            }
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is required for s3"));
        }
        Ok(())
    }
}

/// Which archive entries are treated as relocatable assets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssetSelectionPolicy {
    /// Everything under the directory holding the HTML document.
    #[default]
    DirectoryRelative,
    /// Only entries under a fixed set of top-level folders.
    FixedFolders {
        #[serde(default = "defaults::fixed_folders")]
        folders: Vec<String>,
    },
}

/// How the storage key of a relocated asset is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDerivationPolicy {
    /// `<jobId>/<relativePath>`, preserving directory structure.
    #[default]
    JobScoped,
    /// `<md5><extension>`, shared across jobs.
    ContentAddressed,
}

/// Where the rewritten document is published.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PublishKeyPolicy {
    /// `<jobId>/<anchor file name>`.
    #[default]
    JobScoped,
    /// A fixed well-known key.
    Fixed {
        #[serde(default = "defaults::publish_key")]
        key: String,
    },
}

/// Pipeline behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub selection: AssetSelectionPolicy,

    #[serde(default)]
    pub key_scheme: KeyDerivationPolicy,

    #[serde(default)]
    pub publish_key: PublishKeyPolicy,

    /// Maximum concurrent asset uploads per job
    #[serde(default = "defaults::max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,

    /// Largest archive accepted by the job runner
    #[serde(default = "defaults::max_archive_bytes")]
    pub max_archive_bytes: usize,

    /// Whole-job deadline enforced by the job runner
    #[serde(default = "defaults::job_timeout_secs")]
    pub job_timeout_secs: u64,

    /// Version stamped into the page footer
    #[serde(default = "defaults::version")]
    pub version: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            selection: AssetSelectionPolicy::default(),
            key_scheme: KeyDerivationPolicy::default(),
            publish_key: PublishKeyPolicy::default(),
            max_concurrent_uploads: defaults::max_concurrent_uploads(),
            max_archive_bytes: defaults::max_archive_bytes(),
            job_timeout_secs: defaults::job_timeout_secs(),
            version: defaults::version(),
        }
    }
}

/// Supported object storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend (objects and job records)
    #[serde(default = "defaults::root_dir")]
    pub root_dir: PathBuf,

    /// Base URL prepended to object keys; backend-specific when unset
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// S3 bucket name
    #[serde(default)]
    pub bucket: String,

    /// Key prefix inside the bucket
    #[serde(default)]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root_dir: defaults::root_dir(),
            public_base_url: None,
            bucket: String::new(),
            prefix: String::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Default value functions for serde.
mod defaults {
    use std::path::PathBuf;

    pub fn fixed_folders() -> Vec<String> {
        ["css", "js", "img", "images"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn publish_key() -> String {
        "index.html".into()
    }

    pub fn max_concurrent_uploads() -> usize {
        4
    }

    pub fn max_archive_bytes() -> usize {
        100 * 1024 * 1024
    }

    pub fn job_timeout_secs() -> u64 {
        300
    }

    pub fn version() -> String {
        "1.0.0".into()
    }

    pub fn root_dir() -> PathBuf {
        PathBuf::from("storage")
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

impl AssetSelectionPolicy {
    /// Fixed-folder policy with the built-in folder list.
    pub fn fixed_folders() -> Self {
        Self::FixedFolders {
            folders: defaults::fixed_folders(),
        }
    }
}

impl PublishKeyPolicy {
    /// Fixed publish key with the built-in `index.html` name.
    pub fn fixed() -> Self {
        Self::Fixed {
            key: defaults::publish_key(),
        }
    }
}
