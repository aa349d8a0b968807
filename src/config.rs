// src/config.rs

//! Configuration loading utilities.
//!
//! Loads the TOML config file, applies environment overrides and opens the
//! configured object storage backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, StorageBackend, StorageConfig};
use crate::storage::{LocalStorage, ObjectStore};

/// Footer version override.
pub const ENV_VERSION: &str = "APP_VERSION";
pub const ENV_BUCKET: &str = "SITEHOST_BUCKET";
pub const ENV_PREFIX: &str = "SITEHOST_PREFIX";
pub const ENV_PUBLIC_URL: &str = "SITEHOST_PUBLIC_URL";
pub const ENV_STORAGE_ROOT: &str = "SITEHOST_STORAGE_ROOT";

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing or unreadable.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config file at {}; using defaults.", path.display());
        return Config::default();
    }
    Config::load_or_default(path)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` to resolve variable names.
///
/// Empty values are ignored.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(version) = get(ENV_VERSION) {
        config.pipeline.version = version;
    }
    if let Some(bucket) = get(ENV_BUCKET) {
        config.storage.bucket = bucket;
        config.storage.backend = StorageBackend::S3;
    }
    if let Some(prefix) = get(ENV_PREFIX) {
        config.storage.prefix = prefix;
    }
    if let Some(url) = get(ENV_PUBLIC_URL) {
        config.storage.public_base_url = Some(url);
    }
    if let Some(root) = get(ENV_STORAGE_ROOT) {
        config.storage.root_dir = PathBuf::from(root);
    }
}

/// Load, override and validate the configuration.
pub fn load_all(path: &Path) -> Result<Config> {
    let mut config = load_config(path);
    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    Ok(config)
}

/// Local storage for job records and, with the local backend, objects.
pub fn open_local_storage(config: &StorageConfig) -> LocalStorage {
    let storage = LocalStorage::new(&config.root_dir);
    match &config.public_base_url {
        Some(url) if config.backend == StorageBackend::Local => storage.with_public_base_url(url),
        _ => storage,
    }
}

/// Open the configured object storage backend.
pub async fn open_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(open_local_storage(config))),
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let storage = crate::storage::s3::S3Storage::from_config(config).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(AppError::config(
            "storage.backend = \"s3\" requires the `s3` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config.pipeline.version, "1.0.0");
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitehost.toml");
        std::fs::write(&path, "pipeline = [").unwrap();
        let config = load_config(&path);
        assert_eq!(config.pipeline.max_concurrent_uploads, 4);
    }

    #[test]
    fn test_file_values_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitehost.toml");
        std::fs::write(&path, "[pipeline]\nversion = \"3.2.1\"\n").unwrap();
        assert_eq!(load_config(&path).pipeline.version, "3.2.1");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            lookup(&[
                (ENV_VERSION, "2.0.0"),
                (ENV_BUCKET, "sites"),
                (ENV_PREFIX, "public"),
                (ENV_PUBLIC_URL, "https://cdn.example.com"),
            ]),
        );

        assert_eq!(config.pipeline.version, "2.0.0");
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "sites");
        assert_eq!(config.storage.prefix, "public");
        assert_eq!(
            config.storage.public_base_url.as_deref(),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn test_empty_override_ignored() {
        let mut config = Config::default();
        apply_overrides(&mut config, lookup(&[(ENV_VERSION, "  ")]));
        assert_eq!(config.pipeline.version, "1.0.0");
    }

    #[tokio::test]
    async fn test_open_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            root_dir: dir.path().to_path_buf(),
            public_base_url: Some("https://static.example.com".into()),
            ..StorageConfig::default()
        };

        let store = open_object_store(&config).await.unwrap();
        let url = store.put("a/b.css", b"x".to_vec(), "text/css").await.unwrap();
        assert_eq!(url, "https://static.example.com/a/b.css");
        assert!(dir.path().join("objects/a/b.css").exists());
    }
}
