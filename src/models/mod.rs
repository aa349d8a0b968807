// src/models/mod.rs

//! Domain models for the site publishing pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod archive;
mod asset;
mod config;
mod job;
mod mapping;

// Re-export all public types
pub use archive::{AnchorDocument, ArchiveEntry};
pub use asset::{AssetFailure, AssetRecord, DEFAULT_CONTENT_TYPE, content_type_for};
pub use config::{
    AssetSelectionPolicy, Config, KeyDerivationPolicy, LoggingConfig, PipelineConfig,
    PublishKeyPolicy, StorageBackend, StorageConfig,
};
pub use job::{JobRecord, JobStatus, LogEntry, LogLevel};
pub use mapping::{MappingDocument, MappingEntry, PipelineResult};
