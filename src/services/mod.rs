//! Service layer for the site publisher.
//!
//! This module contains the job-level business logic:
//! - Upload job lifecycle and status tracking (`JobRunner`)

mod jobs;

pub use jobs::{JobReport, JobRunner};
