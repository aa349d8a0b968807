// src/lib.rs

//! sitehost Library
//!
//! Rehosts the static assets of a zipped site in object storage, rewrites
//! the HTML document to point at them and publishes the result.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
