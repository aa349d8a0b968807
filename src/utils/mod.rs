//! Utility functions and helpers.

pub mod log;

use md5::{Digest, Md5};

pub use log::JobLogger;

/// MD5 digest of `bytes` as lowercase hex.
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Strip a single leading `./` from an archive path.
pub fn strip_dot_slash(name: &str) -> &str {
    name.strip_prefix("./").unwrap_or(name)
}
