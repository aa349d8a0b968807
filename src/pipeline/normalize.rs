// src/pipeline/normalize.rs

//! Archive entry name normalization.

use percent_encoding::percent_decode_str;

use crate::error::{AppError, Result};
use crate::utils::strip_dot_slash;

/// Prefix of macOS resource-fork folders added by Finder's "Compress".
pub const METADATA_PREFIX: &str = "__MACOSX/";

/// Normalize a raw entry name.
///
/// Returns `Ok(None)` for entries that are ignored outright (directories and
/// platform metadata) and `Err(MalformedEntry)` when the name holds an
/// invalid percent-escape or decodes to invalid UTF-8.
pub fn normalize_entry_name(raw_name: &str, is_directory: bool) -> Result<Option<String>> {
    if is_directory || raw_name.ends_with('/') || raw_name.starts_with(METADATA_PREFIX) {
        return Ok(None);
    }

    let stripped = strip_dot_slash(raw_name);
    validate_escapes(raw_name, stripped)?;

    let decoded = percent_decode_str(stripped)
        .decode_utf8()
        .map_err(|e| AppError::malformed(raw_name, e))?;

    Ok(Some(decoded.into_owned()))
}

/// Every `%` must start a two-digit hex escape.
fn validate_escapes(raw_name: &str, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(AppError::malformed(
                    raw_name,
                    format!("invalid percent-escape at byte {i}"),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
