// src/pipeline/footer.rs

//! Version footer injection.

use chrono::{DateTime, SecondsFormat, Utc};

const BODY_CLOSE: &str = "</body>";

/// Version and build time stamped into published pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            timestamp,
        }
    }

    /// Build info stamped with the current time.
    pub fn now(version: impl Into<String>) -> Self {
        Self::new(version, Utc::now())
    }

    /// The footer markup, with a leading newline.
    pub fn footer(&self) -> String {
        format!(
            "\n<footer><p>Version: {} | Build: {}</p></footer>",
            self.version,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Document with the footer applied.
#[derive(Debug, Clone)]
pub struct FooterOutcome {
    pub html: String,
    /// False when the footer had to be appended at the end
    pub body_tag_found: bool,
}

/// Insert the footer before the first `</body>`, or append it.
///
/// Not idempotent: a document that already carries a footer gets another.
pub fn inject_footer(html: &str, build: &BuildInfo) -> FooterOutcome {
    let footer = build.footer();
    match html.find(BODY_CLOSE) {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + footer.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(&footer);
            out.push('\n');
            out.push_str(&html[pos..]);
            FooterOutcome {
                html: out,
                body_tag_found: true,
            }
        }
        None => FooterOutcome {
            html: format!("{html}{footer}"),
            body_tag_found: false,
        },
    }
}
