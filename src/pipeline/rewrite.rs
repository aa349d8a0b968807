// src/pipeline/rewrite.rs

//! Reference rewriting in the anchor document.
//!
//! Matching is textual: only literal occurrences of an asset's reference
//! path inside `src=`, `href=` and CSS `url(...)` are rewritten. References
//! split across lines, spelled with different casing or through another
//! relative path are left untouched.

use regex::{Captures, Regex};

use crate::error::Result;
use crate::models::MappingDocument;

/// One rewritten asset reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub path: String,
    pub url: String,
    /// Number of occurrences replaced
    pub occurrences: usize,
}

/// Rewritten document plus the substitutions applied.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub html: String,
    pub substitutions: Vec<Substitution>,
}

/// Rewrites asset references in a document.
pub trait ReferenceRewriter: Send + Sync {
    /// Apply every mapping entry to `html`, in mapping order.
    fn rewrite(&self, html: &str, mapping: &MappingDocument) -> Result<Rewrite>;
}

/// Regex-based rewriter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRewriter;

/// Compiled patterns for a single reference path.
struct ReferencePatterns {
    attribute: Regex,
    css_url: Regex,
}

impl ReferencePatterns {
    fn new(path: &str) -> Result<Self> {
        let p = regex::escape(path);
        Ok(Self {
            attribute: Regex::new(&format!(
                r#"(?P<attr>src|href)\s*=\s*(?:"(?P<dq>{p})"|'(?P<sq>{p})')"#
            ))?,
            css_url: Regex::new(&format!(
                r#"url\(\s*(?:"(?P<dq>{p})"|'(?P<sq>{p})'|(?P<bare>{p}))\s*\)"#
            ))?,
        })
    }
}

/// Quote character of the alternative that matched.
fn quote_of(caps: &Captures) -> &'static str {
    if caps.name("dq").is_some() {
        "\""
    } else if caps.name("sq").is_some() {
        "'"
    } else {
        ""
    }
}

impl ReferenceRewriter for PatternRewriter {
    fn rewrite(&self, html: &str, mapping: &MappingDocument) -> Result<Rewrite> {
        let mut text = html.to_string();
        let mut substitutions = Vec::with_capacity(mapping.len());

        for entry in mapping.iter() {
            let patterns = ReferencePatterns::new(&entry.reference_path)?;
            let url = entry.published_url.as_str();
            let mut occurrences = 0;

            text = patterns
                .attribute
                .replace_all(&text, |caps: &Captures| {
                    occurrences += 1;
                    let q = quote_of(caps);
                    format!("{}={q}{url}{q}", &caps["attr"])
                })
                .into_owned();

            text = patterns
                .css_url
                .replace_all(&text, |caps: &Captures| {
                    occurrences += 1;
                    let q = quote_of(caps);
                    format!("url({q}{url}{q})")
                })
                .into_owned();

            substitutions.push(Substitution {
                path: entry.reference_path.clone(),
                url: url.to_string(),
                occurrences,
            });
        }

        Ok(Rewrite {
            html: text,
            substitutions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MappingEntry;

    fn mapping(pairs: &[(&str, &str)]) -> MappingDocument {
        let mut doc = MappingDocument::new();
        for (path, url) in pairs {
            doc.insert(MappingEntry {
                original_path: path.to_string(),
                published_url: url.to_string(),
                content_hash: "h".into(),
                reference_path: path.to_string(),
            });
        }
        doc
    }

    fn rewrite(html: &str, pairs: &[(&str, &str)]) -> Rewrite {
        PatternRewriter.rewrite(html, &mapping(pairs)).unwrap()
    }

    #[test]
    fn test_rewrites_src_and_href_preserving_quotes() {
        let html = r#"<img src="img/logo.png"><link href='css/a.css'>"#;
        let out = rewrite(html, &[("img/logo.png", "https://cdn/logo.png"), ("css/a.css", "https://cdn/a.css")]);

        assert_eq!(out.html, r#"<img src="https://cdn/logo.png"><link href='https://cdn/a.css'>"#);
        assert_eq!(out.substitutions[0].occurrences, 1);
    }

    #[test]
    fn test_rewrites_every_occurrence() {
        let html = r#"<img src="a.png"><a href="a.png">x</a><div style="background: url(a.png)"></div><img src = 'a.png'>"#;
        let out = rewrite(html, &[("a.png", "U")]);

        assert_eq!(
            out.html,
            r#"<img src="U"><a href="U">x</a><div style="background: url(U)"></div><img src='U'>"#
        );
        assert_eq!(out.substitutions[0].occurrences, 4);
    }

    #[test]
    fn test_css_url_quoting_variants() {
        let css = r#"url(bg.jpg) url('bg.jpg') url( "bg.jpg" )"#;
        let out = rewrite(css, &[("bg.jpg", "https://cdn/bg.jpg")]);
        assert_eq!(
            out.html,
            r#"url(https://cdn/bg.jpg) url('https://cdn/bg.jpg') url("https://cdn/bg.jpg")"#
        );
    }

    #[test]
    fn test_escapes_metacharacters() {
        let html = r#"<img src="a+b.png"><img src="aab.png"><img src="a+b(1).png">"#;
        let out = rewrite(html, &[("a+b.png", "X"), ("a+b(1).png", "Y")]);
        assert_eq!(out.html, r#"<img src="X"><img src="aab.png"><img src="Y">"#);
    }

    #[test]
    fn test_mismatched_quotes_and_other_spellings_untouched() {
        let html = r#"<img src="a.png'><img src="./a.png"><img SRC="A.PNG"><img src="a.png.bak">"#;
        let out = rewrite(html, &[("a.png", "X")]);
        assert_eq!(out.html, html);
        assert_eq!(out.substitutions[0].occurrences, 0);
    }

    #[test]
    fn test_replacement_url_is_literal() {
        let out = rewrite(r#"<img src="a.png">"#, &[("a.png", "https://cdn/$1/a.png")]);
        assert_eq!(out.html, r#"<img src="https://cdn/$1/a.png">"#);
    }
}
