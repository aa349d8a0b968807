//! Pipeline stages for publishing a zipped site.
//!
//! - `archive` / `normalize`: read the ZIP and canonicalize entry names
//! - `anchor`: pick the HTML document
//! - `select`: choose relocatable assets
//! - `relocate`: hash and upload assets
//! - `rewrite`: point document references at uploaded assets
//! - `footer` / `publish`: stamp and upload the final document
//! - `pipeline`: `SitePipeline`, sequencing all of the above

pub mod anchor;
pub mod archive;
pub mod footer;
pub mod normalize;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod publish;
pub mod relocate;
pub mod rewrite;
pub mod select;

pub use anchor::{AnchorResolution, resolve_anchor};
pub use archive::{ArchiveScan, SiteArchive};
pub use footer::{BuildInfo, FooterOutcome, inject_footer};
pub use normalize::normalize_entry_name;
pub use pipeline::SitePipeline;
pub use publish::{publish_document, publish_key};
pub use relocate::{RelocationOutcome, Relocator, storage_key};
pub use rewrite::{PatternRewriter, ReferenceRewriter, Rewrite, Substitution};
pub use select::select_assets;
