// src/pipeline/select.rs

//! Asset selection.

use crate::models::{ArchiveEntry, AssetRecord, AssetSelectionPolicy};

use super::anchor::AnchorResolution;

/// Select the relocatable assets among the usable archive entries.
///
/// The anchor and every secondary HTML document are always skipped.
pub fn select_assets(
    entries: &[ArchiveEntry],
    resolution: &AnchorResolution,
    policy: &AssetSelectionPolicy,
) -> Vec<AssetRecord> {
    let anchor_dir = resolution.anchor.anchor_directory.as_str();

    entries
        .iter()
        .filter(|entry| !resolution.is_document(entry))
        .filter_map(|entry| {
            let name = entry.normalized_name.as_str();
            match policy {
                AssetSelectionPolicy::DirectoryRelative => {
                    let relative = name.strip_prefix(anchor_dir)?;
                    Some(AssetRecord::new(entry.clone(), relative, relative))
                }
                AssetSelectionPolicy::FixedFolders { folders } => folders
                    .iter()
                    .map(|f| f.trim_matches('/'))
                    .filter(|f| !f.is_empty())
                    .any(|f| name.strip_prefix(f).is_some_and(|rest| rest.starts_with('/')))
                    .then(|| AssetRecord::new(entry.clone(), name, name)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::anchor::resolve_anchor;

    fn entries(names: &[&str]) -> Vec<ArchiveEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ArchiveEntry::new(*n, *n, i))
            .collect()
    }

    #[test]
    fn test_directory_relative() {
        let list = entries(&[
            "site/index.html",
            "site/img/logo.png",
            "site/css/main.css",
            "other/readme.txt",
            "site/old.html",
        ]);
        let resolution = resolve_anchor(&list).unwrap();
        let assets = select_assets(&list, &resolution, &AssetSelectionPolicy::DirectoryRelative);

        let relative: Vec<_> = assets.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(relative, ["img/logo.png", "css/main.css"]);
        assert_eq!(assets[0].original_path, "site/img/logo.png");
        assert_eq!(assets[0].reference_path, "img/logo.png");
    }

    #[test]
    fn test_directory_relative_at_root_takes_everything() {
        let list = entries(&["index.html", "a+b.png", "deep/x/y.js"]);
        let resolution = resolve_anchor(&list).unwrap();
        let assets = select_assets(&list, &resolution, &AssetSelectionPolicy::DirectoryRelative);

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].original_path, assets[0].reference_path);
    }

    #[test]
    fn test_fixed_folders() {
        let list = entries(&[
            "index.html",
            "css/main.css",
            "cssx/not.css",
            "js/app.js",
            "fonts/a.woff",
            "images/a.png",
        ]);
        let resolution = resolve_anchor(&list).unwrap();
        let assets = select_assets(&list, &resolution, &AssetSelectionPolicy::fixed_folders());

        let paths: Vec<_> = assets.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(paths, ["css/main.css", "js/app.js", "images/a.png"]);
    }
}
