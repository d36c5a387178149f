//! Page relocation: flat export → hierarchical output tree.
//!
//! For every mapped page, copy its HTML into the destination directory,
//! rewrite it in place ([`crate::rewrite`]), and record the outcome. The
//! batch never aborts on a single bad page: a missing or unreadable source is
//! logged against [`ConversionStats`] and the loop moves on. Only an output
//! root that cannot be created is fatal.
//!
//! The relocated-page list is saved as a JSON manifest at the output root so
//! the convert stage can run as a separate invocation.

use crate::config::ConvertConfig;
use crate::index::MapManifest;
use crate::rewrite::rewrite_page;
use crate::types::{ConversionStats, PageStatus, RelocatedPage, TargetEntry};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestructureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const RESTRUCTURE_MANIFEST: &str = "restructure.json";

/// Relocate and rewrite every page in the map, in map order.
pub fn restructure_pages(
    config: &ConvertConfig,
    manifest: &MapManifest,
    stats: &mut ConversionStats,
) -> Result<Vec<RelocatedPage>, RestructureError> {
    fs::create_dir_all(&config.output_root)?;
    for warning in &manifest.warnings {
        stats.warn(warning.clone());
    }

    let mut relocated = Vec::with_capacity(manifest.pages.len());
    for (source, entry) in &manifest.pages {
        let dest_html = entry.document("html");
        let source_path = config.export_root.join(source);

        let status = if !source_path.is_file() {
            stats.error(format!("source page missing: {source}"));
            PageStatus::MissingSource
        } else {
            match relocate_one(config, &manifest.pages, source, entry) {
                Ok(()) => {
                    stats.rewritten += 1;
                    PageStatus::Rewritten
                }
                Err(err) => {
                    stats.error(format!("failed to relocate {source}: {err}"));
                    PageStatus::RewriteFailed
                }
            }
        };

        relocated.push(RelocatedPage {
            source: source.clone(),
            dest_html,
            status,
        });
    }

    save_relocated(&config.output_root, &relocated)?;
    Ok(relocated)
}

fn relocate_one(
    config: &ConvertConfig,
    pages: &crate::types::PageMap,
    source: &str,
    entry: &TargetEntry,
) -> Result<(), std::io::Error> {
    let dest = config.output_root.join(entry.document("html"));
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let html = fs::read_to_string(config.export_root.join(source))?;
    let rewritten = rewrite_page(&html, entry, pages, config);
    fs::write(&dest, rewritten)?;
    Ok(())
}

pub fn save_relocated(
    output_root: &Path,
    relocated: &[RelocatedPage],
) -> Result<(), RestructureError> {
    let json = serde_json::to_string_pretty(relocated)?;
    fs::write(output_root.join(RESTRUCTURE_MANIFEST), json)?;
    Ok(())
}

pub fn load_relocated(output_root: &Path) -> Result<Vec<RelocatedPage>, RestructureError> {
    let json = fs::read_to_string(output_root.join(RESTRUCTURE_MANIFEST))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PageMap, TargetFormat};
    use tempfile::TempDir;

    fn setup(pages: &[(&str, &[&str], &str)]) -> (TempDir, ConvertConfig, MapManifest) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "<ul></ul>").unwrap();
        let mut map = PageMap::new();
        for (href, segments, body) in pages {
            if !body.is_empty() {
                fs::write(tmp.path().join(href), body).unwrap();
            }
            map.insert(
                href.to_string(),
                TargetEntry {
                    segments: segments.iter().map(|s| s.to_string()).collect(),
                    title: segments.last().unwrap().to_string(),
                },
            );
        }
        let config = ConvertConfig::assemble(
            tmp.path(),
            &tmp.path().join("out"),
            TargetFormat::Docx,
            None,
            false,
        )
        .unwrap();
        let manifest = MapManifest {
            pages: map,
            warnings: Vec::new(),
        };
        (tmp, config, manifest)
    }

    #[test]
    fn pages_land_in_their_own_directories() {
        let (_tmp, config, manifest) = setup(&[
            ("home.html", &["Home"], "<body><p>home</p></body>"),
            ("child.html", &["Home", "Child"], "<body><p>child</p></body>"),
        ]);
        let mut stats = ConversionStats::default();

        let relocated = restructure_pages(&config, &manifest, &mut stats).unwrap();

        assert!(config.output_root.join("Home/Home.html").is_file());
        assert!(config.output_root.join("Home/Child/Child.html").is_file());
        assert_eq!(stats.rewritten, 2);
        assert!(stats.is_clean());
        assert!(relocated.iter().all(|p| p.status == PageStatus::Rewritten));
    }

    #[test]
    fn relocated_pages_are_rewritten() {
        let (_tmp, config, manifest) = setup(&[
            (
                "home.html",
                &["Home"],
                r#"<body><a href="child.html">c</a></body>"#,
            ),
            ("child.html", &["Home", "Child"], "<body>child</body>"),
        ]);
        let mut stats = ConversionStats::default();

        restructure_pages(&config, &manifest, &mut stats).unwrap();

        let html = fs::read_to_string(config.output_root.join("Home/Home.html")).unwrap();
        assert!(html.contains(r#"href="Child/Child.docx""#));
    }

    #[test]
    fn missing_source_is_logged_and_batch_continues() {
        let (_tmp, config, manifest) = setup(&[
            ("ghost.html", &["Ghost"], ""),
            ("real.html", &["Real"], "<body>real</body>"),
        ]);
        let mut stats = ConversionStats::default();

        let relocated = restructure_pages(&config, &manifest, &mut stats).unwrap();

        assert!(!config.output_root.join("Ghost").exists());
        assert!(config.output_root.join("Real/Real.html").is_file());
        assert_eq!(stats.rewritten, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].contains("ghost.html"));
        assert_eq!(relocated[0].status, PageStatus::MissingSource);
        assert_eq!(relocated[1].status, PageStatus::Rewritten);
    }

    #[test]
    fn map_warnings_carry_into_stats() {
        let (_tmp, config, mut manifest) = setup(&[("p.html", &["P"], "<body>p</body>")]);
        manifest.warnings.push("duplicate identifier".to_string());
        let mut stats = ConversionStats::default();

        restructure_pages(&config, &manifest, &mut stats).unwrap();
        assert_eq!(stats.warnings, vec!["duplicate identifier"]);
    }

    #[test]
    fn synthetic_export_relocates_fully() {
        let tmp = crate::test_helpers::setup_export();
        let config = crate::test_helpers::docx_config(&tmp);
        let manifest = crate::index::build_page_map(&config).unwrap();
        let mut stats = ConversionStats::default();

        restructure_pages(&config, &manifest, &mut stats).unwrap();

        assert_eq!(stats.rewritten, 3);
        assert!(config
            .output_root
            .join("Team Home/Roadmap/Roadmap.html")
            .is_file());
    }

    #[test]
    fn manifest_round_trips_through_disk() {
        let (_tmp, config, manifest) = setup(&[("p.html", &["P"], "<body>p</body>")]);
        let mut stats = ConversionStats::default();

        let relocated = restructure_pages(&config, &manifest, &mut stats).unwrap();
        let loaded = load_relocated(&config.output_root).unwrap();
        assert_eq!(loaded, relocated);
    }
}
