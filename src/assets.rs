//! Asset relocation.
//!
//! The export keeps binary assets in a few well-known directories at its root
//! (`images/`, `attachments/`, `styles/` by default). Relocated pages
//! reference them with paths computed against the output root, so the files
//! have to come along:
//!
//! - mirrored layout (DOCX): each asset directory is copied to the output
//!   root with its internal structure intact;
//! - consolidated layout (Markdown): every asset file is flattened into one
//!   `assets/` directory by basename.
//!
//! Both match what [`crate::rewrite`] writes into the markup. Absent asset
//! directories are skipped; a file that fails to copy is logged and the rest
//! of the batch continues.

use crate::config::{ConvertConfig, CONSOLIDATED_ASSETS_DIR};
use crate::types::ConversionStats;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copy every configured asset directory into the output tree.
pub fn copy_assets(config: &ConvertConfig, stats: &mut ConversionStats) -> Result<(), AssetError> {
    fs::create_dir_all(&config.output_root)?;
    if config.format.consolidates_assets() {
        copy_consolidated(config, stats)
    } else {
        copy_mirrored(config, stats)
    }
}

fn copy_mirrored(config: &ConvertConfig, stats: &mut ConversionStats) -> Result<(), AssetError> {
    for dir in &config.asset_dirs {
        let source_dir = config.export_root.join(dir);
        if !source_dir.is_dir() {
            continue;
        }
        let dest_dir = config.output_root.join(dir);
        for entry in WalkDir::new(&source_dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    stats.error(format!("cannot walk {dir}: {err}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            // Every walked entry sits below source_dir.
            let rel = entry.path().strip_prefix(&source_dir).unwrap();
            copy_one(entry.path(), &dest_dir.join(rel), stats);
        }
    }
    Ok(())
}

fn copy_consolidated(
    config: &ConvertConfig,
    stats: &mut ConversionStats,
) -> Result<(), AssetError> {
    let dest_dir = config.output_root.join(CONSOLIDATED_ASSETS_DIR);
    let mut seen: HashSet<String> = HashSet::new();

    for dir in &config.asset_dirs {
        let source_dir = config.export_root.join(dir);
        if !source_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&source_dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    stats.error(format!("cannot walk {dir}: {err}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !seen.insert(name.clone()) {
                stats.warn(format!(
                    "asset name collision in consolidated layout: {name} (overwritten)"
                ));
            }
            copy_one(entry.path(), &dest_dir.join(&name), stats);
        }
    }
    Ok(())
}

fn copy_one(source: &Path, dest: &Path, stats: &mut ConversionStats) {
    let result = dest
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| fs::copy(source, dest));
    match result {
        Ok(_) => stats.assets_copied += 1,
        Err(err) => stats.error(format!("failed to copy {}: {err}", source.display())),
    }
}
