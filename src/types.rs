//! Shared types used across all pipeline stages.
//!
//! The page map is serialized to JSON between stages (map → restructure →
//! convert) and must be identical across all three modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Final output format, selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// DOCX via pandoc; asset directories are mirrored at the output root.
    Docx,
    /// GitHub-flavored Markdown via pandoc; assets are consolidated into a
    /// single `assets/` directory at the output root.
    Markdown,
}

impl TargetFormat {
    /// File extension of the converted document (no dot).
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Docx => "docx",
            TargetFormat::Markdown => "md",
        }
    }

    /// Whether assets are flattened into one `assets/` directory instead of
    /// mirroring the export's asset directories.
    pub fn consolidates_assets(&self) -> bool {
        matches!(self, TargetFormat::Markdown)
    }
}

/// Destination of one source page: where it lives in the output tree.
///
/// `segments` is the sanitized ancestor-title chain, deepest last. A page
/// always gets its own directory; the document file sits inside it, named
/// after the final segment:
///
/// ```text
/// segments = ["Home", "Child"]
///   directory:  Home/Child/
///   document:   Home/Child/Child.<ext>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Sanitized path segments, no extension. Never empty.
    pub segments: Vec<String>,
    /// Display title as it appeared in the navigation index.
    pub title: String,
}

impl TargetEntry {
    /// Directory holding this page's document, relative to the output root.
    pub fn dir(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Document path relative to the output root, with the given extension.
    pub fn document(&self, ext: &str) -> PathBuf {
        let name = self.segments.last().map(String::as_str).unwrap_or_default();
        self.dir().join(format!("{name}.{ext}"))
    }
}

/// Mapping from decoded source identifier (the export's relative page path)
/// to its target entry. BTreeMap keeps stage output deterministic.
pub type PageMap = BTreeMap<String, TargetEntry>;

/// Outcome of relocating and rewriting one mapped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocatedPage {
    /// Decoded source identifier (key into the page map).
    pub source: String,
    /// Intermediate rewritten HTML, relative to the output root.
    pub dest_html: PathBuf,
    pub status: PageStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Copied, rewritten, and written back successfully.
    Rewritten,
    /// Source HTML absent from the export; nothing was written.
    MissingSource,
    /// Copy succeeded but parsing or rewriting failed.
    RewriteFailed,
}

/// Aggregate counters and error log for a whole run.
///
/// Purely observational: every stage bumps its counters and appends error
/// strings; nothing reads it until the final summary. Single-threaded batch,
/// so plain `&mut` access is all that is needed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages relocated and rewritten.
    pub rewritten: usize,
    /// Pages converted to the target format.
    pub converted: usize,
    /// Intermediate HTML files deleted by cleanup.
    pub cleaned: usize,
    /// Asset files copied to the output tree.
    pub assets_copied: usize,
    /// Non-fatal anomalies (mapping collisions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Recoverable per-document failures, in occurrence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ConversionStats {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compute the forward-slash relative path from one directory to a target.
///
/// Both paths must be relative to the same root (the output root). Purely
/// lexical — nothing touches the filesystem.
pub fn relative_href(from_dir: &Path, to: &Path) -> String {
    let rel = pathdiff::diff_paths(to, from_dir).unwrap_or_else(|| to.to_path_buf());
    // Hrefs always use forward slashes, whatever the host convention.
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
