//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ## Map
//!
//! ```text
//! Pages
//! Home → Home/Home.docx
//!     Child → Home/Child/Child.docx
//!
//! Mapped 2 pages
//! ```
//!
//! Indentation mirrors hierarchy depth, so the listing reads as the tree the
//! output directory will become.
//!
//! ## Restructure
//!
//! ```text
//! home.html → Home/Home.html
//! ghost.html → Ghost/Ghost.html (missing source)
//!
//! Relocated 1 page, 1 error
//! ```
//!
//! ## Summary
//!
//! ```text
//! Relocated 2 pages, converted 2 documents (docx), copied 3 assets
//!
//! Warnings
//!     duplicate identifier "p.html": A replaced by B
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::types::{ConversionStats, PageMap, PageStatus, RelocatedPage, TargetFormat};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Stage 1: Map output
// ============================================================================

/// Format the page map as an indented tree of destinations.
pub fn format_map_output(pages: &PageMap, format: TargetFormat) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Pages".to_string());

    // BTreeMap order is by source identifier; sort a copy by path so parents
    // precede children in the listing.
    let mut entries: Vec<_> = pages.values().collect();
    entries.sort_by(|a, b| a.segments.cmp(&b.segments));

    for entry in entries {
        let depth = entry.segments.len().saturating_sub(1);
        lines.push(format!(
            "{}{} → {}",
            indent(depth),
            entry.title,
            entry.document(format.extension()).display()
        ));
    }

    lines.push(String::new());
    lines.push(format!("Mapped {}", plural(pages.len(), "page")));
    lines
}

pub fn print_map_output(pages: &PageMap, format: TargetFormat) {
    for line in format_map_output(pages, format) {
        println!("{line}");
    }
}

// ============================================================================
// Stage 2: Restructure output
// ============================================================================

/// Format relocation results, one line per page, failures annotated.
pub fn format_restructure_output(relocated: &[RelocatedPage]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut ok = 0;
    let mut failed = 0;

    for page in relocated {
        let note = match page.status {
            PageStatus::Rewritten => {
                ok += 1;
                ""
            }
            PageStatus::MissingSource => {
                failed += 1;
                " (missing source)"
            }
            PageStatus::RewriteFailed => {
                failed += 1;
                " (rewrite failed)"
            }
        };
        lines.push(format!(
            "{} → {}{note}",
            page.source,
            page.dest_html.display()
        ));
    }

    lines.push(String::new());
    let mut summary = format!("Relocated {}", plural(ok, "page"));
    if failed > 0 {
        summary.push_str(&format!(", {}", plural(failed, "error")));
    }
    lines.push(summary);
    lines
}

pub fn print_restructure_output(relocated: &[RelocatedPage]) {
    for line in format_restructure_output(relocated) {
        println!("{line}");
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the end-of-run summary: counters on one line, then warnings and
/// errors as indented sections when present.
pub fn format_summary(stats: &ConversionStats, format: TargetFormat) -> Vec<String> {
    let mut parts = Vec::new();
    if stats.rewritten > 0 {
        parts.push(format!("relocated {}", plural(stats.rewritten, "page")));
    }
    if stats.converted > 0 {
        parts.push(format!(
            "converted {} ({})",
            plural(stats.converted, "document"),
            format.extension()
        ));
    }
    if stats.assets_copied > 0 {
        parts.push(format!("copied {}", plural(stats.assets_copied, "asset")));
    }
    if stats.cleaned > 0 {
        parts.push(format!(
            "cleaned {}",
            plural(stats.cleaned, "intermediate file")
        ));
    }

    let mut lines = Vec::new();
    if parts.is_empty() {
        lines.push("Nothing to do".to_string());
    } else {
        let mut summary = parts.join(", ");
        if let Some(first) = summary.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        lines.push(summary);
    }

    if !stats.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in &stats.warnings {
            lines.push(format!("{}{warning}", indent(1)));
        }
    }
    if !stats.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors".to_string());
        for error in &stats.errors {
            lines.push(format!("{}{error}", indent(1)));
        }
    }
    lines
}

pub fn print_summary(stats: &ConversionStats, format: TargetFormat) {
    for line in format_summary(stats, format) {
        println!("{line}");
    }
}
