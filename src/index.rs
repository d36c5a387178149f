//! Navigation index parsing and page-map generation.
//!
//! Stage 1 of the spaceloom pipeline. A Confluence space export is flat: every
//! page sits at the export root, and `index.html` carries the only record of
//! how pages nest, as a tree of `<ul>`/`<li>` lists:
//!
//! ```text
//! <ul>
//!   <li><a href="Team-Home_12345.html">Team Home</a>
//!     <ul>
//!       <li><a href="Roadmap_23456.html">Roadmap</a></li>
//!     </ul>
//!   </li>
//! </ul>
//! ```
//!
//! This module parses that list into a [`PageMap`]: decoded source identifier
//! → hierarchical target path. Every page becomes its own directory named
//! after its sanitized title, nested under its ancestors' directories:
//!
//! ```text
//! Team-Home_12345.html  →  Team Home/Team Home.<ext>
//! Roadmap_23456.html    →  Team Home/Roadmap/Roadmap.<ext>
//! ```
//!
//! ## Collisions
//!
//! The map is keyed by source identifier with last-writer-wins semantics, and
//! two sibling titles can sanitize to the same segment. Neither case is
//! corrected — the export is taken as-is — but both are surfaced as warnings
//! so a dropped page never disappears silently.

use crate::config::ConvertConfig;
use crate::dom::{self, Dom, NodeId};
use crate::sanitize::sanitize_title;
use crate::types::{PageMap, TargetEntry};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("navigation index not found: {0}")]
    IndexMissing(PathBuf),
    #[error("no top-level <ul> navigation list in {0}")]
    NavListMissing(PathBuf),
}

/// One entry of the navigation index, decoupled from the markup parser.
///
/// The walker only ever sees this shape; everything html5ever-specific stays
/// inside [`parse_nav_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPage {
    /// Percent-decoded link target, the page's source identifier.
    pub href: String,
    /// Link text, untrimmed of interior whitespace.
    pub title: String,
    pub children: Vec<NavPage>,
}

/// Manifest output from the map stage, consumed by restructure and convert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapManifest {
    pub pages: PageMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub const MAP_MANIFEST: &str = "mapping.json";

/// Save the map manifest at the output root for later stages.
pub fn save_manifest(output_root: &Path, manifest: &MapManifest) -> Result<(), IndexError> {
    fs::create_dir_all(output_root)?;
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(output_root.join(MAP_MANIFEST), json)?;
    Ok(())
}

pub fn load_manifest(output_root: &Path) -> Result<MapManifest, IndexError> {
    let json = fs::read_to_string(output_root.join(MAP_MANIFEST))?;
    Ok(serde_json::from_str(&json)?)
}

/// Parse the export's `index.html` and build the page map.
///
/// Fatal if the index is missing or carries no top-level `<ul>` — with no
/// mapping there is no work to do.
pub fn build_page_map(config: &ConvertConfig) -> Result<MapManifest, IndexError> {
    let index_path = config.index_path();
    if !index_path.is_file() {
        return Err(IndexError::IndexMissing(index_path));
    }
    let html = fs::read_to_string(&index_path)?;
    let nav = parse_nav_tree(&html).ok_or(IndexError::NavListMissing(index_path))?;

    let mut pages = PageMap::new();
    let mut warnings = Vec::new();
    walk(&nav, &config.base_segments(), &mut pages, &mut warnings);

    let mut seen_dirs = BTreeSet::new();
    for entry in pages.values() {
        if !seen_dirs.insert(entry.segments.clone()) {
            warnings.push(format!(
                "multiple pages map to the same destination: {}",
                entry.segments.join("/")
            ));
        }
    }

    Ok(MapManifest { pages, warnings })
}

/// Extract the navigation tree from index markup: the first `<ul>` in
/// document order, adapted into [`NavPage`]s. `None` when no list exists.
pub fn parse_nav_tree(html: &str) -> Option<Vec<NavPage>> {
    let dom = dom::parse_html(html);
    let root_ul = dom.find(|n| match &n.data {
        dom::NodeData::Element { name, .. } => name.local.as_ref() == "ul",
        _ => false,
    })?;
    Some(nav_pages_of_list(&dom, root_ul))
}

/// Convert one `<ul>`'s direct `<li>` children into [`NavPage`]s.
///
/// A list item without a hyperlink is skipped entirely, subtree included —
/// there is no identifier to anchor its descendants to.
fn nav_pages_of_list(dom: &Dom, ul: NodeId) -> Vec<NavPage> {
    let mut pages = Vec::new();
    for li in dom.children(ul) {
        if dom.element_name(li).is_none_or(|n| n.as_ref() != "li") {
            continue;
        }
        let Some(href) = first_link_href(dom, li) else {
            continue;
        };
        let (anchor, raw_href) = href;
        let title = dom.text_content(anchor).trim().to_string();

        let mut children = Vec::new();
        for child in dom.children(li) {
            if dom.element_name(child).is_some_and(|n| n.as_ref() == "ul") {
                children.extend(nav_pages_of_list(dom, child));
            }
        }

        pages.push(NavPage {
            href: decode_identifier(&raw_href),
            title,
            children,
        });
    }
    pages
}

/// First `<a>` element belonging to the list item itself, with its raw href.
///
/// Nested `<ul>` subtrees are not searched: links in there identify child
/// pages, never this item.
fn first_link_href(dom: &Dom, li: NodeId) -> Option<(NodeId, String)> {
    let mut stack: Vec<NodeId> = dom.children(li).collect();
    stack.reverse();
    while let Some(id) = stack.pop() {
        if dom.element_name(id).is_some_and(|n| n.as_ref() == "a") {
            return dom.get_attr(id, "href").map(|h| (id, h.to_string()));
        }
        if dom.element_name(id).is_some_and(|n| n.as_ref() == "ul") {
            continue;
        }
        let mut children: Vec<_> = dom.children(id).collect();
        children.reverse();
        // Depth-first, left to right: matches document order.
        for child in children {
            stack.push(child);
        }
    }
    None
}

/// Percent-decode a source identifier the same way hyperlink targets are
/// decoded before map lookup, so keys and lookups agree.
pub fn decode_identifier(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Depth-first walk assigning each page its hierarchical target path.
fn walk(pages: &[NavPage], base: &[String], map: &mut PageMap, warnings: &mut Vec<String>) {
    for page in pages {
        let mut segments = base.to_vec();
        segments.push(sanitize_title(&page.title));

        let entry = TargetEntry {
            segments: segments.clone(),
            title: page.title.clone(),
        };
        if let Some(previous) = map.insert(page.href.clone(), entry) {
            warnings.push(format!(
                "duplicate identifier {:?}: {} replaced by {}",
                page.href,
                previous.segments.join("/"),
                segments.join("/")
            ));
        }

        walk(&page.children, &segments, map, warnings);
    }
}
