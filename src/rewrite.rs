//! In-place HTML rewriting for relocated pages.
//!
//! Stage 2 transforms each page's markup so it still works from its new home
//! in the hierarchy:
//!
//! 1. Export chrome is stripped (breadcrumbs, page metadata, the attachments
//!    appendix, footer, expand widgets).
//! 2. Hyperlinks to other mapped pages are repointed at the target's
//!    converted document.
//! 3. References into the export's asset directories are repointed at the
//!    asset's location under the output root.
//!
//! All hrefs are percent-decoded before map lookup, matching how the page map
//! keys were decoded. Every rewrite is purely lexical path math via
//! [`relative_href`]; nothing here touches the filesystem.

use crate::config::{ConvertConfig, CONSOLIDATED_ASSETS_DIR};
use crate::dom::{self, Dom, NodeId};
use crate::index::decode_identifier;
use crate::types::{relative_href, PageMap, TargetEntry};
use std::path::PathBuf;

/// Attribute carrying the reference, per tag.
const ASSET_REF_TAGS: [(&str, &str); 4] = [
    ("img", "src"),
    ("link", "href"),
    ("script", "src"),
    ("a", "href"),
];

/// Rewrite one page's markup for its mapped destination.
///
/// Infallible: a malformed page still parses (html5ever recovers), and
/// references that match nothing are left alone.
pub fn rewrite_page(
    html: &str,
    entry: &TargetEntry,
    pages: &PageMap,
    config: &ConvertConfig,
) -> String {
    let mut dom = dom::parse_html(html);
    strip_boilerplate(&mut dom);
    rewrite_links(&mut dom, entry, pages, config.format.extension());
    rewrite_asset_refs(&mut dom, entry, config);
    if config.format.consolidates_assets() {
        inline_embedded_images(&mut dom);
    }
    dom::to_html(&dom)
}

/// Remove Confluence export chrome that has no place in a converted document.
///
/// Every selector is optional; a page missing all of them passes through
/// untouched. The attachments appendix is an `<h2 id="attachments">` nested
/// two levels inside its section wrapper, so the wrapper is what gets
/// dropped.
pub fn strip_boilerplate(dom: &mut Dom) {
    for id in ["breadcrumb-section", "title-heading", "footer"] {
        if let Some(node) = dom.get_by_id(id) {
            dom.detach(node);
        }
    }

    if let Some(heading) = dom.get_by_id("attachments") {
        if dom.element_name(heading).is_some_and(|n| n.as_ref() == "h2") {
            let wrapper = dom.parent(dom.parent(heading));
            if wrapper.is_some() && wrapper != dom.document() {
                dom.detach(wrapper);
            } else {
                dom.detach(heading);
            }
        }
    }

    for class in ["page-metadata", "expand-container"] {
        let doomed: Vec<NodeId> = all_with_class(dom, class);
        for node in doomed {
            dom.detach(node);
        }
    }
}

fn all_with_class(dom: &Dom, class: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![dom.document()];
    while let Some(id) = stack.pop() {
        if dom.has_class(id, class) {
            out.push(id);
            // Children go with their wrapper.
            continue;
        }
        let mut children: Vec<_> = dom.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Repoint hyperlinks at mapped pages' converted documents.
///
/// A link counts as internal when its decoded target ends in `.html` and is a
/// key of the page map. Anything else (external URLs, anchors, unmapped
/// pages) stays untouched.
pub fn rewrite_links(dom: &mut Dom, entry: &TargetEntry, pages: &PageMap, ext: &str) -> usize {
    let from_dir = entry.dir();
    let mut rewritten = 0;

    let anchors: Vec<(NodeId, String)> = dom
        .find_all_by_tag("a")
        .into_iter()
        .filter_map(|a| dom.get_attr(a, "href").map(|h| (a, decode_identifier(h))))
        .collect();

    for (anchor, decoded) in anchors {
        if !decoded.ends_with(".html") {
            continue;
        }
        let Some(target) = pages.get(&decoded) else {
            continue;
        };
        let href = relative_href(&from_dir, &target.document(ext));
        dom.set_attr(anchor, "href", &href);
        rewritten += 1;
    }
    rewritten
}

/// Repoint asset references at their copied location under the output root.
///
/// A reference counts as an asset when its decoded value starts with one of
/// the configured asset directory names plus `/`; the first matching
/// directory wins. Mirrored layouts keep the export-relative path;
/// consolidating layouts flatten to `assets/<basename>`.
pub fn rewrite_asset_refs(dom: &mut Dom, entry: &TargetEntry, config: &ConvertConfig) -> usize {
    let from_dir = entry.dir();
    let mut rewritten = 0;

    for (tag, attr) in ASSET_REF_TAGS {
        let refs: Vec<(NodeId, String)> = dom
            .find_all_by_tag(tag)
            .into_iter()
            .filter_map(|el| dom.get_attr(el, attr).map(|v| (el, decode_identifier(v))))
            .collect();

        for (el, decoded) in refs {
            let Some(target) = asset_target(&decoded, config) else {
                continue;
            };
            let value = relative_href(&from_dir, &target);
            dom.set_attr(el, attr, &value);
            rewritten += 1;
        }
    }
    rewritten
}

/// Output-root-relative location of an asset reference, or `None` when the
/// value does not point into a configured asset directory.
fn asset_target(decoded: &str, config: &ConvertConfig) -> Option<PathBuf> {
    config
        .asset_dirs
        .iter()
        .find(|dir| decoded.starts_with(&format!("{dir}/")))?;
    if config.format.consolidates_assets() {
        let basename = decoded.rsplit('/').next().unwrap_or(decoded);
        Some(PathBuf::from(CONSOLIDATED_ASSETS_DIR).join(basename))
    } else {
        Some(PathBuf::from(decoded))
    }
}

/// Replace Confluence embedded-file wrappers with a literal Markdown image.
///
/// Pandoc turns the wrapper's nested spans into noise in Markdown output;
/// emitting `![alt](src)` as plain text sidesteps that, and pandoc passes it
/// through verbatim. Runs after asset rewriting so `src` is already the
/// relocated path.
pub fn inline_embedded_images(dom: &mut Dom) {
    let wrappers = all_with_class(dom, "confluence-embedded-file-wrapper");
    for wrapper in wrappers {
        let Some(img) = first_descendant(dom, wrapper, "img") else {
            continue;
        };
        let Some(src) = dom.get_attr(img, "src").map(str::to_string) else {
            continue;
        };
        let alt = dom.get_attr(img, "alt").unwrap_or_default().to_string();
        dom.replace_with_text(wrapper, &format!("![{alt}]({src})"));
    }
}

fn first_descendant(dom: &Dom, root: NodeId, tag: &str) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = dom.children(root).collect();
    stack.reverse();
    while let Some(id) = stack.pop() {
        if dom.element_name(id).is_some_and(|n| n.as_ref() == tag) {
            return Some(id);
        }
        let mut children: Vec<_> = dom.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    None
}
