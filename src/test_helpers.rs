//! Shared test utilities for the spaceloom test suite.
//!
//! Builds a small synthetic Confluence-style export in a temp directory:
//! a navigation index, pages with boilerplate, cross-links and asset
//! references, and the asset files those references point at.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_export();
//! let config = docx_config(&tmp);
//! let manifest = crate::index::build_page_map(&config).unwrap();
//! assert!(manifest.pages.contains_key("Team-Home_100.html"));
//! ```

use crate::config::ConvertConfig;
use crate::types::TargetFormat;
use std::fs;
use tempfile::TempDir;

pub const INDEX_HTML: &str = r#"<html><body>
<ul>
  <li><a href="Team-Home_100.html">Team Home</a>
    <ul>
      <li><a href="Roadmap_200.html">Roadmap</a></li>
      <li><a href="Meeting-Notes_300.html">Meeting Notes</a></li>
    </ul>
  </li>
</ul>
</body></html>"#;

/// Create the synthetic export and return the temp directory holding it.
pub fn setup_export() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::write(root.join("index.html"), INDEX_HTML).unwrap();

    fs::write(
        root.join("Team-Home_100.html"),
        r#"<html><body>
<div id="breadcrumb-section">Space / Team Home</div>
<h1 id="title-heading">Team Home</h1>
<div class="page-metadata">Created by someone</div>
<p>Welcome. See the <a href="Roadmap_200.html">roadmap</a>.</p>
<img src="images/pic.png" alt="team photo">
<div id="footer">Generated by Confluence</div>
</body></html>"#,
    )
    .unwrap();

    fs::write(
        root.join("Roadmap_200.html"),
        r#"<html><body>
<p>Back to <a href="Team-Home_100.html">Team Home</a>.</p>
<span class="confluence-embedded-file-wrapper">
  <img src="images/pic.png" alt="milestones">
</span>
<a href="attachments/300/plan.pdf">the plan</a>
</body></html>"#,
    )
    .unwrap();

    fs::write(
        root.join("Meeting-Notes_300.html"),
        r#"<html><body>
<p>Notes with an <a href="https://example.com/page.html">external link</a>.</p>
<div class="pageSection">
  <div class="pageSectionHeader"><h2 id="attachments">Attachments:</h2></div>
  <a href="attachments/300/plan.pdf">plan.pdf</a>
</div>
</body></html>"#,
    )
    .unwrap();

    fs::create_dir_all(root.join("images")).unwrap();
    fs::write(root.join("images/pic.png"), b"png bytes").unwrap();
    fs::create_dir_all(root.join("attachments/300")).unwrap();
    fs::write(root.join("attachments/300/plan.pdf"), b"pdf bytes").unwrap();

    tmp
}

pub fn docx_config(tmp: &TempDir) -> ConvertConfig {
    config_for(tmp, TargetFormat::Docx)
}

pub fn markdown_config(tmp: &TempDir) -> ConvertConfig {
    config_for(tmp, TargetFormat::Markdown)
}

fn config_for(tmp: &TempDir, format: TargetFormat) -> ConvertConfig {
    ConvertConfig::assemble(
        tmp.path(),
        &tmp.path().join("converted"),
        format,
        None,
        false,
    )
    .unwrap()
}
