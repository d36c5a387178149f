//! # Spaceloom
//!
//! Converts a flat Confluence HTML space export into a hierarchy of DOCX or
//! Markdown documents. The export's `index.html` navigation list is the data
//! source: its nesting becomes the output directory tree, every page lands in
//! its own directory, and cross-page links and asset references are rewritten
//! to keep working from their new locations.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Spaceloom processes an export through three independent stages, each
//! producing a JSON manifest that the next stage consumes:
//!
//! ```text
//! 1. Map          index.html  →  mapping.json      (navigation → page map)
//! 2. Restructure  page map    →  output tree       (copy + rewrite HTML, assets)
//! 3. Convert      rewritten HTML  →  .docx / .md   (pandoc subprocess)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Debuggability**: each manifest is human-readable JSON you can inspect.
//! - **Resumability**: a failed pandoc run can be retried without re-mapping
//!   or re-copying anything.
//! - **Testability**: map and restructure are exercisable without pandoc
//!   installed, and convert runs against a mock subprocess seam.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`index`] | Stage 1 — parses the navigation index, produces the page map |
//! | [`restructure`] | Stage 2 — relocates pages into the hierarchy, rewriting each in place |
//! | [`convert`] | Stage 3 — converts relocated HTML via pandoc, optional cleanup |
//! | [`rewrite`] | In-place HTML rewriting: boilerplate, links, asset references |
//! | [`assets`] | Copies asset directories, mirrored or consolidated per format |
//! | [`dom`] | Arena HTML tree with an html5ever parser sink and serializer |
//! | [`sanitize`] | Title → filesystem-safe path segment |
//! | [`config`] | CLI + `spaceloom.toml` run configuration |
//! | [`types`] | Shared types serialized between stages (`TargetEntry`, stats) |
//! | [`output`] | CLI output formatting — tree-based display of pipeline results |
//!
//! # Design Decisions
//!
//! ## The Index Is the Only Source of Structure
//!
//! Confluence exports carry no hierarchy metadata in the page files
//! themselves; the nested `<ul>` in `index.html` is the complete record.
//! Pages absent from that list are intentionally ignored — they are
//! unreachable in the original space too.
//!
//! ## Rewrite Before Convert
//!
//! Links and asset paths are fixed while the content is still HTML, then
//! pandoc runs with its working directory set to each document's own
//! directory. Relative paths computed by the rewrite stage therefore pass
//! through conversion byte-for-byte, and no pandoc filter has to understand
//! the output layout.
//!
//! ## Arena DOM Over `RcDom`
//!
//! The [`dom`] module stores nodes in a flat `Vec` indexed by `NodeId`
//! instead of reference-counted cells. Mutation during rewriting is plain
//! `&mut` access with no interior mutability, detached subtrees are simply
//! unreachable, and the whole tree drops in one deallocation.
//!
//! ## Batch Never Aborts on One Page
//!
//! A space export is often slightly broken: a page deleted after the index
//! was generated, an image that never uploaded. Every per-document failure is
//! recorded in [`types::ConversionStats`] and the run continues; only a
//! missing export root or an unusable navigation index aborts the run.

pub mod assets;
pub mod config;
pub mod convert;
pub mod dom;
pub mod index;
pub mod output;
pub mod restructure;
pub mod rewrite;
pub mod sanitize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
