//! Final-format conversion via pandoc.
//!
//! Stage 3 hands each relocated HTML file to a pandoc subprocess. The
//! subprocess runs with its working directory set to the document's own
//! directory so the relative links and asset paths baked in by the rewrite
//! stage survive conversion unchanged.
//!
//! [`Converter`] is the subprocess seam: production uses [`PandocConverter`],
//! tests use a mock that records invocations and fabricates output files, so
//! the batch logic is testable without pandoc installed.

use crate::config::ConvertConfig;
use crate::types::{ConversionStats, PageStatus, RelocatedPage, TargetFormat};
use std::fs;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to launch {pandoc}: {err}")]
    Launch { pandoc: String, err: std::io::Error },
    #[error("conversion failed for {doc}: {stderr}")]
    Failed { doc: String, stderr: String },
}

/// One document conversion. `source` and `dest` are absolute; they share a
/// parent directory.
pub trait Converter {
    fn convert(&self, config: &ConvertConfig, source: &Path, dest: &Path)
    -> Result<(), ConvertError>;
}

/// Shells out to the configured pandoc executable.
pub struct PandocConverter;

impl Converter for PandocConverter {
    fn convert(
        &self,
        config: &ConvertConfig,
        source: &Path,
        dest: &Path,
    ) -> Result<(), ConvertError> {
        let dir = source.parent().unwrap_or(Path::new("."));
        let source_name = source.file_name().unwrap_or(source.as_os_str());
        let dest_name = dest.file_name().unwrap_or(dest.as_os_str());

        let mut cmd = Command::new(&config.pandoc);
        cmd.current_dir(dir).arg(source_name).arg("-o").arg(dest_name);
        if config.format == TargetFormat::Markdown {
            cmd.args(["-t", "gfm"]);
        }
        if let Some(filter) = &config.filter {
            cmd.arg("--lua-filter").arg(filter);
        }

        let output = cmd.output().map_err(|err| ConvertError::Launch {
            pandoc: config.pandoc.clone(),
            err,
        })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ConvertError::Failed {
                doc: source.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Convert every successfully relocated page, in order.
///
/// Every converter failure, a bad exit status and a failed launch alike, is
/// logged against the stats and the batch continues. With `cleanup` set, the
/// intermediate HTML of each successfully converted page is deleted.
pub fn convert_pages(
    config: &ConvertConfig,
    relocated: &[RelocatedPage],
    converter: &dyn Converter,
    stats: &mut ConversionStats,
) {
    let ext = config.format.extension();
    for page in relocated {
        if page.status != PageStatus::Rewritten {
            continue;
        }
        let source = config.output_root.join(&page.dest_html);
        let dest = source.with_extension(ext);

        match converter.convert(config, &source, &dest) {
            Ok(()) => {
                stats.converted += 1;
                if config.format == TargetFormat::Markdown {
                    if let Err(err) = postprocess_markdown(&dest) {
                        stats.error(format!(
                            "postprocess failed for {}: {err}",
                            dest.display()
                        ));
                    }
                }
                if config.cleanup {
                    match fs::remove_file(&source) {
                        Ok(()) => stats.cleaned += 1,
                        Err(err) => stats.error(format!(
                            "cleanup failed for {}: {err}",
                            source.display()
                        )),
                    }
                }
            }
            Err(err) => {
                stats.error(err.to_string());
            }
        }
    }
}

fn postprocess_markdown(dest: &Path) -> Result<(), std::io::Error> {
    let markdown = fs::read_to_string(dest)?;
    let stripped = strip_image_attr_blocks(&markdown);
    if stripped != markdown {
        fs::write(dest, stripped)?;
    }
    Ok(())
}

/// Drop pandoc attribute blocks attached to image references.
///
/// Pandoc's gfm writer can emit `![alt](pic.png){width="600"}`; the brace
/// block renders as literal text on GitHub, so it goes.
pub fn strip_image_attr_blocks(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut rest = markdown;
    while let Some(start) = rest.find("![") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        match image_span(tail) {
            Some(len) => {
                out.push_str(&tail[..len]);
                let mut after = &tail[len..];
                if after.starts_with('{') {
                    if let Some(close) = after.find('}') {
                        after = &after[close + 1..];
                    }
                }
                rest = after;
            }
            None => {
                out.push_str("![");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of a leading `![alt](target)` span, when `s` starts with one.
fn image_span(s: &str) -> Option<usize> {
    let bracket = s.find("](")?;
    let target_start = bracket + 2;
    let close = s[target_start..].find(')')?;
    Some(target_start + close + 1)
}
