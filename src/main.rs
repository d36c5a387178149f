use clap::{Parser, Subcommand};
use spaceloom::convert::PandocConverter;
use spaceloom::types::{ConversionStats, TargetFormat};
use spaceloom::{assets, config, convert, index, output, restructure};
use std::path::PathBuf;

/// Shared flags for commands that run pandoc.
#[derive(clap::Args, Clone)]
struct ConvertArgs {
    /// Delete each intermediate HTML file after successful conversion
    #[arg(long)]
    cleanup: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "spaceloom")]
#[command(about = "Convert a flat Confluence HTML export into a document hierarchy")]
#[command(long_about = "\
Convert a flat Confluence HTML export into a document hierarchy

The export's index.html navigation list is the data source. Its nesting
becomes the output directory tree, every page lands in its own directory,
and links and asset references are rewritten to keep working.

Export structure:

  export/
  ├── index.html                   # Nested <ul> navigation — the hierarchy record
  ├── spaceloom.toml               # Run config (optional)
  ├── Team-Home_123.html           # Pages, all flat at the root
  ├── Roadmap_456.html
  ├── images/                      # Asset directories, referenced by pages
  ├── attachments/
  └── styles/

Output (docx format):

  converted/
  ├── Team Home/
  │   ├── Team Home.docx
  │   └── Roadmap/
  │       └── Roadmap.docx
  ├── images/                      # Mirrored (markdown consolidates into assets/)
  └── attachments/

Conversion runs pandoc, which must be installed separately.")]
#[command(version = version_string())]
struct Cli {
    /// Export directory (contains index.html)
    #[arg(long, default_value = "export", global = true)]
    export_root: PathBuf,

    /// Output directory
    #[arg(long, default_value = "converted", global = true)]
    output: PathBuf,

    /// Target document format
    #[arg(long, value_enum, default_value = "docx", global = true)]
    format: TargetFormat,

    /// Extra top-level directory every page nests under
    #[arg(long, global = true)]
    space_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the navigation index into a page map
    Map,
    /// Relocate pages into the hierarchy and copy assets
    Restructure,
    /// Convert relocated HTML to the target format via pandoc
    Convert(ConvertArgs),
    /// Run the full pipeline: map → restructure → convert
    Build(ConvertArgs),
    /// Validate the export without writing anything
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Map => {
            let config = assemble_config(&cli, false)?;
            let manifest = index::build_page_map(&config)?;
            index::save_manifest(&config.output_root, &manifest)?;
            output::print_map_output(&manifest.pages, config.format);
            for warning in &manifest.warnings {
                eprintln!("warning: {warning}");
            }
        }
        Command::Restructure => {
            let config = assemble_config(&cli, false)?;
            let manifest = index::load_manifest(&config.output_root)?;
            let mut stats = ConversionStats::default();
            let relocated = restructure::restructure_pages(&config, &manifest, &mut stats)?;
            assets::copy_assets(&config, &mut stats)?;
            output::print_restructure_output(&relocated);
            output::print_summary(&stats, config.format);
            if !stats.is_clean() {
                std::process::exit(1);
            }
        }
        Command::Convert(args) => {
            let config = assemble_config(&cli, args.cleanup)?;
            let relocated = restructure::load_relocated(&config.output_root)?;
            let mut stats = ConversionStats::default();
            convert::convert_pages(&config, &relocated, &PandocConverter, &mut stats);
            output::print_summary(&stats, config.format);
            if !stats.is_clean() {
                std::process::exit(1);
            }
        }
        Command::Build(args) => {
            let config = assemble_config(&cli, args.cleanup)?;

            println!("==> Stage 1: Mapping {}", config.export_root.display());
            let manifest = index::build_page_map(&config)?;
            index::save_manifest(&config.output_root, &manifest)?;
            output::print_map_output(&manifest.pages, config.format);

            println!(
                "==> Stage 2: Restructuring → {}",
                config.output_root.display()
            );
            let mut stats = ConversionStats::default();
            let relocated = restructure::restructure_pages(&config, &manifest, &mut stats)?;
            assets::copy_assets(&config, &mut stats)?;
            output::print_restructure_output(&relocated);

            println!(
                "==> Stage 3: Converting to {}",
                config.format.extension()
            );
            convert::convert_pages(&config, &relocated, &PandocConverter, &mut stats);
            output::print_summary(&stats, config.format);

            println!("==> Conversion complete: {}", config.output_root.display());
            if !stats.is_clean() {
                std::process::exit(1);
            }
        }
        Command::Check => {
            let config = assemble_config(&cli, false)?;
            println!("==> Checking {}", config.export_root.display());
            let manifest = index::build_page_map(&config)?;
            output::print_map_output(&manifest.pages, config.format);
            for warning in &manifest.warnings {
                eprintln!("warning: {warning}");
            }

            let missing: Vec<&String> = manifest
                .pages
                .keys()
                .filter(|source| !config.export_root.join(source.as_str()).is_file())
                .collect();
            if missing.is_empty() && manifest.warnings.is_empty() {
                println!("==> Export is valid");
            } else {
                for source in &missing {
                    eprintln!("warning: source page missing: {source}");
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn assemble_config(cli: &Cli, cleanup: bool) -> Result<config::ConvertConfig, config::ConfigError> {
    config::ConvertConfig::assemble(
        &cli.export_root,
        &cli.output,
        cli.format,
        cli.space_name.clone(),
        cleanup,
    )
}
