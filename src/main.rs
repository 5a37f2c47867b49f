use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Section;
use libfolio::{
    clean::{CleanOptions, CleanTarget, clean},
    config::{BuildMode, INPUT_DIR, OUTPUT_DIR, SiteConfig},
    content::markdown_options,
    front_matter::YamlFrontmatter,
    legacy::build_legacy_at,
    migrate::migrate_at,
    pipeline::build_at_with_now,
    types::IsoDate,
    validate::validate_projects,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::EnvFilter;

/// Static site generator for a Markdown project portfolio
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Site root containing projects/, templates/ and site.toml
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Production drops drafts and requires the projects directory
    #[arg(long, global = true, env = "FOLIO_MODE", value_enum, default_value_t = BuildMode::Development)]
    mode: BuildMode,

    /// Log at debug level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build pages, indexes and SEO files into public/
    Build {
        /// Build flat projects/*.md files with the lenient parser
        #[arg(long)]
        legacy: bool,
    },

    /// Check every project and write a validation report
    Validate,

    /// Remove generated artifacts
    Clean {
        /// List what would be removed without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Artifact groups to remove: html, json, seo, reports (default: all)
        targets: Vec<CleanTarget>,
    },

    /// Convert flat project files into per-project folders
    Migrate,
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()
            .with_note(|| "While getting the current working directory")?,
    };
    let now = OffsetDateTime::now_utc();

    match cli.command {
        Command::Build { legacy: false } => {
            build_at_with_now(&root, cli.mode, now)?;
        }
        Command::Build { legacy: true } => {
            let site = SiteConfig::load_at(&root)?;
            build_legacy_at(&root, &site, IsoDate::today(now), markdown_options())?;
        }
        Command::Validate => {
            let generated_at = now.format(&Rfc3339)?;
            let report = validate_projects(
                &YamlFrontmatter,
                &root.join(INPUT_DIR),
                markdown_options(),
                &generated_at,
            )?;
            report.write(&root.join(OUTPUT_DIR))?;
            report.log_summary();
            if !report.passed() {
                std::process::exit(1);
            }
        }
        Command::Clean { dry_run, targets } => {
            let options = CleanOptions {
                dry_run,
                verbose: cli.verbose,
            };
            clean(&root.join(OUTPUT_DIR), &targets, options);
        }
        Command::Migrate => {
            let site = SiteConfig::load_at(&root)?;
            migrate_at(&root, &site, now)?;
        }
    }

    Ok(())
}
