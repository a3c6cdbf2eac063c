//! Scan-Harvest main entry point
//!
//! This is the command-line interface for the Scan-Harvest chapter downloader.

use anyhow::{bail, Context};
use clap::Parser;
use scan_harvest::config::{load_or_default, Config};
use scan_harvest::crawler::{select, ChapterRange, Coordinator};
use scan_harvest::output::print_summary;
use scan_harvest::source::{ChapterNumber, ReferenceKind, SeriesReference};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Scan-Harvest: a sequential chapter downloader
///
/// Scan-Harvest lists the chapters of a series, downloads every page image
/// of the selected chapters and optionally folds each chapter into a PDF.
#[derive(Parser, Debug)]
#[command(name = "scan-harvest")]
#[command(version)]
#[command(about = "Download manga chapters page by page", long_about = None)]
struct Cli {
    /// Series or chapter URLs to download
    #[arg(short, long = "url", value_name = "URL", num_args = 1..)]
    urls: Vec<String>,

    /// First chapter to download
    #[arg(short, long, value_name = "NUMBER", default_value = "1")]
    start_chapter: ChapterNumber,

    /// Last chapter to download (unbounded when omitted)
    #[arg(short, long, value_name = "NUMBER")]
    end_chapter: Option<ChapterNumber>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// File with comma-separated links to download
    #[arg(long, value_name = "FILE")]
    links_file: Option<PathBuf>,

    /// List the chapters that would be downloaded and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.debug, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => load_or_default(path, true),
        None => load_or_default(Path::new(DEFAULT_CONFIG_PATH), false),
    }
    .context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let mut inputs = cli.urls.clone();
    if let Some(path) = &cli.links_file {
        inputs.extend(read_links_file(path)?);
    }
    if inputs.is_empty() {
        bail!("No URL given; pass --url or --links-file");
    }

    // Reject bad input before touching the network or the filesystem
    let range = ChapterRange::new(cli.start_chapter.clone(), cli.end_chapter.clone())?;
    let references = inputs
        .iter()
        .map(|input| {
            SeriesReference::parse(input, &config.site)
                .with_context(|| format!("Invalid URL: {}", input))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let coordinator = Coordinator::new(config)?.with_config_hash(config_hash);

    if cli.dry_run {
        return handle_dry_run(&coordinator, &references, &range).await;
    }

    let results = coordinator.run_all(&references, &range).await;
    let failed = results.iter().filter(|result| result.is_err()).count();
    for summary in results.iter().flatten() {
        print_summary(summary);
    }

    if failed > 0 {
        bail!("{} of {} downloads failed", failed, references.len());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber
fn setup_logging(debug: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if debug {
        EnvFilter::new("scan_harvest=debug,info")
    } else {
        EnvFilter::new("scan_harvest=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads comma-separated links, ignoring blanks and surrounding whitespace
fn read_links_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read links file {}", path.display()))?;

    Ok(split_links(&content))
}

fn split_links(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handles the --dry-run mode: shows what would be downloaded
async fn handle_dry_run(
    coordinator: &Coordinator,
    references: &[SeriesReference],
    range: &ChapterRange,
) -> anyhow::Result<()> {
    println!("=== Scan-Harvest Dry Run ===\n");
    print_settings(coordinator.config());
    println!("  Output root: {}", coordinator.layout().root().display());

    let mut failed = 0;
    for reference in references {
        println!("\n{} ({:?})", reference.url(), reference.kind());

        if reference.kind() == ReferenceKind::SingleChapter {
            println!("  single chapter, range ignored");
            continue;
        }

        let listing = match coordinator.list_chapters(reference).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("Failed to list chapters of {}: {}", reference.url(), e);
                println!("  listing failed: {}", e);
                failed += 1;
                continue;
            }
        };
        let selected = select(&listing.chapters, range);

        println!(
            "  {} chapters listed, {} selected",
            listing.chapters.len(),
            selected.len()
        );
        for chapter in &selected {
            println!("    * {} [{}]", chapter.title, chapter.number);
        }
        for card in &listing.skipped {
            println!("    - skipped '{}': {}", card.title, card.reason);
        }
        if listing.incomplete_cards > 0 {
            println!(
                "    - ignored {} cards without a link or title",
                listing.incomplete_cards
            );
        }
    }

    if failed > 0 {
        bail!("{} of {} listings failed", failed, references.len());
    }

    Ok(())
}

fn print_settings(config: &Config) {
    println!("Site: {}", config.site.origin);
    println!(
        "  Max pages per chapter: {}",
        config.crawler.max_pages_per_chapter
    );
    println!("  Latest first: {}", config.download.latest_first);
    println!("  Create PDF: {}", config.download.create_pdf);
}
