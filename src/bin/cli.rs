//! Corpus Crawler CLI
//!
//! Selects the crawl variant, wires up the fetcher and politeness controller
//! and runs the engine for one site directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use corpus_crawler::{
    config,
    error::{AppError, Result},
    models::CrawlerConfig,
    pipeline::{CheckerSpec, CrawlEngine, MediaEngine},
    services::checkers,
    services::corpus::{self, Extraction},
    services::fetch::{self, DynamicFetcher, PageFetcher, StaticFetcher},
    services::politeness::{DelayRange, RobotsGate},
    storage::{scaffold_site, GoalDirs},
    utils::count_files,
};

/// corpus-crawler - resumable news/forum corpus crawler
#[derive(Parser, Debug)]
#[command(
    name = "corpus-crawler",
    version,
    about = "Crawls news and forum sites into a resumable, classified page corpus"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the on-disk layout for a new site directory
    Scaffold {
        /// Site directory to create
        site_dir: PathBuf,

        /// Also create the media directories and their indexes
        #[arg(long)]
        media: bool,
    },

    /// Crawl one site, plain or content-checked
    Crawl {
        /// Site directory (its name is the pattern registry key)
        site_dir: PathBuf,

        /// Path to the site pattern registry
        #[arg(long, default_value = "patterns.toml")]
        patterns: PathBuf,

        /// Path to the crawler settings file (defaults used when absent)
        #[arg(long, default_value = "crawler.toml")]
        config: PathBuf,

        /// Name of the content checker to apply after each fetch
        #[arg(short, long)]
        checker: Option<String>,

        /// Render pages in a headless browser instead of plain GETs
        #[arg(short, long)]
        dynamic: bool,

        /// CSS selector the rendered page must contain (with --dynamic)
        #[arg(long)]
        selector: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Download queued media URLs into the indexed media directories
    Media {
        /// Site directory
        site_dir: PathBuf,

        /// Path to the crawler settings file
        #[arg(long, default_value = "crawler.toml")]
        config: PathBuf,

        /// Stop after this many downloads
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Extract links (or image sources) from an already-stored corpus
    Harvest {
        /// Site directory
        site_dir: PathBuf,

        /// Extract image sources instead of links
        #[arg(long)]
        images: bool,

        /// Path to the crawler settings file
        #[arg(long, default_value = "crawler.toml")]
        config: PathBuf,
    },

    /// Show open site directories and their corpus sizes
    Status {
        /// Directory holding the per-site directories
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// The pattern registry key for a site directory is the directory's name.
fn site_id(site_dir: &Path) -> Result<String> {
    site_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::config(format!("cannot derive a site id from {site_dir:?}")))
}

/// Resolve a checker name against the registry, rejecting unknown names
/// with the list of valid ones.
fn resolve_checker(name: &str) -> Result<CheckerSpec> {
    checkers::lookup(name)
        .map(CheckerSpec::new)
        .ok_or_else(|| {
            AppError::config(format!(
                "unknown checker '{}'. Valid checkers: {}",
                name,
                checkers::names().join(", ")
            ))
        })
}

async fn run_crawl(
    site_dir: &Path,
    patterns: &Path,
    config_path: &Path,
    checker: Option<String>,
    dynamic: bool,
    selector: Option<String>,
    max_pages: Option<usize>,
) -> Result<()> {
    let site = config::load_site(patterns, &site_id(site_dir)?)?;
    let settings = CrawlerConfig::load_or_default(config_path);
    settings.validate()?;

    let checker = checker.as_deref().map(resolve_checker).transpose()?;

    let client = fetch::create_client(&settings)?;
    let fetcher: Box<dyn PageFetcher> = if dynamic {
        let selector = selector.unwrap_or_else(|| settings.render_selector.clone());
        Box::new(DynamicFetcher::new(
            client.clone(),
            selector,
            Duration::from_millis(settings.render_timeout_ms),
        ))
    } else {
        Box::new(StaticFetcher::new(client.clone()))
    };

    let robots = RobotsGate::fetch(&client, &site.base_url, &settings.user_agent).await;
    let delay = DelayRange::new(settings.min_delay_secs, settings.max_delay_secs);

    let mut engine = match checker {
        Some(spec) => CrawlEngine::checked(site_dir, site, fetcher, delay, spec)?,
        None => CrawlEngine::classic(site_dir, site, fetcher, delay)?,
    }
    .with_robots(robots);

    engine.run(max_pages).await?;
    log::info!("Crawl complete! {} URLs left in frontier.", engine.frontier().len());
    Ok(())
}

async fn run_media(site_dir: &Path, config_path: &Path, max_pages: Option<usize>) -> Result<()> {
    let settings = CrawlerConfig::load_or_default(config_path);
    settings.validate()?;

    let client = fetch::create_client(&settings)?;
    let fetcher: Box<dyn PageFetcher> = Box::new(StaticFetcher::new(client));
    let delay = DelayRange::new(settings.media_min_delay_secs, settings.media_max_delay_secs);

    let mut engine = MediaEngine::new(site_dir, fetcher, delay)?;
    engine.run(max_pages).await?;
    log::info!(
        "Media crawl complete! {} URLs left in frontier.",
        engine.frontier().len()
    );
    Ok(())
}

async fn run_harvest(site_dir: &Path, images: bool, config_path: &Path) -> Result<()> {
    let settings = CrawlerConfig::load_or_default(config_path);
    let what = if images {
        Extraction::Images
    } else {
        Extraction::Links
    };

    let dirs = GoalDirs::detect(site_dir);
    let mut merged = std::collections::HashSet::new();
    for dir in [&dirs.article, &dirs.nonarticle] {
        if dir.is_dir() {
            merged.extend(
                corpus::extract_from_corpus(dir, what, settings.extract_concurrency).await?,
            );
        }
    }

    let mut sorted: Vec<_> = merged.into_iter().collect();
    sorted.sort();
    for line in sorted {
        println!("{line}");
    }
    Ok(())
}

/// List site directories whose frontier is still open, with corpus sizes.
fn report_status(root: &Path) -> Result<()> {
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(path.join("resources/graph.txt")) else {
            continue;
        };
        let Some(last) = content.lines().last() else {
            continue;
        };
        let open = last.trim().parse::<usize>().unwrap_or(0);
        if open > 0 {
            let dirs = GoalDirs::detect(&path);
            log::info!(
                "{}: {} in frontier, {} article pages, {} board pages",
                path.display(),
                open,
                count_files(&dirs.article),
                count_files(&dirs.nonarticle)
            );
        }
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scaffold { site_dir, media } => {
            scaffold_site(&site_dir, media)?;
            log::info!("Site directory {} ready.", site_dir.display());
        }

        Command::Crawl {
            site_dir,
            patterns,
            config,
            checker,
            dynamic,
            selector,
            max_pages,
        } => {
            run_crawl(
                &site_dir, &patterns, &config, checker, dynamic, selector, max_pages,
            )
            .await?;
        }

        Command::Media {
            site_dir,
            config,
            max_pages,
        } => {
            run_media(&site_dir, &config, max_pages).await?;
        }

        Command::Harvest {
            site_dir,
            images,
            config,
        } => {
            run_harvest(&site_dir, images, &config).await?;
        }

        Command::Status { root } => {
            report_status(&root)?;
        }
    }

    Ok(())
}
