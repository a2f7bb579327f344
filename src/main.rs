//! Linkwalk main entry point
//!
//! This is the command-line interface for the Linkwalk record extractor.

use anyhow::Context;
use clap::Parser;
use linkwalk::config::{load_config_with_hash, validate, Config, FieldKind, FieldSpec};
use linkwalk::crawler::{crawl, crawl_with_timeout, DocumentFetcher, HttpFetcher, RenderedFetcher};
use linkwalk::output::{print_summary, write_json};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Linkwalk: a schema-driven, link-following record extractor
///
/// Linkwalk reads the items of an HTML list page, extracts the configured
/// fields from each one, and follows links to detail pages (up to three
/// levels deep) to extract nested fields there. Results are written as JSON.
#[derive(Parser, Debug)]
#[command(name = "linkwalk")]
#[command(version)]
#[command(about = "A schema-driven, link-following record extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write JSON results to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Fetch every document through the WebDriver backend
    #[arg(long)]
    rendered: bool,

    /// Process at most this many list items
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// WebDriver server for rendered fetches
    #[arg(long, value_name = "URL", env = "WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Validate config and show the field schema without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    handle_crawl(&config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwalk=info,warn"),
            1 => EnvFilter::new("linkwalk=debug,info"),
            2 => EnvFilter::new("linkwalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.rendered {
        config.request.use_rendered_fetch = true;
    }
    if let Some(max_items) = cli.max_items {
        config.request.max_items = Some(max_items);
    }
    if let Some(webdriver_url) = &cli.webdriver_url {
        config.render.webdriver_url = webdriver_url.clone();
    }
}

/// Handles the --dry-run mode: shows the request and its field tree
fn handle_dry_run(config: &Config) {
    let request = &config.request;

    println!("=== Linkwalk Dry Run ===\n");

    println!("Request:");
    println!("  URL: {}", request.url);
    println!("  List selector: {}", request.list_selector);
    println!(
        "  Max items: {}",
        request
            .max_items
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    );
    println!("  User agent: {}", request.user_agent);
    println!("  Cookie: {}", if request.cookie.is_some() { "set" } else { "none" });

    println!("\nFetching:");
    if request.use_rendered_fetch {
        println!("  Mode: rendered via {}", config.render.webdriver_url);
        println!("  Headless: {}", config.render.headless);
    } else {
        println!("  Mode: static (timeout {}s)", config.http.timeout_secs);
    }
    if let Some(timeout) = config.crawl_timeout_secs {
        println!("  Crawl timeout: {}s", timeout);
    }

    println!("\nFields ({}):", request.fields.len());
    print_fields(&request.fields, 1);

    println!("\n✓ Configuration is valid");
}

fn print_fields(fields: &[FieldSpec], level: usize) {
    let indent = "  ".repeat(level);
    for field in fields {
        match &field.kind {
            FieldKind::Text => println!("{}- {} [text] {}", indent, field.name, field.selector),
            FieldKind::Markup => println!("{}- {} [markup] {}", indent, field.name, field.selector),
            FieldKind::Attribute { name } => println!(
                "{}- {} [attribute {}] {}",
                indent, field.name, name, field.selector
            ),
            FieldKind::Navigate(navigation) => {
                println!("{}- {} [navigate] {}", indent, field.name, field.selector);
                if !navigation.click_selector.is_empty() {
                    println!("{}    click: {}", indent, navigation.click_selector);
                }
                if let Some(target) = &navigation.target_selector {
                    println!("{}    target: {}", indent, target);
                }
                if let Some(template) = &navigation.url_template {
                    println!("{}    template: {}", indent, template);
                }
                print_fields(&navigation.fields, level + 2);
            }
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, cli: &Cli) -> anyhow::Result<ExitCode> {
    let http = HttpFetcher::new(&config.http).context("Failed to build HTTP client")?;
    let mut fetcher = DocumentFetcher::new(http);
    if config.request.use_rendered_fetch {
        tracing::info!("Rendered fetches via {}", config.render.webdriver_url);
        fetcher = fetcher.with_renderer(RenderedFetcher::new(config.render.clone()));
    }

    let result = match config.crawl_timeout_secs {
        Some(secs) => {
            crawl_with_timeout(&config.request, &fetcher, Duration::from_secs(secs)).await
        }
        None => crawl(&config.request, &fetcher).await,
    };

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_json(&result, BufWriter::new(file), cli.pretty)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Results written to {}", path.display());
        }
        None => {
            write_json(&result, io::stdout().lock(), cli.pretty)
                .context("Failed to write results")?;
        }
    }

    if !cli.quiet {
        print_summary(&result);
    }

    if result.success {
        tracing::info!("Crawl completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("Crawl failed");
        Ok(ExitCode::FAILURE)
    }
}
