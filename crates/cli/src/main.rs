//! Data Atlas CLI — search and inspect the dataset catalog from the terminal.
//!
//! Calls `atlas-core` directly with no server overhead.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use atlas_core::boost::{NoBoost, RelevanceBooster};
use atlas_core::catalog::Catalog;
use atlas_core::config::{load_atlas_config, AtlasConfig};
use atlas_core::search::{search, validate_request};
use atlas_core::types::*;
use atlas_core::{configured_booster, load_catalog};

/// Data Atlas CLI — dataset discovery from the terminal.
#[derive(Parser)]
#[command(name = "atlas", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding `.atlas.toml` (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Catalog JSON file (overrides `.atlas.toml`; default: builtin catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, filter and rank datasets
    Search {
        /// Free-text query matched against title, description and tags
        query: Option<String>,

        /// Problem description; enables the relevance boost
        #[arg(long)]
        description: Option<String>,

        /// Accept only these formats (repeatable)
        #[arg(long)]
        format: Vec<Format>,

        /// Accept only these sources (repeatable)
        #[arg(long)]
        source: Vec<Source>,

        /// Accept only these quality levels (repeatable)
        #[arg(long)]
        quality: Vec<Quality>,

        /// Size bucket: small, medium, large or all
        #[arg(long)]
        size: Option<SizeBucket>,

        /// Freshness window: day, week, month, year or all
        #[arg(long)]
        freshness: Option<Freshness>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,

        /// Results per page
        #[arg(long)]
        limit: Option<u32>,

        /// Rank by catalog score only
        #[arg(long)]
        no_boost: bool,
    },
    /// Show one dataset with its analytics
    Show {
        /// Dataset id, e.g. ds-001
        id: String,
    },
    /// Summarize the catalog by source, format and quality
    Stats,
}

fn resolve_config(root: Option<PathBuf>, catalog: Option<PathBuf>) -> AtlasConfig {
    let root = match root {
        Some(r) => r,
        None => std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("Could not determine current directory: {e}");
            std::process::exit(1);
        }),
    };
    let mut config = load_atlas_config(&root);
    if catalog.is_some() {
        config.catalog = catalog;
    }
    config
}

fn open_catalog(config: &AtlasConfig) -> Catalog {
    load_catalog(config).unwrap_or_else(|e| {
        eprintln!("Could not load catalog: {e}");
        std::process::exit(1);
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Could not serialize output: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atlas=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.root, cli.catalog);
    let catalog = open_catalog(&config);

    match cli.command {
        Commands::Search {
            query,
            description,
            format,
            source,
            quality,
            size,
            freshness,
            page,
            limit,
            no_boost,
        } => {
            let request = SearchRequest {
                query,
                description,
                filters: Some(SearchFilters { format, source, quality, size, freshness }),
                page,
                limit,
            };
            if let Err(e) = validate_request(&request) {
                eprintln!("{e}");
                std::process::exit(2);
            }

            let booster: Arc<dyn RelevanceBooster> =
                if no_boost { Arc::new(NoBoost) } else { configured_booster(&config) };
            let resp = search(catalog.all_datasets(), &request, booster.as_ref());

            if cli.json {
                print_json(&resp);
            } else {
                if resp.datasets.is_empty() {
                    if resp.total == 0 {
                        eprintln!("No datasets match");
                    } else {
                        eprintln!("Page {} is past the end ({} pages)", resp.page, resp.total_pages);
                    }
                    std::process::exit(1);
                }
                for d in &resp.datasets {
                    println!(
                        "{:<8} {:>3}  {:<11} {:<7} {:>9}  {:<6}  {}",
                        d.id,
                        d.relevance_score,
                        d.source.as_str(),
                        d.format.as_str(),
                        d.size,
                        d.quality_score.as_str(),
                        d.title,
                    );
                }
                eprintln!("\n{} results (page {} of {})", resp.total, resp.page, resp.total_pages);
            }
        }
        Commands::Show { id } => {
            let Some(dataset) = catalog.get(&id) else {
                eprintln!("Dataset not found: {id}");
                std::process::exit(1);
            };
            let details = catalog.details(&id);

            if cli.json {
                match &details {
                    Some(d) => print_json(d),
                    None => print_json(dataset),
                }
                return;
            }

            println!("{}  ({})", dataset.title, dataset.id);
            println!("Source:     {}", dataset.source);
            println!("Format:     {}", dataset.format);
            println!("Size:       {} ({} bytes)", dataset.size, dataset.size_bytes);
            println!("Relevance:  {}", dataset.relevance_score);
            println!("Quality:    {}", dataset.quality_score);
            println!("Updated:    {}", dataset.last_updated.format("%Y-%m-%d"));
            println!("Author:     {}", dataset.author);
            println!("License:    {}", dataset.license);
            println!("Tags:       {}", dataset.tags.join(", "));
            println!("Download:   {}", dataset.download_url);
            println!("\n{}", dataset.description);

            let Some(details) = details else {
                eprintln!("\nNo analytics available");
                return;
            };
            let a = &details.analytics;
            let m = &a.metrics;
            println!("\nRows:       {}", m.rows);
            println!("Columns:    {}", m.columns);
            println!("Missing:    {:.1}%", m.missing_percent);
            println!("Duplicates: {:.1}%", m.duplicate_percent);

            println!("\nColumns:");
            for c in &m.column_types {
                println!(
                    "  {:<28} {:<8} nulls={:<6} unique={}",
                    c.name,
                    c.kind.as_str(),
                    c.null_count,
                    c.unique_count
                );
            }

            if !a.correlations.is_empty() {
                println!("\nCorrelations:");
                for c in &a.correlations {
                    println!("  {:<24} {:<24} {:>6.2}", c.column1, c.column2, c.value);
                }
            }

            let rec = &a.ml_recommendation;
            println!("\nRecommended task: {} ({}% confidence)", rec.task.as_str(), rec.confidence);
            if let Some(target) = &rec.target_column {
                println!("Target column:    {target}");
            }
            println!("Models:           {}", rec.suggested_models.join(", "));
            println!("{}", rec.reasoning);
        }
        Commands::Stats => {
            let datasets = catalog.all_datasets();

            let by_source: Vec<(&str, usize)> = Source::ALL
                .iter()
                .map(|s| (s.as_str(), datasets.iter().filter(|d| d.source == *s).count()))
                .collect();
            let by_format: Vec<(&str, usize)> = Format::ALL
                .iter()
                .map(|f| (f.as_str(), datasets.iter().filter(|d| d.format == *f).count()))
                .collect();
            let by_quality: Vec<(&str, usize)> = Quality::ALL
                .iter()
                .map(|q| (q.as_str(), datasets.iter().filter(|d| d.quality_score == *q).count()))
                .collect();

            if cli.json {
                let counts = |rows: &[(&str, usize)]| {
                    rows.iter()
                        .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
                        .collect::<serde_json::Map<_, _>>()
                };
                print_json(&serde_json::json!({
                    "datasets": datasets.len(),
                    "analytics": catalog.analytics_count(),
                    "source": counts(&by_source),
                    "format": counts(&by_format),
                    "quality": counts(&by_quality),
                }));
            } else {
                println!("Datasets:   {}", datasets.len());
                for (title, rows) in [("Source", &by_source), ("Format", &by_format), ("Quality", &by_quality)] {
                    println!("\n{title}:");
                    for (name, count) in rows.iter().filter(|(_, c)| *c > 0) {
                        println!("  {:<12} {}", name, count);
                    }
                }
            }
        }
    }
}
