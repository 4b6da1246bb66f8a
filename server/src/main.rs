//! Data Atlas binary — thin CLI shell over the [`atlas_http`] router.

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use atlas_core::config::load_atlas_config;
use atlas_core::{configured_booster, load_catalog};
use atlas_http::{router, AppContext};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Dataset discovery server — search, filter and rank a catalog of public datasets.
#[derive(Parser)]
#[command(name = "data-atlas", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding `.atlas.toml` (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Catalog JSON file (overrides `.atlas.toml`; default: builtin catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Relevance booster: random (default) or none
    #[arg(long)]
    booster: Option<String>,

    /// Artificial delay added to data endpoints, in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Path to web UI dist directory
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "Could not register SIGTERM handler");
                    let _ = ctrl_c.await;
                    info!("Received SIGINT, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("data_atlas=info".parse().unwrap())
                .add_directive("atlas_core=info".parse().unwrap())
                .add_directive("atlas_http=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "data-atlas", &mut std::io::stdout());
        return;
    }

    // Config: .atlas.toml, then CLI overrides
    let root = match cli.root {
        Some(r) => r,
        None => std::env::current_dir().unwrap_or_else(|e| {
            error!(error = %e, "Could not determine current directory");
            std::process::exit(1);
        }),
    };
    let mut config = load_atlas_config(&root);
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(booster) = cli.booster {
        config.booster = booster;
    }
    if let Some(ms) = cli.latency_ms {
        config.latency_ms = ms;
    }

    let catalog = load_catalog(&config).unwrap_or_else(|e| {
        error!(error = %e, "Could not load catalog");
        std::process::exit(1);
    });
    let booster = configured_booster(&config);
    info!(
        datasets = catalog.len(),
        booster = booster.name(),
        latency_ms = config.latency_ms,
        "Catalog ready"
    );

    let ctx = AppContext::new(catalog, booster, Duration::from_millis(config.latency_ms))
        .unwrap_or_else(|e| {
            error!(error = %e, "Could not pre-serialize catalog");
            std::process::exit(1);
        });
    let sessions = ctx.sessions.clone();

    // Bind address: 127.0.0.1 by default, --bind-all for 0.0.0.0
    let bind_addr = if cli.bind_all { "0.0.0.0" } else { "127.0.0.1" };

    let explicit_port: Option<u16> = std::env::var("PORT").ok().and_then(|p| p.parse().ok());

    let listener = if let Some(port) = explicit_port {
        tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await.unwrap_or_else(|e| {
            error!(port = port, error = %e, "Could not bind to port");
            eprintln!("  PORT={port} was set explicitly. Choose a different port.");
            std::process::exit(1);
        })
    } else {
        // Auto-scan: try 8480..=8489
        const BASE: u16 = 8480;
        const RANGE: u16 = 10;
        let mut found = None;
        for port in BASE..BASE + RANGE {
            match tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await {
                Ok(l) => {
                    found = Some(l);
                    break;
                }
                Err(_) => continue,
            }
        }
        found.unwrap_or_else(|| {
            error!(range_start = BASE, range_end = BASE + RANGE - 1, "No free port found");
            eprintln!("  Try: PORT=<port> data-atlas");
            std::process::exit(1);
        })
    };

    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!(error = %e, "Could not read bound address");
            std::process::exit(1);
        }
    };

    // API routes + optional static UI
    let mut app = router(ctx);
    if let Some(dist_dir) = &cli.dist {
        let index_html = dist_dir.join("index.html");
        if !index_html.exists() {
            warn!(dist = %dist_dir.display(), "No index.html in dist directory");
        }
        app = app.fallback_service(ServeDir::new(dist_dir).not_found_service(ServeFile::new(&index_html)));
        info!(dist = %dist_dir.display(), "Serving web UI");
    }
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Session cleanup: prune idle sessions every 5 minutes
    let ttl = Duration::from_secs(config.session_ttl_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            sessions.prune_idle(ttl);
        }
    });

    info!(port = port, "http://localhost:{port}");
    // Machine-readable line for scripts (not through tracing)
    eprintln!("DATA_ATLAS_PORT={port}");

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
