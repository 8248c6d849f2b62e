//! Photogrid - keyword photo search over a paged catalog.
//!
//! # Usage
//!
//! ```bash
//! photogrid catalog.json
//! photogrid --search "red fox" catalog.json
//! photogrid --page-size 10 --latency-ms 300 catalog.json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use photogrid::app::App;
use photogrid::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use photogrid::history::{SearchHistory, default_history_path, load_history};
use photogrid::image::FsImageFetcher;
use photogrid::perf;
use photogrid::search::CatalogSource;

/// Keyword photo search with incremental page fetching
#[derive(Parser, Debug)]
#[command(name = "photogrid", version, about, long_about = None)]
struct Cli {
    /// JSON catalog of photos to search
    #[arg(value_name = "CATALOG")]
    catalog: PathBuf,

    /// Run this search on startup
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Results requested per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Start the next page this many cells before the end of the results
    #[arg(long, value_name = "N")]
    prefetch_distance: Option<usize>,

    /// Grid columns
    #[arg(long, value_name = "N")]
    columns: Option<usize>,

    /// Visible grid rows
    #[arg(long, value_name = "N")]
    rows: Option<usize>,

    /// Simulated latency for every page fetch
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Where recent searches are kept
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Skip thumbnail and preview loading
    #[arg(long)]
    no_thumbnails: bool,

    /// Log fetch and decode timings
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);

    if !cli.catalog.exists() {
        anyhow::bail!("Catalog not found: {}", cli.catalog.display());
    }
    let source = CatalogSource::load(&cli.catalog, effective.page_size())?
        .with_latency(Duration::from_millis(effective.latency_ms()));
    if source.is_empty() {
        tracing::warn!(path = %cli.catalog.display(), "catalog has no entries");
    }

    let history_path = effective
        .history_file
        .clone()
        .unwrap_or_else(default_history_path);
    let history = load_history(&history_path).unwrap_or_else(|err| {
        tracing::warn!(path = %history_path.display(), "ignoring unreadable history: {err:#}");
        SearchHistory::default()
    });

    let app = App::new(source, FsImageFetcher)
        .with_grid(effective.columns(), effective.rows())
        .with_prefetch_distance(effective.prefetch_distance())
        .with_thumbnails_enabled(!effective.no_thumbnails)
        .with_history(history, Some(history_path))
        .with_initial_search(cli.search);

    app.run().context("Application error")
}
