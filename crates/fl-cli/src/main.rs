//! Filterlink CLI
//!
//! CLI tool for building and reading portal search links and for working with
//! persisted filter state.

use std::collections::HashSet;
use std::fs;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use fl_core::{FilterSet, FilterStore, TabId, TrackerConfig};
use fl_url::{codec, Tracker};

mod replay;
mod snapshot;

use snapshot::FileSink;

#[derive(Parser)]
#[command(name = "fl-cli")]
#[command(about = "Filterlink portal link and filter state tools")]
struct Cli {
    /// Tracker config JSON file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a filter set JSON file as a portal URL
    Encode {
        /// Portal host, e.g. acme.bynder.com
        #[arg(long)]
        host: String,

        /// Filter set JSON file
        #[arg(short, long)]
        input: String,

        /// Emit the path-segment form (metaproperties only)
        #[arg(long)]
        predictable: bool,
    },

    /// Decode a portal URL into filter set JSON
    Decode {
        url: String,

        /// Parse the path-segment form
        #[arg(long)]
        predictable: bool,

        /// Print the one-line summary instead of JSON
        #[arg(long)]
        summary: bool,
    },

    /// Replay a recorded event feed through the tracker
    Replay {
        /// Feed file
        #[arg(short, long)]
        input: String,

        /// State file, created if missing
        #[arg(short, long, default_value = "filter-state.json")]
        state: String,
    },

    /// List the tabs stored in a state file
    Inspect {
        #[arg(short, long, default_value = "filter-state.json")]
        state: String,
    },

    /// Drop stored tabs that are not live
    Prune {
        #[arg(short, long, default_value = "filter-state.json")]
        state: String,

        /// Live tab ids, comma separated
        #[arg(long, value_delimiter = ',')]
        live: Vec<TabId>,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Encode {
            host,
            input,
            predictable,
        } => cmd_encode(&host, &input, predictable),
        Commands::Decode {
            url,
            predictable,
            summary,
        } => cmd_decode(&url, predictable, summary),
        Commands::Replay { input, state } => cmd_replay(config, &input, &state),
        Commands::Inspect { state } => cmd_inspect(config, &state),
        Commands::Prune { state, live } => cmd_prune(config, &state, &live),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> Result<TrackerConfig, String> {
    let Some(path) = path else {
        return Ok(TrackerConfig::default());
    };
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    TrackerConfig::from_json(&content).map_err(|e| format!("Invalid config '{}': {}", path, e))
}

fn cmd_encode(host: &str, input: &str, predictable: bool) -> Result<(), String> {
    let content =
        fs::read_to_string(input).map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let filters: FilterSet = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid filter set '{}': {}", input, e))?;

    let url = if predictable {
        codec::encode_predictable(host, &filters)
    } else {
        codec::encode(host, &filters)
    };
    println!("{}", url);
    Ok(())
}

fn cmd_decode(url: &str, predictable: bool, summary: bool) -> Result<(), String> {
    let filters = if predictable {
        codec::decode_predictable(url)
    } else {
        codec::decode(url)
    }
    .map_err(|e| e.to_string())?;

    if summary {
        println!("{}", filters.summary());
    } else {
        let json = serde_json::to_string_pretty(&filters)
            .map_err(|e| format!("Failed to encode filters: {}", e))?;
        println!("{}", json);
    }
    Ok(())
}

fn cmd_replay(config: TrackerConfig, input: &str, state: &str) -> Result<(), String> {
    let content =
        fs::read_to_string(input).map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let feed = replay::parse_feed(&content).map_err(|e| format!("{}: {}", input, e))?;

    let mut tracker = Tracker::new(config, FileSink::new(state));
    let stats = replay::replay(&mut tracker, &feed);

    println!("Replayed {} events from '{}'", feed.len(), input);
    println!("  Requests:    {}", stats.requests);
    println!("  Navigations: {}", stats.navigations);
    println!("  Closes:      {}", stats.closes);
    println!("  Changes:     {}", stats.changes);
    println!("  Tabs:        {}", tracker.store().len());
    Ok(())
}

fn cmd_inspect(config: TrackerConfig, state: &str) -> Result<(), String> {
    let store = FilterStore::restore(config, FileSink::new(state));
    println!("State: {} ({} tabs)", state, store.len());

    for (tab_id, tab) in store.tabs() {
        let filters = tab.filter_set();
        println!();
        println!("Tab {}", tab_id);
        println!("  Portal:      {}", tab.portal_host);
        println!("  Filters:     {}", filters.summary());
        println!("  Last change: {}", tab.last_mutation_time.as_millis());
        if let Some(reset) = tab.last_reset_time {
            println!("  Last reset:  {}", reset.as_millis());
        }
        println!("  URL:         {}", codec::encode(&tab.portal_host, &filters));
    }
    Ok(())
}

fn cmd_prune(config: TrackerConfig, state: &str, live: &[TabId]) -> Result<(), String> {
    let mut store = FilterStore::restore(config, FileSink::new(state));
    let live: HashSet<TabId> = live.iter().copied().collect();
    let pruned = store.prune_stale(&live);

    println!("Pruned {} tab(s), {} remaining", pruned, store.len());
    Ok(())
}
