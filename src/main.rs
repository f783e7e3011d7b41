//! # mixgraph
//!
//! Command-line front end over the playlist dataset: totals, rankings, user
//! activity and the artist co-occurrence network.
//!
//! ## Usage
//!
//! ```bash
//! mixgraph --source spotify.db ping
//! mixgraph --source spotify.db stats
//! mixgraph --source spotify.db top artists
//! mixgraph --source spotify.db network --top-k 15 --json
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;
use mixgraph::cli::{self, Command};
use mixgraph::completion;
use mixgraph::config::RuntimeConfig;
use mixgraph::dashboard::{Analytics, Fetch};
use mixgraph::network::NetworkConfig;
use mixgraph::report;
use mixgraph::schema::ResolvedSchema;
use mixgraph::source::{self, SampleMode};

/// Print `fetch` with `render`, or a message explaining why there is nothing
/// to print. Neither case is a process failure.
fn show<T>(fetch: Fetch<T>, what: &str, render: impl FnOnce(T) -> Result<String>) -> Result<()> {
    match fetch {
        Fetch::Ready(value) => print!("{}", render(value)?),
        Fetch::NoData => eprintln!("No data available for {what}."),
        Fetch::SourceUnavailable(reason) => {
            eprintln!("Data source unavailable, cannot show {what}:");
            eprintln!("  {reason}");
        }
    }
    Ok(())
}

/// Main entry point.
///
/// Initializes logging, parses arguments, resolves the configuration and
/// routes the command. Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug mixgraph network` - resolved fields and build statistics
/// - `RUST_LOG=mixgraph::source=debug mixgraph stats` - source queries only
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    // Completion scripts do not need a data source.
    if let Command::Completion { shell } = args.command {
        let mut cmd = cli::Args::command();
        completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        return Ok(());
    }

    let config = RuntimeConfig::load(args.source.as_deref(), args.table.as_deref())?;
    let analytics = Analytics::new(source::open_source(&config.source));
    info!("Using data source {}", analytics.describe());

    match args.command {
        Command::Ping => {
            show(analytics.ping(), "the connection check", |()| {
                Ok(format!("✓ Connected to {}\n", analytics.describe()))
            })?;
        }
        Command::Stats => {
            info!("Computing dataset totals");
            show(analytics.totals(), "dataset totals", |totals| Ok(report::format_totals(&totals)))?;
        }
        Command::Top { dimension, limit } => {
            let limit = limit.unwrap_or(config.top_n);
            info!("Ranking top {limit} {dimension:?} values");
            let title = match dimension {
                source::Dimension::Artist => format!("🎤 Top {limit} artists"),
                source::Dimension::Playlist => format!("📀 Top {limit} playlists"),
                source::Dimension::User => format!("👤 Top {limit} users"),
            };
            show(analytics.top_counts(dimension, limit), "the ranking", |rows| {
                Ok(report::format_ranked(&title, &rows))
            })?;
        }
        Command::Users { limit } => {
            let limit = limit.unwrap_or(config.user_limit);
            info!("Computing user statistics (top {limit})");
            show(analytics.user_stats(limit), "user statistics", |stats| {
                Ok(report::format_user_stats(&stats))
            })?;
        }
        Command::Schema { sample_size } => {
            info!("Inspecting attributes of {sample_size} records");
            show(analytics.sample(sample_size, SampleMode::Head), "the schema", |sample| {
                let names = sample.attribute_names();
                Ok(report::format_schema(&names, &ResolvedSchema::resolve(&names)))
            })?;
        }
        Command::Network { top_k, sample_size, full_scan, json } => {
            let network_config = NetworkConfig::with_top_k(top_k.map_or(config.top_k, usize::from));
            let sample_size = sample_size.unwrap_or(config.sample_size);
            let mode = if full_scan { SampleMode::Head } else { SampleMode::Random };
            info!(
                "Building artist network (top_k={}, sample_size={sample_size}, mode={mode:?})",
                network_config.top_k
            );

            show(
                analytics.artist_network(sample_size, mode, &network_config),
                "the artist network",
                |outcome| {
                    if json {
                        let mut text = serde_json::to_string_pretty(&outcome)
                            .context("Failed to serialize network")?;
                        text.push('\n');
                        Ok(text)
                    } else {
                        Ok(report::format_network_outcome(&outcome))
                    }
                },
            )?;
        }
        Command::Completion { .. } => unreachable!("handled before configuration"),
    }

    Ok(())
}
