//! # Command-Line Interface Module
//!
//! Clap derive definitions for `mixgraph`.
//!
//! ## Commands
//!
//! - `ping`: Check that the data source can be reached
//! - `stats`: Dataset totals
//! - `top`: Most frequent artists, playlists or users
//! - `users`: User activity with the long tail folded into "Others"
//! - `schema`: Attribute names of a sample and the fields the network uses
//! - `network`: Artist co-occurrence network
//! - `completion`: Shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! mixgraph --source spotify.db stats
//! MIXGRAPH_SOURCE=export.jsonl mixgraph top artists --limit 20
//! mixgraph --source spotify.db network --top-k 15 --json > network.json
//! ```

use crate::source::Dimension;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "mixgraph")]
#[command(about = "mixgraph: playlist analytics and artist co-occurrence networks")]
#[command(version)]
pub struct Args {
    /// Dataset to read: a SQLite database (.db, .sqlite, ...) or a JSON
    /// document export (.json, .jsonl, .ndjson)
    #[arg(long, global = true, env = "MIXGRAPH_SOURCE", value_hint = clap::ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Table holding the playlist rows (SQLite sources only)
    #[arg(long, global = true, env = "MIXGRAPH_TABLE")]
    pub table: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the data source can be reached
    Ping,

    /// Show dataset totals
    ///
    /// Total records plus distinct artists, tracks and playlists.
    Stats,

    /// Show the most frequent values of a dimension
    Top {
        /// What to rank
        dimension: Dimension,

        /// Number of rows (default from config, 15)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show user activity
    ///
    /// Distinct users, the most active ones, and their share of the records
    /// with everyone past the tenth folded into "Others".
    Users {
        /// Number of users to rank (default from config, 20)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the attributes of a sample and the fields the network uses
    Schema {
        /// Number of records to inspect
        #[arg(long, default_value = "100")]
        sample_size: usize,
    },

    /// Build the artist co-occurrence network
    ///
    /// Two artists are connected when they appear in the same playlist; the
    /// edge weight is the number of playlists they share. Only the most
    /// frequent artists of a random sample become nodes.
    Network {
        /// Number of artists to keep (default from config, 30)
        #[arg(short = 'k', long, value_parser = clap::value_parser!(u16).range(5..=50))]
        top_k: Option<u16>,

        /// Number of records to sample (default from config, 5000)
        #[arg(long)]
        sample_size: Option<usize>,

        /// Read the first records in storage order instead of a random sample
        #[arg(long)]
        full_scan: bool,

        /// Print the network as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Usage: mixgraph completion bash > ~/.local/share/bash-completion/completions/mixgraph
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
