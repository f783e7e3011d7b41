//! Playlist analytics and artist co-occurrence networks.
//!
//! Core modules:
//! - [`network`] - Artist co-occurrence network builder
//! - [`schema`] - Attribute role resolution
//! - [`aggregate`] - Ranked counts and tail folding
//! - [`source`] - SQLite and JSON document data sources
//! - [`dashboard`] - Analytics facade that absorbs source failures
//!
//! ### Supporting Modules
//!
//! - [`record`] - Records and samples
//! - [`config`] - Source location and default query sizes
//! - [`report`] - Plain text rendering
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use mixgraph::dashboard::{Analytics, Fetch};
//! use mixgraph::network::{NetworkConfig, NetworkOutcome};
//! use mixgraph::source::{SampleMode, SqliteSource};
//! use std::path::Path;
//!
//! let source = SqliteSource::new(Path::new("spotify.db"), "spotify_dataset");
//! let analytics = Analytics::new(Box::new(source));
//!
//! match analytics.artist_network(5000, SampleMode::Random, &NetworkConfig::with_top_k(15)) {
//!     Fetch::Ready(NetworkOutcome::Built(network)) => {
//!         for edge in &network.edges {
//!             println!("{} <-> {}: {}", edge.endpoint_a, edge.endpoint_b, edge.weight);
//!         }
//!     }
//!     Fetch::Ready(NetworkOutcome::NoGraph(reason)) => println!("no graph: {reason:?}"),
//!     Fetch::NoData => println!("empty dataset"),
//!     Fetch::SourceUnavailable(reason) => eprintln!("source unavailable: {reason}"),
//! }
//! ```
//!
//! ## Building a Network Directly
//!
//! ```
//! use mixgraph::network::{build_artist_network, NetworkConfig};
//! use mixgraph::record::{Record, Sample};
//!
//! let sample: Sample = (0..12)
//!     .map(|i| {
//!         Record::new()
//!             .with("artistname", ["Queen", "ABBA", "Blur"][i % 3])
//!             .with("playlistname", ["Road Trip", "Workout"][i % 2])
//!     })
//!     .collect();
//!
//! let outcome = build_artist_network(&sample, &NetworkConfig::default());
//! let network = outcome.network().unwrap();
//! assert_eq!(network.nodes.len(), 3);
//! assert_eq!(network.edge("Queen", "ABBA").unwrap().weight, 2);
//! ```
//!
//! ## Error Handling
//!
//! Sources return `anyhow::Result`. [`dashboard::Analytics`] turns failures
//! into [`dashboard::Fetch::SourceUnavailable`] and empty answers into
//! [`dashboard::Fetch::NoData`]; the network builder itself never fails and
//! reports why it declined through [`network::NoGraphReason`].

pub mod aggregate;
pub mod cli;
pub mod completion;
pub mod config;
pub mod dashboard;
pub mod network;
pub mod record;
pub mod report;
pub mod schema;
pub mod source;
