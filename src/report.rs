//! # Text Reports
//!
//! Plain text rendering of analytics results for the terminal. Every function
//! returns a `String` so the output can be checked without a terminal.

use crate::aggregate::{self, RankedCount};
use crate::network::{ArtistNetwork, NetworkOutcome, NoGraphReason};
use crate::schema::{FieldRole, ResolvedSchema};
use crate::source::{DatasetTotals, UserStats};

/// Label of the bucket that folds the long tail of a distribution.
pub const OTHERS_LABEL: &str = "Others";

/// How many users keep their own slice in the user distribution.
pub const USER_DISTRIBUTION_HEAD: usize = 10;

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn heading(out: &mut String, title: &str) {
    push_line(out, title);
    push_line(out, &"═".repeat(title.chars().count()));
}

/// `1234567` -> `1,234,567`.
#[must_use]
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}

#[must_use]
pub fn format_totals(totals: &DatasetTotals) -> String {
    let mut out = String::new();
    heading(&mut out, "📊 Dataset");
    push_line(&mut out, &format!("Records:   {}", thousands(totals.records)));
    push_line(&mut out, &format!("Artists:   {}", thousands(totals.artists)));
    push_line(&mut out, &format!("Tracks:    {}", thousands(totals.tracks)));
    push_line(&mut out, &format!("Playlists: {}", thousands(totals.playlists)));
    out
}

/// Numbered ranking, counts right-aligned.
#[must_use]
pub fn format_ranked(title: &str, rows: &[RankedCount]) -> String {
    let mut out = String::new();
    heading(&mut out, title);

    let width = rows
        .iter()
        .map(|row| thousands(row.count).len())
        .max()
        .unwrap_or(0);

    for (i, row) in rows.iter().enumerate() {
        push_line(&mut out, &format!("{:>3}. {:>width$}  {}", i + 1, thousands(row.count), row.key));
    }

    out
}

/// Distinct users, the top users, and the distribution with the tail folded
/// into [`OTHERS_LABEL`].
#[must_use]
pub fn format_user_stats(stats: &UserStats) -> String {
    let mut out = String::new();
    heading(&mut out, "👤 Users");
    push_line(&mut out, &format!("Distinct users: {}", thousands(stats.total_users)));
    out.push('\n');

    out.push_str(&format_ranked("Most active users", &stats.top_users));
    out.push('\n');

    let distribution = aggregate::collapse_tail(&stats.top_users, USER_DISTRIBUTION_HEAD, OTHERS_LABEL);
    let total: u64 = distribution.iter().map(|row| row.count).sum();
    heading(&mut out, "Distribution");
    for row in &distribution {
        #[allow(clippy::cast_precision_loss)]
        let share = if total == 0 {
            0.0
        } else {
            row.count as f64 / total as f64 * 100.0
        };
        push_line(&mut out, &format!("{share:>5.1}%  {}", row.key));
    }

    out
}

#[must_use]
pub fn format_schema(attributes: &[String], resolved: &Result<ResolvedSchema, FieldRole>) -> String {
    let mut out = String::new();
    heading(&mut out, "Attributes");
    for name in attributes {
        push_line(&mut out, &format!("  {name}"));
    }
    out.push('\n');

    match resolved {
        Ok(schema) => {
            push_line(&mut out, &format!("Artist field:   {}", schema.artist));
            push_line(&mut out, &format!("Playlist field: {}", schema.playlist));
        }
        Err(role) => {
            push_line(&mut out, &format!("No {role} attribute found; the artist network cannot be built."));
        }
    }

    out
}

#[must_use]
pub fn describe_no_graph(reason: &NoGraphReason) -> String {
    match reason {
        NoGraphReason::InsufficientSample { usable, required } => format!(
            "Not enough data for the artist network: {usable} usable records, at least {required} needed."
        ),
        NoGraphReason::MissingField { role } => {
            format!("Not enough data for the artist network: no {role} attribute in the sample.")
        }
        NoGraphReason::NoArtistsSelected => "No artists selected for the network.".to_string(),
    }
}

/// Node and edge listing of a built network, heaviest edges first.
#[must_use]
pub fn format_network(network: &ArtistNetwork) -> String {
    let mut out = String::new();
    heading(&mut out, "🔗 Artist Network");
    push_line(
        &mut out,
        &format!(
            "{} artists, {} connections, max degree {}",
            network.nodes.len(),
            network.edges.len(),
            network.max_degree()
        ),
    );
    out.push('\n');

    heading(&mut out, "Artists");
    for (i, node) in network.nodes.iter().enumerate() {
        push_line(&mut out, &format!("{:>3}. {} ({} connections)", i + 1, node.identifier, node.degree));
    }

    if !network.edges.is_empty() {
        out.push('\n');
        heading(&mut out, "Shared playlists");
        let mut edges: Vec<_> = network.edges.iter().collect();
        edges.sort_by(|a, b| b.weight.cmp(&a.weight));
        for edge in edges {
            push_line(&mut out, &format!("{:>5}  {} <-> {}", edge.weight, edge.endpoint_a, edge.endpoint_b));
        }
    }

    out
}

#[must_use]
pub fn format_network_outcome(outcome: &NetworkOutcome) -> String {
    match outcome {
        NetworkOutcome::Built(network) => format_network(network),
        NetworkOutcome::NoGraph(reason) => format!("{}\n", describe_no_graph(reason)),
    }
}
