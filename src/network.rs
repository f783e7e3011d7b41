//! # Artist Co-occurrence Network
//!
//! Builds the "which artists share playlists" graph shown by the dashboard.
//!
//! ## Pipeline
//!
//! 1. **Field resolution**: find the artist and playlist attributes once per
//!    sample ([`ResolvedSchema`]).
//! 2. **Top-K selection**: keep the `top_k` artists with the most records.
//! 3. **Pair counting**: for each playlist, every unordered pair of distinct
//!    top-K artists in it gains one unit of weight.
//! 4. **Layout**: artists are spaced evenly on a circle in rank order.
//! 5. **Assembly**: nodes carry their degree (distinct partners), edges carry
//!    their weight and the segment between both endpoints.
//!
//! A build never fails. Samples that are too small or lack the needed
//! attributes produce [`NetworkOutcome::NoGraph`] with the reason.

use crate::record::{Record, Sample};
use crate::schema::{FieldRole, ResolvedSchema};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::TAU;

/// Tunables for a network build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    /// How many of the most frequent artists become nodes.
    pub top_k: usize,
    /// Minimum number of records (raw and usable) for a build to proceed.
    pub min_records: usize,
    /// Radius of the circular layout.
    pub radius: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            top_k: 30,
            min_records: 10,
            radius: 1.0,
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }
}

/// Canonical artist pair, smaller identifier first.
pub type ArtistPair = (String, String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistNode {
    pub identifier: String,
    pub x: f64,
    pub y: f64,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooccurrenceEdge {
    pub endpoint_a: String,
    pub endpoint_b: String,
    /// Number of distinct playlists both artists appear in.
    pub weight: u32,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Renderable network: nodes in rank order, edges in canonical pair order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtistNetwork {
    pub nodes: Vec<ArtistNode>,
    pub edges: Vec<CooccurrenceEdge>,
}

impl ArtistNetwork {
    /// Upper bound for a degree colour scale.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(|n| n.degree).max().unwrap_or(0)
    }

    #[must_use]
    pub fn node(&self, identifier: &str) -> Option<&ArtistNode> {
        self.nodes.iter().find(|n| n.identifier == identifier)
    }

    #[must_use]
    pub fn edge(&self, a: &str, b: &str) -> Option<&CooccurrenceEdge> {
        let (a, b) = canonical_pair(a, b);
        self.edges
            .iter()
            .find(|e| e.endpoint_a == a && e.endpoint_b == b)
    }

    /// All edges flattened into two polylines, segments separated by `None`,
    /// the shape line-trace renderers expect.
    #[must_use]
    pub fn edge_trace(&self) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let mut xs = Vec::with_capacity(self.edges.len() * 3);
        let mut ys = Vec::with_capacity(self.edges.len() * 3);

        for edge in &self.edges {
            xs.extend([Some(edge.x0), Some(edge.x1), None]);
            ys.extend([Some(edge.y0), Some(edge.y1), None]);
        }

        (xs, ys)
    }
}

/// Why a build declined to produce a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoGraphReason {
    InsufficientSample { usable: usize, required: usize },
    MissingField { role: FieldRole },
    NoArtistsSelected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NetworkOutcome {
    Built(ArtistNetwork),
    NoGraph(NoGraphReason),
}

impl NetworkOutcome {
    #[must_use]
    pub fn network(&self) -> Option<&ArtistNetwork> {
        match self {
            Self::Built(network) => Some(network),
            Self::NoGraph(_) => None,
        }
    }
}

/// Build the co-occurrence network for `sample`.
#[must_use]
pub fn build_artist_network(sample: &Sample, config: &NetworkConfig) -> NetworkOutcome {
    if sample.len() < config.min_records {
        return NetworkOutcome::NoGraph(NoGraphReason::InsufficientSample {
            usable: sample.len(),
            required: config.min_records,
        });
    }

    let schema = match ResolvedSchema::resolve(&sample.attribute_names()) {
        Ok(schema) => schema,
        Err(role) => {
            debug!("No {role} attribute in sample, skipping network");
            return NetworkOutcome::NoGraph(NoGraphReason::MissingField { role });
        }
    };
    debug!(
        "Network fields: artist=`{}`, playlist=`{}`",
        schema.artist, schema.playlist
    );

    let pairs = usable_pairs(sample.records(), &schema);
    if pairs.len() < config.min_records {
        return NetworkOutcome::NoGraph(NoGraphReason::InsufficientSample {
            usable: pairs.len(),
            required: config.min_records,
        });
    }

    if config.top_k == 0 {
        return NetworkOutcome::NoGraph(NoGraphReason::NoArtistsSelected);
    }

    let top_artists = select_top_artists(&pairs, config.top_k);
    let weights = count_cooccurrences(&pairs, &top_artists);
    let positions = circular_layout(&top_artists, config.radius);
    let degree_map = degrees(&weights);

    debug!(
        "Built network from {} usable records: {} nodes, {} edges",
        pairs.len(),
        top_artists.len(),
        weights.len()
    );

    NetworkOutcome::Built(assemble(&top_artists, &positions, &weights, &degree_map))
}

/// (artist, playlist) of every record that has both attributes.
fn usable_pairs<'a>(records: &'a [Record], schema: &ResolvedSchema) -> Vec<(&'a str, &'a str)> {
    records
        .iter()
        .filter_map(|record| {
            Some((
                record.get_non_empty(&schema.artist)?,
                record.get_non_empty(&schema.playlist)?,
            ))
        })
        .collect()
}

/// The `top_k` artists by record count, most frequent first.
///
/// Equal counts keep the order in which the artists first appear.
#[must_use]
pub fn select_top_artists(pairs: &[(&str, &str)], top_k: usize) -> Vec<String> {
    crate::aggregate::rank_counts(pairs.iter().map(|(artist, _)| *artist), top_k)
        .into_iter()
        .map(|row| row.key)
        .collect()
}

/// Playlist co-occurrence weights among `top_artists`.
///
/// Only pairs that share at least one playlist are present.
#[must_use]
pub fn count_cooccurrences(
    pairs: &[(&str, &str)],
    top_artists: &[String],
) -> BTreeMap<ArtistPair, u32> {
    let selected: HashSet<&str> = top_artists.iter().map(String::as_str).collect();

    // Playlist -> distinct artists, both in first-seen order.
    let mut playlist_index: HashMap<&str, usize> = HashMap::new();
    let mut members: Vec<Vec<&str>> = Vec::new();

    for &(artist, playlist) in pairs.iter().filter(|(a, _)| selected.contains(a)) {
        let slot = *playlist_index.entry(playlist).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        if !members[slot].contains(&artist) {
            members[slot].push(artist);
        }
    }

    let mut weights: BTreeMap<ArtistPair, u32> = BTreeMap::new();
    for artists in &members {
        for (i, first) in artists.iter().enumerate() {
            for second in &artists[i + 1..] {
                let (a, b) = canonical_pair(first, second);
                *weights.entry((a.to_string(), b.to_string())).or_insert(0) += 1;
            }
        }
    }

    weights
}

/// Evenly spaced points on a circle, one per artist, in the given order.
#[must_use]
pub fn circular_layout(artists: &[String], radius: f64) -> Vec<(f64, f64)> {
    if artists.is_empty() {
        return Vec::new();
    }

    #[allow(clippy::cast_precision_loss)]
    let step = TAU / artists.len() as f64;

    (0..artists.len())
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f64 * step;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Distinct partners per artist.
#[must_use]
pub fn degrees(weights: &BTreeMap<ArtistPair, u32>) -> HashMap<&str, usize> {
    let mut degrees: HashMap<&str, usize> = HashMap::new();
    for (a, b) in weights.keys() {
        *degrees.entry(a.as_str()).or_insert(0) += 1;
        *degrees.entry(b.as_str()).or_insert(0) += 1;
    }
    degrees
}

fn assemble(
    top_artists: &[String],
    positions: &[(f64, f64)],
    weights: &BTreeMap<ArtistPair, u32>,
    degrees: &HashMap<&str, usize>,
) -> ArtistNetwork {
    let position_of: HashMap<&str, (f64, f64)> = top_artists
        .iter()
        .map(String::as_str)
        .zip(positions.iter().copied())
        .collect();

    let nodes = top_artists
        .iter()
        .zip(positions)
        .map(|(artist, &(x, y))| ArtistNode {
            identifier: artist.clone(),
            x,
            y,
            degree: degrees.get(artist.as_str()).copied().unwrap_or(0),
        })
        .collect();

    let edges = weights
        .iter()
        .filter_map(|((a, b), &weight)| {
            let &(x0, y0) = position_of.get(a.as_str())?;
            let &(x1, y1) = position_of.get(b.as_str())?;
            Some(CooccurrenceEdge {
                endpoint_a: a.clone(),
                endpoint_b: b.clone(),
                weight,
                x0,
                y0,
                x1,
                y1,
            })
        })
        .collect();

    ArtistNetwork { nodes, edges }
}

fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(artist: &str, playlist: &str) -> Record {
        Record::new()
            .with("user_id", "u1")
            .with("artistname", artist)
            .with("trackname", "t")
            .with("playlistname", playlist)
    }

    /// P1: [A, B], P2: [A, B, C], P3: [C], padded with repeats so the sample
    /// clears the minimum size without changing any weights.
    fn triangle_sample() -> Sample {
        vec![
            record("A", "P1"),
            record("B", "P1"),
            record("A", "P2"),
            record("B", "P2"),
            record("C", "P2"),
            record("C", "P3"),
            record("A", "P1"),
            record("B", "P2"),
            record("C", "P3"),
            record("A", "P2"),
        ]
        .into()
    }

    fn build(sample: &Sample, top_k: usize) -> ArtistNetwork {
        match build_artist_network(sample, &NetworkConfig::with_top_k(top_k)) {
            NetworkOutcome::Built(network) => network,
            NetworkOutcome::NoGraph(reason) => panic!("expected a network, got {reason:?}"),
        }
    }

    #[test]
    fn test_triangle_weights() {
        let network = build(&triangle_sample(), 30);

        assert_eq!(network.edge("A", "B").map(|e| e.weight), Some(2));
        assert_eq!(network.edge("C", "A").map(|e| e.weight), Some(1));
        assert_eq!(network.edge("B", "C").map(|e| e.weight), Some(1));
        assert_eq!(network.edges.len(), 3);
    }

    #[test]
    fn test_triangle_degrees() {
        let network = build(&triangle_sample(), 30);

        for artist in ["A", "B", "C"] {
            assert_eq!(network.node(artist).map(|n| n.degree), Some(2), "{artist}");
        }
        assert_eq!(network.max_degree(), 2);
    }

    #[test]
    fn test_small_sample_yields_no_graph() {
        let sample: Sample = triangle_sample().records()[..9].to_vec().into();

        assert_eq!(
            build_artist_network(&sample, &NetworkConfig::default()),
            NetworkOutcome::NoGraph(NoGraphReason::InsufficientSample {
                usable: 9,
                required: 10
            })
        );
    }

    #[test]
    fn test_unusable_records_do_not_count() {
        let mut records = triangle_sample().records().to_vec();
        records[0] = Record::new().with("artistname", "A").with("playlistname", "");

        let outcome = build_artist_network(&records.into(), &NetworkConfig::default());
        assert_eq!(
            outcome,
            NetworkOutcome::NoGraph(NoGraphReason::InsufficientSample {
                usable: 9,
                required: 10
            })
        );
    }

    #[test]
    fn test_missing_fields_yield_no_graph() {
        let no_artist: Sample = (0..20)
            .map(|i| Record::new().with("band", &format!("b{i}")).with("playlist", "p"))
            .collect();
        let no_playlist: Sample = (0..20)
            .map(|i| Record::new().with("Artist", &format!("a{i}")).with("mix", "m"))
            .collect();

        assert_eq!(
            build_artist_network(&no_artist, &NetworkConfig::default()),
            NetworkOutcome::NoGraph(NoGraphReason::MissingField {
                role: FieldRole::Artist
            })
        );
        assert_eq!(
            build_artist_network(&no_playlist, &NetworkConfig::default()),
            NetworkOutcome::NoGraph(NoGraphReason::MissingField {
                role: FieldRole::Playlist
            })
        );
    }

    #[test]
    fn test_zero_top_k_selects_nothing() {
        assert_eq!(
            build_artist_network(&triangle_sample(), &NetworkConfig::with_top_k(0)),
            NetworkOutcome::NoGraph(NoGraphReason::NoArtistsSelected)
        );
    }

    #[test]
    fn test_node_count_is_min_of_k_and_distinct_artists() {
        let sample: Sample = (0..40)
            .map(|i| record(&format!("artist{}", i % 8), &format!("p{}", i % 5)))
            .collect();

        assert_eq!(build(&sample, 5).nodes.len(), 5);
        assert_eq!(build(&sample, 8).nodes.len(), 8);
        assert_eq!(build(&sample, 50).nodes.len(), 8);
    }

    #[test]
    fn test_top_k_restricts_edges_to_selected_artists() {
        // "Rare" shares P1 with A but is the least frequent artist.
        let mut records = triangle_sample().records().to_vec();
        records.push(record("Rare", "P1"));

        let network = build(&records.into(), 3);

        assert!(network.node("Rare").is_none());
        assert!(network.edge("A", "Rare").is_none());
        assert_eq!(network.edge("A", "B").map(|e| e.weight), Some(2));
    }

    #[test]
    fn test_top_artist_ties_keep_first_appearance() {
        let pairs = [("x", "p"), ("y", "p"), ("z", "p"), ("y", "q"), ("x", "q")];
        assert_eq!(select_top_artists(&pairs, 2), ["x", "y"]);
    }

    #[test]
    fn test_no_edge_without_shared_playlist() {
        let sample: Sample = (0..12)
            .map(|i| record(if i % 2 == 0 { "Solo1" } else { "Solo2" }, &format!("own{}", i % 2)))
            .collect();

        let network = build(&sample, 30);

        assert_eq!(network.nodes.len(), 2);
        assert!(network.edges.is_empty());
        assert!(network.nodes.iter().all(|n| n.degree == 0));
    }

    #[test]
    fn test_repeated_artist_in_playlist_counts_once() {
        let pairs = [("A", "P"), ("A", "P"), ("B", "P"), ("B", "P")];
        let top = vec!["A".to_string(), "B".to_string()];
        let weights = count_cooccurrences(&pairs, &top);

        assert_eq!(weights.len(), 1);
        assert_eq!(weights[&("A".to_string(), "B".to_string())], 1);
    }

    #[test]
    fn test_circular_layout_positions() {
        let artists: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let layout = circular_layout(&artists, 1.0);

        let expected = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
        for ((x, y), (ex, ey)) in layout.iter().zip(expected) {
            assert!((x - ex).abs() < 1e-12 && (y - ey).abs() < 1e-12);
        }
        assert!(circular_layout(&[], 1.0).is_empty());
    }

    #[test]
    fn test_edges_carry_endpoint_positions() {
        let network = build(&triangle_sample(), 30);

        for edge in &network.edges {
            let a = network.node(&edge.endpoint_a).unwrap();
            let b = network.node(&edge.endpoint_b).unwrap();
            assert_eq!((edge.x0, edge.y0), (a.x, a.y));
            assert_eq!((edge.x1, edge.y1), (b.x, b.y));
            assert!(edge.endpoint_a < edge.endpoint_b);
            assert!(edge.weight > 0);
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let sample: Sample = (0..200)
            .map(|i| record(&format!("artist{}", (i * 7) % 13), &format!("p{}", i % 17)))
            .collect();
        let config = NetworkConfig::with_top_k(10);

        assert_eq!(
            build_artist_network(&sample, &config),
            build_artist_network(&sample, &config)
        );
    }

    #[test]
    fn test_edge_trace_shape() {
        let network = build(&triangle_sample(), 30);
        let (xs, ys) = network.edge_trace();

        assert_eq!(xs.len(), network.edges.len() * 3);
        assert_eq!(ys.len(), xs.len());
        assert!(xs.iter().skip(2).step_by(3).all(Option::is_none));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = build_artist_network(&triangle_sample(), &NetworkConfig::default());
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "built");
        assert_eq!(json["nodes"].as_array().map(Vec::len), Some(3));
        assert!(json["edges"][0].get("endpoint_a").is_some());

        let declined = NetworkOutcome::NoGraph(NoGraphReason::NoArtistsSelected);
        let json = serde_json::to_value(&declined).unwrap();
        assert_eq!(json["status"], "no_graph");
        assert_eq!(json["reason"], "no_artists_selected");
    }
}
