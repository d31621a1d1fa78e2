//! Connection strategies.
//!
//! Each strategy turns an ordered entity list into an edge set whose node
//! indices line up with the node builders in [`crate::nodes`]:
//!
//! - [`by_feature_distance`]: song nodes, audio-feature similarity
//! - [`by_artist_membership`]: song nodes then artist nodes, credit links
//! - [`by_related_artists`]: artist nodes, related-artist links
//! - [`by_genre_overlap`]: artist nodes, shared genre tags
//!
//! All of them are O(n²) over their input. That is fine for a single
//! playlist or a top-50 artist list.

use anyhow::{Context, Result};
use log::{debug, trace, warn};
use std::collections::HashSet;

use crate::features::{distance_within, DISTANCE_DIMENSIONS};
use crate::graph::{add_or_accumulate, find_edge, normalize_weights, push_edge, Edge, EdgeMatch, Node, NodeGroup, DECAY};
use crate::relations::ArtistRelations;
use crate::track::{Artist, TrackFeature};

/// Tuning for [`by_feature_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDistanceConfig {
    /// Pairs at or beyond this distance are not connected.
    pub cutoff: f64,
    /// Closest candidates kept per node per pass.
    pub max_neighbours: usize,
    /// Stand-in for a distance of exactly zero.
    pub zero_epsilon: f64,
    /// Decay passed to [`normalize_weights`].
    pub decay: f64,
}

impl Default for FeatureDistanceConfig {
    fn default() -> Self {
        Self {
            cutoff: 0.344,
            max_neighbours: 3,
            zero_epsilon: 0.001,
            decay: DECAY,
        }
    }
}

/// Connects tracks whose audio features are close.
///
/// For each track, every other track closer than `cutoff` is a candidate;
/// the `max_neighbours` closest are linked. The cap applies to a node's own
/// selection only, so a popular track can gain more links from others.
/// When both ends select each other the two distances add up on one edge.
/// Raw distances are finally turned into weights with [`normalize_weights`].
pub fn by_feature_distance(tracks: &[TrackFeature], config: &FeatureDistanceConfig) -> Vec<Edge> {
    let mut edges = feature_distance_edges(tracks, config);
    normalize_weights(&mut edges, config.decay);
    debug!("Feature distance connected {} tracks with {} edges", tracks.len(), edges.len());
    edges
}

/// [`by_feature_distance`] before weight normalisation.
pub(crate) fn feature_distance_edges(tracks: &[TrackFeature], config: &FeatureDistanceConfig) -> Vec<Edge> {
    let mut edges = Vec::new();

    for (i, track) in tracks.iter().enumerate() {
        let mut candidates: Vec<(usize, f64)> = tracks
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(j, other)| {
                distance_within(track, other, &DISTANCE_DIMENSIONS, config.cutoff)
                    .map(|d| (j, if d == 0.0 { config.zero_epsilon } else { d }))
            })
            .collect();

        candidates.sort_by(|(_, a), (_, b)| a.total_cmp(b));
        candidates.truncate(config.max_neighbours);
        trace!("Track '{}' keeps {} neighbour candidates", track.id, candidates.len());

        for (j, d) in candidates {
            add_or_accumulate(&mut edges, i, j, d, EdgeMatch::Undirected);
        }
    }

    edges
}

/// Links each track to the artist nodes of its credited artists.
///
/// `nodes` must be laid out as by [`crate::nodes::track_and_artist_nodes`].
/// Existing links are checked with [`EdgeMatch::Directed`]; since every
/// link runs track to artist that never admits a duplicate pair.
pub fn by_artist_membership(tracks: &[TrackFeature], nodes: &[Node]) -> Vec<Edge> {
    let mut edges = Vec::new();
    let artist_nodes = nodes.get(tracks.len()..).unwrap_or_default();

    for (i, track) in tracks.iter().enumerate() {
        if track.artists.is_none() {
            warn!("Track '{}' has no artist list, skipping", track.id);
            continue;
        }

        for artist in track.artists() {
            let Some(artist_node) = artist_nodes
                .iter()
                .find(|node| node.group == NodeGroup::Artist && node.guid == artist.id)
            else {
                debug!("No node for artist '{}' on track '{}'", artist.id, track.id);
                continue;
            };

            if find_edge(i, artist_node.id, &edges, EdgeMatch::Directed).is_none() {
                push_edge(&mut edges, i, artist_node.id, 1.0);
            }
        }
    }

    edges
}

/// Connects artists that the relations collaborator lists as related.
///
/// Lookups happen once per artist, in order. Every `(i, j)` where `j` is in
/// `i`'s related list adds one to the `i`–`j` edge, so a mutual relation
/// ends up with weight two.
///
/// # Errors
///
/// Fails on the first lookup that fails; no partial edge set is returned.
pub fn by_related_artists(artists: &[Artist], relations: &mut dyn ArtistRelations) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();

    for (i, artist) in artists.iter().enumerate() {
        let related = relations
            .related_artists(&artist.id)
            .with_context(|| format!("Related artists lookup failed for artist '{}'", artist.id))?;
        let related: HashSet<&str> = related.iter().map(|r| r.id.as_str()).collect();

        for (j, other) in artists.iter().enumerate() {
            if j != i && related.contains(other.id.as_str()) {
                add_or_accumulate(&mut edges, i, j, 1.0, EdgeMatch::Undirected);
            }
        }
    }

    debug!("Related artists connected {} artists with {} edges", artists.len(), edges.len());
    Ok(edges)
}

/// Connects artists sharing genre tags; an edge's weight is the number of
/// shared tags.
///
/// Each unordered pair is visited once. Every tag of the first artist that
/// the second also carries adds one, so a tag listed twice counts twice.
/// Artists without a genre list are skipped.
pub fn by_genre_overlap(artists: &[Artist]) -> Vec<Edge> {
    let mut edges = Vec::new();

    for (i, artist) in artists.iter().enumerate() {
        let Some(genres) = &artist.genres else {
            warn!("Artist '{}' has no genre list, skipping", artist.id);
            continue;
        };

        for (j, other) in artists.iter().enumerate().skip(i + 1) {
            let Some(other_genres) = &other.genres else {
                continue;
            };

            for genre in genres.iter().filter(|g| other_genres.contains(g)) {
                trace!("Artists '{}' and '{}' share '{genre}'", artist.id, other.id);
                add_or_accumulate(&mut edges, i, j, 1.0, EdgeMatch::Undirected);
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::track_and_artist_nodes;
    use crate::track::{ArtistRef, AudioFeatures};
    use anyhow::bail;
    use std::collections::HashMap;

    fn features(tempo: f64) -> AudioFeatures {
        AudioFeatures {
            danceability: 0.6,
            energy: 0.7,
            loudness: -7.0,
            speechiness: 0.04,
            acousticness: 0.15,
            instrumentalness: 0.0,
            liveness: 0.12,
            valence: 0.55,
            tempo,
        }
    }

    fn track(id: &str, tempo: f64) -> TrackFeature {
        TrackFeature::new(id, id, features(tempo))
    }

    fn assert_no_duplicates_or_loops(edges: &[Edge]) {
        for (k, edge) in edges.iter().enumerate() {
            assert_ne!(edge.from, edge.to, "self-loop at {k}");
            for other in &edges[k + 1..] {
                assert!(!other.joins(edge.from, edge.to), "duplicate edge {edge:?}");
            }
        }
    }

    struct MapRelations(HashMap<&'static str, Vec<&'static str>>);

    impl ArtistRelations for MapRelations {
        fn related_artists(&mut self, artist_id: &str) -> Result<Vec<ArtistRef>> {
            match self.0.get(artist_id) {
                Some(ids) => Ok(ids.iter().map(|id| ArtistRef::new(*id, *id)).collect()),
                None => bail!("lookup failed for {artist_id}"),
            }
        }
    }

    #[test]
    fn test_close_tempos_connect_with_tiny_distance() {
        let tracks = vec![track("t1", 118.0), track("t2", 122.0), track("t3", 118.0), track("t4", 118.0)];
        let config = FeatureDistanceConfig::default();
        let raw = feature_distance_edges(&tracks, &config);

        let t1_t2 = find_edge(0, 1, &raw, EdgeMatch::Undirected).expect("t1 and t2 connected");
        // Both directions selected each other, so the distance is counted twice
        let expected = 2.0 * (4.0 / 210.0);
        assert!((raw[t1_t2].value - expected).abs() < 1e-9);

        // Identical tracks collapse onto epsilon rather than being dropped
        let t1_t3 = find_edge(0, 2, &raw, EdgeMatch::Undirected).expect("t1 and t3 connected");
        assert!((raw[t1_t3].value - 2.0 * config.zero_epsilon).abs() < 1e-12);
        assert_no_duplicates_or_loops(&raw);
    }

    #[test]
    fn test_neighbour_cap_is_per_node_selection() {
        let tracks: Vec<_> = (0..5).map(|i| track(&format!("t{i}"), 120.0)).collect();
        let raw = feature_distance_edges(&tracks, &FeatureDistanceConfig::default());

        // Nodes 3 and 4 each fill their top three with 0, 1, 2 before reaching each other
        assert_eq!(raw.len(), 9);
        assert!(find_edge(3, 4, &raw, EdgeMatch::Undirected).is_none());
        // Node 0 is picked by everyone
        let degree_0 = raw.iter().filter(|e| e.from == 0 || e.to == 0).count();
        assert_eq!(degree_0, 4);

        let once = find_edge(0, 4, &raw, EdgeMatch::Undirected).unwrap();
        assert!((raw[once].value - 0.001).abs() < 1e-12);
        assert_no_duplicates_or_loops(&raw);
    }

    #[test]
    fn test_feature_distance_cutoff_drops_far_tracks() {
        let mut far = track("far", 120.0);
        far.features.energy = 0.0;
        far.features.acousticness = 0.95;
        let tracks = vec![track("near", 120.0), far];

        assert!(by_feature_distance(&tracks, &FeatureDistanceConfig::default()).is_empty());
    }

    #[test]
    fn test_feature_distance_weights_are_normalized() {
        let tracks = vec![track("a", 120.0), track("b", 120.0)];
        let edges = by_feature_distance(&tracks, &FeatureDistanceConfig::default());

        assert_eq!(edges.len(), 1);
        assert!((edges[0].value - (-2.0_f64 * 0.002).exp()).abs() < 1e-12);
        assert!(edges[0].value <= 1.0);
    }

    #[test]
    fn test_artist_membership_links_tracks_to_artists() {
        let tracks = vec![
            track("t5", 120.0).with_artists(vec![ArtistRef::new("x", "Artist X")]),
            track("t6", 120.0).with_artists(vec![ArtistRef::new("x", "Artist X"), ArtistRef::new("y", "Artist Y")]),
        ];
        let nodes = track_and_artist_nodes(&tracks);
        let edges = by_artist_membership(&tracks, &nodes);

        let pairs: Vec<_> = edges.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, [(0, 2), (1, 2), (1, 3)]);
        assert!(edges.iter().all(|e| e.value == 1.0));
        assert_no_duplicates_or_loops(&edges);
    }

    #[test]
    fn test_artist_membership_ignores_repeated_credit() {
        let tracks = vec![track("t", 120.0).with_artists(vec![ArtistRef::new("x", "X"), ArtistRef::new("x", "X")])];
        let nodes = track_and_artist_nodes(&tracks);
        assert_eq!(by_artist_membership(&tracks, &nodes).len(), 1);
    }

    #[test]
    fn test_artist_membership_skips_tracks_without_artists() {
        let mut bare = track("bare", 120.0);
        bare.artists = None;
        let tracks = vec![bare, track("t", 120.0).with_artists(vec![ArtistRef::new("x", "X")])];
        let nodes = track_and_artist_nodes(&tracks);
        let edges = by_artist_membership(&tracks, &nodes);

        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from, edges[0].to), (1, 2));
    }

    #[test]
    fn test_genre_overlap_counts_shared_tags() {
        let artists = vec![Artist::new("a1", "A1", &["pop", "rock"]), Artist::new("a2", "A2", &["rock", "jazz"])];
        let edges = by_genre_overlap(&artists);

        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from, edges[0].to), (0, 1));
        assert_eq!(edges[0].value, 1.0);
    }

    #[test]
    fn test_genre_overlap_multiple_tags_and_missing_genres() {
        let mut unknown = Artist::new("a3", "A3", &[]);
        unknown.genres = None;
        let artists = vec![
            Artist::new("a1", "A1", &["pop", "rock", "indie"]),
            Artist::new("a2", "A2", &["indie", "rock"]),
            unknown,
        ];
        let edges = by_genre_overlap(&artists);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].value, 2.0);
        assert_no_duplicates_or_loops(&edges);
    }

    #[test]
    fn test_related_artists_mutual_relation_accumulates() {
        let artists = vec![Artist::new("a", "A", &[]), Artist::new("b", "B", &[]), Artist::new("c", "C", &[])];
        let mut relations = MapRelations(HashMap::from([
            ("a", vec!["b", "zzz"]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
        ]));
        let edges = by_related_artists(&artists, &mut relations).unwrap();

        let ab = find_edge(0, 1, &edges, EdgeMatch::Undirected).unwrap();
        let ac = find_edge(0, 2, &edges, EdgeMatch::Undirected).unwrap();
        assert_eq!(edges[ab].value, 2.0);
        assert_eq!(edges[ac].value, 1.0);
        assert!(find_edge(1, 2, &edges, EdgeMatch::Undirected).is_none());
        assert_no_duplicates_or_loops(&edges);
    }

    #[test]
    fn test_related_artists_lookup_failure_aborts() {
        let artists = vec![Artist::new("a", "A", &[]), Artist::new("missing", "M", &[])];
        let mut relations = MapRelations(HashMap::from([("a", vec!["missing"])]));

        let err = by_related_artists(&artists, &mut relations).unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
    }
}
