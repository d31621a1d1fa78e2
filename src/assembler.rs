//! Graph assembly: foundation in, `{nodes, edges}` out.
//!
//! A build runs `Idle -> Loading -> Ready | Failed`. Unsupported selections
//! are rejected before `Loading` is entered. Every build starts from a fresh
//! [`GraphBuilder`], so nothing leaks from one build into the next.
//!
//! ```no_run
//! use tunegraph::assembler::{BuildRequest, Connection, ConnectionName, Foundation, GraphAssembler};
//! use tunegraph::db::RelationsCache;
//! use tunegraph::library::Library;
//! use tunegraph::relations::CachedRelations;
//!
//! let library = Library::load("library.json".as_ref())?;
//! let cache = RelationsCache::in_memory()?;
//! let mut relations = CachedRelations::new(&cache, &library);
//!
//! let request = BuildRequest::new(
//!     Foundation::Playlists(vec!["p1".into()]),
//!     vec![Connection::playlist(ConnectionName::SongFeatures)],
//! );
//! let mut assembler = GraphAssembler::new();
//! assembler.build(&request, &library, &mut relations);
//! if let Some(graph) = assembler.graph() {
//!     println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::graph::{Graph, GraphBuilder};
use crate::library::{LibrarySource, TimeRange};
use crate::nodes::{artist_nodes, track_and_artist_nodes, track_nodes};
use crate::relations::ArtistRelations;
use crate::strategy::{self, FeatureDistanceConfig};
use crate::track::{Artist, TrackFeature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ConnectionName {
    #[serde(rename = "Song Features")]
    SongFeatures,
    #[serde(rename = "Shared Artists")]
    SharedArtists,
    #[serde(rename = "Album Genres")]
    AlbumGenres,
    #[serde(rename = "Related Artists")]
    RelatedArtists,
}

impl fmt::Display for ConnectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SongFeatures => "Song Features",
            Self::SharedArtists => "Shared Artists",
            Self::AlbumGenres => "Album Genres",
            Self::RelatedArtists => "Related Artists",
        })
    }
}

/// Which foundation a connection type is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionCategory {
    Artist,
    Playlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub name: ConnectionName,
    pub category: ConnectionCategory,
}

impl Connection {
    pub const fn playlist(name: ConnectionName) -> Self {
        Self { name, category: ConnectionCategory::Playlist }
    }

    pub const fn artist(name: ConnectionName) -> Self {
        Self { name, category: ConnectionCategory::Artist }
    }

    /// Whether a strategy exists for this name/category pair.
    #[must_use]
    pub const fn is_implemented(&self) -> bool {
        matches!(
            (self.category, self.name),
            (ConnectionCategory::Playlist, ConnectionName::SongFeatures | ConnectionName::SharedArtists)
                | (ConnectionCategory::Artist, ConnectionName::RelatedArtists | ConnectionName::AlbumGenres)
        )
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.category)
    }
}

/// The entity collection a graph is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Foundation {
    /// Tracks of these playlists, merged.
    Playlists(Vec<String>),
    /// The user's top artists over a time range.
    TopArtists(TimeRange),
}

impl Foundation {
    #[must_use]
    pub const fn category(&self) -> ConnectionCategory {
        match self {
            Self::Playlists(_) => ConnectionCategory::Playlist,
            Self::TopArtists(_) => ConnectionCategory::Artist,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub foundation: Foundation,
    pub connections: Vec<Connection>,
    pub feature_distance: FeatureDistanceConfig,
}

impl BuildRequest {
    pub fn new(foundation: Foundation, connections: Vec<Connection>) -> Self {
        Self {
            foundation,
            connections,
            feature_distance: FeatureDistanceConfig::default(),
        }
    }

    fn selects(&self, name: ConnectionName) -> bool {
        self.connections.iter().any(|c| c.name == name)
    }

    /// First selected connection that cannot run on this foundation.
    fn unsupported(&self) -> Option<Connection> {
        let category = self.foundation.category();
        self.connections
            .iter()
            .copied()
            .find(|c| c.category != category || !c.is_implemented())
    }
}

#[derive(Debug, Default)]
pub enum BuildState {
    #[default]
    Idle,
    Loading,
    Ready(Graph),
    Failed(anyhow::Error),
}

/// What a call to [`GraphAssembler::build`] ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Ready,
    /// Rejected up front; the previous state is untouched.
    NotImplemented(Connection),
    Failed,
}

/// Owns the state of graph builds for one consumer.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    state: BuildState,
}

impl GraphAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &BuildState {
        &self.state
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.state, BuildState::Loading)
    }

    /// The last successfully built graph, if the latest build succeeded.
    pub fn graph(&self) -> Option<&Graph> {
        match &self.state {
            BuildState::Ready(graph) => Some(graph),
            _ => None,
        }
    }

    /// Builds a graph for `request`.
    ///
    /// Failures are logged and recorded in [`BuildState::Failed`]; no partial
    /// graph is ever exposed. Loading is always cleared before returning.
    pub fn build(
        &mut self,
        request: &BuildRequest,
        source: &dyn LibrarySource,
        relations: &mut dyn ArtistRelations,
    ) -> BuildOutcome {
        if let Some(connection) = request.unsupported() {
            warn!("Connection type {connection} is not implemented for this foundation");
            return BuildOutcome::NotImplemented(connection);
        }

        self.state = BuildState::Loading;
        match assemble(request, source, relations) {
            Ok(graph) => {
                info!("Graph built with {} nodes and {} edges", graph.nodes.len(), graph.edges.len());
                self.state = BuildState::Ready(graph);
                BuildOutcome::Ready
            }
            Err(err) => {
                error!("Graph build failed for {:?}: {err:#}", request.foundation);
                self.state = BuildState::Failed(err);
                BuildOutcome::Failed
            }
        }
    }
}

fn assemble(
    request: &BuildRequest,
    source: &dyn LibrarySource,
    relations: &mut dyn ArtistRelations,
) -> Result<Graph> {
    match &request.foundation {
        Foundation::Playlists(ids) => {
            let tracks = fetch_playlist_tracks(source, ids)?;
            Ok(assemble_tracks(request, &tracks))
        }
        Foundation::TopArtists(range) => {
            let artists = source
                .top_artists(*range)
                .with_context(|| format!("Failed to fetch top artists ({range})"))?;
            assemble_artists(request, &artists, relations)
        }
    }
}

/// Tracks of every playlist, first occurrence of each track id wins.
fn fetch_playlist_tracks(source: &dyn LibrarySource, ids: &[String]) -> Result<Vec<TrackFeature>> {
    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for id in ids {
        let fetched = source
            .playlist_tracks(id)
            .with_context(|| format!("Failed to fetch tracks for playlist '{id}'"))?;
        tracks.extend(fetched.into_iter().filter(|t| seen.insert(t.id.clone())));
    }

    Ok(tracks)
}

fn assemble_tracks(request: &BuildRequest, tracks: &[TrackFeature]) -> Graph {
    // Shared Artists needs the artist nodes appended after the song nodes.
    let nodes = if request.selects(ConnectionName::SharedArtists) {
        track_and_artist_nodes(tracks)
    } else {
        track_nodes(tracks)
    };
    let mut builder = GraphBuilder::with_nodes(nodes);

    if request.selects(ConnectionName::SongFeatures) {
        builder.extend_edges(strategy::by_feature_distance(tracks, &request.feature_distance));
    }
    if request.selects(ConnectionName::SharedArtists) {
        let edges = strategy::by_artist_membership(tracks, builder.nodes());
        builder.extend_edges(edges);
    }

    builder.finish()
}

fn assemble_artists(
    request: &BuildRequest,
    artists: &[Artist],
    relations: &mut dyn ArtistRelations,
) -> Result<Graph> {
    let mut builder = GraphBuilder::with_nodes(artist_nodes(artists));

    if request.selects(ConnectionName::RelatedArtists) {
        builder.extend_edges(strategy::by_related_artists(artists, relations)?);
    }
    if request.selects(ConnectionName::AlbumGenres) {
        builder.extend_edges(strategy::by_genre_overlap(artists));
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeGroup;
    use crate::track::{ArtistRef, AudioFeatures};
    use anyhow::{anyhow, bail};
    use std::cell::Cell;

    struct FakeSource {
        tracks: Vec<TrackFeature>,
        artists: Vec<Artist>,
        calls: Cell<usize>,
    }

    impl LibrarySource for FakeSource {
        fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackFeature>> {
            self.calls.set(self.calls.get() + 1);
            match playlist_id {
                "p1" => Ok(self.tracks.clone()),
                "p2" => Ok(self.tracks[..1].to_vec()),
                _ => Err(anyhow!("404 for playlist {playlist_id}")),
            }
        }

        fn top_artists(&self, _range: TimeRange) -> Result<Vec<Artist>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.artists.clone())
        }
    }

    struct FakeRelations {
        fail: bool,
    }

    impl ArtistRelations for FakeRelations {
        fn related_artists(&mut self, artist_id: &str) -> Result<Vec<ArtistRef>> {
            if self.fail {
                bail!("timeout");
            }
            Ok(match artist_id {
                "a1" => vec![ArtistRef::new("a2", "A2")],
                _ => Vec::new(),
            })
        }
    }

    fn source() -> FakeSource {
        let features = AudioFeatures { tempo: 120.0, loudness: -8.0, energy: 0.6, ..AudioFeatures::default() };
        FakeSource {
            tracks: vec![
                TrackFeature::new("t1", "One", features).with_artists(vec![ArtistRef::new("x", "X")]),
                TrackFeature::new("t2", "Two", features).with_artists(vec![ArtistRef::new("x", "X"), ArtistRef::new("y", "Y")]),
            ],
            artists: vec![Artist::new("a1", "A1", &["pop", "rock"]), Artist::new("a2", "A2", &["rock", "jazz"])],
            calls: Cell::new(0),
        }
    }

    fn playlists(ids: &[&str]) -> Foundation {
        Foundation::Playlists(ids.iter().map(|id| (*id).to_string()).collect())
    }

    #[test]
    fn test_album_genres_on_playlist_is_not_implemented() {
        let source = source();
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(playlists(&["p1"]), vec![Connection::playlist(ConnectionName::AlbumGenres)]);

        let outcome = assembler.build(&request, &source, &mut FakeRelations { fail: false });

        assert_eq!(outcome, BuildOutcome::NotImplemented(Connection::playlist(ConnectionName::AlbumGenres)));
        assert!(matches!(assembler.state(), BuildState::Idle));
        assert_eq!(source.calls.get(), 0, "no work before rejection");
    }

    #[test]
    fn test_category_mismatch_is_not_implemented() {
        let source = source();
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(
            Foundation::TopArtists(TimeRange::Medium),
            vec![Connection::playlist(ConnectionName::SongFeatures)],
        );
        assert!(matches!(
            assembler.build(&request, &source, &mut FakeRelations { fail: false }),
            BuildOutcome::NotImplemented(_)
        ));
    }

    #[test]
    fn test_song_features_build() {
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(playlists(&["p1"]), vec![Connection::playlist(ConnectionName::SongFeatures)]);

        assert_eq!(assembler.build(&request, &source(), &mut FakeRelations { fail: false }), BuildOutcome::Ready);
        let graph = assembler.graph().expect("ready");
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.nodes.iter().all(|n| n.group == NodeGroup::Song));
        assert_eq!(graph.edges.len(), 1);
        assert!(!assembler.is_loading());
    }

    #[test]
    fn test_shared_artists_with_song_features_concatenates() {
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(
            playlists(&["p1"]),
            vec![
                Connection::playlist(ConnectionName::SongFeatures),
                Connection::playlist(ConnectionName::SharedArtists),
            ],
        );
        assembler.build(&request, &source(), &mut FakeRelations { fail: false });
        let graph = assembler.graph().expect("ready");

        let guids: Vec<_> = graph.nodes.iter().map(|n| n.guid.as_str()).collect();
        assert_eq!(guids, ["t1", "t2", "x", "y"]);
        // one feature edge plus three membership edges
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn test_playlists_are_merged_without_duplicate_tracks() {
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(playlists(&["p1", "p2"]), vec![Connection::playlist(ConnectionName::SongFeatures)]);
        assembler.build(&request, &source(), &mut FakeRelations { fail: false });
        assert_eq!(assembler.graph().unwrap().nodes.len(), 2);
    }

    #[test]
    fn test_artist_foundation_keeps_strategy_edges_apart() {
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(
            Foundation::TopArtists(TimeRange::Short),
            vec![
                Connection::artist(ConnectionName::RelatedArtists),
                Connection::artist(ConnectionName::AlbumGenres),
            ],
        );
        assembler.build(&request, &source(), &mut FakeRelations { fail: false });
        let graph = assembler.graph().expect("ready");

        assert_eq!(graph.nodes.len(), 2);
        // a1->a2 related edge and the shared "rock" genre edge, not merged
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.joins(0, 1) && e.value == 1.0));
    }

    #[test]
    fn test_fetch_failure_clears_loading_and_drops_graph() {
        let mut assembler = GraphAssembler::new();
        let ok = BuildRequest::new(playlists(&["p1"]), vec![Connection::playlist(ConnectionName::SongFeatures)]);
        assembler.build(&ok, &source(), &mut FakeRelations { fail: false });
        assert!(assembler.graph().is_some());

        let bad = BuildRequest::new(playlists(&["p1", "gone"]), vec![Connection::playlist(ConnectionName::SongFeatures)]);
        assert_eq!(assembler.build(&bad, &source(), &mut FakeRelations { fail: false }), BuildOutcome::Failed);
        assert!(!assembler.is_loading());
        assert!(assembler.graph().is_none());

        let BuildState::Failed(err) = assembler.state() else {
            panic!("expected failed state");
        };
        assert!(format!("{err:#}").contains("gone"));
    }

    #[test]
    fn test_relations_failure_fails_build() {
        let mut assembler = GraphAssembler::new();
        let request = BuildRequest::new(
            Foundation::TopArtists(TimeRange::Long),
            vec![Connection::artist(ConnectionName::RelatedArtists)],
        );
        assert_eq!(assembler.build(&request, &source(), &mut FakeRelations { fail: true }), BuildOutcome::Failed);
        assert!(!assembler.is_loading());
    }
}
