//! Track/artist source collaborator.
//!
//! [`LibrarySource`] is what the assembler pulls its foundation from. The
//! bundled [`Library`] reads a JSON export of a user's library so the whole
//! pipeline can run offline; it also stands in as the remote side of the
//! related-artists lookup.
//!
//! ```json
//! {
//!   "tracks": [{ "id": "t1", "name": "...", "artists": [...], "tempo": 121.0, ... }],
//!   "artists": [{ "id": "a1", "name": "...", "genres": ["pop"] }],
//!   "playlists": [{ "id": "p1", "name": "Mix", "track_ids": ["t1"] }],
//!   "top_artists": { "short_term": ["a1"] },
//!   "related_artists": { "a1": [{ "id": "a2", "name": "..." }] }
//! }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::relations::RelatedArtistFetcher;
use crate::track::{Artist, ArtistRef, TrackFeature};

/// Window a top-artists list is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum TimeRange {
    #[serde(rename = "short_term")]
    #[value(name = "short")]
    Short,
    #[serde(rename = "medium_term")]
    #[value(name = "medium")]
    Medium,
    #[serde(rename = "long_term")]
    #[value(name = "long")]
    Long,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Short => "short_term",
            Self::Medium => "medium_term",
            Self::Long => "long_term",
        })
    }
}

/// Where a graph's foundation comes from.
pub trait LibrarySource {
    /// Tracks of one playlist, with audio features and artists attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist cannot be retrieved.
    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackFeature>>;

    /// The user's top artists over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be retrieved.
    fn top_artists(&self, range: TimeRange) -> Result<Vec<Artist>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub track_ids: Vec<String>,
}

/// A library export loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub tracks: Vec<TrackFeature>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub top_artists: HashMap<TimeRange, Vec<String>>,
    #[serde(default)]
    pub related_artists: HashMap<String, Vec<ArtistRef>>,
}

impl Library {
    /// Reads a library export from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid export.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library file {}", path.display()))?;
        let library: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Library file {} is not a valid export", path.display()))?;

        info!(
            "Loaded library with {} tracks, {} artists, {} playlists",
            library.tracks.len(),
            library.artists.len(),
            library.playlists.len()
        );
        Ok(library)
    }

    pub fn playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == playlist_id)
    }

    fn track(&self, track_id: &str) -> Option<&TrackFeature> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    fn artist(&self, artist_id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.id == artist_id)
    }
}

impl LibrarySource for Library {
    fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackFeature>> {
        let playlist = self
            .playlist(playlist_id)
            .ok_or_else(|| anyhow!("Playlist '{playlist_id}' not found in library"))?;

        let tracks = playlist
            .track_ids
            .iter()
            .map(|id| {
                self.track(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("Track '{id}' of playlist '{playlist_id}' has no feature record"))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Playlist '{playlist_id}' resolved to {} tracks", tracks.len());
        Ok(tracks)
    }

    fn top_artists(&self, range: TimeRange) -> Result<Vec<Artist>> {
        let Some(ids) = self.top_artists.get(&range) else {
            bail!("No top artists recorded for {range}");
        };

        ids.iter()
            .map(|id| {
                self.artist(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("Top artist '{id}' ({range}) has no artist record"))
            })
            .collect()
    }
}

impl RelatedArtistFetcher for Library {
    fn fetch_related(&self, artist_id: &str) -> Result<Vec<ArtistRef>> {
        self.related_artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| anyhow!("No related artists available for '{artist_id}'"))
    }
}
