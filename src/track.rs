//! Domain entities consumed by the graph core.
//!
//! These are already-fetched records: the core never talks to the remote
//! API itself, it only reads what a [`crate::library::LibrarySource`] hands it.

use serde::{Deserialize, Serialize};

use crate::features::FeatureKind;

/// Lightweight reference to an artist, as attached to a track or returned
/// by a related-artists lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

impl ArtistRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A full artist record from the top-artists foundation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// `None` when the source omitted genres entirely, which is not the
    /// same as an artist tagged with no genres.
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>, genres: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            genres: Some(genres.iter().map(|g| (*g).to_string()).collect()),
        }
    }
}

/// Raw audio features in their native ranges.
///
/// Loudness is in dB (roughly -60..0), tempo in BPM (roughly 30..300),
/// everything else in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
}

impl AudioFeatures {
    #[must_use]
    pub const fn get(&self, kind: FeatureKind) -> f64 {
        match kind {
            FeatureKind::Danceability => self.danceability,
            FeatureKind::Energy => self.energy,
            FeatureKind::Loudness => self.loudness,
            FeatureKind::Speechiness => self.speechiness,
            FeatureKind::Acousticness => self.acousticness,
            FeatureKind::Instrumentalness => self.instrumentalness,
            FeatureKind::Liveness => self.liveness,
            FeatureKind::Valence => self.valence,
            FeatureKind::Tempo => self.tempo,
        }
    }
}

/// A track together with its audio features and credited artists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeature {
    pub id: String,
    pub name: String,
    /// `None` when the source record had no artist list at all.
    #[serde(default)]
    pub artists: Option<Vec<ArtistRef>>,
    #[serde(flatten)]
    pub features: AudioFeatures,
}

impl TrackFeature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, features: AudioFeatures) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Some(Vec::new()),
            features,
        }
    }

    #[must_use]
    pub fn with_artists(mut self, artists: Vec<ArtistRef>) -> Self {
        self.artists = Some(artists);
        self
    }

    /// Credited artists, empty when the record carried none.
    pub fn artists(&self) -> &[ArtistRef] {
        self.artists.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn feature(&self, kind: FeatureKind) -> f64 {
        self.features.get(kind)
    }
}
