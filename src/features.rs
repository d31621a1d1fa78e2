//! Audio-feature normalisation and track distance.
//!
//! Every feature is brought onto a comparable, roughly `[0, 1]` scale before
//! two tracks are compared. Loudness is shifted from dB, tempo is octave
//! corrected and scaled, the remaining features are already unit-ranged.
//!
//! ```
//! use tunegraph::features::{normalize, FeatureKind};
//!
//! assert_eq!(normalize(120.0, FeatureKind::Tempo), 120.0 / 210.0);
//! assert_eq!(normalize(-30.0, FeatureKind::Loudness), 0.5);
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::track::TrackFeature;

/// Lowest loudness the scale maps to zero, in dB.
pub const LOUDNESS_FLOOR_DB: f64 = -60.0;
/// Tempo every candidate is pulled towards during octave correction.
pub const REFERENCE_TEMPO: f64 = 120.0;
/// Musically plausible tempo window, inclusive.
pub const TEMPO_RANGE: (f64, f64) = (30.0, 300.0);
/// Divisor that brings a corrected tempo onto the unit scale.
pub const TEMPO_SCALE: f64 = 210.0;

/// One dimension of a track's audio features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
}

/// Dimensions compared when building feature-distance edges.
pub const DISTANCE_DIMENSIONS: [FeatureKind; 9] = [
    FeatureKind::Acousticness,
    FeatureKind::Danceability,
    FeatureKind::Energy,
    FeatureKind::Instrumentalness,
    FeatureKind::Liveness,
    FeatureKind::Loudness,
    FeatureKind::Speechiness,
    FeatureKind::Tempo,
    FeatureKind::Valence,
];

impl FeatureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Loudness => "loudness",
            Self::Speechiness => "speechiness",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::Liveness => "liveness",
            Self::Valence => "valence",
            Self::Tempo => "tempo",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        DISTANCE_DIMENSIONS
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown feature kind: '{s}'"))
    }
}

/// Maps a raw feature value onto the comparable scale for its kind.
///
/// Loudness is not clamped: values below -60 dB come out negative and
/// values above 0 dB exceed one.
#[must_use]
pub fn normalize(value: f64, kind: FeatureKind) -> f64 {
    match kind {
        FeatureKind::Loudness => (value - LOUDNESS_FLOOR_DB) / -LOUDNESS_FLOOR_DB,
        FeatureKind::Tempo => octave_correct_tempo(value) / TEMPO_SCALE,
        _ => value,
    }
}

/// Resolves half/double tempo detection errors.
///
/// Of `bpm`, `bpm / 2` and `bpm * 2`, keeps those inside [`TEMPO_RANGE`] and
/// returns the one closest to [`REFERENCE_TEMPO`]. Ties go to the earlier
/// candidate. With no candidate in range the input comes back unchanged.
#[must_use]
pub fn octave_correct_tempo(bpm: f64) -> f64 {
    let (low, high) = TEMPO_RANGE;

    [bpm, bpm / 2.0, bpm * 2.0]
        .into_iter()
        .filter(|candidate| (low..=high).contains(candidate))
        .fold(None, |best: Option<f64>, candidate| match best {
            Some(b) if (b - REFERENCE_TEMPO).abs() <= (candidate - REFERENCE_TEMPO).abs() => Some(b),
            _ => Some(candidate),
        })
        .unwrap_or(bpm)
}

/// Euclidean distance between two tracks over the given dimensions.
#[must_use]
pub fn distance(a: &TrackFeature, b: &TrackFeature, dims: &[FeatureKind]) -> f64 {
    dims.iter()
        .map(|&kind| squared_delta(a, b, kind))
        .sum::<f64>()
        .sqrt()
}

/// [`distance`] over [`DISTANCE_DIMENSIONS`].
#[must_use]
pub fn track_distance(a: &TrackFeature, b: &TrackFeature) -> f64 {
    distance(a, b, &DISTANCE_DIMENSIONS)
}

/// Like [`distance`], but gives up with `None` once the running sum of
/// squares reaches `cutoff²`.
#[must_use]
pub fn distance_within(
    a: &TrackFeature,
    b: &TrackFeature,
    dims: &[FeatureKind],
    cutoff: f64,
) -> Option<f64> {
    let limit = cutoff * cutoff;
    let mut sum = 0.0;

    for &kind in dims {
        sum += squared_delta(a, b, kind);
        if sum >= limit {
            return None;
        }
    }

    Some(sum.sqrt())
}

#[inline]
fn squared_delta(a: &TrackFeature, b: &TrackFeature, kind: FeatureKind) -> f64 {
    (normalize(a.feature(kind), kind) - normalize(b.feature(kind), kind)).powi(2)
}
