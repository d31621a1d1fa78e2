//! Mood filtering: keep the tracks whose audio features fall inside a set
//! of ranges, e.g. `valence=0.6..1.0 energy=0.7..1.0` for something upbeat.
//!
//! Ranges are inclusive and compared against native feature values, so a
//! tempo range is written in BPM and a loudness range in dB.

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use std::fmt;
use std::str::FromStr;

use crate::features::FeatureKind;
use crate::track::TrackFeature;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub kind: FeatureKind,
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// # Errors
    ///
    /// Returns an error if `min > max` or either bound is not finite.
    pub fn new(kind: FeatureKind, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            bail!("Range bounds for {kind} must be finite");
        }
        if min > max {
            bail!("Empty range for {kind}: {min} > {max}");
        }
        Ok(Self { kind, min, max })
    }

    #[must_use]
    pub fn contains(&self, track: &TrackFeature) -> bool {
        (self.min..=self.max).contains(&track.feature(self.kind))
    }
}

impl FromStr for FeatureRange {
    type Err = anyhow::Error;

    /// Parses `kind=min..max`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, bounds) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected 'feature=min..max', got '{s}'"))?;
        let (min, max) = bounds
            .split_once("..")
            .ok_or_else(|| anyhow!("Expected 'min..max' bounds in '{s}'"))?;

        let kind: FeatureKind = kind.parse()?;
        let min: f64 = min.trim().parse().with_context(|| format!("Invalid lower bound in '{s}'"))?;
        let max: f64 = max.trim().parse().with_context(|| format!("Invalid upper bound in '{s}'"))?;
        Self::new(kind, min, max)
    }
}

impl fmt::Display for FeatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}..{}", self.kind, self.min, self.max)
    }
}

/// A conjunction of feature ranges. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodFilter {
    pub ranges: Vec<FeatureRange>,
}

impl MoodFilter {
    pub fn new(ranges: Vec<FeatureRange>) -> Self {
        Self { ranges }
    }

    #[must_use]
    pub fn matches(&self, track: &TrackFeature) -> bool {
        self.ranges.iter().all(|range| range.contains(track))
    }

    /// Matching tracks, in input order.
    pub fn filter<'a>(&self, tracks: &'a [TrackFeature]) -> Vec<&'a TrackFeature> {
        let matched: Vec<_> = tracks.iter().filter(|t| self.matches(t)).collect();
        debug!("Mood filter kept {} of {} tracks", matched.len(), tracks.len());
        matched
    }
}
