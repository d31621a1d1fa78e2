//! Turns a music library into a weighted, deduplicated network graph.
//!
//! Core modules:
//! - [`features`] - Feature normalisation and track distance
//! - [`graph`] - Node/edge model, edge deduplication, weight normalisation
//! - [`nodes`] - Node builders
//! - [`strategy`] - Connection strategies (song features, shared artists,
//!   related artists, album genres)
//! - [`assembler`] - Build orchestration and build state
//! - [`neighbours`] - Neighbour queries on a built graph
//!
//! ### Supporting Modules
//!
//! - [`track`] - Domain entities the core consumes
//! - [`library`] - Track/artist source (JSON library export)
//! - [`relations`] - Related-artists lookup with cache-aside
//! - [`db`] - SQLite related-artists cache
//! - [`mood`] - Mood filtering by feature ranges
//! - [`config`] - Data directory management
//! - [`cli`] / [`completion`] - Command-line interface
//!
//! ## Quick Start Example
//!
//! ```
//! use tunegraph::features::track_distance;
//! use tunegraph::neighbours::{neighbours, Degree};
//! use tunegraph::strategy::{by_feature_distance, FeatureDistanceConfig};
//! use tunegraph::track::{AudioFeatures, TrackFeature};
//!
//! let base = AudioFeatures { tempo: 118.0, loudness: -7.0, energy: 0.7, ..AudioFeatures::default() };
//! let tracks = vec![
//!     TrackFeature::new("t1", "First", base),
//!     TrackFeature::new("t2", "Second", AudioFeatures { tempo: 122.0, ..base }),
//! ];
//!
//! assert!(track_distance(&tracks[0], &tracks[1]) < 0.05);
//!
//! let edges = by_feature_distance(&tracks, &FeatureDistanceConfig::default());
//! assert_eq!(edges.len(), 1);
//! assert_eq!(neighbours(0, Degree::One, &edges), vec![1]);
//! ```
//!
//! ## Error Handling
//!
//! All fallible public functions return `Result<T, anyhow::Error>`. Build
//! failures never surface a partial graph: the assembler records the error
//! and clears its loading state.

pub mod assembler;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod features;
pub mod graph;
pub mod library;
pub mod mood;
pub mod neighbours;
pub mod nodes;
pub mod relations;
pub mod strategy;
pub mod track;
