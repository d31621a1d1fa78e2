//! # Command-Line Interface Module
//!
//! Clap definitions for the `tunegraph` binary.
//!
//! ## Commands
//!
//! - `build`: Build a graph from playlists or top artists and print it as JSON
//! - `neighbours`: Query the neighbours of a node in a saved graph
//! - `mood`: Filter playlist tracks by audio-feature ranges
//! - `cache`: Inspect or clear the related-artists cache
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! tunegraph build --library lib.json --playlist 37i9dQ --connection song-features
//! tunegraph build --library lib.json --top-artists medium --connection related-artists --connection album-genres
//! tunegraph neighbours --graph graph.json --node 4 --degree 2
//! tunegraph mood --library lib.json --playlist 37i9dQ --range valence=0.6..1.0
//! ```

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::assembler::ConnectionName;
use crate::library::TimeRange;
use crate::mood::FeatureRange;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "tunegraph")]
#[command(about = "Tunegraph: turn a music library into a weighted similarity graph")]
#[command(version)]
pub struct Args {
    /// Related-artists cache database (defaults to the platform data directory)
    #[arg(long, global = true, env = "TUNEGRAPH_DB")]
    pub db: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a graph and print it as JSON
    ///
    /// The foundation is either one or more playlists (their tracks are
    /// merged) or the user's top artists for a time range. Playlist
    /// foundations accept song-features and shared-artists; top-artist
    /// foundations accept related-artists and album-genres.
    #[command(group(ArgGroup::new("foundation").required(true).args(["playlist", "top_artists"])))]
    Build {
        /// Library export (JSON)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        library: PathBuf,

        /// Playlist id to build from; repeatable
        #[arg(long)]
        playlist: Vec<String>,

        /// Build from the top artists of this time range
        #[arg(long, value_enum)]
        top_artists: Option<TimeRange>,

        /// Connection type; repeatable
        #[arg(long, value_enum, required = true)]
        connection: Vec<ConnectionName>,

        /// Write the graph here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List the neighbours of a node in a saved graph
    Neighbours {
        /// Graph JSON as written by `build`
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        graph: PathBuf,

        /// Node id
        #[arg(long)]
        node: usize,

        /// 1 for direct neighbours, 2 to include one more hop
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=2))]
        degree: u8,
    },

    /// Filter playlist tracks by mood
    Mood {
        /// Library export (JSON)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        library: PathBuf,

        /// Playlist id; repeatable
        #[arg(long, required = true)]
        playlist: Vec<String>,

        /// Feature range as `feature=min..max`; repeatable
        #[arg(long)]
        range: Vec<FeatureRange>,
    },

    /// Inspect or clear the related-artists cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions
    ///
    /// Usage: tunegraph completion bash > ~/.local/share/bash-completion/completions/tunegraph
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show how many artists have cached related-artist lists
    Stats,
    /// Drop every cached entry
    Clear,
}
