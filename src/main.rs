//! # Tunegraph
//!
//! Builds a network graph out of a music library export: songs linked by
//! audio-feature similarity or shared artists, or top artists linked by
//! related-artist lists and shared genres.
//!
//! ## Usage
//!
//! ```bash
//! # Similarity graph of one playlist
//! tunegraph build --library lib.json --playlist p1 --connection song-features
//!
//! # Top-artist graph, written to a file
//! tunegraph build --library lib.json --top-artists long --connection related-artists -o graph.json
//!
//! # Who is near node 3?
//! tunegraph neighbours --graph graph.json --node 3 --degree 2
//! ```

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use std::fs;
use std::path::Path;

use tunegraph::assembler::{BuildOutcome, BuildRequest, BuildState, Connection, Foundation, GraphAssembler};
use tunegraph::cli::{self, CacheAction};
use tunegraph::completion;
use tunegraph::config::RuntimeConfig;
use tunegraph::db::RelationsCache;
use tunegraph::graph::Graph;
use tunegraph::library::{Library, LibrarySource};
use tunegraph::mood::MoodFilter;
use tunegraph::neighbours::{neighbours, Degree};
use tunegraph::relations::CachedRelations;

/// Main entry point for the Tunegraph application.
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug tunegraph build ...` - Enable debug logging
/// - `RUST_LOG=tunegraph::strategy=trace tunegraph build ...` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Build { library, playlist, top_artists, connection, output } => {
            let foundation = match top_artists {
                Some(range) => Foundation::TopArtists(range),
                None => Foundation::Playlists(playlist),
            };
            let category = foundation.category();
            let connections = connection
                .into_iter()
                .map(|name| Connection { name, category })
                .collect();

            let config = RuntimeConfig::resolve(args.db)?;
            run_build(&library, &config, BuildRequest::new(foundation, connections), output.as_deref())?;
        }
        cli::Command::Neighbours { graph, node, degree } => {
            let graph = load_graph(&graph)?;
            if node >= graph.nodes.len() {
                bail!("Node {node} does not exist; graph has {} nodes", graph.nodes.len());
            }

            let ids = neighbours(node, Degree::try_from(degree)?, &graph.edges);
            for id in ids {
                let label = graph.nodes.get(id).map_or("?", |n| n.label.as_str());
                println!("{id}\t{label}");
            }
        }
        cli::Command::Mood { library, playlist, range } => {
            let library = Library::load(&library)?;
            let filter = MoodFilter::new(range);

            for id in &playlist {
                let tracks = library.playlist_tracks(id)?;
                for track in filter.filter(&tracks) {
                    println!("{}\t{}", track.id, track.name);
                }
            }
        }
        cli::Command::Cache { action } => {
            let config = RuntimeConfig::resolve(args.db)?;
            let cache = RelationsCache::open(&config.db_path)?;
            match action {
                CacheAction::Stats => {
                    println!("{} artists cached in {}", cache.len()?, config.db_path.display());
                }
                CacheAction::Clear => {
                    cache.clear()?;
                    info!("Cleared relations cache at {}", config.db_path.display());
                }
            }
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

fn run_build(library: &Path, config: &RuntimeConfig, request: BuildRequest, output: Option<&Path>) -> Result<()> {
    let library = Library::load(library)?;
    let cache = RelationsCache::open(&config.db_path)?;
    let mut relations = CachedRelations::new(&cache, &library);
    let mut assembler = GraphAssembler::new();

    match assembler.build(&request, &library, &mut relations) {
        BuildOutcome::NotImplemented(connection) => {
            eprintln!("Connection type '{connection}' is not implemented yet.");
            return Ok(());
        }
        BuildOutcome::Failed => {
            if let BuildState::Failed(err) = assembler.state() {
                bail!("Graph build failed: {err:#}");
            }
            bail!("Graph build failed");
        }
        BuildOutcome::Ready => {}
    }

    let graph = assembler.graph().context("Build reported ready without a graph")?;
    let json = serde_json::to_string_pretty(graph).context("Failed to serialize graph")?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write graph to {}", path.display()))?;
            info!("Graph written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<Graph> {
    debug!("Loading graph from {}", path.display());
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read graph file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Graph file {} is not valid graph JSON", path.display()))
}
