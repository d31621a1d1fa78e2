//! # Configuration Module
//!
//! Data directory and cache location management.
//!
//! Tunegraph keeps its related-artists cache in the platform-standard data
//! directory:
//! - Linux: `~/.local/share/tunegraph/`
//! - macOS: `~/Library/Application Support/tunegraph/`
//! - Windows: `%APPDATA%\tunegraph\`
//!
//! Algorithm tuning lives with the algorithms, see
//! [`crate::strategy::FeatureDistanceConfig`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "tunegraph";
const CACHE_FILE: &str = "cache.db";

/// Returns the platform-appropriate data directory for Tunegraph, creating
/// it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The tunegraph subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create Tunegraph data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Returns the platform-appropriate related-artists cache path.
///
/// # Examples
///
/// ```no_run
/// use tunegraph::config::get_db_path;
///
/// let db_path = get_db_path()?;
/// println!("Cache location: {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CACHE_FILE))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the related-artists cache database
    pub db_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: get_db_path().unwrap_or_else(|_| PathBuf::from(CACHE_FILE)),
        }
    }
}

impl RuntimeConfig {
    /// Resolve the configuration, preferring an explicit cache path.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the data directory
    /// cannot be resolved.
    pub fn resolve(db_override: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_override {
            Some(path) => path,
            None => get_db_path()?,
        };
        Ok(Self { db_path })
    }

    /// Create configuration with explicit database path
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_db_path_structure() {
        let path = get_db_path().expect("Should get valid path");

        assert_eq!(path.file_name().unwrap(), CACHE_FILE);
        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), APP_DIR);
        assert!(parent.is_dir());
    }

    #[test]
    fn test_get_db_path_consistent_results() {
        let path1 = get_db_path().expect("First call should succeed");
        let path2 = get_db_path().expect("Second call should succeed");
        assert_eq!(path1, path2);
    }

    #[test]
    fn test_override_wins() {
        let config = RuntimeConfig::resolve(Some(PathBuf::from("/tmp/custom.db"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(RuntimeConfig::with_db_path("x.db".into()).db_path, PathBuf::from("x.db"));
    }
}
