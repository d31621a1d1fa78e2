//! SQLite cache for related-artist lookups.
//!
//! Two tables: `related_lookup` records that an artist has been looked up
//! at all (so a cached empty answer is not mistaken for a miss), and
//! `related_artist` holds the answer rows.

use anyhow::{Context, Result};
use log::{debug, trace};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::track::ArtistRef;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS related_lookup (
        artist_id  TEXT PRIMARY KEY,
        fetched_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS related_artist (
        artist_id    TEXT    NOT NULL,
        position     INTEGER NOT NULL,
        related_id   TEXT    NOT NULL,
        related_name TEXT    NOT NULL,
        PRIMARY KEY (artist_id, position),
        FOREIGN KEY (artist_id) REFERENCES related_lookup(artist_id)
    );
";

/// Local related-artists store.
#[derive(Debug)]
pub struct RelationsCache {
    conn: Connection,
}

impl RelationsCache {
    /// Opens (creating if needed) the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open relations cache at {}", path.display()))?;
        debug!("Opened relations cache at {}", path.display());
        Self::with_connection(conn)
    }

    /// A throwaway cache living only in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot create the in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory relations cache")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Invalid SQL when creating relations cache tables")?;
        Ok(Self { conn })
    }

    /// Cached related artists for `artist_id`, `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, artist_id: &str) -> Result<Option<Vec<ArtistRef>>> {
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT fetched_at FROM related_lookup WHERE artist_id = ?1",
                [artist_id],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to query related lookup for '{artist_id}'"))?;

        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT related_id, related_name FROM related_artist WHERE artist_id = ?1 ORDER BY position")
            .context("Invalid SQL when SELECTing related artists")?;

        let rows = stmt
            .query_map([artist_id], |row| Ok(ArtistRef { id: row.get(0)?, name: row.get(1)? }))
            .with_context(|| format!("Cannot query related artists for '{artist_id}'"))?;

        let mut related = Vec::new();
        for row in rows {
            related.push(row.with_context(|| format!("Malformed related artist row for '{artist_id}'"))?);
        }

        trace!("Cache hit for '{artist_id}': {} related artists", related.len());
        Ok(Some(related))
    }

    /// Replaces whatever is cached for `artist_id` with `related`.
    /// Storing the same answer again leaves the cache unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing is written then.
    pub fn store(&self, artist_id: &str, related: &[ArtistRef]) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin relations cache transaction")?;

        tx.execute("DELETE FROM related_artist WHERE artist_id = ?1", [artist_id])
            .with_context(|| format!("Failed to clear cached related artists for '{artist_id}'"))?;
        tx.execute(
            "INSERT OR REPLACE INTO related_lookup (artist_id, fetched_at) VALUES (?1, ?2)",
            params![artist_id, unix_now()],
        )
        .with_context(|| format!("Failed to record related lookup for '{artist_id}'"))?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO related_artist (artist_id, position, related_id, related_name) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, artist) in related.iter().enumerate() {
                let position = i64::try_from(position).context("Related artist list too long")?;
                stmt.execute(params![artist_id, position, artist.id, artist.name])
                    .with_context(|| format!("Failed to INSERT related artist {artist:?} for '{artist_id}'"))?;
            }
        }

        tx.commit().context("Committing relations cache transaction failed")?;
        debug!("Cached {} related artists for '{artist_id}'", related.len());
        Ok(())
    }

    /// Number of artists with a cached answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM related_lookup", [], |row| row.get(0))
            .context("Could not count cached related lookups")?;
        usize::try_from(count).context("Negative row count")
    }

    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drops every cached answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM related_artist; DELETE FROM related_lookup;")
            .context("Failed to clear relations cache")
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
