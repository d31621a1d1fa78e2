//! Artist-relations collaborator.
//!
//! Strategies only see [`ArtistRelations`]. [`CachedRelations`] is the
//! cache-aside implementation: the local SQLite cache answers first and the
//! remote [`RelatedArtistFetcher`] is only consulted on a miss, after which
//! the answer is stored.

use anyhow::{Context, Result};
use log::debug;

use crate::db::RelationsCache;
use crate::track::ArtistRef;

/// Answers "which artists are related to this one?".
pub trait ArtistRelations {
    /// Related artists for `artist_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup could not be completed.
    fn related_artists(&mut self, artist_id: &str) -> Result<Vec<ArtistRef>>;
}

/// The remote side of a related-artists lookup.
pub trait RelatedArtistFetcher {
    /// Fetch related artists for `artist_id` from the source of truth.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    fn fetch_related(&self, artist_id: &str) -> Result<Vec<ArtistRef>>;
}

impl<T: RelatedArtistFetcher + ?Sized> RelatedArtistFetcher for &T {
    fn fetch_related(&self, artist_id: &str) -> Result<Vec<ArtistRef>> {
        (**self).fetch_related(artist_id)
    }
}

/// Cache-aside wrapper around a fetcher.
pub struct CachedRelations<'a, F: RelatedArtistFetcher> {
    cache: &'a RelationsCache,
    fetcher: F,
}

impl<'a, F: RelatedArtistFetcher> CachedRelations<'a, F> {
    pub fn new(cache: &'a RelationsCache, fetcher: F) -> Self {
        Self { cache, fetcher }
    }
}

impl<F: RelatedArtistFetcher> ArtistRelations for CachedRelations<'_, F> {
    fn related_artists(&mut self, artist_id: &str) -> Result<Vec<ArtistRef>> {
        if let Some(cached) = self.cache.get(artist_id)? {
            debug!("Related artists for '{artist_id}' served from cache ({} entries)", cached.len());
            return Ok(cached);
        }

        debug!("Related artists cache miss for '{artist_id}', fetching");
        let related = self
            .fetcher
            .fetch_related(artist_id)
            .with_context(|| format!("Failed to fetch related artists for '{artist_id}'"))?;

        self.cache.store(artist_id, &related)?;
        Ok(related)
    }
}
