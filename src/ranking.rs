//! # Track Ranking Engine
//!
//! Produces the bounded, ordered candidate list for each strategy:
//!
//! | Strategy   | Artist universe                          | Stage 2 score          |
//! |------------|------------------------------------------|------------------------|
//! | top tracks | the resolved artist set                  | none (store order)     |
//! | related    | relation targets of the seed, plus seed  | `random() * weight²`   |
//! | genre      | artists with nonzero weight for the tags | `random() / 8 * weight`|
//!
//! Related and genre share the two-stage sampler in [`crate::algorithm`].
//! An empty result is a valid outcome.

use crate::algorithm;
use crate::db::MetadataStore;
use crate::error::SelectionError;
use crate::track::{Artist, ArtistSet, TrackCandidate};
use anyhow::Result;
use log::{debug, info};
use rand::RngCore;

/// Limits applied by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Final cap on playlist length.
    pub track_limit: usize,
    /// Cap on tracks per artist before cross-artist sampling.
    pub per_artist_limit: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            track_limit: 25,
            per_artist_limit: 5,
        }
    }
}

/// Genre tags matched by a pattern. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// `"rock", "indie rock"`
    #[must_use]
    pub fn quoted(&self) -> String {
        self.tags
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Ranks tracks from a [`MetadataStore`] using an injected random source.
pub struct RankingEngine<'a, S: MetadataStore, R: RngCore> {
    store: &'a S,
    rng: &'a mut R,
    config: QueueConfig,
}

impl<'a, S: MetadataStore, R: RngCore> RankingEngine<'a, S, R> {
    pub fn new(store: &'a S, rng: &'a mut R, config: QueueConfig) -> Self {
        Self { store, rng, config }
    }

    /// The artists' most played tracks, rank 1 first. Deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn top_tracks(&mut self, artists: &ArtistSet) -> Result<Vec<TrackCandidate>> {
        debug!("Top tracks for artist ids {}", artists.id_list());
        let tracks = self.store.top_tracks(&artists.ids(), self.config.track_limit)?;
        info!("Top tracks for {artists}: {} selected", tracks.len());
        Ok(tracks)
    }

    /// Tracks from artists related to `seed`, the seed included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn related(&mut self, seed: &Artist) -> Result<Vec<TrackCandidate>> {
        let pool = self.store.related_pool(seed.id)?;
        let tracks = self.two_stage(pool, |rng, track| {
            algorithm::relation_score(rng, track.artist_weight)
        });
        info!("Related to {}: {} selected", seed.name, tracks.len());
        Ok(tracks)
    }

    /// Tags whose name matches `pattern`.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoGenreMatch`] when nothing matches, or a store failure.
    pub fn resolve_tags(&self, pattern: &str) -> Result<TagSet> {
        let tags = self.store.search_tags(pattern)?;
        if tags.is_empty() {
            return Err(SelectionError::NoGenreMatch(pattern.to_string()).into());
        }
        Ok(TagSet { tags })
    }

    /// Tracks from artists carrying the tags, weighted by summed tag count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn genre_tracks(&mut self, tags: &TagSet) -> Result<Vec<TrackCandidate>> {
        let pool = self.store.tagged_pool(tags.tags())?;
        let tracks = self.two_stage(pool, |rng, track| algorithm::tag_score(rng, track.artist_weight));
        info!("Genres {}: {} selected", tags.quoted(), tracks.len());
        Ok(tracks)
    }

    /// [`Self::resolve_tags`] followed by [`Self::genre_tracks`].
    ///
    /// # Errors
    ///
    /// As the two steps.
    pub fn by_genre(&mut self, pattern: &str) -> Result<(TagSet, Vec<TrackCandidate>)> {
        let tags = self.resolve_tags(pattern)?;
        let tracks = self.genre_tracks(&tags)?;
        Ok((tags, tracks))
    }

    /// Matching tag names only. Never touches track data.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list_genres(&self, pattern: &str) -> Result<Vec<String>> {
        self.store.search_tags(pattern)
    }

    fn two_stage<F>(&mut self, pool: Vec<TrackCandidate>, score: F) -> Vec<TrackCandidate>
    where
        F: FnMut(&mut R, &TrackCandidate) -> f64,
    {
        let pool_size = pool.len();
        let ranked = algorithm::rank_within_artists(pool, &mut *self.rng, self.config.per_artist_limit);
        debug!(
            "Stage 1 kept {} of {pool_size} tracks (per-artist limit {})",
            ranked.len(),
            self.config.per_artist_limit
        );
        algorithm::sample(ranked, &mut *self.rng, self.config.track_limit, score)
    }
}
