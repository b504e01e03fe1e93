//! Weighted-random ranking used by the related and genre strategies.
//!
//! Both strategies run the same two stages over a pool of candidates:
//!
//! 1. **Per-artist ranking.** Every track gets a blended score
//!    `random() * (110 - popularity_rank + play_count / 3)` and is ranked
//!    inside its artist, best first. Only ranks up to the per-artist limit
//!    survive.
//! 2. **Cross-artist sampling.** Survivors are scored again with a
//!    strategy-specific weight function ([`relation_score`] or
//!    [`tag_score`]), sorted descending and cut to the track limit.
//!
//! Random numbers are drawn in a fixed order so a seeded RNG reproduces the
//! exact result:
//! stage 1 draws in pool order, stage 2 in stage-1 output order (artists by
//! ascending id, then rank).

use crate::track::{ArtistId, TrackCandidate};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Offset that keeps the popularity term positive for the first 110 ranks.
pub const POPULARITY_BASE: i64 = 110;

/// Divisor applied to the random factor of the tag score.
pub const TAG_SCORE_DAMPING: f64 = 8.0;

/// Blended recency/popularity/random score for stage 1.
///
/// `play_count / 3` is integer division.
#[must_use]
pub fn blended_score<R: Rng + ?Sized>(rng: &mut R, popularity_rank: u32, play_count: u32) -> f64 {
    let base = POPULARITY_BASE - i64::from(popularity_rank) + i64::from(play_count / 3);
    #[allow(clippy::cast_precision_loss)]
    let base = base as f64;
    rng.gen::<f64>() * base
}

/// Stage 2 score for related artists: `random() * weight²`.
#[must_use]
pub fn relation_score<R: Rng + ?Sized>(rng: &mut R, weight: f64) -> f64 {
    rng.gen::<f64>() * weight * weight
}

/// Stage 2 score for genre tags.
#[must_use]
pub fn tag_score<R: Rng + ?Sized>(rng: &mut R, weight: f64) -> f64 {
    (rng.gen::<f64>() / TAG_SCORE_DAMPING) * weight
}

/// Stage 1: rank each artist's tracks by [`blended_score`] and keep those
/// ranked `<= per_artist_limit`.
///
/// Ranks follow SQL `RANK()`: equal scores share a rank and the next rank
/// skips ahead. The result is grouped by ascending artist id, best rank
/// first, with `rank_within_artist` filled in.
#[must_use]
pub fn rank_within_artists<R: Rng + ?Sized>(
    pool: Vec<TrackCandidate>,
    rng: &mut R,
    per_artist_limit: usize,
) -> Vec<TrackCandidate> {
    let mut by_artist: BTreeMap<ArtistId, Vec<(f64, TrackCandidate)>> = BTreeMap::new();
    for track in pool {
        let score = blended_score(rng, track.popularity_rank, track.play_count);
        by_artist.entry(track.artist_id).or_default().push((score, track));
    }

    let mut ranked = Vec::new();
    for (_, mut tracks) in by_artist {
        tracks.sort_by(|(a, _), (b, _)| descending(*a, *b));

        let mut rank = 0;
        let mut previous: Option<f64> = None;
        for (position, (score, mut track)) in tracks.into_iter().enumerate() {
            if previous != Some(score) {
                rank = position + 1;
                previous = Some(score);
            }
            if rank > per_artist_limit {
                break;
            }
            track.rank_within_artist = u32::try_from(rank).unwrap_or(u32::MAX);
            ranked.push(track);
        }
    }

    ranked
}

/// Stage 2: score every candidate with `score`, sort descending and keep
/// at most `limit`.
#[must_use]
pub fn sample<R, F>(candidates: Vec<TrackCandidate>, rng: &mut R, limit: usize, mut score: F) -> Vec<TrackCandidate>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R, &TrackCandidate) -> f64,
{
    let mut scored: Vec<(f64, TrackCandidate)> = candidates
        .into_iter()
        .map(|track| (score(rng, &track), track))
        .collect();

    scored.sort_by(|(a, _), (b, _)| descending(*a, *b));
    scored.truncate(limit);
    scored.into_iter().map(|(_, track)| track).collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
