//! Artists, tracks and playlist entries as they move through a run.

use serde::Serialize;
use std::fmt;

/// Store-assigned artist id.
pub type ArtistId = i64;

/// An artist as found in the library. Only ever used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: ArtistId,
    /// Display name (`artist_name_capitalization`).
    pub name: String,
}

/// One or more artists picked by the resolver. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSet {
    artists: Vec<Artist>,
}

impl ArtistSet {
    /// A set holding exactly one artist.
    #[must_use]
    pub fn single(artist: Artist) -> Self {
        Self { artists: vec![artist] }
    }

    /// The union of several matches. Returns `None` for an empty list.
    #[must_use]
    pub fn union(artists: Vec<Artist>) -> Option<Self> {
        if artists.is_empty() {
            None
        } else {
            Some(Self { artists })
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ArtistId> {
        self.artists.iter().map(|a| a.id).collect()
    }

    /// Comma-joined ids, e.g. `"3,17,42"`.
    #[must_use]
    pub fn id_list(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The plain name for one artist, quoted and comma-joined names for a union.
    #[must_use]
    pub fn names(&self) -> String {
        match self.artists.as_slice() {
            [only] => only.name.clone(),
            many => many
                .iter()
                .map(|a| format!("'{}'", a.name))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for ArtistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names())
    }
}

/// A track as returned by the store, plus the ranking data the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCandidate {
    /// Artist the ranking partitions by (relation target or tagged artist).
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub album_name: String,
    pub track_name: String,
    /// Absolute directory as stored in the library.
    pub directory_path: String,
    pub filename: String,
    /// Play-count rank among the artist's top tracks, 1 = most played.
    pub popularity_rank: u32,
    pub play_count: u32,
    /// Ordinal under the blended random score, 1 = most preferred.
    /// 0 until the engine ranks the candidate; equals `popularity_rank`
    /// for top tracks.
    pub rank_within_artist: u32,
    /// Relation weight or aggregated tag weight; 1 for top tracks.
    pub artist_weight: f64,
}

impl TrackCandidate {
    /// `Artist - Track (Album)`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.artist_name, self.track_name, self.album_name)
    }
}

/// What MPD gets: something to print and a path relative to its music directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    pub display_label: String,
    pub relative_file_path: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn candidate(artist_id: ArtistId, track: &str, popularity_rank: u32) -> TrackCandidate {
        TrackCandidate {
            artist_id,
            artist_name: format!("Artist {artist_id}"),
            album_name: "Album".to_string(),
            track_name: track.to_string(),
            directory_path: format!("/music/artist{artist_id}/album"),
            filename: format!("{track}.flac"),
            popularity_rank,
            play_count: 0,
            rank_within_artist: 0,
            artist_weight: 1.0,
        }
    }
}
