//! Final ordering and mapping of ranked candidates to playlist entries.

use crate::path_translator;
use crate::track::{PlaylistEntry, TrackCandidate};
use rand::seq::SliceRandom;
use rand::Rng;

/// Orders `candidates` and maps them to [`PlaylistEntry`] values.
///
/// With `shuffle_final` the sequence is uniformly shuffled; otherwise the
/// engine's order is kept. The output always has the same length as the
/// input: limits are enforced upstream.
#[must_use]
pub fn assemble<R: Rng + ?Sized>(
    mut candidates: Vec<TrackCandidate>,
    shuffle_final: bool,
    music_root: &str,
    rng: &mut R,
) -> Vec<PlaylistEntry> {
    if shuffle_final {
        candidates.shuffle(rng);
    }

    candidates
        .iter()
        .map(|track| PlaylistEntry {
            display_label: track.label(),
            relative_file_path: path_translator::to_mpd_relative(
                &track.directory_path,
                &track.filename,
                music_root,
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::fixtures::candidate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracks(n: u32) -> Vec<TrackCandidate> {
        (1..=n).map(|i| candidate(1, &format!("t{i}"), i)).collect()
    }

    #[test]
    fn test_preserves_order_without_shuffle() {
        let mut rng = StdRng::seed_from_u64(1);
        let entries = assemble(tracks(5), false, "/music/", &mut rng);
        let paths: Vec<_> = entries.iter().map(|e| e.relative_file_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "artist1/album/t1.flac",
                "artist1/album/t2.flac",
                "artist1/album/t3.flac",
                "artist1/album/t4.flac",
                "artist1/album/t5.flac",
            ]
        );
        assert_eq!(entries[0].display_label, "Artist 1 - t1 (Album)");
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut entries: Vec<_> = assemble(tracks(30), true, "/music/", &mut rng)
            .into_iter()
            .map(|e| e.relative_file_path)
            .collect();
        let mut expected: Vec<_> = assemble(tracks(30), false, "/music/", &mut rng)
            .into_iter()
            .map(|e| e.relative_file_path)
            .collect();

        assert_ne!(entries, expected, "30 tracks should not shuffle into identity");
        entries.sort();
        expected.sort();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_empty_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(assemble(Vec::new(), true, "/music/", &mut rng).is_empty());
    }
}
