//! # Pipeline
//!
//! One run from settings to a filled MPD playlist:
//!
//! ```text
//! resolve artists/tags ─> connect ─> rank ─> assemble ─> print or enqueue ─> disconnect
//! ```
//!
//! Selection failures (no match, bad choice, unknown genre) abort before the
//! playback daemon is contacted, and an unreachable daemon aborts before any
//! ranking work. Listing genres and dry runs never connect at all.
//!
//! The store, the prompt, the daemon connection and the random source are
//! all passed in, so the whole run can be driven from tests.

use crate::config::{PlaylistPosition, Selection, Settings};
use crate::db::MetadataStore;
use crate::mpd_client::{MpdSettings, PlaybackSink};
use crate::playlist;
use crate::ranking::{RankingEngine, TagSet};
use crate::resolver::{ArtistResolver, Chooser};
use crate::track::{Artist, ArtistSet, PlaylistEntry};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use rand::RngCore;
use std::io::Write;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Genre tags were listed.
    Genres(Vec<String>),
    /// Dry run: the playlist was printed, nothing was sent to MPD.
    Printed(Vec<PlaylistEntry>),
    /// Tracks were handed to MPD.
    Queued { added: usize, skipped: usize },
}

enum Target {
    TopTracks(ArtistSet),
    Related(Artist),
    Genres(TagSet),
}

/// Runs the selection described by `settings`.
///
/// `connect` opens the playback sink; it is only called for real runs.
/// Human-readable progress goes to `out`.
///
/// # Errors
///
/// Selection errors ([`crate::error::SelectionError`]), store failures,
/// connection and authentication failures, and a playlist that MPD refused
/// entirely.
pub fn run<S, C, P, F, R>(
    settings: &Settings,
    store: &S,
    chooser: &mut C,
    connect: F,
    rng: &mut R,
    out: &mut dyn Write,
) -> Result<Outcome>
where
    S: MetadataStore,
    C: Chooser,
    P: PlaybackSink,
    F: FnOnce(&MpdSettings) -> Result<P>,
    R: RngCore,
{
    let mut engine = RankingEngine::new(store, &mut *rng, settings.queue);

    let target = match &settings.selection {
        Selection::ListGenres { pattern } => {
            let genres = engine.list_genres(pattern)?;
            print_genres(&genres, settings.json, out)?;
            return Ok(Outcome::Genres(genres));
        }
        Selection::TopTracks { artist } => {
            Target::TopTracks(ArtistResolver::new(store, chooser).top_tracks(artist)?)
        }
        Selection::Related { artist } => Target::Related(ArtistResolver::new(store, chooser).related(artist)?),
        Selection::Genres { pattern } => Target::Genres(engine.resolve_tags(pattern)?),
    };

    let mut sink = if settings.dry_run {
        None
    } else {
        let mut sink = connect(&settings.mpd)?;
        if let Some(password) = &settings.mpd.password {
            sink.authenticate(password)?;
        }
        Some(sink)
    };

    let limit = settings.queue.track_limit;
    let (headline, candidates) = match &target {
        Target::TopTracks(artists) => {
            let plural = if artists.len() > 1 { "s" } else { "" };
            (
                format!("==> Selecting top {limit} tracks for artist{plural} {}", artists.names()),
                engine.top_tracks(artists)?,
            )
        }
        Target::Related(seed) => (
            format!("==> Selecting {limit} tracks from artists related to {}", seed.name),
            engine.related(seed)?,
        ),
        Target::Genres(tags) => (
            format!("==> Selecting {limit} tracks with genre tags {}", tags.quoted()),
            engine.genre_tracks(tags)?,
        ),
    };
    if !settings.json {
        writeln!(out, "{headline}")?;
    }

    let entries = playlist::assemble(candidates, settings.shuffle_tracks, &settings.music_dir, rng);
    debug!("Assembled {} playlist entries", entries.len());

    match sink.as_mut() {
        None => {
            print_entries(&entries, settings.json, out)?;
            Ok(Outcome::Printed(entries))
        }
        Some(sink) => {
            let outcome = deliver(sink, &entries, settings, out)?;
            sink.disconnect()?;
            Ok(outcome)
        }
    }
}

/// Sends the playlist to MPD: clear, add each entry, play after the first,
/// shuffle at the end. Each added entry is echoed unless `--json` is set.
fn deliver<P: PlaybackSink>(
    sink: &mut P,
    entries: &[PlaylistEntry],
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<Outcome> {
    if entries.is_empty() {
        warn!("No tracks selected, MPD playlist left untouched");
        return Ok(Outcome::Queued { added: 0, skipped: 0 });
    }

    if settings.position == PlaylistPosition::Replace {
        sink.clear_queue().context("Failed to clear the MPD playlist")?;
    }

    let mut added = 0;
    for entry in entries {
        if let Err(e) = sink.enqueue(&entry.relative_file_path) {
            warn!("Skipping {:?}: {e:#}", entry.relative_file_path);
            continue;
        }
        if !settings.json {
            writeln!(out, "added \"{}\"", entry.display_label)?;
        }
        added += 1;
        if added == 1 {
            sink.play().context("Failed to start playback")?;
        }
    }

    let skipped = entries.len() - added;
    if added == 0 {
        bail!("MPD refused all {skipped} tracks, check --music-dir");
    }

    if settings.shuffle_queue {
        sink.shuffle_queue().context("Failed to shuffle the MPD playlist")?;
    }

    info!("Added {added} tracks to MPD ({skipped} skipped)");
    Ok(Outcome::Queued { added, skipped })
}

fn print_genres(genres: &[String], json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(genres)?)?;
    } else {
        for genre in genres {
            writeln!(out, "{genre}")?;
        }
    }
    Ok(())
}

fn print_entries(entries: &[PlaylistEntry], json: bool, out: &mut dyn Write) -> Result<()> {
    for entry in entries {
        if json {
            writeln!(out, "{}", serde_json::to_string(entry)?)?;
        } else {
            writeln!(out, "{}", entry.display_label)?;
        }
    }
    Ok(())
}
